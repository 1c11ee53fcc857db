//! API middleware.
//!
//! Only the access logger today; CORS comes from `tower-http` in the router.

pub mod audit;
