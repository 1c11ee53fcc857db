//! API endpoint handlers.

pub mod feedback;
pub mod health;
pub mod procedure;
