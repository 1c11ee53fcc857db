//! Request-scoped domain types shared by the generator, the risk
//! annotator and the HTTP layer.

pub mod enums;
pub mod feedback;
pub mod lab;
pub mod plan;
pub mod procedure;

pub use enums::*;
pub use feedback::*;
pub use lab::*;
pub use plan::*;
pub use procedure::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid value for {field}: {value}")]
pub struct ParseEnumError {
    pub field: &'static str,
    pub value: String,
}

/// Input that deserialized fine but breaks a domain constraint.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
