//! Error types
//!
//! Property resolution failures and execution control errors.

use thiserror::Error;

use crate::models::PropertyType;

/// Errors raised while resolving or assigning property values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropertyError {
    #[error("Property reference '{0}' could not be resolved")]
    UnresolvedReference(String),

    #[error("Could not parse date string: {0}")]
    InvalidDate(String),

    #[error("Could not parse numeric string: {0}")]
    InvalidNumber(String),

    #[error("Invalid property type: {expected} -> {found}")]
    TypeMismatch {
        expected: PropertyType,
        found: PropertyType,
    },

    #[error("Unsupported property type referenced: {0}")]
    UnsupportedType(PropertyType),

    #[error("Property '{0}' is not a property list")]
    NotAComposite(String),
}

/// Errors raised at execution control suspension points
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlError {
    #[error("Test execution interrupted")]
    Interrupted,
}
