//! Domain error model.

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures. Every variant
/// is raised before any state is touched. Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required input was missing or malformed.
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// The referenced entity does not exist for this owner.
    #[error("not found")]
    NotFound,

    /// An outward movement asked for more than is on hand.
    #[error("Insufficient stock. Available: {available} {unit}")]
    InsufficientStock { available: Decimal, unit: String },

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn insufficient_stock(available: Decimal, unit: impl Into<String>) -> Self {
        Self::InsufficientStock {
            available,
            unit: unit.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_message_is_displayable() {
        let err = DomainError::insufficient_stock(Decimal::from(150), "pcs");
        assert_eq!(err.to_string(), "Insufficient stock. Available: 150 pcs");
    }

    #[test]
    fn validation_message_is_the_bare_message() {
        let err = DomainError::validation("supplier", "supplier is required");
        assert_eq!(err.to_string(), "supplier is required");
    }
}
