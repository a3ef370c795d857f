//! Error model of the ledger infrastructure.

use rust_decimal::Decimal;
use thiserror::Error;

use voltran_core::DomainError;

use crate::journal::JournalError;

/// Failure of a repository, log, or ledger operation.
///
/// Every variant guarantees that no state was changed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Missing or malformed input.
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    /// Referenced entity absent or owned by someone else.
    #[error("not found")]
    NotFound,
    /// Outward quantity exceeds what is on hand.
    #[error("Insufficient stock. Available: {available} {unit}")]
    InsufficientStock { available: Decimal, unit: String },
    /// Exclusive access to the material could not be obtained in time (retryable).
    #[error("material is busy, retry the request")]
    Busy,
    /// Storage or unexpected failure. The detail is for logs only.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// A std lock was poisoned by a panicking holder.
    pub(crate) fn poisoned(lock: &'static str) -> Self {
        tracing::error!(lock, "lock poisoned");
        Self::Internal(format!("{lock} lock poisoned"))
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Busy)
    }
}

impl From<DomainError> for LedgerError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation { field, message } => LedgerError::Validation { field, message },
            DomainError::NotFound => LedgerError::NotFound,
            DomainError::InsufficientStock { available, unit } => {
                LedgerError::InsufficientStock { available, unit }
            }
            // An id that does not parse cannot name anything.
            DomainError::InvalidId(_) => LedgerError::NotFound,
        }
    }
}

impl From<JournalError> for LedgerError {
    fn from(value: JournalError) -> Self {
        LedgerError::Internal(value.to_string())
    }
}
