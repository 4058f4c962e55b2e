//! Errors raised by stock, donor, donation and scheduling rules.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Failure of a domain operation.
///
/// Every variant means the operation had no effect: callers never observe a
/// half-applied stock adjustment or donor credit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input rejected before touching state (negative volume, empty name,
    /// blood type not matching the donor, inactive donor).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Stored data broke a rule it should always satisfy, e.g. a ledger with
    /// two rows for one blood type.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Text that is not a donor, donation, appointment or campaign id.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// No record with that id or blood type. Carries what was looked up.
    #[error("not found: {0}")]
    NotFound(String),

    /// The record's status forbids the change (completing a cancelled
    /// donation, reusing a registered email).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Stable machine-readable code, used as the `error` field of API bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::InvariantViolation(_) => "invariant_violation",
            Self::InvalidId(_) => "invalid_id",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
        }
    }
}
