//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (missing entities,
/// failed preconditions, status guards). Infrastructure concerns belong
/// elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A referenced entity does not exist (stock row, BOM, product, document).
    #[error("not found: {0}")]
    NotFound(String),

    /// Not enough stock of a product to satisfy a sale or transfer.
    #[error("insufficient stock: {0}")]
    InsufficientStock(String),

    /// Not enough raw material to satisfy a production order.
    #[error("insufficient material: {0}")]
    InsufficientMaterial(String),

    /// The capital balance cannot fund the requested debit.
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    /// A status guard rejected the operation (double receipt, double payment,
    /// same-location transfer, non-positive quantity, ...).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A uniqueness constraint was violated (stock triple, document number).
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn insufficient_stock(msg: impl Into<String>) -> Self {
        Self::InsufficientStock(msg.into())
    }

    pub fn insufficient_material(msg: impl Into<String>) -> Self {
        Self::InsufficientMaterial(msg.into())
    }

    pub fn insufficient_funds(msg: impl Into<String>) -> Self {
        Self::InsufficientFunds(msg.into())
    }

    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    pub fn duplicate_key(msg: impl Into<String>) -> Self {
        Self::DuplicateKey(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
