//! Transfer Error Types
//!
//! Domain rejections (`InvalidAccount`, `SameAccount`, `InsufficientFunds`,
//! `InvalidAmount`, `Overflow`, `PrecisionLoss`) are kept apart from operational failures
//! (`Internal`) so callers never mistake one for the other.

use thiserror::Error;

use crate::account::StoreError;

use super::state::TransferState;

/// Transfer error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    // === Validation Errors ===
    #[error("Invalid From/To account")]
    InvalidAccount,

    #[error("From and To account should be different")]
    SameAccount,

    #[error("Amount to transfer must not be negative")]
    InvalidAmount,

    // === Balance Errors ===
    #[error("Insufficient balance in senders account")]
    InsufficientFunds,

    #[error("Resulting balance would overflow")]
    Overflow,

    #[error("Resulting balance would lose precision")]
    PrecisionLoss,

    // === System Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TransferError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::InvalidAccount => "INVALID_ACCOUNT",
            TransferError::SameAccount => "SAME_ACCOUNT",
            TransferError::InvalidAmount => "INVALID_AMOUNT",
            TransferError::InsufficientFunds => "INSUFFICIENT_FUNDS",
            TransferError::Overflow => "OVERFLOW",
            TransferError::PrecisionLoss => "PRECISION_LOSS",
            TransferError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// True for rejections caused by the request or account state,
    /// false for operational failures.
    pub fn is_domain(&self) -> bool {
        !matches!(self, TransferError::Internal(_))
    }

    /// The FSM state in which this error ends a transfer.
    pub fn failed_in(&self) -> TransferState {
        match self {
            TransferError::InvalidAccount
            | TransferError::SameAccount
            | TransferError::InvalidAmount
            | TransferError::Internal(_) => TransferState::Validating,
            TransferError::InsufficientFunds
            | TransferError::Overflow
            | TransferError::PrecisionLoss => TransferState::BalanceChecking,
        }
    }
}

impl From<StoreError> for TransferError {
    fn from(e: StoreError) -> Self {
        TransferError::Internal(e.to_string())
    }
}
