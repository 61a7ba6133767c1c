//! Account store errors

use thiserror::Error;

/// Errors surfaced by an [`AccountStore`](super::AccountStore)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Account id {0} already exists!")]
    DuplicateAccountId(String),

    #[error("Account store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Get the error code for callers that map errors to responses
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::DuplicateAccountId(_) => "DUPLICATE_ACCOUNT_ID",
            StoreError::Unavailable(_) => "STORE_UNAVAILABLE",
        }
    }
}
