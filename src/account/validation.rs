//! Construction-time checks for account records
//!
//! Only what the transfer core relies on is checked here: an identifier that
//! can be ordered and looked up, and a balance that starts out non-negative.

use crate::core_types::Amount;

/// Account construction errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AccountError {
    #[error("Account id must not be empty")]
    EmptyAccountId,

    #[error("Initial balance must be non-negative: got {balance}")]
    NegativeBalance { balance: Amount },
}

/// Reject blank identifiers.
pub fn validate_account_id(account_id: &str) -> Result<(), AccountError> {
    if account_id.trim().is_empty() {
        return Err(AccountError::EmptyAccountId);
    }
    Ok(())
}

/// Reject opening balances below zero.
pub fn validate_opening_balance(balance: Amount) -> Result<(), AccountError> {
    if balance.is_sign_negative() && !balance.is_zero() {
        return Err(AccountError::NegativeBalance { balance });
    }
    Ok(())
}
