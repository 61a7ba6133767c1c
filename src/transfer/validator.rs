//! Transfer validation
//!
//! Pure checks, no locks taken. `validate_sufficient_balance` is meant to be
//! called with the sender's lock held; see the engine.

use crate::account::Account;
use crate::core_types::Amount;

use super::error::TransferError;

/// Both accounts must exist and must be two different records.
///
/// Distinctness is record identity or an equal ID, never equal balances.
pub fn validate_accounts<'a>(
    from: Option<&'a Account>,
    to: Option<&'a Account>,
) -> Result<(&'a Account, &'a Account), TransferError> {
    let (Some(from), Some(to)) = (from, to) else {
        return Err(TransferError::InvalidAccount);
    };
    if std::ptr::eq(from, to) || from.account_id() == to.account_id() {
        return Err(TransferError::SameAccount);
    }
    Ok((from, to))
}

/// Amounts may be zero but never negative.
pub fn validate_amount(amount: Amount) -> Result<(), TransferError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(TransferError::InvalidAmount);
    }
    Ok(())
}

/// Sender must cover the full amount. Exact decimal comparison.
pub fn validate_sufficient_balance(balance: Amount, amount: Amount) -> Result<(), TransferError> {
    if balance < amount {
        return Err(TransferError::InsufficientFunds);
    }
    Ok(())
}

/// `result` must be the exact value of `lhs ± rhs`.
///
/// `Decimal` arithmetic rounds once a result needs more than 28 significant
/// digits. An exact sum or difference never needs a finer scale than the
/// finer of its two operands, so a result with a coarser scale was rounded.
pub fn validate_exact(lhs: Amount, rhs: Amount, result: Amount) -> Result<(), TransferError> {
    let needed = lhs.normalize().scale().max(rhs.normalize().scale());
    if result.scale() < needed {
        return Err(TransferError::PrecisionLoss);
    }
    Ok(())
}
