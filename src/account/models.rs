//! Account record owned by the account store

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::core_types::{AccountId, Amount};

use super::validation::{AccountError, validate_account_id, validate_opening_balance};

/// A balance-holding account.
///
/// # Invariants (enforced by private fields):
/// 1. `account_id` is immutable after creation
/// 2. `balance` is never negative when observed outside a transfer
/// 3. `balance` is only written while holding its own mutex
///
/// Each account carries its own lock. The transfer engine acquires the locks
/// of two accounts in identifier order; see [`crate::transfer::coordinator`].
pub struct Account {
    account_id: AccountId,
    balance: Mutex<Amount>,
}

impl Account {
    /// Create an account with a zero balance.
    pub fn new(account_id: impl Into<AccountId>) -> Result<Self, AccountError> {
        Self::with_balance(account_id, Amount::ZERO)
    }

    /// Create an account with an opening balance.
    ///
    /// # Errors
    /// - `EmptyAccountId` if the identifier is blank
    /// - `NegativeBalance` if the opening balance is below zero
    pub fn with_balance(
        account_id: impl Into<AccountId>,
        balance: Amount,
    ) -> Result<Self, AccountError> {
        let account_id = account_id.into();
        validate_account_id(&account_id)?;
        validate_opening_balance(balance)?;
        Ok(Self {
            account_id,
            balance: Mutex::new(balance),
        })
    }

    /// Read-only access to the account ID
    #[inline]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Snapshot of the current balance.
    ///
    /// Takes the account lock, so a read waits for an in-flight transfer on
    /// this account (notifier calls included) and then sees its result. The
    /// value is either the pre-transfer or post-transfer balance, never a
    /// partial one.
    pub fn balance(&self) -> Amount {
        *self.lock_balance()
    }

    /// Acquire this account's balance lock.
    ///
    /// Balances are only written after every fallible step of a transfer has
    /// passed, so a poisoned mutex still guards a consistent value.
    pub(crate) fn lock_balance(&self) -> MutexGuard<'_, Amount> {
        self.balance.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("account_id", &self.account_id)
            .field("balance", &self.balance())
            .finish()
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account[{}]", self.account_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_starts_at_zero() {
        let account = Account::new("Id-123").unwrap();
        assert_eq!(account.account_id(), "Id-123");
        assert_eq!(account.balance(), Amount::ZERO);
    }

    #[test]
    fn test_with_balance() {
        let account = Account::with_balance("Id-123", Amount::from(1000)).unwrap();
        assert_eq!(account.balance(), Amount::from(1000));
    }

    #[test]
    fn test_rejects_negative_opening_balance() {
        let err = Account::with_balance("Id-123", Amount::from(-1)).unwrap_err();
        assert!(matches!(err, AccountError::NegativeBalance { .. }));
    }

    #[test]
    fn test_rejects_empty_id() {
        assert_eq!(
            Account::new("  ").unwrap_err(),
            AccountError::EmptyAccountId
        );
    }

    #[test]
    fn test_lock_balance_writes_through() {
        let account = Account::with_balance("Id-1", Amount::from(10)).unwrap();
        {
            let mut guard = account.lock_balance();
            *guard += Amount::from(5);
        }
        assert_eq!(account.balance(), Amount::from(15));
    }

    #[test]
    fn test_balance_read_waits_for_writer() {
        use std::sync::{Arc, Barrier};
        use std::thread;
        use std::time::Duration;

        let account = Arc::new(Account::with_balance("Id-1", Amount::from(10)).unwrap());
        let locked = Arc::new(Barrier::new(2));

        let writer = {
            let account = Arc::clone(&account);
            let locked = Arc::clone(&locked);
            thread::spawn(move || {
                let mut guard = account.lock_balance();
                locked.wait();
                thread::sleep(Duration::from_millis(50));
                *guard = Amount::from(4);
            })
        };

        locked.wait();
        // Blocks until the writer drops its guard
        assert_eq!(account.balance(), Amount::from(4));
        writer.join().unwrap();
    }

    #[test]
    fn test_display_hides_balance() {
        let account = Account::with_balance("Id-7", Amount::from(3)).unwrap();
        assert_eq!(account.to_string(), "Account[Id-7]");
        assert!(format!("{:?}", account).contains("balance: 3"));
    }
}
