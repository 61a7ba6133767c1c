//! Transfer Engine
//!
//! The single entry point for moving funds between accounts.
//!
//! # Steps
//!
//! 1. Resolve both accounts through the store (no locks)
//! 2. Reject negative amounts, missing accounts, and self-transfers (no locks)
//! 3. Acquire both account locks in ID order ([`coordinator`](super::coordinator))
//! 4. Re-check the sender balance with both locks held, and compute both
//!    new balances exactly
//! 5. Debit and credit together, then notify each account
//! 6. Drop the guards, releasing both locks
//!
//! Nothing is written before step 5, and every check that can fail runs
//! before the first write. A rejected transfer leaves both balances exactly
//! as they were.

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::account::{Account, AccountStore};
use crate::core_types::Amount;
use crate::notification::Notifier;

use super::coordinator::{self, LockedPair};
use super::error::TransferError;
use super::state::TransferState;
use super::types::{Direction, TransferId, TransferReceipt, TransferRequest};
use super::validator;

/// Moves funds between accounts of a shared store.
///
/// `TransferEngine` is `Send + Sync`; share it behind an `Arc` and call
/// [`transfer`](Self::transfer) from any number of threads.
pub struct TransferEngine {
    store: Arc<dyn AccountStore>,
    notifier: Arc<dyn Notifier>,
}

impl TransferEngine {
    /// Create a new TransferEngine
    pub fn new(store: Arc<dyn AccountStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Look up an account by ID.
    ///
    /// The returned balance snapshot is not ordered against concurrent
    /// transfers.
    pub fn get_account(&self, account_id: &str) -> Result<Option<Arc<Account>>, TransferError> {
        Ok(self.store.get(account_id)?)
    }

    /// Convenience wrapper around [`transfer`](Self::transfer).
    pub fn transfer_money(
        &self,
        from_account_id: &str,
        to_account_id: &str,
        amount: Amount,
    ) -> Result<TransferReceipt, TransferError> {
        self.transfer(&TransferRequest::new(
            from_account_id,
            to_account_id,
            amount,
        ))
    }

    /// Move `request.amount` from one account to another.
    ///
    /// # Errors
    /// - `InvalidAmount` - negative amount
    /// - `InvalidAccount` - either ID not found in the store
    /// - `SameAccount` - source and destination are the same account
    /// - `InsufficientFunds` - sender balance below amount (checked under lock)
    /// - `Overflow` - a resulting balance is not representable
    /// - `PrecisionLoss` - a resulting balance would need rounding
    /// - `Internal` - the store failed
    ///
    /// No retries: a caller retrying after `InsufficientFunds` must submit a
    /// fresh request, which is validated from scratch.
    pub fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, TransferError> {
        let transfer_id = TransferId::new();
        match self.execute(transfer_id, request) {
            Ok(receipt) => {
                info!(
                    transfer_id = %transfer_id,
                    from = %receipt.from_account_id,
                    to = %receipt.to_account_id,
                    amount = %receipt.amount,
                    "Successfully completed transfer request"
                );
                Ok(receipt)
            }
            Err(e) => {
                warn!(
                    transfer_id = %transfer_id,
                    request = %request,
                    code = e.code(),
                    state = %e.failed_in(),
                    "Transfer rejected: {}",
                    e
                );
                Err(e)
            }
        }
    }

    fn execute(
        &self,
        transfer_id: TransferId,
        request: &TransferRequest,
    ) -> Result<TransferReceipt, TransferError> {
        let amount = request.amount;

        // === VALIDATING ===
        enter(transfer_id, TransferState::Validating);
        validator::validate_amount(amount)?;
        let from = self.store.get(&request.from_account_id)?;
        let to = self.store.get(&request.to_account_id)?;
        let (from, to) = validator::validate_accounts(from.as_deref(), to.as_deref())?;

        // Existence is not re-checked under the lock. The store never removes
        // accounts and we hold the records themselves, so the lock we take is
        // the lock that governs these balances.

        // === LOCK_ACQUIRING ===
        enter(transfer_id, TransferState::LockAcquiring);
        let mut pair = coordinator::acquire(from, to);
        debug!(
            transfer_id = %transfer_id,
            from = from.account_id(),
            to = to.account_id(),
            "Acquired ordered account locks"
        );

        // === BALANCE_CHECKING ===
        enter(transfer_id, TransferState::BalanceChecking);
        let (from_balance, to_balance) = Self::settle_amounts(&pair, amount)?;

        // === MUTATING ===
        enter(transfer_id, TransferState::Mutating);
        let Some((source, target)) = pair.balances_mut() else {
            // validate_accounts rejects equal IDs, the only way to a single lock
            unreachable!("single-lock pair for distinct accounts");
        };
        *source = from_balance;
        *target = to_balance;

        // === NOTIFYING ===
        enter(transfer_id, TransferState::Notifying);
        self.notifier.notify_about_transfer(
            &request.from_account_id,
            &Direction::Debit.message(amount, from_balance),
        );
        self.notifier.notify_about_transfer(
            &request.to_account_id,
            &Direction::Credit.message(amount, to_balance),
        );

        // === RELEASED ===
        drop(pair);
        enter(transfer_id, TransferState::Released);

        Ok(TransferReceipt {
            transfer_id,
            from_account_id: request.from_account_id.clone(),
            to_account_id: request.to_account_id.clone(),
            amount,
            from_balance,
            to_balance,
        })
    }

    /// Compute both post-transfer balances without writing anything.
    ///
    /// Both results must be exact, so the debit always equals the credit.
    fn settle_amounts(
        pair: &LockedPair<'_>,
        amount: Amount,
    ) -> Result<(Amount, Amount), TransferError> {
        let source = pair.source_balance();
        validator::validate_sufficient_balance(source, amount)?;
        let from_balance = source
            .checked_sub(amount)
            .ok_or(TransferError::Overflow)?;
        validator::validate_exact(source, amount, from_balance)?;

        let target = pair.target_balance();
        let to_balance = target
            .checked_add(amount)
            .ok_or(TransferError::Overflow)?;
        validator::validate_exact(target, amount, to_balance)?;
        Ok((from_balance, to_balance))
    }
}

#[inline]
fn enter(transfer_id: TransferId, state: TransferState) {
    trace!(transfer_id = %transfer_id, state = state.as_str(), "Transfer state");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{InMemoryAccountStore, StoreError};
    use crate::notification::QueueNotifier;

    struct Harness {
        store: Arc<InMemoryAccountStore>,
        notifier: Arc<QueueNotifier>,
        engine: TransferEngine,
    }

    impl Harness {
        fn new(accounts: &[(&str, i64)]) -> Self {
            let store = Arc::new(InMemoryAccountStore::new());
            for (id, balance) in accounts {
                store
                    .insert(Account::with_balance(*id, Amount::from(*balance)).unwrap())
                    .unwrap();
            }
            let notifier = Arc::new(QueueNotifier::new(64));
            let engine = TransferEngine::new(store.clone(), notifier.clone());
            Self {
                store,
                notifier,
                engine,
            }
        }

        fn balance(&self, id: &str) -> Amount {
            self.engine.get_account(id).unwrap().unwrap().balance()
        }
    }

    /// Store whose lookups always fail
    struct BrokenStore;

    impl AccountStore for BrokenStore {
        fn get(&self, _: &str) -> Result<Option<Arc<Account>>, StoreError> {
            Err(StoreError::Unavailable("offline".into()))
        }

        fn insert(&self, _: Account) -> Result<Arc<Account>, StoreError> {
            Err(StoreError::Unavailable("offline".into()))
        }
    }

    /// Store that hands out a fresh record on every lookup
    struct UnsharedStore;

    impl AccountStore for UnsharedStore {
        fn get(&self, account_id: &str) -> Result<Option<Arc<Account>>, StoreError> {
            let account = Account::with_balance(account_id, Amount::from(100))
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            Ok(Some(Arc::new(account)))
        }

        fn insert(&self, account: Account) -> Result<Arc<Account>, StoreError> {
            Ok(Arc::new(account))
        }
    }

    #[test]
    fn test_equal_ids_rejected_before_locking() {
        let engine = TransferEngine::new(Arc::new(UnsharedStore), Arc::new(QueueNotifier::new(1)));
        let err = engine
            .transfer_money("A", "A", Amount::from(1))
            .unwrap_err();
        assert_eq!(err, TransferError::SameAccount);
        assert!(err.failed_in().can_fail());
        assert_eq!(err.failed_in(), TransferState::Validating);
    }

    #[test]
    fn test_transfer_success() {
        let h = Harness::new(&[("A", 100), ("B", 100)]);
        let receipt = h.engine.transfer_money("A", "B", Amount::from(50)).unwrap();

        assert_eq!(receipt.from_balance, Amount::from(50));
        assert_eq!(receipt.to_balance, Amount::from(150));
        assert_eq!(h.balance("A"), Amount::from(50));
        assert_eq!(h.balance("B"), Amount::from(150));
    }

    #[test]
    fn test_notifies_both_accounts() {
        let h = Harness::new(&[("A", 100), ("B", 100)]);
        h.engine.transfer_money("A", "B", Amount::from(50)).unwrap();

        let sent = h.notifier.drain();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].account_id, "A");
        assert_eq!(
            sent[0].message,
            "Successfully debited amount 50 Current Balance : 50"
        );
        assert_eq!(sent[1].account_id, "B");
        assert_eq!(
            sent[1].message,
            "Successfully credited amount 50 Current Balance : 150"
        );
    }

    #[test]
    fn test_insufficient_funds_unchanged() {
        let h = Harness::new(&[("A", 100), ("B", 100)]);
        let err = h
            .engine
            .transfer_money("A", "B", Amount::from(1000))
            .unwrap_err();

        assert_eq!(err, TransferError::InsufficientFunds);
        assert_eq!(h.balance("A"), Amount::from(100));
        assert_eq!(h.balance("B"), Amount::from(100));
        assert!(h.notifier.is_empty());
    }

    #[test]
    fn test_same_account() {
        let h = Harness::new(&[("A", 100)]);
        for amount in [0, 50, 100, 1000] {
            let err = h
                .engine
                .transfer_money("A", "A", Amount::from(amount))
                .unwrap_err();
            assert_eq!(err, TransferError::SameAccount);
        }
        assert_eq!(h.balance("A"), Amount::from(100));
    }

    #[test]
    fn test_invalid_account() {
        let h = Harness::new(&[("B", 100)]);
        assert_eq!(
            h.engine
                .transfer_money("00000", "B", Amount::from(50))
                .unwrap_err(),
            TransferError::InvalidAccount
        );
        assert_eq!(
            h.engine
                .transfer_money("B", "00000", Amount::from(50))
                .unwrap_err(),
            TransferError::InvalidAccount
        );
        assert_eq!(h.balance("B"), Amount::from(100));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let h = Harness::new(&[("A", 100), ("B", 100)]);
        let err = h
            .engine
            .transfer_money("A", "B", Amount::from(-10))
            .unwrap_err();
        assert_eq!(err, TransferError::InvalidAmount);
        assert_eq!(h.store.total_balance(), Amount::from(200));
    }

    #[test]
    fn test_zero_amount_allowed() {
        let h = Harness::new(&[("A", 0), ("B", 0)]);
        let receipt = h.engine.transfer_money("A", "B", Amount::ZERO).unwrap();
        assert_eq!(receipt.from_balance, Amount::ZERO);
        assert_eq!(h.notifier.len(), 2);
    }

    #[test]
    fn test_full_balance_drains_to_zero() {
        let h = Harness::new(&[("A", 100), ("B", 0)]);
        h.engine.transfer_money("A", "B", Amount::from(100)).unwrap();
        assert_eq!(h.balance("A"), Amount::ZERO);
        assert_eq!(h.balance("B"), Amount::from(100));
    }

    #[test]
    fn test_decimal_amount_is_exact() {
        let h = Harness::new(&[("A", 1), ("B", 0)]);
        let third = Amount::new(333_333_333, 9);
        for _ in 0..3 {
            h.engine.transfer_money("A", "B", third).unwrap();
        }
        assert_eq!(h.balance("A"), Amount::new(1, 9));
        assert_eq!(h.balance("B"), Amount::new(999_999_999, 9));
    }

    #[test]
    fn test_overflow_leaves_state_unchanged() {
        let h = Harness::new(&[("A", 0), ("B", 0)]);
        {
            // Seed balances directly to reach the edge of the decimal range
            *h.engine.get_account("A").unwrap().unwrap().lock_balance() = Amount::MAX;
            *h.engine.get_account("B").unwrap().unwrap().lock_balance() = Amount::MAX;
        }
        let err = h
            .engine
            .transfer_money("A", "B", Amount::ONE)
            .unwrap_err();
        assert_eq!(err, TransferError::Overflow);
        assert_eq!(h.balance("A"), Amount::MAX);
        assert_eq!(h.balance("B"), Amount::MAX);
    }

    fn seed(h: &Harness, id: &str, balance: &str) {
        *h.engine.get_account(id).unwrap().unwrap().lock_balance() = balance.parse().unwrap();
    }

    #[test]
    fn test_debit_that_needs_rounding_is_rejected() {
        let h = Harness::new(&[("A", 0), ("B", 0)]);
        seed(&h, "A", "100000000000000000000");

        let err = h
            .engine
            .transfer_money("A", "B", Amount::new(1, 10))
            .unwrap_err();
        assert_eq!(err, TransferError::PrecisionLoss);
        assert_eq!(h.balance("A").to_string(), "100000000000000000000");
        assert_eq!(h.balance("B"), Amount::ZERO);
        assert!(h.notifier.is_empty());
    }

    #[test]
    fn test_credit_that_needs_rounding_is_rejected() {
        let h = Harness::new(&[("A", 1), ("B", 0)]);
        seed(&h, "B", "100000000000000000000");

        let err = h
            .engine
            .transfer_money("A", "B", Amount::new(1, 10))
            .unwrap_err();
        assert_eq!(err, TransferError::PrecisionLoss);
        assert_eq!(h.balance("A").to_string(), "1");
        assert_eq!(h.balance("B").to_string(), "100000000000000000000");
        assert!(h.notifier.is_empty());
    }

    #[test]
    fn test_large_balances_move_exactly() {
        let h = Harness::new(&[("A", 0), ("B", 0)]);
        seed(&h, "A", "100000000000000000000");
        seed(&h, "B", "1");

        let receipt = h
            .engine
            .transfer_money("A", "B", "0.00000001".parse().unwrap())
            .unwrap();
        assert_eq!(receipt.from_balance.to_string(), "99999999999999999999.99999999");
        assert_eq!(receipt.to_balance.to_string(), "1.00000001");
        assert_eq!(h.balance("A"), receipt.from_balance);
        assert_eq!(h.balance("B"), receipt.to_balance);
    }

    #[test]
    fn test_store_failure_is_internal() {
        let engine = TransferEngine::new(Arc::new(BrokenStore), Arc::new(QueueNotifier::new(1)));
        let err = engine
            .transfer_money("A", "B", Amount::from(1))
            .unwrap_err();
        assert!(matches!(err, TransferError::Internal(_)));
        assert!(!err.is_domain());
        assert!(engine.get_account("A").is_err());
    }

    #[test]
    fn test_receipt_ids_are_unique() {
        let h = Harness::new(&[("A", 10), ("B", 10)]);
        let r1 = h.engine.transfer_money("A", "B", Amount::ONE).unwrap();
        let r2 = h.engine.transfer_money("A", "B", Amount::ONE).unwrap();
        assert_ne!(r1.transfer_id, r2.transfer_id);
    }
}
