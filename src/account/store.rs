//! Account store
//!
//! Maps account IDs to shared account records. The store's own
//! synchronization covers insert/lookup only; balance mutation is governed by
//! each account's lock.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use crate::core_types::Amount;

use super::error::StoreError;
use super::models::Account;

/// Storage seam consumed by the transfer engine.
///
/// Implementations must return the *same* record for the same ID on every
/// call; the engine relies on that record's lock for mutual exclusion.
pub trait AccountStore: Send + Sync {
    /// Look up an account by exact ID.
    fn get(&self, account_id: &str) -> Result<Option<Arc<Account>>, StoreError>;

    /// Insert a new account.
    ///
    /// # Errors
    /// `DuplicateAccountId` if the ID is already taken.
    fn insert(&self, account: Account) -> Result<Arc<Account>, StoreError>;
}

/// Thread-safe in-memory store backed by [`DashMap`].
pub struct InMemoryAccountStore {
    accounts: DashMap<String, Arc<Account>>,
}

impl InMemoryAccountStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Get the number of accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Point-in-time `(account_id, balance)` pairs sorted by ID.
    ///
    /// Each balance is read independently; take the snapshot when no
    /// transfers are in flight if a consistent total is needed.
    pub fn snapshot(&self) -> Vec<(String, Amount)> {
        let mut rows: Vec<(String, Amount)> = self
            .accounts
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().balance()))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    /// Sum of all balances (conservation check).
    ///
    /// Exact only while the sum fits in `Decimal` precision (28 significant
    /// digits). Past that the sum is rounded and two totals can compare equal
    /// after funds moved; compare per-account balances from [`snapshot`](Self::snapshot)
    /// when that matters.
    pub fn total_balance(&self) -> Amount {
        self.accounts
            .iter()
            .map(|entry| entry.value().balance())
            .sum()
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn get(&self, account_id: &str) -> Result<Option<Arc<Account>>, StoreError> {
        Ok(self
            .accounts
            .get(account_id)
            .map(|entry| Arc::clone(entry.value())))
    }

    fn insert(&self, account: Account) -> Result<Arc<Account>, StoreError> {
        // entry() holds the shard lock, so two racing inserts cannot both win
        match self.accounts.entry(account.account_id().to_string()) {
            Entry::Occupied(entry) => Err(StoreError::DuplicateAccountId(entry.key().clone())),
            Entry::Vacant(entry) => {
                let account = Arc::new(account);
                entry.insert(Arc::clone(&account));
                debug!(account_id = account.account_id(), "Account created");
                Ok(account)
            }
        }
    }
}
