//! Ordered Lock Coordinator
//!
//! Acquires the balance locks of two accounts in one global order: the
//! account with the lexicographically smaller ID (byte order) is always
//! locked first. Every transfer follows the same order, so no two transfers
//! can each hold one lock of a pair while waiting for the other.
//!
//! ```text
//! T1: A -> B    lock(A) → lock(B)
//! T2: B -> A    lock(A) → lock(B)    (same order, T2 waits on A)
//! ```
//!
//! Locks are released when the returned [`LockedPair`] is dropped, on every
//! exit path including early returns.

use std::cmp::Ordering;
use std::sync::MutexGuard;

use tracing::trace;

use crate::account::Account;
use crate::core_types::Amount;

/// Guards for the source and target balances of one transfer.
pub enum LockedPair<'a> {
    /// Both IDs compare equal; only one lock was taken.
    Single(MutexGuard<'a, Amount>),
    /// Two distinct accounts, locked in ID order.
    Ordered {
        source: MutexGuard<'a, Amount>,
        target: MutexGuard<'a, Amount>,
    },
}

impl<'a> LockedPair<'a> {
    /// Current source balance.
    pub fn source_balance(&self) -> Amount {
        match self {
            LockedPair::Single(guard) => **guard,
            LockedPair::Ordered { source, .. } => **source,
        }
    }

    /// Current target balance.
    pub fn target_balance(&self) -> Amount {
        match self {
            LockedPair::Single(guard) => **guard,
            LockedPair::Ordered { target, .. } => **target,
        }
    }

    /// Mutable access to both balances.
    ///
    /// `None` for a single-lock pair: source and target are the same cell.
    pub fn balances_mut(&mut self) -> Option<(&mut Amount, &mut Amount)> {
        match self {
            LockedPair::Single(_) => None,
            LockedPair::Ordered { source, target } => Some((&mut **source, &mut **target)),
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, LockedPair::Single(_))
    }
}

/// Which of the two accounts gets locked first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOrder {
    SourceFirst,
    TargetFirst,
    /// Same ID; take one lock only
    Single,
}

/// Decide the acquisition order for a `source -> target` pair.
pub fn lock_order(source_id: &str, target_id: &str) -> LockOrder {
    match source_id.as_bytes().cmp(target_id.as_bytes()) {
        Ordering::Less => LockOrder::SourceFirst,
        Ordering::Greater => LockOrder::TargetFirst,
        Ordering::Equal => LockOrder::Single,
    }
}

/// Lock `source` and `target` in global ID order.
///
/// Blocks until both locks are held. Argument order only decides which
/// guard is reported as source and which as target.
pub fn acquire<'a>(source: &'a Account, target: &'a Account) -> LockedPair<'a> {
    match lock_order(source.account_id(), target.account_id()) {
        LockOrder::SourceFirst => {
            let source_guard = source.lock_balance();
            trace!(account_id = source.account_id(), "Acquired first lock");
            let target_guard = target.lock_balance();
            trace!(account_id = target.account_id(), "Acquired second lock");
            LockedPair::Ordered {
                source: source_guard,
                target: target_guard,
            }
        }
        LockOrder::TargetFirst => {
            let target_guard = target.lock_balance();
            trace!(account_id = target.account_id(), "Acquired first lock");
            let source_guard = source.lock_balance();
            trace!(account_id = source.account_id(), "Acquired second lock");
            LockedPair::Ordered {
                source: source_guard,
                target: target_guard,
            }
        }
        LockOrder::Single => {
            let guard = source.lock_balance();
            trace!(account_id = source.account_id(), "Acquired single lock");
            LockedPair::Single(guard)
        }
    }
}
