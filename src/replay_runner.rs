//! Replay Runner - Executes a batch of transfers across worker threads
//!
//! # Design
//!
//! All workers share one [`TransferEngine`] and pull the next request index
//! from a shared atomic cursor, so any worker may pick up any transfer.
//! Transfers on overlapping accounts therefore really do race; the engine's
//! lock ordering is what keeps the run deadlock-free.
//!
//! ```text
//! transfers[] ──cursor──▶ worker 0 ─┐
//!                       ▶ worker 1 ─┼─▶ TransferEngine ─▶ AccountStore
//!                       ▶ worker N ─┘
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{error, info};

use crate::account::InMemoryAccountStore;
use crate::core_types::Amount;
use crate::transfer::{TransferEngine, TransferError, TransferRequest};

// ============================================================
// REPLAY RESULT
// ============================================================

/// Result of a replay run
#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub submitted: u64,
    pub succeeded: u64,
    /// Rejections keyed by [`TransferError::code`]
    pub rejected: FxHashMap<&'static str, u64>,
    pub total_before: Amount,
    pub total_after: Amount,
    pub elapsed_ms: u64,
}

impl ReplaySummary {
    /// Conservation check: no funds created or destroyed.
    ///
    /// Relies on [`InMemoryAccountStore::total_balance`], so it is exact only
    /// while the total fits in `Decimal` precision.
    pub fn is_conserved(&self) -> bool {
        self.total_before == self.total_after
    }

    pub fn rejected_total(&self) -> u64 {
        self.rejected.values().sum()
    }
}

/// Per-worker tally, merged after join
#[derive(Default)]
struct WorkerTally {
    succeeded: u64,
    rejected: FxHashMap<&'static str, u64>,
}

impl WorkerTally {
    fn record(&mut self, result: &Result<crate::transfer::TransferReceipt, TransferError>) {
        match result {
            Ok(_) => self.succeeded += 1,
            Err(e) => {
                if !e.is_domain() {
                    error!(code = e.code(), "Transfer failed: {}", e);
                }
                *self.rejected.entry(e.code()).or_insert(0) += 1;
            }
        }
    }
}

// ============================================================
// MULTI-THREAD REPLAY
// ============================================================

/// Replay `transfers` on `workers` threads against one shared engine.
///
/// `store` must be the store the engine was built on; it is only read for the
/// before/after totals, which are taken while no transfer is in flight.
pub fn run_replay(
    engine: &TransferEngine,
    store: &InMemoryAccountStore,
    transfers: &[TransferRequest],
    workers: usize,
) -> ReplaySummary {
    let workers = workers.max(1);
    let total_before = store.total_balance();
    let cursor = AtomicUsize::new(0);
    let start = Instant::now();

    let tallies: Vec<WorkerTally> = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            handles.push(scope.spawn(|| {
                let mut tally = WorkerTally::default();
                loop {
                    let idx = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some(request) = transfers.get(idx) else {
                        break;
                    };
                    tally.record(&engine.transfer(request));
                }
                tally
            }));
        }
        handles
            .into_iter()
            .map(|h| {
                h.join().unwrap_or_else(|_| {
                    error!("Replay worker panicked; its outcomes are not counted");
                    WorkerTally::default()
                })
            })
            .collect()
    });

    let mut summary = ReplaySummary {
        submitted: transfers.len() as u64,
        succeeded: 0,
        rejected: FxHashMap::default(),
        total_before,
        total_after: store.total_balance(),
        elapsed_ms: start.elapsed().as_millis() as u64,
    };
    for tally in tallies {
        summary.succeeded += tally.succeeded;
        for (code, count) in tally.rejected {
            *summary.rejected.entry(code).or_insert(0) += count;
        }
    }

    info!(
        submitted = summary.submitted,
        succeeded = summary.succeeded,
        rejected = summary.rejected_total(),
        elapsed_ms = summary.elapsed_ms,
        "Replay finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, AccountStore};
    use crate::notification::QueueNotifier;
    use std::sync::Arc;

    fn setup(accounts: &[(&str, i64)]) -> (Arc<InMemoryAccountStore>, TransferEngine) {
        let store = Arc::new(InMemoryAccountStore::new());
        for (id, balance) in accounts {
            store
                .insert(Account::with_balance(*id, Amount::from(*balance)).unwrap())
                .unwrap();
        }
        let engine = TransferEngine::new(store.clone(), Arc::new(QueueNotifier::new(1024)));
        (store, engine)
    }

    #[test]
    fn test_replay_counts_outcomes() {
        let (store, engine) = setup(&[("A", 100), ("B", 70)]);
        let transfers = vec![
            TransferRequest::new("A", "B", Amount::from(40)),
            TransferRequest::new("B", "A", Amount::from(30)),
            TransferRequest::new("A", "A", Amount::from(1)),
            TransferRequest::new("A", "00000", Amount::from(1)),
            TransferRequest::new("B", "A", Amount::from(10_000)),
        ];

        let summary = run_replay(&engine, &store, &transfers, 3);
        assert_eq!(summary.submitted, 5);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.rejected["SAME_ACCOUNT"], 1);
        assert_eq!(summary.rejected["INVALID_ACCOUNT"], 1);
        assert_eq!(summary.rejected["INSUFFICIENT_FUNDS"], 1);
        assert!(summary.is_conserved());
        assert_eq!(store.get("A").unwrap().unwrap().balance(), Amount::from(90));
        assert_eq!(store.get("B").unwrap().unwrap().balance(), Amount::from(80));
    }

    #[test]
    fn test_replay_empty_batch() {
        let (store, engine) = setup(&[("A", 1)]);
        let summary = run_replay(&engine, &store, &[], 4);
        assert_eq!(summary.submitted, 0);
        assert_eq!(summary.rejected_total(), 0);
        assert!(summary.is_conserved());
    }

    #[test]
    fn test_summary_serializes() {
        let (store, engine) = setup(&[("A", 5), ("B", 0)]);
        let summary = run_replay(
            &engine,
            &store,
            &[TransferRequest::new("A", "B", Amount::from(5))],
            0,
        );
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["succeeded"], 1);
        assert_eq!(json["total_before"], "5");
    }
}
