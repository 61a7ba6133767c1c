//! Account-to-account transfers
//!
//! Moves funds between two accounts of a shared in-memory store while many
//! threads transfer concurrently.
//!
//! # Architecture
//!
//! - [`validator`] - pure presence / identity / amount / balance checks
//! - [`coordinator`] - acquires two account locks in global ID order
//! - [`engine`] - drives one transfer through the state machine
//!
//! # State Machine
//!
//! ```text
//! VALIDATING → LOCK_ACQUIRING → BALANCE_CHECKING → MUTATING → NOTIFYING → RELEASED
//! ```
//!
//! # Safety Invariants
//!
//! 1. **Conservation**: every debit is paired with an equal credit
//! 2. **No Negative Balance**: sender balance is re-checked under lock
//! 3. **Lock Ordering**: the smaller account ID is always locked first
//! 4. **No Partial Transfer**: both balances are written together, after all checks

pub mod coordinator;
pub mod engine;
pub mod error;
pub mod state;
pub mod types;
pub mod validator;


// Re-exports for convenience
pub use coordinator::{LockOrder, LockedPair};
pub use engine::TransferEngine;
pub use error::TransferError;
pub use state::TransferState;
pub use types::{Direction, TransferId, TransferReceipt, TransferRequest};
