//! Transfer FSM State Definitions
//!
//! A transfer is a short-lived, in-process state machine:
//!
//! ```text
//! VALIDATING → LOCK_ACQUIRING → BALANCE_CHECKING → MUTATING → NOTIFYING → RELEASED
//!      ↓                               ↓
//!   (reject)                        (reject)
//! ```
//!
//! Rejections end the transfer in the state where they were detected; no
//! balance changes before `MUTATING`.

use std::fmt;

/// Transfer FSM States
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferState {
    /// Accounts resolved, identity and amount checked. No locks held.
    Validating,

    /// Waiting on the ordered pair of account locks
    LockAcquiring,

    /// Both locks held; sender balance re-checked
    BalanceChecking,

    /// Debit and credit applied together
    Mutating,

    /// Per-account notifications emitted, locks still held
    Notifying,

    /// Terminal: both locks released, transfer complete
    Released,
}

impl TransferState {
    /// Check if the transfer completed
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Released)
    }

    /// Check if both account locks are held in this state
    #[inline]
    pub fn holds_locks(&self) -> bool {
        matches!(
            self,
            TransferState::BalanceChecking | TransferState::Mutating | TransferState::Notifying
        )
    }

    /// Check if a rejection may end the transfer in this state
    #[inline]
    pub fn can_fail(&self) -> bool {
        matches!(
            self,
            TransferState::Validating | TransferState::LockAcquiring | TransferState::BalanceChecking
        )
    }

    /// Next state on the success path
    pub fn next(&self) -> Option<Self> {
        match self {
            TransferState::Validating => Some(TransferState::LockAcquiring),
            TransferState::LockAcquiring => Some(TransferState::BalanceChecking),
            TransferState::BalanceChecking => Some(TransferState::Mutating),
            TransferState::Mutating => Some(TransferState::Notifying),
            TransferState::Notifying => Some(TransferState::Released),
            TransferState::Released => None,
        }
    }

    /// Get human-readable state name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Validating => "VALIDATING",
            TransferState::LockAcquiring => "LOCK_ACQUIRING",
            TransferState::BalanceChecking => "BALANCE_CHECKING",
            TransferState::Mutating => "MUTATING",
            TransferState::Notifying => "NOTIFYING",
            TransferState::Released => "RELEASED",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
