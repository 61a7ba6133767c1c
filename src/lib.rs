//! money_transfer - Concurrent in-memory account transfers
//!
//! Moves funds between in-memory accounts from many threads at once without
//! negative balances, lost funds, or deadlocks.
//!
//! # Modules
//!
//! - [`core_types`] - Core type definitions (AccountId, Amount)
//! - [`account`] - Account records and the account store
//! - [`notification`] - Transfer notification sinks
//! - [`transfer`] - Validator, ordered lock coordinator, transfer engine
//! - [`config`] - YAML configuration
//! - [`logging`] - tracing subscriber setup
//! - [`csv_io`] - CSV loading/saving
//! - [`replay_runner`] - Multi-threaded batch replay

// Core types - must be first!
pub mod core_types;

// Transfer components
pub mod account;
pub mod notification;
pub mod transfer;

// Application plumbing
pub mod config;
pub mod csv_io;
pub mod logging;
pub mod replay_runner;

// Convenient re-exports at crate root
pub use account::{Account, AccountStore, InMemoryAccountStore, StoreError};
pub use core_types::{AccountId, Amount};
pub use notification::{LogNotifier, Notification, Notifier, QueueNotifier};
pub use transfer::{TransferEngine, TransferError, TransferReceipt, TransferRequest};
