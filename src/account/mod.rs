//! Account management module
//!
//! In-memory account records and the store that owns them.

pub mod error;
pub mod models;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use error::StoreError;
pub use models::Account;
pub use store::{AccountStore, InMemoryAccountStore};
pub use validation::AccountError;
