//! Core types used throughout the system
//!
//! These are fundamental type aliases used by all modules.
//! They provide semantic meaning and enable future type evolution.

use rust_decimal::Decimal;

/// Account ID - globally unique, immutable after creation.
///
/// # Constraints:
/// - **Non-empty**: enforced when an [`Account`](crate::account::Account) is built
/// - **Exact match**: store lookups compare bytes for equality
/// - **Total order**: lock ordering compares bytes lexicographically
pub type AccountId = String;

/// Monetary amount - 96-bit decimal with up to 28 significant digits.
///
/// `Decimal` arithmetic rounds past that precision; transfers refuse any
/// result that would need rounding.
pub type Amount = Decimal;
