//! Data models for ledger entities.
//!
//! This module contains strongly-typed representations of wallets,
//! categories and transactions, newtype ID wrappers, and enumeration types
//! for constrained values.

mod category;
mod enums;
mod geo;
mod ids;
mod transaction;
mod wallet;

pub use category::Category;
pub use enums::{EntryKind, WalletType};
pub use geo::GeoPoint;
pub use ids::{CategoryId, TransactionId, WalletId};
pub use transaction::Transaction;
pub use wallet::Wallet;
