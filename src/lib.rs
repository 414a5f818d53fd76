//! Aggregation engine for a personal finance ledger.
//!
//! A [`Snapshot`](snapshot::Snapshot) holds wallets, a two-level category
//! hierarchy and transactions, validated once at construction. Everything
//! else in the crate is a read-only query over that snapshot: balances,
//! spending within half-open time windows, category rankings rolled up to
//! root categories, and the filter tokens the transaction list offers.
//!
//! Calendar boundaries always come from a caller-supplied
//! [`chrono::TimeZone`]; the crate never consults the machine's local zone.
//!
//! ```
//! use ledger_engine::aggregate;
//! use ledger_engine::snapshot::Snapshot;
//!
//! let snapshot = Snapshot::from_json(
//!     r#"{"wallets": [{"id": "w", "name": "Cash", "balance": 1500,
//!         "type": "cash", "updatedAt": "2024-04-15T00:00:00Z"}]}"#,
//! )?;
//! assert_eq!(aggregate::total_balance(&snapshot), 1500);
//! # Ok::<(), ledger_engine::error::LedgerError>(())
//! ```

pub mod aggregate;
pub mod error;
pub mod hierarchy;
pub mod models;
pub mod query;
pub mod snapshot;
pub mod views;
pub mod window;
