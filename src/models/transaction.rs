//! Transaction model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CategoryId, EntryKind, GeoPoint, TransactionId, WalletId};

/// A single income or expense booked against a wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// Wallet the money moved in or out of.
    pub wallet_id: WalletId,
    /// Category the transaction is booked under.
    pub category_id: CategoryId,
    /// Optional sub-category; must be a direct child of `category_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category_id: Option<CategoryId>,
    /// Amount in whole VND (> 0).
    pub amount: i64,
    /// Income or expense; must match the category kind.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// When the transaction happened.
    pub date: DateTime<Utc>,
    /// Free-form description.
    pub description: String,
    /// Where the transaction happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

impl Transaction {
    /// Returns the amount signed by direction: positive for income,
    /// negative for expenses.
    #[inline]
    #[must_use]
    pub const fn signed_amount(&self) -> i64 {
        match self.kind {
            EntryKind::Income => self.amount,
            EntryKind::Expense => -self.amount,
        }
    }
}
