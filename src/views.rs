//! Display-ready projections of snapshot data.
//!
//! Views resolve ids into names and icons so a renderer never has to look
//! anything up. They borrow from the snapshot and serialize to camelCase
//! JSON.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::aggregate::{self, CategorySpend};
use crate::models::{Category, EntryKind, Transaction, Wallet};
use crate::snapshot::Snapshot;
use crate::window::TimeWindow;

/// Icon shown for a transaction whose category carries none.
pub const FALLBACK_ICON: &str = "💰";

/// One line of the transaction list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRow<'snap> {
    /// The underlying transaction.
    pub transaction: &'snap Transaction,
    /// Name of the wallet the transaction is booked against.
    pub wallet_name: &'snap str,
    /// Name of the transaction's category.
    pub category_name: &'snap str,
    /// Icon of the category, or [`FALLBACK_ICON`].
    pub icon: &'snap str,
    /// Name of the sub-category, if any.
    pub sub_category_name: Option<&'snap str>,
    /// Amount with income positive and expense negative.
    pub signed_amount: i64,
}

/// Resolves names and icons for each transaction, keeping the input order.
#[must_use]
pub fn transaction_rows<'snap>(
    snapshot: &'snap Snapshot,
    transactions: &[&'snap Transaction],
) -> Vec<TransactionRow<'snap>> {
    transactions
        .iter()
        .map(|&tx| {
            let category = snapshot.resolved_category(&tx.category_id);
            let icon = if category.icon.is_empty() {
                FALLBACK_ICON
            } else {
                category.icon.as_str()
            };
            TransactionRow {
                transaction: tx,
                wallet_name: snapshot.resolved_wallet(&tx.wallet_id).name.as_str(),
                category_name: category.name.as_str(),
                icon,
                sub_category_name: tx
                    .sub_category_id
                    .as_ref()
                    .map(|id| snapshot.resolved_category(id).name.as_str()),
                signed_amount: tx.signed_amount(),
            }
        })
        .collect()
}

/// One tile of the category grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCard<'snap> {
    /// The category.
    pub category: &'snap Category,
    /// Name of the parent category, for sub-categories.
    pub parent_name: Option<&'snap str>,
    /// Number of direct sub-categories.
    pub children: usize,
}

impl CategoryCard<'_> {
    /// Income/expense kind of the category.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        self.category.kind
    }
}

/// Cards for every category, in input order.
#[must_use]
pub fn category_cards(snapshot: &Snapshot) -> Vec<CategoryCard<'_>> {
    let tree = snapshot.categories();
    tree.iter()
        .map(|category| CategoryCard {
            category,
            parent_name: tree.parent_of(&category.id).map(|parent| parent.name.as_str()),
            children: tree.children_of(&category.id).len(),
        })
        .collect()
}

/// Home screen figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard<'snap> {
    /// Sum of all wallet balances.
    pub total_balance: i64,
    /// Expense on the caller's current day.
    pub spending_today: i64,
    /// Income within the current week.
    pub income_this_week: i64,
    /// Expense within the current week.
    pub spending_this_week: i64,
    /// All wallets, in input order.
    pub wallets: &'snap [Wallet],
    /// Top root categories by expense within the current week.
    pub top_categories: Vec<CategorySpend<'snap>>,
    /// Most recent transactions.
    pub recent: Vec<TransactionRow<'snap>>,
}

/// Assembles the home screen for the caller's `now` in `tz`.
///
/// "This week" is the Monday-to-Sunday week containing `now`. At most
/// `top_n` categories and `recent_n` transactions are included.
#[tracing::instrument(skip(snapshot, tz))]
pub fn dashboard<'snap, Tz: TimeZone>(
    snapshot: &'snap Snapshot,
    now: DateTime<Utc>,
    tz: &Tz,
    top_n: usize,
    recent_n: usize,
) -> Dashboard<'snap> {
    let week = TimeWindow::week_of(now, tz);
    let recent: Vec<&Transaction> = aggregate::filter_transactions(snapshot, |_| true)
        .into_iter()
        .take(recent_n)
        .collect();

    Dashboard {
        total_balance: aggregate::total_balance(snapshot),
        spending_today: aggregate::spending_today(snapshot, now, tz),
        income_this_week: aggregate::income_within(snapshot, &week),
        spending_this_week: aggregate::spending_within(snapshot, &week),
        wallets: snapshot.wallets(),
        top_categories: aggregate::top_categories_by_spend(snapshot, top_n, &week),
        recent: transaction_rows(snapshot, &recent),
    }
}
