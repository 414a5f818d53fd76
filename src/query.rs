//! Filter vocabulary used by the presentation layer.
//!
//! The transaction list offers a fixed set of filter chips ("all",
//! "today", "income", "expense"). [`FilterToken`] parses those tokens and
//! [`TransactionFilter`] turns them into predicates for
//! [`crate::aggregate::filter_transactions`]. The currently selected chip is
//! caller state: it is passed in on every call and never stored here.

use core::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};

use crate::aggregate;
use crate::error::ConfigurationError;
use crate::models::{CategoryId, EntryKind, Transaction, WalletId};
use crate::snapshot::Snapshot;
use crate::window::TimeWindow;

/// A transaction list filter token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FilterToken {
    /// No filtering.
    #[default]
    All,
    /// Transactions dated on the caller's current calendar day.
    Today,
    /// Income transactions only.
    Income,
    /// Expense transactions only.
    Expense,
}

impl FilterToken {
    /// Every token, in display order.
    pub const ALL: [Self; 4] = [Self::All, Self::Today, Self::Income, Self::Expense];

    /// Returns the token string.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Builds the filter this token stands for.
    ///
    /// `now` and `tz` only matter for [`FilterToken::Today`].
    #[inline]
    #[must_use]
    pub fn to_filter<Tz: TimeZone>(self, now: DateTime<Utc>, tz: &Tz) -> TransactionFilter {
        match self {
            Self::All => TransactionFilter::new(),
            Self::Today => TransactionFilter::new().window(TimeWindow::today(now, tz)),
            Self::Income => TransactionFilter::new().kind(EntryKind::Income),
            Self::Expense => TransactionFilter::new().kind(EntryKind::Expense),
        }
    }
}

impl FromStr for FilterToken {
    type Err = ConfigurationError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|token| token.as_str() == s)
            .ok_or_else(|| ConfigurationError::UnknownFilterToken(s.to_owned()))
    }
}

impl core::fmt::Display for FilterToken {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composable filter for querying transactions from a snapshot.
///
/// Use builder-style methods to chain multiple criteria. All conditions
/// are combined: a transaction must satisfy every set criterion to pass.
///
/// # Examples
///
/// ```
/// use ledger_engine::models::{EntryKind, WalletId};
/// use ledger_engine::query::TransactionFilter;
/// use ledger_engine::window::TimeWindow;
///
/// let filter = TransactionFilter::new()
///     .kind(EntryKind::Expense)
///     .wallet(WalletId::from("wallet-1"))
///     .window(TimeWindow::all_time());
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Income or expense.
    pub kind: Option<EntryKind>,
    /// Date window.
    pub window: Option<TimeWindow>,
    /// Wallet the transaction belongs to.
    pub wallet: Option<WalletId>,
    /// Category id (matches the category or the sub-category).
    pub category: Option<CategoryId>,
}

impl TransactionFilter {
    /// Creates an empty filter that matches all transactions.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to transactions of the given kind.
    #[inline]
    #[must_use]
    pub const fn kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restricts to transactions dated within `window`.
    #[inline]
    #[must_use]
    pub const fn window(mut self, window: TimeWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Restricts to transactions booked against the given wallet.
    #[inline]
    #[must_use]
    pub fn wallet(mut self, id: WalletId) -> Self {
        self.wallet = Some(id);
        self
    }

    /// Restricts to transactions booked under the given category or
    /// sub-category.
    #[inline]
    #[must_use]
    pub fn category(mut self, id: CategoryId) -> Self {
        self.category = Some(id);
        self
    }

    /// Returns `true` if the transaction satisfies all set criteria.
    #[inline]
    #[must_use]
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.matches_kind(tx)
            && self.matches_window(tx)
            && self.matches_wallet(tx)
            && self.matches_category(tx)
    }

    /// Checks kind criteria.
    fn matches_kind(&self, tx: &Transaction) -> bool {
        self.kind.is_none_or(|kind| tx.kind == kind)
    }

    /// Checks date window criteria.
    fn matches_window(&self, tx: &Transaction) -> bool {
        self.window
            .as_ref()
            .is_none_or(|window| window.contains(&tx.date))
    }

    /// Checks wallet criteria.
    fn matches_wallet(&self, tx: &Transaction) -> bool {
        self.wallet.as_ref().is_none_or(|id| tx.wallet_id == *id)
    }

    /// Checks category criteria.
    fn matches_category(&self, tx: &Transaction) -> bool {
        self.category.as_ref().is_none_or(|id| {
            tx.category_id == *id || tx.sub_category_id.as_ref().is_some_and(|sub| sub == id)
        })
    }

    /// Applies the filter to a snapshot, most recent first.
    #[inline]
    #[must_use]
    pub fn apply<'snap>(&self, snapshot: &'snap Snapshot) -> Vec<&'snap Transaction> {
        aggregate::filter_transactions(snapshot, |tx| self.matches(tx))
    }
}

/// Lists transactions for a filter token, most recent first.
///
/// "today" is the calendar day containing `now` in `tz`.
///
/// # Errors
///
/// Returns [`ConfigurationError::UnknownFilterToken`] if `token` is not one
/// of `all`, `today`, `income` or `expense`.
#[tracing::instrument(skip(snapshot, now, tz))]
pub fn filter_transactions<'snap, Tz: TimeZone>(
    snapshot: &'snap Snapshot,
    token: &str,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<Vec<&'snap Transaction>, ConfigurationError> {
    let parsed: FilterToken = token.parse()?;
    Ok(parsed.to_filter(now, tz).apply(snapshot))
}
