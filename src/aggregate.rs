//! Read-only analytical queries over a validated [`Snapshot`].
//!
//! Every function here is pure: it borrows the snapshot, allocates its
//! result and touches nothing else, so the same call always returns the
//! same answer and any number of calls may run in parallel.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::models::{Category, CategoryId, EntryKind, Transaction};
use crate::snapshot::Snapshot;
use crate::window::TimeWindow;

/// Summed expense for one root category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategorySpend<'snap> {
    /// The root category.
    pub category: &'snap Category,
    /// Total expense booked under the category and its sub-categories.
    pub amount: i64,
}

/// Net worth: the exact sum of all wallet balances.
#[inline]
#[must_use]
pub fn total_balance(snapshot: &Snapshot) -> i64 {
    snapshot.wallets().iter().map(|wallet| wallet.balance).sum()
}

/// Returns every transaction accepted by `predicate`, most recent first.
///
/// Transactions with the same date are ordered by id ascending.
#[must_use]
pub fn filter_transactions<P>(snapshot: &Snapshot, predicate: P) -> Vec<&Transaction>
where
    P: Fn(&Transaction) -> bool,
{
    let mut matched: Vec<&Transaction> = snapshot
        .transactions()
        .iter()
        .filter(|tx| predicate(tx))
        .collect();
    sort_recent_first(&mut matched);
    tracing::trace!(matched = matched.len(), "filtered transactions");
    matched
}

/// Sums expenses dated within `[start, end)`, where both dates are turned
/// into instants at local midnight in `tz`.
#[inline]
#[must_use]
pub fn spending_in_window<Tz: TimeZone>(
    snapshot: &Snapshot,
    start: NaiveDate,
    end: NaiveDate,
    tz: &Tz,
) -> i64 {
    spending_within(snapshot, &TimeWindow::from_dates(start, end, tz))
}

/// Sums expenses dated within `window`.
#[inline]
#[must_use]
pub fn spending_within(snapshot: &Snapshot, window: &TimeWindow) -> i64 {
    sum_kind_within(snapshot, EntryKind::Expense, window)
}

/// Sums income dated within `window`.
#[inline]
#[must_use]
pub fn income_within(snapshot: &Snapshot, window: &TimeWindow) -> i64 {
    sum_kind_within(snapshot, EntryKind::Income, window)
}

/// Sums expenses on the calendar day containing `now` in `tz`.
#[inline]
#[must_use]
pub fn spending_today<Tz: TimeZone>(snapshot: &Snapshot, now: DateTime<Utc>, tz: &Tz) -> i64 {
    spending_within(snapshot, &TimeWindow::today(now, tz))
}

/// Ranks root categories by expense within `window`.
///
/// Expenses are grouped by the root of their category, so spending booked
/// on a sub-category counts towards its parent. The result is sorted by
/// amount descending, then category id ascending, and holds at most `n`
/// entries. Categories without spend never appear.
#[must_use]
pub fn top_categories_by_spend<'snap>(
    snapshot: &'snap Snapshot,
    n: usize,
    window: &TimeWindow,
) -> Vec<CategorySpend<'snap>> {
    let mut sums: HashMap<&CategoryId, CategorySpend<'snap>> = HashMap::new();
    for tx in expenses_within(snapshot, window) {
        let root = snapshot.root_category(&tx.category_id);
        sums.entry(&root.id)
            .or_insert(CategorySpend {
                category: root,
                amount: 0,
            })
            .amount += tx.amount;
    }

    let mut ranked: Vec<CategorySpend<'snap>> = sums.into_values().collect();
    ranked.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.category.id.cmp(&b.category.id))
    });
    ranked.truncate(n);
    tracing::trace!(categories = ranked.len(), limit = n, "ranked category spend");
    ranked
}

/// Splits all transactions into `(income, expense)`.
///
/// Each side keeps the [`filter_transactions`] ordering. Every transaction
/// lands in exactly one side.
#[must_use]
pub fn partition_by_type(snapshot: &Snapshot) -> (Vec<&Transaction>, Vec<&Transaction>) {
    filter_transactions(snapshot, |_| true)
        .into_iter()
        .partition(|tx| tx.kind.is_income())
}

/// Iterates over expense transactions dated within `window`.
fn expenses_within<'snap>(
    snapshot: &'snap Snapshot,
    window: &TimeWindow,
) -> impl Iterator<Item = &'snap Transaction> {
    let window = *window;
    snapshot
        .transactions()
        .iter()
        .filter(move |tx| tx.kind.is_expense() && window.contains(&tx.date))
}

/// Sums amounts of one kind within `window`.
fn sum_kind_within(snapshot: &Snapshot, kind: EntryKind, window: &TimeWindow) -> i64 {
    snapshot
        .transactions()
        .iter()
        .filter(|tx| tx.kind == kind && window.contains(&tx.date))
        .map(|tx| tx.amount)
        .sum()
}

/// Orders by date descending, then id ascending.
fn sort_recent_first(transactions: &mut [&Transaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TransactionId, Wallet, WalletId, WalletType};
    use crate::snapshot::build_snapshot;
    use chrono::FixedOffset;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn wallet(id: &str, balance: i64) -> Wallet {
        Wallet {
            id: WalletId::from(id),
            name: id.to_owned(),
            balance,
            kind: WalletType::Bank,
            updated_at: utc("2024-04-15T06:20:00Z"),
        }
    }

    fn category(id: &str, kind: EntryKind, parent: Option<&str>) -> Category {
        Category {
            id: CategoryId::from(id),
            name: id.to_owned(),
            kind,
            parent_id: parent.map(CategoryId::from),
            icon: "*".to_owned(),
        }
    }

    fn tx(id: &str, category_id: &str, kind: EntryKind, amount: i64, date: &str) -> Transaction {
        Transaction {
            id: TransactionId::from(id),
            wallet_id: WalletId::from("w-1"),
            category_id: CategoryId::from(category_id),
            sub_category_id: None,
            amount,
            kind,
            date: utc(date),
            description: String::new(),
            location: None,
        }
    }

    fn snapshot(transactions: Vec<Transaction>) -> Snapshot {
        build_snapshot(
            vec![wallet("w-1", 0)],
            vec![
                category("a", EntryKind::Expense, None),
                category("a-sub", EntryKind::Expense, Some("a")),
                category("b", EntryKind::Expense, None),
                category("c", EntryKind::Expense, None),
                category("pay", EntryKind::Income, None),
            ],
            transactions,
        )
        .unwrap()
    }

    fn ids<'a>(txs: &[&'a Transaction]) -> Vec<&'a str> {
        txs.iter().map(|tx| tx.id.as_inner()).collect()
    }

    #[test]
    fn total_balance_sums_exactly() {
        let snapshot = build_snapshot(
            vec![
                wallet("w-1", 18_500_000),
                wallet("w-2", 32_000_000),
                wallet("w-3", 125_000_000),
            ],
            vec![],
            vec![],
        )
        .unwrap();
        assert_eq!(total_balance(&snapshot), 175_500_000);
    }

    #[test]
    fn total_balance_handles_negative_and_empty() {
        let snapshot =
            build_snapshot(vec![wallet("w-1", 500), wallet("w-2", -800)], vec![], vec![]).unwrap();
        assert_eq!(total_balance(&snapshot), -300);

        let empty = build_snapshot(vec![], vec![], vec![]).unwrap();
        assert_eq!(total_balance(&empty), 0);
    }

    #[test]
    fn filter_orders_recent_first_with_id_tie_break() {
        let snapshot = snapshot(vec![
            tx("t-2", "a", EntryKind::Expense, 1, "2024-04-15T07:30:00Z"),
            tx("t-3", "b", EntryKind::Expense, 1, "2024-04-12T12:10:00Z"),
            tx("t-1", "a", EntryKind::Expense, 1, "2024-04-15T07:30:00Z"),
            tx("t-4", "pay", EntryKind::Income, 1, "2024-04-16T00:00:00Z"),
        ]);
        let all = filter_transactions(&snapshot, |_| true);
        assert_eq!(ids(&all), ["t-4", "t-1", "t-2", "t-3"]);

        let only_b = filter_transactions(&snapshot, |tx| tx.category_id.as_inner() == "b");
        assert_eq!(ids(&only_b), ["t-3"]);

        assert!(filter_transactions(&snapshot, |_| false).is_empty());
    }

    #[test]
    fn spending_window_is_half_open_and_ignores_income() {
        let snapshot = snapshot(vec![
            tx("t-1", "a", EntryKind::Expense, 100, "2024-04-14T00:00:00Z"),
            tx("t-2", "a", EntryKind::Expense, 200, "2024-04-14T23:59:59Z"),
            tx("t-3", "a", EntryKind::Expense, 400, "2024-04-15T00:00:00Z"),
            tx("t-4", "pay", EntryKind::Income, 800, "2024-04-14T12:00:00Z"),
        ]);
        let start = NaiveDate::from_ymd_opt(2024, 4, 14).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 4, 15).unwrap();
        assert_eq!(spending_in_window(&snapshot, start, end, &Utc), 300);
        assert_eq!(spending_in_window(&snapshot, end, start, &Utc), 0);
        assert_eq!(
            income_within(&snapshot, &TimeWindow::from_dates(start, end, &Utc)),
            800
        );
    }

    #[test]
    fn spending_window_follows_time_zone() {
        let snapshot = snapshot(vec![
            tx("t-1", "a", EntryKind::Expense, 100, "2024-04-14T18:00:00Z"),
            tx("t-2", "a", EntryKind::Expense, 200, "2024-04-15T06:00:00Z"),
        ]);
        let day = NaiveDate::from_ymd_opt(2024, 4, 15).unwrap();
        let next = NaiveDate::from_ymd_opt(2024, 4, 16).unwrap();
        let hanoi = FixedOffset::east_opt(7 * 3600).unwrap();

        assert_eq!(spending_in_window(&snapshot, day, next, &Utc), 200);
        assert_eq!(spending_in_window(&snapshot, day, next, &hanoi), 300);
    }

    #[test]
    fn spending_window_open_ended_at_calendar_edges() {
        let snapshot = snapshot(vec![
            tx("t-1", "a", EntryKind::Expense, 100, "1999-12-31T12:00:00Z"),
            tx("t-2", "a", EntryKind::Expense, 200, "2024-04-15T06:00:00Z"),
        ]);
        let hanoi = FixedOffset::east_opt(7 * 3600).unwrap();
        let new_york = FixedOffset::west_opt(5 * 3600).unwrap();
        let cutoff = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        assert_eq!(spending_in_window(&snapshot, NaiveDate::MIN, cutoff, &hanoi), 100);
        assert_eq!(spending_in_window(&snapshot, cutoff, NaiveDate::MAX, &new_york), 200);
        assert_eq!(
            spending_in_window(&snapshot, NaiveDate::MIN, NaiveDate::MAX, &hanoi),
            300
        );
    }

    #[test]
    fn top_categories_rank_by_amount() {
        let snapshot = snapshot(vec![
            tx("t-1", "a", EntryKind::Expense, 85_000, "2024-04-15T07:30:00Z"),
            tx("t-2", "b", EntryKind::Expense, 120_000, "2024-04-15T06:45:00Z"),
            tx("t-3", "c", EntryKind::Expense, 450_000, "2024-04-12T12:10:00Z"),
            tx("t-4", "pay", EntryKind::Income, 28_000_000, "2024-04-14T16:00:00Z"),
        ]);
        let top = top_categories_by_spend(&snapshot, 3, &TimeWindow::all_time());
        let ranked: Vec<(&str, i64)> = top
            .iter()
            .map(|entry| (entry.category.id.as_inner(), entry.amount))
            .collect();
        assert_eq!(ranked, [("c", 450_000), ("b", 120_000), ("a", 85_000)]);

        let top_one = top_categories_by_spend(&snapshot, 1, &TimeWindow::all_time());
        assert_eq!(top_one.len(), 1);
        assert!(top_categories_by_spend(&snapshot, 0, &TimeWindow::all_time()).is_empty());
    }

    #[test]
    fn top_categories_roll_sub_categories_into_root() {
        let on_sub = tx("t-1", "a-sub", EntryKind::Expense, 70, "2024-04-15T07:30:00Z");
        let mut with_sub = tx("t-2", "a", EntryKind::Expense, 50, "2024-04-15T07:30:00Z");
        with_sub.sub_category_id = Some(CategoryId::from("a-sub"));
        let snapshot = snapshot(vec![
            on_sub,
            with_sub,
            tx("t-3", "b", EntryKind::Expense, 100, "2024-04-15T07:30:00Z"),
        ]);

        let top = top_categories_by_spend(&snapshot, 10, &TimeWindow::all_time());
        assert_eq!(top.len(), 2);
        assert_eq!(top.first().map(|e| (e.category.id.as_inner(), e.amount)), Some(("a", 120)));
    }

    #[test]
    fn top_categories_tie_break_by_id() {
        let snapshot = snapshot(vec![
            tx("t-1", "c", EntryKind::Expense, 10, "2024-04-15T07:30:00Z"),
            tx("t-2", "a", EntryKind::Expense, 10, "2024-04-15T07:30:00Z"),
            tx("t-3", "b", EntryKind::Expense, 10, "2024-04-15T07:30:00Z"),
        ]);
        let top = top_categories_by_spend(&snapshot, 5, &TimeWindow::all_time());
        let order: Vec<&str> = top.iter().map(|e| e.category.id.as_inner()).collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[test]
    fn top_categories_sum_matches_window_spending() {
        let snapshot = snapshot(vec![
            tx("t-1", "a", EntryKind::Expense, 5, "2024-04-10T00:00:00Z"),
            tx("t-2", "b", EntryKind::Expense, 7, "2024-04-11T00:00:00Z"),
            tx("t-3", "c", EntryKind::Expense, 11, "2024-04-20T00:00:00Z"),
        ]);
        let window = TimeWindow::between(utc("2024-04-01T00:00:00Z"), utc("2024-04-15T00:00:00Z"));
        let total: i64 = top_categories_by_spend(&snapshot, snapshot.categories().len(), &window)
            .iter()
            .map(|e| e.amount)
            .sum();
        assert_eq!(total, spending_within(&snapshot, &window));
        assert_eq!(total, 12);
    }

    #[test]
    fn partition_is_complete_and_disjoint() {
        let snapshot = snapshot(vec![
            tx("t-1", "a", EntryKind::Expense, 1, "2024-04-15T07:30:00Z"),
            tx("t-2", "pay", EntryKind::Income, 1, "2024-04-14T16:00:00Z"),
            tx("t-3", "b", EntryKind::Expense, 1, "2024-04-16T07:30:00Z"),
        ]);
        let (income, expense) = partition_by_type(&snapshot);
        assert_eq!(ids(&income), ["t-2"]);
        assert_eq!(ids(&expense), ["t-3", "t-1"]);
        assert_eq!(income.len() + expense.len(), snapshot.transactions().len());
    }

    #[test]
    fn spending_today_uses_callers_zone() {
        let snapshot = snapshot(vec![tx(
            "t-1",
            "a",
            EntryKind::Expense,
            42,
            "2024-04-15T20:00:00Z",
        )]);
        let now = utc("2024-04-16T02:00:00Z");
        let hanoi = FixedOffset::east_opt(7 * 3600).unwrap();
        assert_eq!(spending_today(&snapshot, now, &Utc), 0);
        assert_eq!(spending_today(&snapshot, now, &hanoi), 42);
    }

    #[test]
    fn queries_are_repeatable() {
        let snapshot = snapshot(vec![
            tx("t-1", "a", EntryKind::Expense, 3, "2024-04-15T07:30:00Z"),
            tx("t-2", "b", EntryKind::Expense, 4, "2024-04-15T07:30:00Z"),
        ]);
        let window = TimeWindow::all_time();
        assert_eq!(
            top_categories_by_spend(&snapshot, 2, &window),
            top_categories_by_spend(&snapshot, 2, &window)
        );
        assert_eq!(
            filter_transactions(&snapshot, |_| true),
            filter_transactions(&snapshot, |_| true)
        );
    }
}
