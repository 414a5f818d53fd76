//! Validated, indexed ledger snapshots.
//!
//! A [`Snapshot`] is the only input the query layer accepts. Building one
//! checks every cross-record invariant up front, so queries never have to
//! handle a dangling reference. Construction is all-or-nothing: the first
//! violation aborts the build and no partial snapshot is returned.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EntityKind, Result, ValidationError, ValidationRule};
use crate::hierarchy::{CategoryTree, DEFAULT_MAX_CATEGORY_DEPTH};
use crate::models::{Category, CategoryId, Transaction, TransactionId, Wallet, WalletId};

/// Raw, unvalidated records as received from the wallet, category and
/// transaction services.
///
/// This is the JSON shape accepted by [`Snapshot::from_json`]:
///
/// ```json
/// { "wallets": [..], "categories": [..], "transactions": [..] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LedgerInput {
    /// All wallets.
    pub wallets: Vec<Wallet>,
    /// All categories and sub-categories.
    pub categories: Vec<Category>,
    /// All transactions.
    pub transactions: Vec<Transaction>,
}

/// An immutable, validated view of wallets, categories and transactions.
///
/// Every id referenced by a transaction resolves, every category chain is
/// acyclic, and every amount is positive. The snapshot is `Send + Sync`
/// and can be shared freely between threads.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Wallets in input order.
    wallets: Vec<Wallet>,
    /// Position of each wallet in `wallets`.
    wallet_index: HashMap<WalletId, usize>,
    /// Category hierarchy.
    categories: CategoryTree,
    /// Transactions in input order.
    transactions: Vec<Transaction>,
    /// Position of each transaction in `transactions`.
    transaction_index: HashMap<TransactionId, usize>,
}

/// Builder for [`Snapshot`].
///
/// # Examples
///
/// ```
/// use ledger_engine::snapshot::Snapshot;
///
/// let snapshot = Snapshot::builder()
///     .max_category_depth(2)
///     .build()
///     .unwrap();
/// assert!(snapshot.transactions().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    /// Wallet records.
    wallets: Vec<Wallet>,
    /// Category records.
    categories: Vec<Category>,
    /// Transaction records.
    transactions: Vec<Transaction>,
    /// Maximum category nesting depth (root = 1).
    max_category_depth: usize,
}

impl Default for SnapshotBuilder {
    #[inline]
    fn default() -> Self {
        Self {
            wallets: Vec::new(),
            categories: Vec::new(),
            transactions: Vec::new(),
            max_category_depth: DEFAULT_MAX_CATEGORY_DEPTH,
        }
    }
}

impl SnapshotBuilder {
    /// Sets the wallet records.
    #[inline]
    #[must_use]
    pub fn wallets(mut self, wallets: Vec<Wallet>) -> Self {
        self.wallets = wallets;
        self
    }

    /// Sets the category records.
    #[inline]
    #[must_use]
    pub fn categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    /// Sets the transaction records.
    #[inline]
    #[must_use]
    pub fn transactions(mut self, transactions: Vec<Transaction>) -> Self {
        self.transactions = transactions;
        self
    }

    /// Overrides the maximum category nesting depth (default 2).
    #[inline]
    #[must_use]
    pub const fn max_category_depth(mut self, depth: usize) -> Self {
        self.max_category_depth = depth;
        self
    }

    /// Validates the records and builds the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::LedgerError::Validation`] naming the first offending record
    /// and rule, or [`crate::error::LedgerError::Hierarchy`] if a category parent chain is
    /// cyclic.
    #[tracing::instrument(
        skip_all,
        fields(
            wallets = self.wallets.len(),
            categories = self.categories.len(),
            transactions = self.transactions.len(),
        )
    )]
    pub fn build(self) -> Result<Snapshot> {
        self.validate_and_index()
            .inspect(|_| tracing::debug!("snapshot built"))
            .inspect_err(|err| tracing::warn!(error = %err, "snapshot validation failed"))
    }

    /// Runs all validation passes in order: wallets, categories,
    /// transactions.
    fn validate_and_index(self) -> Result<Snapshot> {
        let wallet_index = index_unique(&self.wallets, |w| &w.id, EntityKind::Wallet)?;
        ensure_summable(&self.wallets, |w| w.balance, |w| &w.id, EntityKind::Wallet)?;
        let categories = CategoryTree::build(self.categories, self.max_category_depth)?;
        let transaction_index =
            index_unique(&self.transactions, |t| &t.id, EntityKind::Transaction)?;

        for tx in &self.transactions {
            validate_transaction(tx, &wallet_index, &categories)?;
        }
        ensure_summable(&self.transactions, |t| t.amount, |t| &t.id, EntityKind::Transaction)?;

        Ok(Snapshot {
            wallets: self.wallets,
            wallet_index,
            categories,
            transactions: self.transactions,
            transaction_index,
        })
    }
}

/// Indexes records by id, rejecting the first duplicate.
fn index_unique<T, K, F>(
    items: &[T],
    key_fn: F,
    entity: EntityKind,
) -> core::result::Result<HashMap<K, usize>, ValidationError>
where
    K: core::hash::Hash + Eq + Clone + core::fmt::Display,
    F: Fn(&T) -> &K,
{
    let mut index = HashMap::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        let key = key_fn(item);
        if index.insert(key.clone(), position).is_some() {
            return Err(ValidationError::new(
                entity,
                key.to_string(),
                ValidationRule::DuplicateId,
            ));
        }
    }
    Ok(index)
}

/// Rejects the first record whose amount pushes the running total, taken
/// in input order, out of the `i64` range.
///
/// Transaction amounts are positive, so once the grand total fits every
/// windowed or per-category sum fits as well.
fn ensure_summable<T, K, A, F>(
    items: &[T],
    amount_fn: A,
    key_fn: F,
    entity: EntityKind,
) -> core::result::Result<(), ValidationError>
where
    K: core::fmt::Display,
    A: Fn(&T) -> i64,
    F: Fn(&T) -> &K,
{
    let mut total: i64 = 0;
    for item in items {
        let amount = amount_fn(item);
        total = total.checked_add(amount).ok_or_else(|| {
            ValidationError::new(
                entity,
                key_fn(item).to_string(),
                ValidationRule::TotalOverflow(amount),
            )
        })?;
    }
    Ok(())
}

/// Checks a single transaction's references, kind, amount and location.
fn validate_transaction(
    tx: &Transaction,
    wallets: &HashMap<WalletId, usize>,
    categories: &CategoryTree,
) -> core::result::Result<(), ValidationError> {
    let fail = |rule| ValidationError::new(EntityKind::Transaction, tx.id.as_inner(), rule);

    if !wallets.contains_key(&tx.wallet_id) {
        return Err(fail(ValidationRule::UnknownWallet(tx.wallet_id.to_string())));
    }
    let category = categories
        .get(&tx.category_id)
        .ok_or_else(|| fail(ValidationRule::UnknownCategory(tx.category_id.to_string())))?;
    if let Some(sub_id) = tx.sub_category_id.as_ref() {
        if !categories.contains(sub_id) {
            return Err(fail(ValidationRule::UnknownSubCategory(sub_id.to_string())));
        }
        if !categories.is_child_of(sub_id, &tx.category_id) {
            return Err(fail(ValidationRule::NotAChild {
                category: tx.category_id.to_string(),
                sub_category: sub_id.to_string(),
            }));
        }
    }
    if tx.kind != category.kind {
        return Err(fail(ValidationRule::KindMismatch {
            category: category.id.to_string(),
            expected: category.kind.to_string(),
            actual: tx.kind.to_string(),
        }));
    }
    if tx.amount <= 0 {
        return Err(fail(ValidationRule::NonPositiveAmount(tx.amount)));
    }
    if let Some(location) = tx.location.filter(|point| !point.is_valid()) {
        return Err(fail(ValidationRule::InvalidLocation {
            lat: location.lat,
            lng: location.lng,
        }));
    }
    Ok(())
}

/// Validates and indexes the given records with default settings.
///
/// # Errors
///
/// See [`SnapshotBuilder::build`].
#[inline]
pub fn build_snapshot(
    wallets: Vec<Wallet>,
    categories: Vec<Category>,
    transactions: Vec<Transaction>,
) -> Result<Snapshot> {
    Snapshot::builder()
        .wallets(wallets)
        .categories(categories)
        .transactions(transactions)
        .build()
}

impl Snapshot {
    /// Returns a builder with default settings.
    #[inline]
    #[must_use]
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    /// Validates raw service records with default settings.
    ///
    /// # Errors
    ///
    /// See [`SnapshotBuilder::build`].
    #[inline]
    pub fn from_input(input: LedgerInput) -> Result<Self> {
        build_snapshot(input.wallets, input.categories, input.transactions)
    }

    /// Parses a [`LedgerInput`] JSON document and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::LedgerError::Serialization`] for malformed JSON (including
    /// a location encoded as a string rather than an object), otherwise see
    /// [`SnapshotBuilder::build`].
    #[inline]
    pub fn from_json(json: &str) -> Result<Self> {
        let input: LedgerInput = serde_json::from_str(json)?;
        Self::from_input(input)
    }

    /// All wallets in input order.
    #[inline]
    #[must_use]
    pub fn wallets(&self) -> &[Wallet] {
        &self.wallets
    }

    /// All transactions in input order.
    #[inline]
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The category hierarchy.
    #[inline]
    #[must_use]
    pub const fn categories(&self) -> &CategoryTree {
        &self.categories
    }

    /// Looks up a wallet by id.
    #[inline]
    #[must_use]
    pub fn wallet(&self, id: &WalletId) -> Option<&Wallet> {
        self.wallet_index
            .get(id)
            .and_then(|&position| self.wallets.get(position))
    }

    /// Looks up a category by id.
    #[inline]
    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.get(id)
    }

    /// Looks up a transaction by id.
    #[inline]
    #[must_use]
    pub fn transaction(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transaction_index
            .get(id)
            .and_then(|&position| self.transactions.get(position))
    }

    /// Resolves the root category of a validated category id.
    ///
    /// Every id stored in the snapshot resolves by construction; a miss
    /// means the snapshot was corrupted after validation.
    pub(crate) fn root_category(&self, id: &CategoryId) -> &Category {
        match self.categories.root_of(id) {
            Ok(root) => root,
            Err(err) => {
                tracing::error!(category = %id, error = %err, "validated snapshot lost a category");
                unreachable!("validated snapshot cannot fail root lookup: {err}")
            }
        }
    }

    /// Resolves a category referenced by a validated transaction.
    pub(crate) fn resolved_category(&self, id: &CategoryId) -> &Category {
        self.categories.get(id).unwrap_or_else(|| {
            tracing::error!(category = %id, "validated snapshot lost a category");
            unreachable!("validated snapshot cannot miss category {id}")
        })
    }

    /// Resolves a wallet referenced by a validated transaction.
    pub(crate) fn resolved_wallet(&self, id: &WalletId) -> &Wallet {
        self.wallet(id).unwrap_or_else(|| {
            tracing::error!(wallet = %id, "validated snapshot lost a wallet");
            unreachable!("validated snapshot cannot miss wallet {id}")
        })
    }
}
