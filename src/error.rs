//! Error types for the ledger engine.

use crate::models::CategoryId;

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, LedgerError>;

/// All errors that can occur when building or querying a ledger snapshot.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A record in the snapshot violates a ledger invariant.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The category parent chain is cyclic or references an unknown id.
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    /// A query was configured with an unsupported value.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// JSON deserialization of a snapshot failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Kind of record a [`ValidationError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A wallet record.
    Wallet,
    /// A category record.
    Category,
    /// A transaction record.
    Transaction,
}

impl core::fmt::Display for EntityKind {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match *self {
            Self::Wallet => "wallet",
            Self::Category => "category",
            Self::Transaction => "transaction",
        })
    }
}

/// The invariant a record broke.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationRule {
    /// Another record of the same kind already uses this id.
    #[error("duplicate id")]
    DuplicateId,
    /// The referenced wallet does not exist.
    #[error("references unknown wallet `{0}`")]
    UnknownWallet(String),
    /// The referenced category does not exist.
    #[error("references unknown category `{0}`")]
    UnknownCategory(String),
    /// The referenced sub-category does not exist.
    #[error("references unknown sub-category `{0}`")]
    UnknownSubCategory(String),
    /// The referenced parent category does not exist.
    #[error("references unknown parent category `{0}`")]
    UnknownParent(String),
    /// A category's parent has a different income/expense kind.
    #[error("parent category `{parent}` is {parent_kind}, expected {expected}")]
    ParentKindMismatch {
        /// Parent category id.
        parent: String,
        /// Kind of the parent.
        parent_kind: String,
        /// Kind of the child.
        expected: String,
    },
    /// A transaction's kind differs from its category's kind.
    #[error("transaction is {actual} but category `{category}` is {expected}")]
    KindMismatch {
        /// Category id.
        category: String,
        /// Kind of the category.
        expected: String,
        /// Kind of the transaction.
        actual: String,
    },
    /// The sub-category is not a direct child of the transaction's category.
    #[error("sub-category `{sub_category}` is not a child of `{category}`")]
    NotAChild {
        /// Category id.
        category: String,
        /// Sub-category id.
        sub_category: String,
    },
    /// The amount is zero or negative.
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(i64),
    /// The location lies outside valid latitude/longitude ranges.
    #[error("location ({lat}, {lng}) is out of range")]
    InvalidLocation {
        /// Latitude as supplied.
        lat: f64,
        /// Longitude as supplied.
        lng: f64,
    },
    /// Adding this record's amount to the running total of its kind leaves
    /// the `i64` range.
    #[error("running total overflows at amount {0}")]
    TotalOverflow(i64),
    /// The category is nested deeper than allowed.
    #[error("category depth {depth} exceeds maximum {max}")]
    DepthExceeded {
        /// Depth of the category (root = 1).
        depth: usize,
        /// Configured maximum depth.
        max: usize,
    },
}

/// A snapshot record failed validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid {entity} `{id}`: {rule}")]
pub struct ValidationError {
    /// Kind of the offending record.
    pub entity: EntityKind,
    /// Id of the offending record.
    pub id: String,
    /// The rule it violated.
    pub rule: ValidationRule,
}

impl ValidationError {
    /// Creates a validation error for the given record.
    #[inline]
    #[must_use]
    pub fn new<I: Into<String>>(entity: EntityKind, id: I, rule: ValidationRule) -> Self {
        Self {
            entity,
            id: id.into(),
            rule,
        }
    }
}

/// Category hierarchy resolution failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    /// Walking parent links revisited a category.
    #[error("cyclic category parentage starting at `{start}`: {}", format_chain(.chain))]
    Cycle {
        /// Category the walk started from.
        start: CategoryId,
        /// Categories visited, ending with the repeated one.
        chain: Vec<CategoryId>,
    },
    /// The category id is not part of the hierarchy.
    #[error("unknown category `{0}`")]
    UnknownCategory(CategoryId),
}

/// Renders a cycle chain as `a -> b -> a`.
fn format_chain(chain: &[CategoryId]) -> String {
    chain
        .iter()
        .map(CategoryId::as_inner)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// A query facade input was not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// The transaction filter token is not part of the vocabulary.
    #[error("unknown filter token `{0}` (expected all, today, income or expense)")]
    UnknownFilterToken(String),
}
