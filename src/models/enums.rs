//! Enumeration types for constrained ledger values.

use serde::{Deserialize, Serialize};

/// Kind of a wallet.
///
/// The Vietnamese labels used by the upstream wallet service are accepted
/// as aliases when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WalletType {
    /// Physical cash or cash-like e-wallet.
    #[serde(alias = "tiền mặt")]
    Cash,
    /// Bank account.
    #[serde(alias = "ngân hàng")]
    Bank,
    /// Investment account.
    #[serde(alias = "đầu tư")]
    Investment,
}

impl WalletType {
    /// Returns the wire name of this wallet type.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::Investment => "investment",
        }
    }
}

impl core::fmt::Display for WalletType {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of money flow for categories and transactions.
///
/// `thu` (income) and `chi` (expense) are accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryKind {
    /// Money coming in.
    #[serde(alias = "thu")]
    Income,
    /// Money going out.
    #[serde(alias = "chi")]
    Expense,
}

impl EntryKind {
    /// Returns the wire name of this kind.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Returns `true` for [`EntryKind::Income`].
    #[inline]
    #[must_use]
    pub const fn is_income(self) -> bool {
        matches!(self, Self::Income)
    }

    /// Returns `true` for [`EntryKind::Expense`].
    #[inline]
    #[must_use]
    pub const fn is_expense(self) -> bool {
        matches!(self, Self::Expense)
    }
}

impl core::fmt::Display for EntryKind {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
