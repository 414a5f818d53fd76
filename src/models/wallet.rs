//! Wallet model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{WalletId, WalletType};

/// A place money is held: cash, a bank account or an investment account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    /// Unique identifier.
    pub id: WalletId,
    /// Display name.
    pub name: String,
    /// Current balance in whole VND (may be negative).
    pub balance: i64,
    /// Kind of wallet.
    #[serde(rename = "type")]
    pub kind: WalletType,
    /// Last time the wallet service reported a balance change.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_bank_wallet() {
        let json = r#"{
            "id": "wallet-2",
            "name": "Techcombank",
            "balance": 32000000,
            "type": "bank",
            "updatedAt": "2024-04-15T06:20:00Z"
        }"#;
        let wallet: Wallet = serde_json::from_str(json).unwrap();
        assert_eq!(wallet.id, WalletId::from("wallet-2"));
        assert_eq!(wallet.kind, WalletType::Bank);
        assert_eq!(wallet.balance, 32_000_000);
        assert_eq!(
            wallet.updated_at,
            DateTime::parse_from_rfc3339("2024-04-15T06:20:00Z").unwrap()
        );
    }

    #[test]
    fn deserialize_negative_balance() {
        let json = r#"{
            "id": "w",
            "name": "Overdraft",
            "balance": -150000,
            "type": "bank",
            "updatedAt": "2024-04-15T06:20:00+07:00"
        }"#;
        let wallet: Wallet = serde_json::from_str(json).unwrap();
        assert_eq!(wallet.balance, -150_000);
        assert_eq!(
            wallet.updated_at,
            DateTime::parse_from_rfc3339("2024-04-14T23:20:00Z").unwrap()
        );
    }

    #[test]
    fn serialize_uses_camel_case() {
        let wallet = Wallet {
            id: WalletId::from("w-1"),
            name: "Cash".to_owned(),
            balance: 1_000,
            kind: WalletType::Cash,
            updated_at: DateTime::from_timestamp(1_713_167_100, 0).unwrap(),
        };
        let value = serde_json::to_value(&wallet).unwrap();
        assert_eq!(value["type"], "cash");
        assert_eq!(value["updatedAt"], "2024-04-15T07:45:00Z");
    }
}
