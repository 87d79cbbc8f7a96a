//! Wallet and wallet-transaction entities.
//!
//! The wallet balance is never negative and only decreases through a
//! successful debit transaction; the transaction history is append-only.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "credit",
            TransactionType::Debit => "debit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "credit" => Some(TransactionType::Credit),
            "debit" => Some(TransactionType::Debit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionCategory {
    Ride,
    Topup,
    Refund,
    Penalty,
    Reward,
}

impl TransactionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionCategory::Ride => "ride",
            TransactionCategory::Topup => "topup",
            TransactionCategory::Refund => "refund",
            TransactionCategory::Penalty => "penalty",
            TransactionCategory::Reward => "reward",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ride" => Some(TransactionCategory::Ride),
            "topup" => Some(TransactionCategory::Topup),
            "refund" => Some(TransactionCategory::Refund),
            "penalty" => Some(TransactionCategory::Penalty),
            "reward" => Some(TransactionCategory::Reward),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TransactionStatus::Pending),
            "completed" => Some(TransactionStatus::Completed),
            "failed" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }
}

/// One prepaid wallet per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub user_id: Uuid,
    pub balance: BigDecimal,
    pub blocked: BigDecimal,
    pub total_added: BigDecimal,
    pub total_spent: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            balance: BigDecimal::from(0),
            blocked: BigDecimal::from(0),
            total_added: BigDecimal::from(0),
            total_spent: BigDecimal::from(0),
            created_at: now,
            updated_at: now,
        }
    }
}

/// An append-only ledger entry. A debit entry and its balance update are
/// applied as one atomic unit by the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub txn_type: TransactionType,
    pub amount: BigDecimal,
    pub balance_after: BigDecimal,
    pub category: TransactionCategory,
    pub reference_id: Option<Uuid>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl WalletTransaction {
    pub fn completed(
        user_id: Uuid,
        txn_type: TransactionType,
        amount: BigDecimal,
        balance_after: BigDecimal,
        category: TransactionCategory,
        reference_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            txn_type,
            amount,
            balance_after,
            category,
            reference_id,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_wallet_is_empty() {
        let wallet = Wallet::new(Uuid::new_v4());
        assert_eq!(wallet.balance, BigDecimal::from(0));
        assert_eq!(wallet.total_spent, BigDecimal::from(0));
    }

    #[test]
    fn category_wire_strings_are_lowercase() {
        assert_eq!(TransactionCategory::Ride.as_str(), "ride");
        assert_eq!(
            TransactionCategory::parse("reward"),
            Some(TransactionCategory::Reward)
        );
        assert_eq!(TransactionCategory::parse("RIDE"), None);
    }
}
