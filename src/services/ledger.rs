//! Wallet ledger service.
//!
//! Thin policy layer over the record store's atomic credit/debit primitives:
//! validates amounts, creates wallets lazily and maps the insufficient-balance
//! outcome to its error.

use std::sync::Arc;

use bigdecimal::BigDecimal;
use tracing::info;
use uuid::Uuid;

use crate::domain::{TransactionCategory, Wallet, WalletTransaction};
use crate::error::CoreError;
use crate::store::{DebitOutcome, RecordStore};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

pub struct WalletLedger {
    store: Arc<dyn RecordStore>,
}

impl WalletLedger {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn get_or_create_wallet(&self, user_id: Uuid) -> Result<Wallet, CoreError> {
        Ok(self.store.create_wallet_if_absent(user_id).await?)
    }

    pub async fn credit(
        &self,
        user_id: Uuid,
        amount: &BigDecimal,
        category: TransactionCategory,
        reference_id: Option<Uuid>,
    ) -> Result<(Wallet, WalletTransaction), CoreError> {
        validate_amount(amount)?;
        let (wallet, transaction) = self
            .store
            .credit_wallet(user_id, &amount.round(2), category, reference_id)
            .await?;
        info!(%user_id, %amount, category = category.as_str(), "wallet credited");
        Ok((wallet, transaction))
    }

    pub async fn debit(
        &self,
        user_id: Uuid,
        amount: &BigDecimal,
        category: TransactionCategory,
        reference_id: Option<Uuid>,
    ) -> Result<(Wallet, WalletTransaction), CoreError> {
        validate_amount(amount)?;
        let amount = amount.round(2);
        match self
            .store
            .debit_wallet(user_id, &amount, category, reference_id)
            .await?
        {
            DebitOutcome::Applied {
                wallet,
                transaction,
            } => {
                info!(%user_id, %amount, category = category.as_str(), "wallet debited");
                Ok((wallet, transaction))
            }
            DebitOutcome::InsufficientBalance { available } => {
                Err(CoreError::InsufficientBalance {
                    requested: amount,
                    available,
                })
            }
        }
    }

    /// Transaction history, newest first. The page size is clamped to
    /// [1, 100] with a default of 20.
    pub async fn transactions(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<WalletTransaction>, CoreError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = offset.unwrap_or(0).max(0);
        Ok(self
            .store
            .list_wallet_transactions(user_id, limit, offset)
            .await?)
    }
}

fn validate_amount(amount: &BigDecimal) -> Result<(), CoreError> {
    if amount <= &BigDecimal::from(0) {
        return Err(CoreError::Validation(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn ledger() -> WalletLedger {
        WalletLedger::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn credit_then_debit_updates_balance() {
        let ledger = ledger();
        let user = Uuid::new_v4();

        let (wallet, _) = ledger
            .credit(user, &BigDecimal::from(500), TransactionCategory::Topup, None)
            .await
            .unwrap();
        assert_eq!(wallet.balance, BigDecimal::from(500));

        let (wallet, txn) = ledger
            .debit(user, &BigDecimal::from(200), TransactionCategory::Ride, None)
            .await
            .unwrap();
        assert_eq!(wallet.balance, BigDecimal::from(300));
        assert_eq!(txn.balance_after, BigDecimal::from(300));
    }

    #[tokio::test]
    async fn rejects_non_positive_amounts() {
        let ledger = ledger();
        let user = Uuid::new_v4();
        assert!(matches!(
            ledger
                .credit(user, &BigDecimal::from(0), TransactionCategory::Topup, None)
                .await,
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            ledger
                .debit(user, &BigDecimal::from(-5), TransactionCategory::Ride, None)
                .await,
            Err(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn overdraw_reports_available_balance() {
        let ledger = ledger();
        let user = Uuid::new_v4();
        ledger
            .credit(user, &BigDecimal::from(40), TransactionCategory::Topup, None)
            .await
            .unwrap();

        match ledger
            .debit(user, &BigDecimal::from(60), TransactionCategory::Ride, None)
            .await
        {
            Err(CoreError::InsufficientBalance {
                requested,
                available,
            }) => {
                assert_eq!(requested, BigDecimal::from(60));
                assert_eq!(available, BigDecimal::from(40));
            }
            other => panic!("expected InsufficientBalance, got {:?}", other),
        }
    }
}
