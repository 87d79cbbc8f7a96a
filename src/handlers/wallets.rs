//! Wallet endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{TransactionCategory, Wallet, WalletTransaction};
use crate::error::CoreError;
use crate::AppState;

pub async fn get_wallet(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Wallet>, CoreError> {
    Ok(Json(state.ledger.get_or_create_wallet(user_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreditBody {
    pub amount: BigDecimal,
}

#[derive(Debug, Serialize)]
pub struct CreditResponse {
    pub wallet: Wallet,
    pub transaction: WalletTransaction,
}

pub async fn credit_wallet(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<CreditBody>,
) -> Result<Json<CreditResponse>, CoreError> {
    let (wallet, transaction) = state
        .ledger
        .credit(user_id, &body.amount, TransactionCategory::Topup, None)
        .await?;
    Ok(Json(CreditResponse {
        wallet,
        transaction,
    }))
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<WalletTransaction>>, CoreError> {
    Ok(Json(
        state
            .ledger
            .transactions(user_id, page.limit, page.offset)
            .await?,
    ))
}
