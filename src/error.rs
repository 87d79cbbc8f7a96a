use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use bigdecimal::BigDecimal;
use serde_json::json;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Ride request already matched to another driver")]
    AlreadyMatched,
    #[error("Promo code is expired or inactive")]
    PromoExpiredOrInactive,
    #[error("Promo code requires a minimum fare of {required}")]
    PromoMinimumNotMet { required: BigDecimal },
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        requested: BigDecimal,
        available: BigDecimal,
    },
    #[error("Auto-pay is disabled: {0}")]
    AutoPayDisabled(String),
    #[error("No driver found within the match timeout")]
    MatchTimeout,
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            CoreError::Validation(_) => StatusCode::BAD_REQUEST,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::AlreadyMatched => StatusCode::CONFLICT,
            CoreError::PromoExpiredOrInactive | CoreError::PromoMinimumNotMet { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            CoreError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,
            CoreError::AutoPayDisabled(_) => StatusCode::FORBIDDEN,
            CoreError::MatchTimeout => StatusCode::REQUEST_TIMEOUT,
            CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_validation_to_400() {
        let resp = CoreError::Validation("bad coordinates".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn maps_lost_race_to_409() {
        let resp = CoreError::AlreadyMatched.into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn maps_insufficient_balance_to_402() {
        let resp = CoreError::InsufficientBalance {
            requested: BigDecimal::from(60),
            available: BigDecimal::from(40),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::PAYMENT_REQUIRED);
    }
}
