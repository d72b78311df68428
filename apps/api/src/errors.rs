use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::lightning::client::LightningError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// `PaymentRequired` is kept distinct from every other failure: the credit
/// accounting wrapper refunds on anything except it.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthenticated")]
    Unauthorized,

    #[error("Payment required: {0}")]
    PaymentRequired(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error("Invoice failure: {0}")]
    Invoice(String),

    #[error("Checkout error: {0}")]
    Checkout(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn is_payment_required(&self) -> bool {
        matches!(self, AppError::PaymentRequired(_))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::Upstream(_)
            | AppError::Invoice(_)
            | AppError::Checkout(_)
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl From<LightningError> for AppError {
    fn from(e: LightningError) -> Self {
        AppError::Invoice(e.to_string())
    }
}

impl From<CheckoutError> for AppError {
    fn from(e: CheckoutError) -> Self {
        AppError::Checkout(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match &self {
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => ("UNAUTHENTICATED", "Authentication required".to_string()),
            AppError::PaymentRequired(msg) => ("PAYMENT_REQUIRED", msg.clone()),
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (
                    "UPSTREAM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Invoice(msg) => {
                tracing::error!("Invoice error: {msg}");
                (
                    "INVOICE_ERROR",
                    "Error processing payment, please try again".to_string(),
                )
            }
            AppError::Checkout(msg) => {
                tracing::error!("Checkout error: {msg}");
                (
                    "CHECKOUT_ERROR",
                    "Could not create a checkout session".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                ("DATABASE_ERROR", "A database error occurred".to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_required_maps_to_402() {
        let err = AppError::PaymentRequired("User must pay to continue".to_string());
        assert!(err.is_payment_required());
        assert_eq!(err.status(), StatusCode::PAYMENT_REQUIRED);
    }

    #[test]
    fn test_upstream_and_invoice_are_not_payment_required() {
        assert!(!AppError::Upstream("boom".to_string()).is_payment_required());
        assert!(!AppError::Invoice("boom".to_string()).is_payment_required());
        assert_eq!(
            AppError::Upstream("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unauthorized_response_has_fixed_code() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_llm_error_becomes_upstream() {
        let err: AppError = LlmError::EmptyContent.into();
        assert!(matches!(err, AppError::Upstream(_)));
    }
}
