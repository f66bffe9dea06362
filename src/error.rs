//! API error taxonomy and HTTP mapping. Steps that fail before persistence
//! leave no order behind; a duplicate reference always resolves to the
//! first order's id.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::checkout::{PricingError, ProvenanceError};
use crate::payments::PaymentError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("an order already exists for this payment reference")]
    Duplicate { order_id: Uuid },
    #[error("payment provider error: {0}")]
    Payment(PaymentError),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl From<PricingError> for ApiError {
    fn from(e: PricingError) -> Self {
        match e {
            PricingError::UnknownDish(_) | PricingError::DishNotAtRestaurant(_) => {
                ApiError::NotFound(e.to_string())
            }
            _ => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl From<ProvenanceError> for ApiError {
    fn from(e: ProvenanceError) -> Self {
        ApiError::Unauthorized(e.to_string())
    }
}

impl From<PaymentError> for ApiError {
    fn from(e: PaymentError) -> Self {
        match e {
            // A reference the provider does not know is a provenance
            // failure, not an infrastructure one.
            PaymentError::NotFound => ApiError::Unauthorized(e.to_string()),
            PaymentError::Http(_) => ApiError::Payment(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::Duplicate { order_id } => (
                StatusCode::CONFLICT,
                json!({ "error": self.to_string(), "order_id": order_id }),
            ),
            ApiError::Payment(e) => {
                error!(error = %e, "payment provider failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "payment provider failure" }),
                )
            }
            ApiError::Db(e) => {
                error!(error = %e, "database failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
