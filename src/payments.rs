//! Payment provider adapter. The provider is opaque: the service only
//! fetches a completed transaction and reads its amount, status, and the
//! identity metadata recorded when the intent was created.

use std::collections::HashMap;

use serde::Deserialize;
use uuid::Uuid;

use crate::types::money::Cents;

/// Facts about a captured payment, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTransaction {
    pub id: String,
    /// Amount actually captured, in cents.
    pub amount: Cents,
    pub status: String,
    pub user_id: Option<String>,
    pub guest_email: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("payment transaction not found")]
    NotFound,
}

/// Stripe-shaped payment-intent response.
#[derive(Debug, Deserialize)]
struct IntentPayload {
    id: String,
    amount_received: i64,
    status: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Clone)]
pub struct PaymentGateway {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl PaymentGateway {
    /// `base_url` is normally `https://api.stripe.com`; tests point it at
    /// a local stub.
    pub fn new(secret_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
        }
    }

    pub async fn fetch_transaction(
        &self,
        intent_id: &str,
    ) -> Result<PaymentTransaction, PaymentError> {
        let url = format!("{}/v1/payment_intents/{}", self.base_url, intent_id);
        let res = self
            .client
            .get(url)
            .bearer_auth(&self.secret_key)
            .send()
            .await?;
        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PaymentError::NotFound);
        }
        let payload: IntentPayload = res.error_for_status()?.json().await?;
        Ok(PaymentTransaction {
            id: payload.id,
            amount: payload.amount_received,
            status: payload.status,
            user_id: payload.metadata.get("user_id").cloned(),
            guest_email: payload.metadata.get("guest_email").cloned(),
        })
    }
}

/// Internal idempotency reference for pay-at-door orders, which have no
/// provider transaction.
pub fn cash_reference() -> String {
    format!("cash_{}", Uuid::new_v4())
}
