//! Confirmation email, fire-and-forget. Failures here are logged by the
//! caller and never fail an order.

use serde_json::json;
use tracing::debug;

use crate::types::money::format_cents;
use crate::types::order::Order;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("email request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    endpoint: Option<String>,
    from: String,
}

impl Mailer {
    /// Without an endpoint configured, sends are logged and dropped.
    pub fn new(endpoint: Option<String>, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            from,
        }
    }

    pub async fn send_order_confirmation(&self, to: &str, order: &Order) -> Result<(), MailError> {
        let Some(endpoint) = &self.endpoint else {
            debug!(order_id = %order.id, %to, "email endpoint not configured, skipping confirmation");
            return Ok(());
        };
        let lines: Vec<String> = order
            .items
            .iter()
            .map(|i| {
                format!(
                    "{} x {} ({}) {}",
                    i.quantity,
                    i.dish_name,
                    i.size_label,
                    format_cents(i.line_subtotal)
                )
            })
            .collect();
        let text = format!(
            "Thanks for your order!\n\n{}\n\nSubtotal: {}\nDelivery: {}\nTax: {}\nTotal: {}\n",
            lines.join("\n"),
            format_cents(order.subtotal),
            format_cents(order.delivery_fee),
            format_cents(order.tax),
            format_cents(order.total),
        );
        self.client
            .post(endpoint)
            .json(&json!({
                "from": self.from,
                "to": to,
                "subject": format!("Order {} confirmed", order.id),
                "text": text,
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
