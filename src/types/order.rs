use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::cart::{Address, OrderType, SelectedModifier};
use crate::types::money::Cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Received,
    Confirmed,
    Preparing,
    Ready,
    OutForDelivery,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    Card,
    Cash,
}

/// A persisted, server-validated order. Line items are snapshots of what
/// was priced at creation time; later menu edits never change them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub user_id: Option<Uuid>,
    pub guest_email: Option<String>,
    pub order_type: OrderType,
    pub address: Option<Address>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub items: Vec<OrderItem>,
    pub subtotal: Cents,
    pub delivery_fee: Cents,
    pub tax: Cents,
    pub total: Cents,
    pub payment_kind: PaymentKind,
    pub payment_ref: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub dish_id: Uuid,
    pub dish_name: String,
    pub size_label: String,
    pub unit_price: Cents,
    pub quantity: i64,
    pub modifiers: Vec<SelectedModifier>,
    pub instructions: Option<String>,
    pub line_subtotal: Cents,
}

/// Append-only timeline entry; never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusEvent {
    pub status: OrderStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}
