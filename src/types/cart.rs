use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::money::Cents;

/// Fulfillment mode for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Delivery,
    Pickup,
}

/// Where a modifier sits on the dish (pizza-style half toppings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    #[default]
    Whole,
    Left,
    Right,
}

/// A chosen add-on for a line item. `price` is the client's claimed unit
/// price; the server re-prices from the catalog and only falls back to this
/// for declared-free items. `paid_quantity` can be lower than `quantity`
/// when a free-item promo covers some units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedModifier {
    pub modifier_id: Uuid,
    pub name: String,
    pub price: Cents,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
}

impl SelectedModifier {
    /// Units of this modifier that are charged for.
    pub fn paid_units(&self) -> i64 {
        self.paid_quantity.unwrap_or_else(|| self.quantity.unwrap_or(1))
    }
}

/// One cart line. `subtotal` is derived:
/// `(size_price + sum(modifier price * paid units)) * quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub key: String,
    pub dish_id: Uuid,
    pub dish_name: String,
    pub size: String,
    pub size_price: Cents,
    pub quantity: i64,
    pub modifiers: Vec<SelectedModifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub subtotal: Cents,
}

/// Discount rule carried by a promo code. At most one promo is active on a
/// cart at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoKind {
    /// Percent off the subtotal.
    Percentage(i64),
    /// Fixed amount off, capped at the subtotal.
    FixedAmount(Cents),
    /// Waives the delivery fee.
    FreeDelivery,
    /// A free item worth the stated value.
    FreeItem(Cents),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPromo {
    pub code: String,
    pub kind: PromoKind,
}

/// Requested hand-off time. Switching fulfillment mode resets to Asap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScheduledTime {
    #[default]
    Asap,
    At(DateTime<Utc>),
}

/// Untrusted line item as submitted at checkout. Quantities are signed so
/// bogus values reach validation instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub dish_id: Uuid,
    pub size: String,
    pub quantity: i64,
    #[serde(default)]
    pub modifiers: Vec<SelectedModifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// Delivery destination for a checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
}
