//! Client-side cart state: a single serializable store with reducer-style
//! transitions. Totals computed here are display-only; the checkout API
//! re-derives everything from the catalog before an order is accepted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::cart::{
    AppliedPromo, CartLineItem, OrderType, PromoKind, ScheduledTime, SelectedModifier,
};
use crate::types::money::{hst, percent_of, Cents};

/// Storage key the serialized cart is persisted under.
pub const CART_STORAGE_KEY: &str = "cart-storage";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CartError {
    /// The cart holds items from another restaurant; switching requires
    /// explicit confirmation via [`CartStore::switch_restaurant`].
    #[error("cart contains items from another restaurant")]
    RestaurantConflict,
}

/// Line item input before the dedup key and subtotal are derived.
#[derive(Debug, Clone)]
pub struct CartItemDraft {
    pub dish_id: Uuid,
    pub dish_name: String,
    pub size: String,
    pub size_price: Cents,
    pub quantity: i64,
    pub modifiers: Vec<SelectedModifier>,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartStore {
    restaurant_id: Option<Uuid>,
    items: Vec<CartLineItem>,
    promo: Option<AppliedPromo>,
    order_type: OrderType,
    delivery_fee: Cents,
    scheduled: ScheduledTime,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restaurant_id(&self) -> Option<Uuid> {
        self.restaurant_id
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn promo(&self) -> Option<&AppliedPromo> {
        self.promo.as_ref()
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn scheduled(&self) -> ScheduledTime {
        self.scheduled
    }

    /// Set the active restaurant. Refused when items from another
    /// restaurant are present; callers that obtained user confirmation go
    /// through [`CartStore::switch_restaurant`] instead.
    pub fn set_restaurant(&mut self, id: Uuid) -> Result<(), CartError> {
        match self.restaurant_id {
            Some(current) if current != id && !self.items.is_empty() => {
                Err(CartError::RestaurantConflict)
            }
            _ => {
                self.restaurant_id = Some(id);
                Ok(())
            }
        }
    }

    /// Confirmed switch: clears the cart and moves to the new restaurant.
    pub fn switch_restaurant(&mut self, id: Uuid) {
        self.items.clear();
        self.promo = None;
        self.restaurant_id = Some(id);
    }

    /// Add a line item. An item with an identical dedup key (dish, size,
    /// modifier signature, instructions) merges into the existing line.
    pub fn add_item(&mut self, draft: CartItemDraft) -> String {
        let key = line_key(&draft);
        if let Some(existing) = self.items.iter_mut().find(|i| i.key == key) {
            existing.quantity += draft.quantity;
            existing.subtotal = line_subtotal(
                existing.size_price,
                &existing.modifiers,
                existing.quantity,
            );
            return key;
        }
        let subtotal = line_subtotal(draft.size_price, &draft.modifiers, draft.quantity);
        self.items.push(CartLineItem {
            key: key.clone(),
            dish_id: draft.dish_id,
            dish_name: draft.dish_name,
            size: draft.size,
            size_price: draft.size_price,
            quantity: draft.quantity,
            modifiers: draft.modifiers,
            instructions: draft.instructions,
            subtotal,
        });
        key
    }

    pub fn remove_item(&mut self, key: &str) {
        self.items.retain(|i| i.key != key);
    }

    /// Set a line's quantity; zero or negative removes the line.
    pub fn update_quantity(&mut self, key: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(key);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.key == key) {
            item.quantity = quantity;
            item.subtotal = line_subtotal(item.size_price, &item.modifiers, quantity);
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.promo = None;
    }

    /// Replace any active promo; promos never stack.
    pub fn apply_promo(&mut self, promo: AppliedPromo) {
        self.promo = Some(promo);
    }

    pub fn clear_promo(&mut self) {
        self.promo = None;
    }

    /// Switching fulfillment mode invalidates a previously chosen schedule.
    pub fn set_order_type(&mut self, order_type: OrderType) {
        if order_type != self.order_type {
            self.scheduled = ScheduledTime::Asap;
        }
        self.order_type = order_type;
    }

    pub fn set_scheduled(&mut self, scheduled: ScheduledTime) {
        self.scheduled = scheduled;
    }

    pub fn set_delivery_fee(&mut self, fee: Cents) {
        self.delivery_fee = fee;
    }

    pub fn subtotal(&self) -> Cents {
        self.items.iter().map(|i| i.subtotal).sum()
    }

    /// Delivery fee after fulfillment mode and promo are applied.
    pub fn effective_delivery_fee(&self) -> Cents {
        if self.order_type == OrderType::Pickup {
            return 0;
        }
        match &self.promo {
            Some(p) if matches!(p.kind, PromoKind::FreeDelivery) => 0,
            _ => self.delivery_fee,
        }
    }

    /// Display discount for the active promo. Percentage and fixed promos
    /// are capped at the subtotal.
    pub fn discount(&self) -> Cents {
        let subtotal = self.subtotal();
        match &self.promo {
            None => 0,
            Some(p) => match p.kind {
                PromoKind::Percentage(pct) => percent_of(subtotal, pct).min(subtotal),
                PromoKind::FixedAmount(amount) => amount.min(subtotal),
                PromoKind::FreeDelivery => {
                    if self.order_type == OrderType::Pickup {
                        0
                    } else {
                        self.delivery_fee
                    }
                }
                PromoKind::FreeItem(value) => value,
            },
        }
    }

    /// Discount applied against the subtotal. A free-delivery promo already
    /// zeroes the effective fee, so it contributes nothing here.
    fn non_delivery_discount(&self) -> Cents {
        match &self.promo {
            Some(p) if matches!(p.kind, PromoKind::FreeDelivery) => 0,
            _ => self.discount(),
        }
    }

    /// 13% HST on `(subtotal - taxable discount + effective delivery fee)`.
    pub fn tax(&self) -> Cents {
        let taxable =
            self.subtotal() - self.non_delivery_discount() + self.effective_delivery_fee();
        hst(taxable)
    }

    /// Grand total, floored at zero.
    pub fn total(&self) -> Cents {
        let total = self.subtotal() + self.effective_delivery_fee() - self.non_delivery_discount()
            + self.tax();
        total.max(0)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

fn line_subtotal(size_price: Cents, modifiers: &[SelectedModifier], quantity: i64) -> Cents {
    let per_unit: Cents = size_price
        + modifiers
            .iter()
            .map(|m| m.price * m.paid_units())
            .sum::<Cents>();
    per_unit * quantity
}

/// Stable dedup key over (dish, size, sorted modifier signature,
/// instructions). Same key means "same thing", so quantities merge.
fn line_key(draft: &CartItemDraft) -> String {
    let mut sig: Vec<String> = draft
        .modifiers
        .iter()
        .map(|m| {
            format!(
                "{}:{:?}:{}:{}",
                m.modifier_id,
                m.placement.unwrap_or_default(),
                m.quantity.unwrap_or(1),
                m.paid_units()
            )
        })
        .collect();
    sig.sort();
    let raw = format!(
        "{}|{}|{}|{}",
        draft.dish_id,
        draft.size,
        sig.join(","),
        draft.instructions.as_deref().unwrap_or("")
    );
    format!("{:016x}", fnv1a(raw.as_bytes()))
}

/// FNV-1a, kept local so persisted keys stay stable across toolchains.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
