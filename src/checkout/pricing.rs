//! Server-side re-pricing. Every amount is derived from catalog rows
//! fetched by the handler; client-claimed prices are ignored except for
//! the declared-free fallback on modifiers with no catalog row.

use uuid::Uuid;

use crate::types::cart::{CheckoutItem, OrderType, SelectedModifier};
use crate::types::menu::{DeliveryZone, Dish, ModifierView, Restaurant, SizePrice};
use crate::types::money::{hst, Cents};
use crate::types::order::OrderItem;

/// Read-only catalog slice covering the dishes a checkout claims.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub restaurant: Restaurant,
    pub dishes: Vec<Dish>,
    pub prices: Vec<SizePrice>,
    pub modifiers: Vec<ModifierView>,
    pub delivery_zone: Option<DeliveryZone>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("restaurant is not accepting orders")]
    InactiveRestaurant,
    #[error("unknown dish {0}")]
    UnknownDish(Uuid),
    #[error("dish {0} does not belong to this restaurant")]
    DishNotAtRestaurant(Uuid),
    #[error("dish {0} is not available")]
    InactiveDish(Uuid),
    #[error("no active price for dish {dish_id} size {size:?}")]
    UnknownSize { dish_id: Uuid, size: String },
    #[error("quantity must be a positive integer")]
    InvalidQuantity,
    #[error("unknown modifier {name:?}")]
    UnknownModifier { name: String },
    #[error("modifier {name:?} is not available")]
    InactiveModifier { name: String },
    #[error("address is outside the delivery area")]
    NoDeliveryZone,
    #[error("order is below the delivery minimum of {min} cents")]
    BelowMinimum { min: Cents },
}

/// Totals and snapshot lines for a validated order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedOrder {
    pub items: Vec<OrderItem>,
    pub subtotal: Cents,
    pub delivery_fee: Cents,
    pub tax: Cents,
    pub total: Cents,
}

/// Re-derive the authoritative totals for a claimed cart.
pub fn price_order(
    catalog: &CatalogSnapshot,
    order_type: OrderType,
    items: &[CheckoutItem],
) -> Result<PricedOrder, PricingError> {
    if items.is_empty() {
        return Err(PricingError::EmptyCart);
    }
    if !catalog.restaurant.active {
        return Err(PricingError::InactiveRestaurant);
    }

    let mut lines = Vec::with_capacity(items.len());
    let mut subtotal: Cents = 0;

    for item in items {
        if item.quantity < 1 {
            return Err(PricingError::InvalidQuantity);
        }
        let dish = catalog
            .dishes
            .iter()
            .find(|d| d.id == item.dish_id)
            .ok_or(PricingError::UnknownDish(item.dish_id))?;
        if dish.restaurant_id != catalog.restaurant.id {
            return Err(PricingError::DishNotAtRestaurant(dish.id));
        }
        if !dish.active {
            return Err(PricingError::InactiveDish(dish.id));
        }
        let size = catalog
            .prices
            .iter()
            .find(|p| p.dish_id == dish.id && p.size_label == item.size && p.active)
            .ok_or_else(|| PricingError::UnknownSize {
                dish_id: dish.id,
                size: item.size.clone(),
            })?;

        let mut priced_modifiers = Vec::with_capacity(item.modifiers.len());
        let mut extras_per_unit: Cents = 0;
        for claimed in &item.modifiers {
            let price = modifier_price(catalog, dish.id, claimed)?;
            extras_per_unit += price * claimed.paid_units();
            priced_modifiers.push(SelectedModifier {
                price,
                ..claimed.clone()
            });
        }

        let line_subtotal = (size.price + extras_per_unit) * item.quantity;
        subtotal += line_subtotal;
        lines.push(OrderItem {
            dish_id: dish.id,
            dish_name: dish.name.clone(),
            size_label: size.size_label.clone(),
            unit_price: size.price,
            quantity: item.quantity,
            modifiers: priced_modifiers,
            instructions: item.instructions.clone(),
            line_subtotal,
        });
    }

    let delivery_fee = match order_type {
        OrderType::Pickup => 0,
        OrderType::Delivery => {
            let zone = catalog
                .delivery_zone
                .as_ref()
                .filter(|z| z.active)
                .ok_or(PricingError::NoDeliveryZone)?;
            if subtotal < zone.min_order {
                return Err(PricingError::BelowMinimum { min: zone.min_order });
            }
            zone.delivery_fee
        }
    };

    let tax = hst(subtotal + delivery_fee);
    Ok(PricedOrder {
        items: lines,
        subtotal,
        delivery_fee,
        tax,
        total: subtotal + delivery_fee + tax,
    })
}

/// Authoritative price for one claimed modifier. Modifiers missing from
/// both catalogs are accepted only when the client declares them free;
/// any nonzero claimed price with no backing row is rejected.
fn modifier_price(
    catalog: &CatalogSnapshot,
    dish_id: Uuid,
    claimed: &SelectedModifier,
) -> Result<Cents, PricingError> {
    if claimed.quantity.is_some_and(|q| q < 1) {
        return Err(PricingError::InvalidQuantity);
    }
    if claimed.paid_quantity.is_some_and(|p| {
        p < 0 || p > claimed.quantity.unwrap_or(1)
    }) {
        return Err(PricingError::InvalidQuantity);
    }
    match catalog
        .modifiers
        .iter()
        .find(|m| m.id == claimed.modifier_id && m.dish_id == dish_id)
    {
        Some(view) if view.active => Ok(view.price),
        Some(view) => Err(PricingError::InactiveModifier {
            name: view.name.clone(),
        }),
        None if claimed.price == 0 => Ok(0),
        None => Err(PricingError::UnknownModifier {
            name: claimed.name.clone(),
        }),
    }
}
