//! Cart aggregator tests: line merging, promo rules, totals, fulfillment
//! switching, restaurant guard.

use chrono::{TimeZone, Utc};
use rust_orders::cart::{CartError, CartItemDraft, CartStore};
use rust_orders::types::cart::{
    AppliedPromo, OrderType, Placement, PromoKind, ScheduledTime, SelectedModifier,
};
use uuid::Uuid;

fn modifier(id: Uuid, name: &str, price: i64) -> SelectedModifier {
    SelectedModifier {
        modifier_id: id,
        name: name.to_string(),
        price,
        quantity: None,
        paid_quantity: None,
        placement: None,
    }
}

fn draft(dish_id: Uuid, size_price: i64, quantity: i64, mods: Vec<SelectedModifier>) -> CartItemDraft {
    CartItemDraft {
        dish_id,
        dish_name: "Margherita".to_string(),
        size: "Large".to_string(),
        size_price,
        quantity,
        modifiers: mods,
        instructions: None,
    }
}

/// $19.49 x 2 with a $2.50 modifier, $4.99 delivery, no promo.
fn worked_example_cart() -> CartStore {
    let mut cart = CartStore::new();
    cart.set_restaurant(Uuid::new_v4()).unwrap();
    cart.set_delivery_fee(499);
    cart.add_item(draft(
        Uuid::new_v4(),
        1949,
        2,
        vec![modifier(Uuid::new_v4(), "Extra Cheese", 250)],
    ));
    cart
}

#[test]
fn line_subtotal_follows_invariant() {
    let cart = worked_example_cart();
    let line = &cart.items()[0];
    assert_eq!(line.subtotal, (1949 + 250) * 2);
    assert_eq!(cart.subtotal(), 4398);
}

#[test]
fn identical_additions_merge_into_one_line() {
    let mut cart = CartStore::new();
    let dish = Uuid::new_v4();
    let cheese = Uuid::new_v4();
    cart.add_item(draft(dish, 1949, 1, vec![modifier(cheese, "Extra Cheese", 250)]));
    cart.add_item(draft(dish, 1949, 2, vec![modifier(cheese, "Extra Cheese", 250)]));

    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.items()[0].quantity, 3);
    assert_eq!(cart.items()[0].subtotal, (1949 + 250) * 3);
}

#[test]
fn different_instructions_stay_separate_lines() {
    let mut cart = CartStore::new();
    let dish = Uuid::new_v4();
    cart.add_item(draft(dish, 1949, 1, vec![]));
    let mut well_done = draft(dish, 1949, 1, vec![]);
    well_done.instructions = Some("well done".to_string());
    cart.add_item(well_done);

    assert_eq!(cart.items().len(), 2);
}

#[test]
fn modifier_placement_affects_identity() {
    let mut cart = CartStore::new();
    let dish = Uuid::new_v4();
    let pepperoni = Uuid::new_v4();
    let mut left = modifier(pepperoni, "Pepperoni", 200);
    left.placement = Some(Placement::Left);
    let mut right = modifier(pepperoni, "Pepperoni", 200);
    right.placement = Some(Placement::Right);
    cart.add_item(draft(dish, 1949, 1, vec![left]));
    cart.add_item(draft(dish, 1949, 1, vec![right]));

    assert_eq!(cart.items().len(), 2);
}

#[test]
fn worked_example_delivery_totals() {
    let cart = worked_example_cart();
    assert_eq!(cart.subtotal(), 4398);
    assert_eq!(cart.effective_delivery_fee(), 499);
    // 13% of $48.97, truncated
    assert_eq!(cart.tax(), 636);
    assert_eq!(cart.total(), 5533);
}

#[test]
fn ten_percent_promo_discounts_and_retaxes() {
    let mut cart = worked_example_cart();
    cart.apply_promo(AppliedPromo {
        code: "SAVE10".to_string(),
        kind: PromoKind::Percentage(10),
    });

    // 10% of $43.98 rounds to $4.40
    assert_eq!(cart.discount(), 440);
    // tax on (43.98 - 4.40 + 4.99)
    assert_eq!(cart.tax(), 4457 * 13 / 100);
    assert_eq!(
        cart.total(),
        cart.subtotal() + cart.effective_delivery_fee() - cart.discount() + cart.tax()
    );
}

#[test]
fn fixed_promo_capped_at_subtotal() {
    let mut cart = CartStore::new();
    cart.set_delivery_fee(499);
    cart.add_item(draft(Uuid::new_v4(), 1000, 1, vec![]));
    cart.apply_promo(AppliedPromo {
        code: "BIGOFF".to_string(),
        kind: PromoKind::FixedAmount(5000),
    });

    assert_eq!(cart.discount(), 1000);
    // taxable collapses to the delivery fee
    assert_eq!(cart.tax(), 499 * 13 / 100);
    assert_eq!(cart.total(), 499 + 499 * 13 / 100);
}

#[test]
fn oversized_percentage_never_exceeds_subtotal() {
    let mut cart = worked_example_cart();
    cart.apply_promo(AppliedPromo {
        code: "EVERYTHING".to_string(),
        kind: PromoKind::Percentage(150),
    });

    assert_eq!(cart.discount(), cart.subtotal());
    assert_eq!(cart.tax(), 499 * 13 / 100);
    assert_eq!(cart.total(), 499 + 499 * 13 / 100);
}

#[test]
fn free_delivery_promo_zeroes_fee_once() {
    let mut cart = worked_example_cart();
    cart.apply_promo(AppliedPromo {
        code: "FREEDEL".to_string(),
        kind: PromoKind::FreeDelivery,
    });

    assert_eq!(cart.discount(), 499);
    assert_eq!(cart.effective_delivery_fee(), 0);
    // fee is already zero, so it is not subtracted again from the taxable base
    assert_eq!(cart.tax(), 4398 * 13 / 100);
    assert_eq!(cart.total(), 4398 + 4398 * 13 / 100);
}

#[test]
fn free_delivery_is_worthless_on_pickup() {
    let mut cart = worked_example_cart();
    cart.set_order_type(OrderType::Pickup);
    cart.apply_promo(AppliedPromo {
        code: "FREEDEL".to_string(),
        kind: PromoKind::FreeDelivery,
    });

    assert_eq!(cart.discount(), 0);
    assert_eq!(cart.effective_delivery_fee(), 0);
    assert_eq!(cart.total(), 4398 + 4398 * 13 / 100);
}

#[test]
fn promos_replace_rather_than_stack() {
    let mut cart = worked_example_cart();
    cart.apply_promo(AppliedPromo {
        code: "SAVE10".to_string(),
        kind: PromoKind::Percentage(10),
    });
    cart.apply_promo(AppliedPromo {
        code: "FIVEOFF".to_string(),
        kind: PromoKind::FixedAmount(500),
    });

    assert_eq!(cart.promo().unwrap().code, "FIVEOFF");
    assert_eq!(cart.discount(), 500);
}

#[test]
fn total_is_floored_at_zero() {
    let mut cart = CartStore::new();
    cart.set_order_type(OrderType::Pickup);
    cart.add_item(draft(Uuid::new_v4(), 100, 1, vec![]));
    cart.apply_promo(AppliedPromo {
        code: "FREEMEAL".to_string(),
        kind: PromoKind::FreeItem(10_000),
    });

    assert_eq!(cart.total(), 0);
}

#[test]
fn switching_order_type_resets_schedule() {
    let mut cart = worked_example_cart();
    let tonight = Utc.with_ymd_and_hms(2025, 6, 1, 18, 30, 0).unwrap();
    cart.set_scheduled(ScheduledTime::At(tonight));

    cart.set_order_type(OrderType::Pickup);
    assert_eq!(cart.scheduled(), ScheduledTime::Asap);

    // setting the same mode again keeps the chosen time
    cart.set_scheduled(ScheduledTime::At(tonight));
    cart.set_order_type(OrderType::Pickup);
    assert_eq!(cart.scheduled(), ScheduledTime::At(tonight));
}

#[test]
fn restaurant_switch_needs_confirmation() {
    let mut cart = CartStore::new();
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    cart.set_restaurant(first).unwrap();
    cart.add_item(draft(Uuid::new_v4(), 1949, 1, vec![]));

    assert_eq!(cart.set_restaurant(second), Err(CartError::RestaurantConflict));
    assert_eq!(cart.restaurant_id(), Some(first));
    assert_eq!(cart.items().len(), 1);

    cart.switch_restaurant(second);
    assert_eq!(cart.restaurant_id(), Some(second));
    assert!(cart.items().is_empty());
}

#[test]
fn update_quantity_zero_removes_line() {
    let mut cart = CartStore::new();
    let key = cart.add_item(draft(Uuid::new_v4(), 1949, 2, vec![]));

    cart.update_quantity(&key, 5);
    assert_eq!(cart.items()[0].quantity, 5);
    assert_eq!(cart.items()[0].subtotal, 1949 * 5);

    cart.update_quantity(&key, 0);
    assert!(cart.items().is_empty());
}

#[test]
fn persisted_cart_restores_totals() {
    let cart = worked_example_cart();
    let raw = cart.to_json().unwrap();
    let restored = CartStore::from_json(&raw).unwrap();

    assert_eq!(restored, cart);
    assert_eq!(restored.total(), 5533);
}
