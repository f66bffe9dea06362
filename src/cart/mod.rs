//! Cart aggregation: advisory totals shown before checkout.

mod store;

pub use store::{CartError, CartItemDraft, CartStore, CART_STORAGE_KEY};
