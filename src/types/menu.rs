//! Catalog shapes the validator prices against. Modifier groups come in two
//! stored layouts (simple lists and sectioned combos); both flatten into
//! [`ModifierView`] so pricing has a single lookup shape.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::money::Cents;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub active: bool,
}

/// Authoritative price for one size variant of a dish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizePrice {
    pub dish_id: Uuid,
    pub size_label: String,
    pub price: Cents,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleModifier {
    pub id: Uuid,
    pub name: String,
    pub price: Cents,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleModifierGroup {
    pub id: Uuid,
    pub dish_id: Uuid,
    pub name: String,
    pub modifiers: Vec<SimpleModifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboItem {
    pub id: Uuid,
    pub name: String,
    pub price: Cents,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboSection {
    pub id: Uuid,
    pub name: String,
    pub items: Vec<ComboItem>,
}

/// A combo group nests its choices under named sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboModifierGroup {
    pub id: Uuid,
    pub dish_id: Uuid,
    pub name: String,
    pub sections: Vec<ComboSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModifierGroup {
    Simple(SimpleModifierGroup),
    Combo(ComboModifierGroup),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierSource {
    Simple,
    Combo,
}

/// Flattened modifier row: one shape regardless of which catalog the
/// modifier came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierView {
    pub id: Uuid,
    pub group_id: Uuid,
    pub dish_id: Uuid,
    pub name: String,
    pub price: Cents,
    pub active: bool,
    pub source: ModifierSource,
}

/// Flatten a group into lookup rows.
pub fn flatten_group(group: &ModifierGroup) -> Vec<ModifierView> {
    match group {
        ModifierGroup::Simple(g) => g
            .modifiers
            .iter()
            .map(|m| ModifierView {
                id: m.id,
                group_id: g.id,
                dish_id: g.dish_id,
                name: m.name.clone(),
                price: m.price,
                active: m.active,
                source: ModifierSource::Simple,
            })
            .collect(),
        ModifierGroup::Combo(g) => g
            .sections
            .iter()
            .flat_map(|s| s.items.iter())
            .map(|i| ModifierView {
                id: i.id,
                group_id: g.id,
                dish_id: g.dish_id,
                name: i.name.clone(),
                price: i.price,
                active: i.active,
                source: ModifierSource::Combo,
            })
            .collect(),
    }
}

/// Postal-prefix delivery rule: matched zone supplies the fee and the
/// minimum order for the address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryZone {
    pub restaurant_id: Uuid,
    pub postal_prefix: String,
    pub delivery_fee: Cents,
    pub min_order: Cents,
    pub active: bool,
}
