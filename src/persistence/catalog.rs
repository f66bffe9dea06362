//! Read-only catalog queries the validator prices against: restaurants,
//! dishes, size prices, modifier groups, delivery zones.

use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::types::menu::{
    ComboItem, ComboModifierGroup, ComboSection, DeliveryZone, Dish, ModifierGroup, Restaurant,
    SimpleModifier, SimpleModifierGroup, SizePrice,
};

#[derive(FromRow)]
struct RestaurantRow {
    id: Uuid,
    name: String,
    active: bool,
}

pub async fn get_restaurant(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<Restaurant>, sqlx::Error> {
    let row = sqlx::query_as::<_, RestaurantRow>(
        "SELECT id, name, active FROM restaurants WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|r| Restaurant {
        id: r.id,
        name: r.name,
        active: r.active,
    }))
}

#[derive(FromRow)]
struct DishRow {
    id: Uuid,
    restaurant_id: Uuid,
    name: String,
    active: bool,
}

/// Fetch the dishes a checkout claims, by id.
pub async fn list_dishes(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Dish>, sqlx::Error> {
    let rows = sqlx::query_as::<_, DishRow>(
        "SELECT id, restaurant_id, name, active FROM dishes WHERE id = ANY($1)",
    )
    .bind(ids.to_vec())
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| Dish {
            id: r.id,
            restaurant_id: r.restaurant_id,
            name: r.name,
            active: r.active,
        })
        .collect())
}

#[derive(FromRow)]
struct SizePriceRow {
    dish_id: Uuid,
    size_label: String,
    price: i64,
    active: bool,
}

pub async fn list_size_prices(
    pool: &PgPool,
    dish_ids: &[Uuid],
) -> Result<Vec<SizePrice>, sqlx::Error> {
    let rows = sqlx::query_as::<_, SizePriceRow>(
        "SELECT dish_id, size_label, price, active FROM dish_prices WHERE dish_id = ANY($1)",
    )
    .bind(dish_ids.to_vec())
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| SizePrice {
            dish_id: r.dish_id,
            size_label: r.size_label,
            price: r.price,
            active: r.active,
        })
        .collect())
}

#[derive(FromRow)]
struct GroupRow {
    id: Uuid,
    dish_id: Uuid,
    name: String,
    kind: String,
}

#[derive(FromRow)]
struct ModifierRow {
    id: Uuid,
    group_id: Uuid,
    name: String,
    price: i64,
    active: bool,
}

#[derive(FromRow)]
struct SectionRow {
    id: Uuid,
    group_id: Uuid,
    name: String,
}

#[derive(FromRow)]
struct ComboItemRow {
    id: Uuid,
    section_id: Uuid,
    name: String,
    price: i64,
    active: bool,
}

/// Load modifier groups for the given dishes as tagged variants. Rows with
/// an unrecognized kind are skipped.
pub async fn list_modifier_groups(
    pool: &PgPool,
    dish_ids: &[Uuid],
) -> Result<Vec<ModifierGroup>, sqlx::Error> {
    let groups = sqlx::query_as::<_, GroupRow>(
        "SELECT id, dish_id, name, kind FROM modifier_groups WHERE dish_id = ANY($1)",
    )
    .bind(dish_ids.to_vec())
    .fetch_all(pool)
    .await?;
    let group_ids: Vec<Uuid> = groups.iter().map(|g| g.id).collect();

    let modifiers = sqlx::query_as::<_, ModifierRow>(
        "SELECT id, group_id, name, price, active FROM modifiers WHERE group_id = ANY($1)",
    )
    .bind(group_ids.clone())
    .fetch_all(pool)
    .await?;

    let sections = sqlx::query_as::<_, SectionRow>(
        "SELECT id, group_id, name FROM combo_sections WHERE group_id = ANY($1)",
    )
    .bind(group_ids)
    .fetch_all(pool)
    .await?;
    let section_ids: Vec<Uuid> = sections.iter().map(|s| s.id).collect();

    let combo_items = sqlx::query_as::<_, ComboItemRow>(
        "SELECT id, section_id, name, price, active FROM combo_items WHERE section_id = ANY($1)",
    )
    .bind(section_ids)
    .fetch_all(pool)
    .await?;

    let mut out = Vec::with_capacity(groups.len());
    for group in groups {
        match group.kind.as_str() {
            "simple" => out.push(ModifierGroup::Simple(SimpleModifierGroup {
                id: group.id,
                dish_id: group.dish_id,
                name: group.name,
                modifiers: modifiers
                    .iter()
                    .filter(|m| m.group_id == group.id)
                    .map(|m| SimpleModifier {
                        id: m.id,
                        name: m.name.clone(),
                        price: m.price,
                        active: m.active,
                    })
                    .collect(),
            })),
            "combo" => out.push(ModifierGroup::Combo(ComboModifierGroup {
                id: group.id,
                dish_id: group.dish_id,
                name: group.name,
                sections: sections
                    .iter()
                    .filter(|s| s.group_id == group.id)
                    .map(|s| ComboSection {
                        id: s.id,
                        name: s.name.clone(),
                        items: combo_items
                            .iter()
                            .filter(|i| i.section_id == s.id)
                            .map(|i| ComboItem {
                                id: i.id,
                                name: i.name.clone(),
                                price: i.price,
                                active: i.active,
                            })
                            .collect(),
                    })
                    .collect(),
            })),
            other => {
                tracing::warn!(group_id = %group.id, kind = other, "skipping modifier group with unknown kind");
            }
        }
    }
    Ok(out)
}

#[derive(FromRow)]
struct ZoneRow {
    restaurant_id: Uuid,
    postal_prefix: String,
    delivery_fee: i64,
    min_order: i64,
    active: bool,
}

/// Longest-prefix match of the address postal code against the
/// restaurant's active zones.
pub async fn find_delivery_zone(
    pool: &PgPool,
    restaurant_id: Uuid,
    postal_code: &str,
) -> Result<Option<DeliveryZone>, sqlx::Error> {
    let row = sqlx::query_as::<_, ZoneRow>(
        "SELECT restaurant_id, postal_prefix, delivery_fee, min_order, active \
         FROM delivery_zones \
         WHERE restaurant_id = $1 AND active AND $2 ILIKE postal_prefix || '%' \
         ORDER BY length(postal_prefix) DESC LIMIT 1",
    )
    .bind(restaurant_id)
    .bind(postal_code)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|z| DeliveryZone {
        restaurant_id: z.restaurant_id,
        postal_prefix: z.postal_prefix,
        delivery_fee: z.delivery_fee,
        min_order: z.min_order,
        active: z.active,
    }))
}
