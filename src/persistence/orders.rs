//! Order persistence: guarded insert, idempotency lookup, and the joined
//! read-back for the confirmation page.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::types::cart::{Address, OrderType, SelectedModifier};
use crate::types::order::{Order, OrderItem, OrderStatus, OrderStatusEvent, PaymentKind};

fn order_type_to_str(t: OrderType) -> &'static str {
    match t {
        OrderType::Delivery => "delivery",
        OrderType::Pickup => "pickup",
    }
}

fn str_to_order_type(s: &str) -> Option<OrderType> {
    match s {
        "delivery" => Some(OrderType::Delivery),
        "pickup" => Some(OrderType::Pickup),
        _ => None,
    }
}

fn payment_kind_to_str(k: PaymentKind) -> &'static str {
    match k {
        PaymentKind::Card => "card",
        PaymentKind::Cash => "cash",
    }
}

fn str_to_payment_kind(s: &str) -> Option<PaymentKind> {
    match s {
        "card" => Some(PaymentKind::Card),
        "cash" => Some(PaymentKind::Cash),
        _ => None,
    }
}

fn status_to_str(s: OrderStatus) -> &'static str {
    match s {
        OrderStatus::Received => "received",
        OrderStatus::Confirmed => "confirmed",
        OrderStatus::Preparing => "preparing",
        OrderStatus::Ready => "ready",
        OrderStatus::OutForDelivery => "out_for_delivery",
        OrderStatus::Completed => "completed",
        OrderStatus::Cancelled => "cancelled",
    }
}

fn str_to_status(s: &str) -> Option<OrderStatus> {
    match s {
        "received" => Some(OrderStatus::Received),
        "confirmed" => Some(OrderStatus::Confirmed),
        "preparing" => Some(OrderStatus::Preparing),
        "ready" => Some(OrderStatus::Ready),
        "out_for_delivery" => Some(OrderStatus::OutForDelivery),
        "completed" => Some(OrderStatus::Completed),
        "cancelled" => Some(OrderStatus::Cancelled),
        _ => None,
    }
}

/// Outcome of an order insert. `Duplicate` carries the id of the order
/// already bound to the payment reference, whether found by the pre-check
/// or by losing the unique-constraint race.
#[derive(Debug, PartialEq, Eq)]
pub enum OrderInsert {
    Created,
    Duplicate(Uuid),
}

/// Idempotency pre-check: any order already bound to this reference?
pub async fn find_order_id_by_payment_ref(
    pool: &PgPool,
    payment_ref: &str,
) -> Result<Option<Uuid>, sqlx::Error> {
    let row: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM orders WHERE payment_ref = $1")
            .bind(payment_ref)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(id,)| id))
}

/// Insert the order, its item snapshot, and the initial status event in one
/// transaction. The UNIQUE constraint on `payment_ref` is the arbiter under
/// concurrent duplicate submissions; losing that race reports `Duplicate`
/// with the winner's id.
pub async fn insert_order(pool: &PgPool, order: &Order) -> Result<OrderInsert, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        "INSERT INTO orders (id, restaurant_id, user_id, guest_email, order_type, \
         address_line1, address_line2, city, postal_code, scheduled_at, \
         subtotal, delivery_fee, tax, total, payment_kind, payment_ref, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
    )
    .bind(order.id)
    .bind(order.restaurant_id)
    .bind(order.user_id)
    .bind(order.guest_email.as_deref())
    .bind(order_type_to_str(order.order_type))
    .bind(order.address.as_ref().map(|a| a.line1.as_str()))
    .bind(order.address.as_ref().and_then(|a| a.line2.as_deref()))
    .bind(order.address.as_ref().map(|a| a.city.as_str()))
    .bind(order.address.as_ref().map(|a| a.postal_code.as_str()))
    .bind(order.scheduled_at)
    .bind(order.subtotal)
    .bind(order.delivery_fee)
    .bind(order.tax)
    .bind(order.total)
    .bind(payment_kind_to_str(order.payment_kind))
    .bind(&order.payment_ref)
    .bind(order.created_at)
    .execute(&mut *tx)
    .await;

    if let Err(e) = inserted {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                drop(tx);
                let existing = find_order_id_by_payment_ref(pool, &order.payment_ref)
                    .await?
                    .ok_or(e)?;
                return Ok(OrderInsert::Duplicate(existing));
            }
        }
        return Err(e);
    }

    for item in &order.items {
        sqlx::query(
            "INSERT INTO order_items (id, order_id, dish_id, dish_name, size_label, \
             unit_price, quantity, modifiers, instructions, line_subtotal) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(Uuid::new_v4())
        .bind(order.id)
        .bind(item.dish_id)
        .bind(&item.dish_name)
        .bind(&item.size_label)
        .bind(item.unit_price)
        .bind(item.quantity)
        .bind(serde_json::to_value(&item.modifiers).unwrap_or_default())
        .bind(item.instructions.as_deref())
        .bind(item.line_subtotal)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        "INSERT INTO order_status_history (id, order_id, status, note, created_at) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(Uuid::new_v4())
    .bind(order.id)
    .bind(status_to_str(OrderStatus::Received))
    .bind(Option::<&str>::None)
    .bind(order.created_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(OrderInsert::Created)
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    restaurant_id: Uuid,
    user_id: Option<Uuid>,
    guest_email: Option<String>,
    order_type: String,
    address_line1: Option<String>,
    address_line2: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    scheduled_at: Option<DateTime<Utc>>,
    subtotal: i64,
    delivery_fee: i64,
    tax: i64,
    total: i64,
    payment_kind: String,
    payment_ref: String,
    created_at: DateTime<Utc>,
    restaurant_name: String,
}

#[derive(Debug, FromRow)]
struct OrderItemRow {
    dish_id: Uuid,
    dish_name: String,
    size_label: String,
    unit_price: i64,
    quantity: i64,
    modifiers: serde_json::Value,
    instructions: Option<String>,
    line_subtotal: i64,
}

#[derive(Debug, FromRow)]
struct StatusRow {
    status: String,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

/// Order plus the joined context the confirmation page renders.
#[derive(Debug)]
pub struct OrderDetail {
    pub order: Order,
    pub restaurant_name: String,
    pub history: Vec<OrderStatusEvent>,
}

fn row_to_order(row: OrderRow, items: Vec<OrderItem>) -> Option<(Order, String)> {
    let order_type = str_to_order_type(&row.order_type)?;
    let payment_kind = str_to_payment_kind(&row.payment_kind)?;
    let address = match (row.address_line1, row.city, row.postal_code) {
        (Some(line1), Some(city), Some(postal_code)) => Some(Address {
            line1,
            line2: row.address_line2,
            city,
            postal_code,
        }),
        _ => None,
    };
    Some((
        Order {
            id: row.id,
            restaurant_id: row.restaurant_id,
            user_id: row.user_id,
            guest_email: row.guest_email,
            order_type,
            address,
            scheduled_at: row.scheduled_at,
            items,
            subtotal: row.subtotal,
            delivery_fee: row.delivery_fee,
            tax: row.tax,
            total: row.total,
            payment_kind,
            payment_ref: row.payment_ref,
            created_at: row.created_at,
        },
        row.restaurant_name,
    ))
}

/// Fetch an order with restaurant name and full status history. Returns
/// `None` for unknown ids and for rows that no longer map to the domain.
pub async fn get_order_detail(
    pool: &PgPool,
    order_id: Uuid,
) -> Result<Option<OrderDetail>, sqlx::Error> {
    let row = sqlx::query_as::<_, OrderRow>(
        "SELECT o.id, o.restaurant_id, o.user_id, o.guest_email, o.order_type, \
         o.address_line1, o.address_line2, o.city, o.postal_code, o.scheduled_at, \
         o.subtotal, o.delivery_fee, o.tax, o.total, o.payment_kind, o.payment_ref, \
         o.created_at, r.name AS restaurant_name \
         FROM orders o JOIN restaurants r ON r.id = o.restaurant_id \
         WHERE o.id = $1",
    )
    .bind(order_id)
    .fetch_optional(pool)
    .await?;
    let Some(row) = row else {
        return Ok(None);
    };

    let item_rows = sqlx::query_as::<_, OrderItemRow>(
        "SELECT dish_id, dish_name, size_label, unit_price, quantity, modifiers, \
         instructions, line_subtotal \
         FROM order_items WHERE order_id = $1",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    let items = item_rows
        .into_iter()
        .map(|r| OrderItem {
            dish_id: r.dish_id,
            dish_name: r.dish_name,
            size_label: r.size_label,
            unit_price: r.unit_price,
            quantity: r.quantity,
            modifiers: serde_json::from_value::<Vec<SelectedModifier>>(r.modifiers)
                .unwrap_or_default(),
            instructions: r.instructions,
            line_subtotal: r.line_subtotal,
        })
        .collect();

    let status_rows = sqlx::query_as::<_, StatusRow>(
        "SELECT status, note, created_at FROM order_status_history \
         WHERE order_id = $1 ORDER BY created_at",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    let history = status_rows
        .into_iter()
        .filter_map(|r| {
            Some(OrderStatusEvent {
                status: str_to_status(&r.status)?,
                note: r.note,
                created_at: r.created_at,
            })
        })
        .collect();

    Ok(row_to_order(row, items).map(|(order, restaurant_name)| OrderDetail {
        order,
        restaurant_name,
        history,
    }))
}
