//! HTTP surface: checkout submission and order read-back.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::auth;
use crate::checkout::{
    amounts_reconcile, price_order, verify_transaction, CatalogSnapshot, Identity,
};
use crate::email::Mailer;
use crate::error::ApiError;
use crate::payments::{cash_reference, PaymentGateway};
use crate::persistence;
use crate::persistence::OrderInsert;
use crate::types::cart::{Address, CheckoutItem, OrderType};
use crate::types::menu::flatten_group;
use crate::types::money::format_cents;
use crate::types::order::{Order, OrderStatusEvent, PaymentKind};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub payments: PaymentGateway,
    pub mailer: Mailer,
    pub jwt_secret: Vec<u8>,
}

async fn health() -> &'static str {
    "healthy"
}

/// How the order was paid. `Intent` references a completed provider
/// transaction; `Cash` is pay-at-door.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentSelection {
    Intent { id: String },
    Cash,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub payment: PaymentSelection,
    pub restaurant_id: Uuid,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub delivery_address: Option<Address>,
    #[serde(default)]
    pub scheduled_time: Option<DateTime<Utc>>,
    pub cart_items: Vec<CheckoutItem>,
    #[serde(default)]
    pub guest_email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order: Order,
}

#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
    pub order: Order,
    pub restaurant_name: String,
    pub history: Vec<OrderStatusEvent>,
}

/// Resolve the caller: a bearer token names a user, otherwise the payload
/// must carry a plausible guest email.
fn caller_identity(
    jwt_secret: &[u8],
    headers: &HeaderMap,
    guest_email: Option<String>,
) -> Result<Identity, ApiError> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let raw = value
            .to_str()
            .map_err(|_| ApiError::Unauthorized("malformed authorization header".to_string()))?;
        let token = raw
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("malformed authorization header".to_string()))?;
        let claims = auth::decode_token(jwt_secret, token)
            .map_err(|_| ApiError::Unauthorized("invalid bearer token".to_string()))?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("invalid token subject".to_string()))?;
        return Ok(Identity::User(user_id));
    }
    match guest_email {
        Some(email) if email.contains('@') => Ok(Identity::Guest(email)),
        Some(_) => Err(ApiError::BadRequest("invalid guest email".to_string())),
        None => Err(ApiError::BadRequest(
            "a bearer token or guest_email is required".to_string(),
        )),
    }
}

/// Checkout submission. Re-derives the authoritative total from the
/// catalog, verifies payment provenance and amount, then persists exactly
/// one order per payment reference.
async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    if req.cart_items.is_empty() {
        return Err(ApiError::BadRequest("cart is empty".to_string()));
    }
    if req.order_type == OrderType::Delivery && req.delivery_address.is_none() {
        return Err(ApiError::BadRequest(
            "delivery orders require a delivery_address".to_string(),
        ));
    }
    let identity = caller_identity(&state.jwt_secret, &headers, req.guest_email.clone())?;

    // Steps 1 and 2: idempotency pre-check, then provenance against the
    // provider transaction. Cash orders have neither; they get a fresh
    // internal reference instead.
    let (payment_ref, payment_kind, transaction) = match &req.payment {
        PaymentSelection::Intent { id } => {
            if let Some(existing) = persistence::find_order_id_by_payment_ref(&state.db, id).await?
            {
                return Err(ApiError::Duplicate { order_id: existing });
            }
            let tx = state.payments.fetch_transaction(id).await?;
            verify_transaction(&tx, &identity)?;
            (id.clone(), PaymentKind::Card, Some(tx))
        }
        PaymentSelection::Cash => (cash_reference(), PaymentKind::Cash, None),
    };

    // Step 3 and 4: re-price every line from catalog rows.
    let restaurant = persistence::get_restaurant(&state.db, req.restaurant_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("restaurant not found".to_string()))?;
    let mut dish_ids: Vec<Uuid> = req.cart_items.iter().map(|i| i.dish_id).collect();
    dish_ids.sort_unstable();
    dish_ids.dedup();
    let dishes = persistence::list_dishes(&state.db, &dish_ids).await?;
    let prices = persistence::list_size_prices(&state.db, &dish_ids).await?;
    let groups = persistence::list_modifier_groups(&state.db, &dish_ids).await?;
    let modifiers = groups.iter().flat_map(flatten_group).collect();
    let delivery_zone = match (&req.order_type, &req.delivery_address) {
        (OrderType::Delivery, Some(addr)) => {
            persistence::find_delivery_zone(&state.db, restaurant.id, &addr.postal_code).await?
        }
        _ => None,
    };
    let catalog = CatalogSnapshot {
        restaurant,
        dishes,
        prices,
        modifiers,
        delivery_zone,
    };
    let priced = price_order(&catalog, req.order_type, &req.cart_items)?;

    // Step 5: the captured amount must match what we just computed.
    if let Some(tx) = &transaction {
        if !amounts_reconcile(priced.total, tx.amount) {
            warn!(
                payment_ref = %payment_ref,
                captured = tx.amount,
                computed = priced.total,
                "payment amount does not match recomputed total"
            );
            return Err(ApiError::BadRequest(format!(
                "captured amount {} does not match order total {}",
                format_cents(tx.amount),
                format_cents(priced.total)
            )));
        }
    }

    let order = Order {
        id: Uuid::new_v4(),
        restaurant_id: catalog.restaurant.id,
        user_id: match &identity {
            Identity::User(id) => Some(*id),
            Identity::Guest(_) => None,
        },
        guest_email: match &identity {
            Identity::User(_) => None,
            Identity::Guest(email) => Some(email.clone()),
        },
        order_type: req.order_type,
        address: req.delivery_address,
        scheduled_at: req.scheduled_time,
        items: priced.items,
        subtotal: priced.subtotal,
        delivery_fee: priced.delivery_fee,
        tax: priced.tax,
        total: priced.total,
        payment_kind,
        payment_ref,
        created_at: Utc::now(),
    };

    // Step 6: persist; the unique constraint settles concurrent duplicates.
    match persistence::insert_order(&state.db, &order).await? {
        OrderInsert::Created => {}
        OrderInsert::Duplicate(existing) => {
            return Err(ApiError::Duplicate { order_id: existing });
        }
    }
    info!(order_id = %order.id, total = order.total, "order created");

    // Confirmation email is best-effort; a send failure never fails the order.
    if let Identity::Guest(email) = &identity {
        if let Err(e) = state.mailer.send_order_confirmation(email, &order).await {
            warn!(error = %e, order_id = %order.id, "failed to send confirmation email");
        }
    }

    Ok(Json(OrderResponse { order }))
}

/// Order read-back for the confirmation page.
async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderDetailResponse>, ApiError> {
    let detail = persistence::get_order_detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("order not found".to_string()))?;
    Ok(Json(OrderDetailResponse {
        order: detail.order,
        restaurant_name: detail.restaurant_name,
        history: detail.history,
    }))
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/orders", post(create_order))
        .route("/orders/{id}", get(get_order))
        .with_state(state)
}
