//! Database layer: pool, migrations, and access for the catalog and orders.

mod catalog;
mod orders;
mod pool;

pub use catalog::{
    find_delivery_zone, get_restaurant, list_dishes, list_modifier_groups, list_size_prices,
};
pub use orders::{
    find_order_id_by_payment_ref, get_order_detail, insert_order, OrderDetail, OrderInsert,
};
pub use pool::{create_pool_and_migrate, run_migrations};
pub use sqlx::PgPool;
