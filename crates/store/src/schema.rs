//! Idempotent schema bootstrap for the PostgreSQL store.

use sqlx::PgPool;

use crate::error::{StoreError, StoreResult};

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS products (
        product_id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        kind TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS warehouses (
        warehouse_id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        address TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS customers (
        customer_id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        phone TEXT NOT NULL DEFAULT '',
        address TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS staff (
        staff_id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        phone TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory (
        inventory_id BIGSERIAL PRIMARY KEY,
        product_id BIGINT NOT NULL REFERENCES products (product_id),
        warehouse_id BIGINT NOT NULL REFERENCES warehouses (warehouse_id),
        full_qty BIGINT NOT NULL DEFAULT 0,
        empty_qty BIGINT NOT NULL DEFAULT 0,
        updated_at TIMESTAMPTZ NOT NULL,
        UNIQUE (product_id, warehouse_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS price_history (
        price_entry_id BIGSERIAL PRIMARY KEY,
        product_id BIGINT NOT NULL REFERENCES products (product_id),
        price BIGINT NOT NULL,
        recorded_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS price_history_product_recorded
        ON price_history (product_id, recorded_at DESC)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        order_id BIGSERIAL PRIMARY KEY,
        customer_id BIGINT NOT NULL REFERENCES customers (customer_id),
        staff_id BIGINT NOT NULL REFERENCES staff (staff_id),
        total_price BIGINT NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS order_lines (
        order_line_id BIGSERIAL PRIMARY KEY,
        order_id BIGINT NOT NULL REFERENCES orders (order_id) ON DELETE CASCADE,
        inventory_id BIGINT NOT NULL REFERENCES inventory (inventory_id),
        quantity BIGINT NOT NULL,
        price_entry_id BIGINT REFERENCES price_history (price_entry_id),
        recorded_at TIMESTAMPTZ NOT NULL
    )
    "#,
];

/// Create all tables and indexes if they do not exist yet.
///
/// Orders own their lines (cascade); inventory and price history are
/// independent reference data order lines merely point to.
pub async fn ensure_schema(pool: &PgPool) -> StoreResult<()> {
    for statement in STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| StoreError::storage("ensure_schema", e.to_string()))?;
    }
    Ok(())
}
