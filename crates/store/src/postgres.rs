//! PostgreSQL-backed store implementation.
//!
//! Catalog and party mutations are single statements against the pool.
//! Order placement runs the workflow inside one transaction: the
//! [`OrderTx`] seam is implemented directly on `sqlx::Transaction`, and
//! [`PgStore::place_order`] owns begin/commit/rollback.
//!
//! SQLx errors map to [`StoreError::Storage`], except foreign-key
//! violations (code `23503`), which surface as user-visible validation
//! rejections.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row, Transaction};
use tracing::instrument;

use gasdepot_catalog::{NewProduct, NewWarehouse, Product, ProductKind, Warehouse};
use gasdepot_core::{
    CustomerId, DomainError, InventoryId, OrderId, OrderLineId, PriceEntryId, ProductId, StaffId,
    WarehouseId,
};
use gasdepot_inventory::{StockMovement, StockRecord, StockUpsert};
use gasdepot_parties::{Customer, NewCustomer, NewStaff, Staff};
use gasdepot_pricing::PricePoint;
use gasdepot_sales::{OrderDetailLine, OrderDetails, OrderRequest, OrderSummary};

use crate::error::{StoreError, StoreResult};
use crate::read::{OrderOverview, StockOverview};
use crate::schema;
use crate::store::Store;
use crate::tx::OrderTx;
use crate::workflow;

/// Pooled PostgreSQL store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect, bootstrap the schema, and hand back a ready store.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::storage("connect", e.to_string()))?;
        schema::ensure_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool (schema assumed present).
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            // 23503: foreign-key violation. A user-visible rejection, not
            // an infrastructure fault.
            if db_err.code().as_deref() == Some("23503") {
                return DomainError::validation("operation violates a foreign-key reference")
                    .into();
            }
            StoreError::storage(operation, db_err.message().to_string())
        }
        sqlx::Error::PoolClosed => StoreError::storage(operation, "connection pool closed"),
        other => StoreError::storage(operation, other.to_string()),
    }
}

fn decode_err(entity: &str, err: sqlx::Error) -> StoreError {
    StoreError::storage(format!("decode_{entity}"), err.to_string())
}

fn decode_kind(raw: &str) -> StoreResult<ProductKind> {
    raw.parse::<ProductKind>().map_err(|_| {
        StoreError::storage("decode_product", format!("unknown product kind '{raw}' in row"))
    })
}

fn product_from_row(row: &PgRow) -> StoreResult<Product> {
    let kind: String = row.try_get("kind").map_err(|e| decode_err("product", e))?;
    Ok(Product {
        id: ProductId::new(row.try_get("product_id").map_err(|e| decode_err("product", e))?),
        name: row.try_get("name").map_err(|e| decode_err("product", e))?,
        kind: decode_kind(&kind)?,
    })
}

fn warehouse_from_row(row: &PgRow) -> StoreResult<Warehouse> {
    Ok(Warehouse {
        id: WarehouseId::new(
            row.try_get("warehouse_id")
                .map_err(|e| decode_err("warehouse", e))?,
        ),
        name: row.try_get("name").map_err(|e| decode_err("warehouse", e))?,
        address: row
            .try_get("address")
            .map_err(|e| decode_err("warehouse", e))?,
    })
}

fn customer_from_row(row: &PgRow) -> StoreResult<Customer> {
    Ok(Customer {
        id: CustomerId::new(
            row.try_get("customer_id")
                .map_err(|e| decode_err("customer", e))?,
        ),
        name: row.try_get("name").map_err(|e| decode_err("customer", e))?,
        phone: row.try_get("phone").map_err(|e| decode_err("customer", e))?,
        address: row
            .try_get("address")
            .map_err(|e| decode_err("customer", e))?,
    })
}

fn staff_from_row(row: &PgRow) -> StoreResult<Staff> {
    Ok(Staff {
        id: StaffId::new(row.try_get("staff_id").map_err(|e| decode_err("staff", e))?),
        name: row.try_get("name").map_err(|e| decode_err("staff", e))?,
        phone: row.try_get("phone").map_err(|e| decode_err("staff", e))?,
    })
}

fn stock_from_row(row: &PgRow) -> StoreResult<StockRecord> {
    Ok(StockRecord {
        id: InventoryId::new(
            row.try_get("inventory_id")
                .map_err(|e| decode_err("inventory", e))?,
        ),
        product_id: ProductId::new(
            row.try_get("product_id")
                .map_err(|e| decode_err("inventory", e))?,
        ),
        warehouse_id: WarehouseId::new(
            row.try_get("warehouse_id")
                .map_err(|e| decode_err("inventory", e))?,
        ),
        full_qty: row
            .try_get("full_qty")
            .map_err(|e| decode_err("inventory", e))?,
        empty_qty: row
            .try_get("empty_qty")
            .map_err(|e| decode_err("inventory", e))?,
        updated_at: row
            .try_get("updated_at")
            .map_err(|e| decode_err("inventory", e))?,
    })
}

fn price_from_row(row: &PgRow) -> StoreResult<PricePoint> {
    Ok(PricePoint {
        id: PriceEntryId::new(
            row.try_get("price_entry_id")
                .map_err(|e| decode_err("price", e))?,
        ),
        product_id: ProductId::new(
            row.try_get("product_id")
                .map_err(|e| decode_err("price", e))?,
        ),
        price: row.try_get("price").map_err(|e| decode_err("price", e))?,
        recorded_at: row
            .try_get("recorded_at")
            .map_err(|e| decode_err("price", e))?,
    })
}

const STOCK_COLUMNS: &str =
    "inventory_id, product_id, warehouse_id, full_qty, empty_qty, updated_at";

#[async_trait]
impl OrderTx for Transaction<'_, Postgres> {
    async fn customer_exists(&mut self, id: CustomerId) -> StoreResult<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM customers WHERE customer_id = $1)")
            .bind(id.as_i64())
            .fetch_one(&mut **self)
            .await
            .map_err(|e| map_sqlx_error("customer_exists", e))
    }

    async fn staff_exists(&mut self, id: StaffId) -> StoreResult<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM staff WHERE staff_id = $1)")
            .bind(id.as_i64())
            .fetch_one(&mut **self)
            .await
            .map_err(|e| map_sqlx_error("staff_exists", e))
    }

    async fn product(&mut self, id: ProductId) -> StoreResult<Option<Product>> {
        let row = sqlx::query("SELECT product_id, name, kind FROM products WHERE product_id = $1")
            .bind(id.as_i64())
            .fetch_optional(&mut **self)
            .await
            .map_err(|e| map_sqlx_error("load_product", e))?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn resolve_stock(
        &mut self,
        product_id: ProductId,
        warehouse_id: Option<WarehouseId>,
    ) -> StoreResult<Option<StockRecord>> {
        let row = match warehouse_id {
            Some(warehouse_id) => {
                sqlx::query(&format!(
                    "SELECT {STOCK_COLUMNS} FROM inventory \
                     WHERE product_id = $1 AND warehouse_id = $2"
                ))
                .bind(product_id.as_i64())
                .bind(warehouse_id.as_i64())
                .fetch_optional(&mut **self)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {STOCK_COLUMNS} FROM inventory \
                     WHERE product_id = $1 ORDER BY inventory_id ASC LIMIT 1"
                ))
                .bind(product_id.as_i64())
                .fetch_optional(&mut **self)
                .await
            }
        }
        .map_err(|e| map_sqlx_error("resolve_stock", e))?;
        row.as_ref().map(stock_from_row).transpose()
    }

    async fn latest_price_in_month(
        &mut self,
        product_id: ProductId,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<PricePoint>> {
        let row = sqlx::query(
            r#"
            SELECT price_entry_id, product_id, price, recorded_at
            FROM price_history
            WHERE product_id = $1
              AND date_trunc('month', recorded_at) = date_trunc('month', $2::timestamptz)
            ORDER BY recorded_at DESC, price_entry_id DESC
            LIMIT 1
            "#,
        )
        .bind(product_id.as_i64())
        .bind(at)
        .fetch_optional(&mut **self)
        .await
        .map_err(|e| map_sqlx_error("latest_price_in_month", e))?;
        row.as_ref().map(price_from_row).transpose()
    }

    async fn append_price(
        &mut self,
        product_id: ProductId,
        price: i64,
        at: DateTime<Utc>,
    ) -> StoreResult<PriceEntryId> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO price_history (product_id, price, recorded_at) \
             VALUES ($1, $2, $3) RETURNING price_entry_id",
        )
        .bind(product_id.as_i64())
        .bind(price)
        .bind(at)
        .fetch_one(&mut **self)
        .await
        .map_err(|e| map_sqlx_error("append_price", e))?;
        Ok(PriceEntryId::new(id))
    }

    async fn insert_order(
        &mut self,
        customer_id: CustomerId,
        staff_id: StaffId,
        at: DateTime<Utc>,
    ) -> StoreResult<OrderId> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (customer_id, staff_id, total_price, created_at) \
             VALUES ($1, $2, 0, $3) RETURNING order_id",
        )
        .bind(customer_id.as_i64())
        .bind(staff_id.as_i64())
        .bind(at)
        .fetch_one(&mut **self)
        .await
        .map_err(|e| map_sqlx_error("insert_order", e))?;
        Ok(OrderId::new(id))
    }

    async fn insert_line(
        &mut self,
        order_id: OrderId,
        inventory_id: InventoryId,
        quantity: i64,
        price_entry_id: Option<PriceEntryId>,
        at: DateTime<Utc>,
    ) -> StoreResult<OrderLineId> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO order_lines (order_id, inventory_id, quantity, price_entry_id, recorded_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING order_line_id",
        )
        .bind(order_id.as_i64())
        .bind(inventory_id.as_i64())
        .bind(quantity)
        .bind(price_entry_id.map(|p| p.as_i64()))
        .bind(at)
        .fetch_one(&mut **self)
        .await
        .map_err(|e| map_sqlx_error("insert_line", e))?;
        Ok(OrderLineId::new(id))
    }

    async fn apply_movement(
        &mut self,
        inventory_id: InventoryId,
        movement: StockMovement,
        at: DateTime<Utc>,
    ) -> StoreResult<StockRecord> {
        let row = sqlx::query(&format!(
            "UPDATE inventory \
             SET full_qty = full_qty + $2, empty_qty = empty_qty + $3, updated_at = $4 \
             WHERE inventory_id = $1 \
             RETURNING {STOCK_COLUMNS}"
        ))
        .bind(inventory_id.as_i64())
        .bind(movement.full_delta)
        .bind(movement.empty_delta)
        .bind(at)
        .fetch_optional(&mut **self)
        .await
        .map_err(|e| map_sqlx_error("apply_movement", e))?;
        match row {
            Some(row) => stock_from_row(&row),
            None => Err(DomainError::not_found("inventory record").into()),
        }
    }

    async fn set_order_total(&mut self, order_id: OrderId, total: i64) -> StoreResult<()> {
        let result = sqlx::query("UPDATE orders SET total_price = $2 WHERE order_id = $1")
            .bind(order_id.as_i64())
            .bind(total)
            .execute(&mut **self)
            .await
            .map_err(|e| map_sqlx_error("set_order_total", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("order").into());
        }
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_product(&self, new: NewProduct) -> StoreResult<Product> {
        new.validate()?;
        let id: i64 =
            sqlx::query_scalar("INSERT INTO products (name, kind) VALUES ($1, $2) RETURNING product_id")
                .bind(&new.name)
                .bind(new.kind.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("create_product", e))?;
        Ok(Product {
            id: ProductId::new(id),
            name: new.name,
            kind: new.kind,
        })
    }

    async fn update_product(&self, id: ProductId, new: NewProduct) -> StoreResult<Product> {
        new.validate()?;
        let result = sqlx::query("UPDATE products SET name = $2, kind = $3 WHERE product_id = $1")
            .bind(id.as_i64())
            .bind(&new.name)
            .bind(new.kind.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_product", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("product").into());
        }
        Ok(Product {
            id,
            name: new.name,
            kind: new.kind,
        })
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("product").into());
        }
        Ok(())
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query("SELECT product_id, name, kind FROM products ORDER BY product_id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;
        rows.iter().map(product_from_row).collect()
    }

    async fn create_warehouse(&self, new: NewWarehouse) -> StoreResult<Warehouse> {
        new.validate()?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO warehouses (name, address) VALUES ($1, $2) RETURNING warehouse_id",
        )
        .bind(&new.name)
        .bind(&new.address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_warehouse", e))?;
        Ok(Warehouse {
            id: WarehouseId::new(id),
            name: new.name,
            address: new.address,
        })
    }

    async fn update_warehouse(&self, id: WarehouseId, new: NewWarehouse) -> StoreResult<Warehouse> {
        new.validate()?;
        let result =
            sqlx::query("UPDATE warehouses SET name = $2, address = $3 WHERE warehouse_id = $1")
                .bind(id.as_i64())
                .bind(&new.name)
                .bind(&new.address)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("update_warehouse", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("warehouse").into());
        }
        Ok(Warehouse {
            id,
            name: new.name,
            address: new.address,
        })
    }

    async fn delete_warehouse(&self, id: WarehouseId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM warehouses WHERE warehouse_id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_warehouse", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("warehouse").into());
        }
        Ok(())
    }

    async fn list_warehouses(&self) -> StoreResult<Vec<Warehouse>> {
        let rows =
            sqlx::query("SELECT warehouse_id, name, address FROM warehouses ORDER BY warehouse_id")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("list_warehouses", e))?;
        rows.iter().map(warehouse_from_row).collect()
    }

    async fn create_customer(&self, new: NewCustomer) -> StoreResult<Customer> {
        new.validate()?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO customers (name, phone, address) VALUES ($1, $2, $3) RETURNING customer_id",
        )
        .bind(&new.name)
        .bind(&new.phone)
        .bind(&new.address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_customer", e))?;
        Ok(Customer {
            id: CustomerId::new(id),
            name: new.name,
            phone: new.phone,
            address: new.address,
        })
    }

    async fn delete_customer(&self, id: CustomerId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE customer_id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_customer", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("customer").into());
        }
        Ok(())
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        let rows = sqlx::query(
            "SELECT customer_id, name, phone, address FROM customers ORDER BY customer_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_customers", e))?;
        rows.iter().map(customer_from_row).collect()
    }

    async fn create_staff(&self, new: NewStaff) -> StoreResult<Staff> {
        new.validate()?;
        let id: i64 =
            sqlx::query_scalar("INSERT INTO staff (name, phone) VALUES ($1, $2) RETURNING staff_id")
                .bind(&new.name)
                .bind(&new.phone)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("create_staff", e))?;
        Ok(Staff {
            id: StaffId::new(id),
            name: new.name,
            phone: new.phone,
        })
    }

    async fn delete_staff(&self, id: StaffId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM staff WHERE staff_id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_staff", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("staff member").into());
        }
        Ok(())
    }

    async fn list_staff(&self) -> StoreResult<Vec<Staff>> {
        let rows = sqlx::query("SELECT staff_id, name, phone FROM staff ORDER BY staff_id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_staff", e))?;
        rows.iter().map(staff_from_row).collect()
    }

    #[instrument(skip(self, upsert), fields(product_id = %upsert.product_id, warehouse_id = %upsert.warehouse_id))]
    async fn upsert_stock(&self, upsert: StockUpsert) -> StoreResult<StockRecord> {
        upsert.validate()?;

        // Existence checks give a proper NotFound instead of a bare
        // foreign-key error.
        let product_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE product_id = $1)")
                .bind(upsert.product_id.as_i64())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("upsert_stock", e))?;
        if !product_exists {
            return Err(DomainError::not_found("product").into());
        }
        let warehouse_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM warehouses WHERE warehouse_id = $1)")
                .bind(upsert.warehouse_id.as_i64())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("upsert_stock", e))?;
        if !warehouse_exists {
            return Err(DomainError::not_found("warehouse").into());
        }

        let row = sqlx::query(&format!(
            "INSERT INTO inventory (product_id, warehouse_id, full_qty, empty_qty, updated_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (product_id, warehouse_id) \
             DO UPDATE SET full_qty = EXCLUDED.full_qty, \
                           empty_qty = EXCLUDED.empty_qty, \
                           updated_at = EXCLUDED.updated_at \
             RETURNING {STOCK_COLUMNS}"
        ))
        .bind(upsert.product_id.as_i64())
        .bind(upsert.warehouse_id.as_i64())
        .bind(upsert.full_qty)
        .bind(upsert.empty_qty)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_stock", e))?;
        stock_from_row(&row)
    }

    async fn delete_stock(&self, id: InventoryId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM inventory WHERE inventory_id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_stock", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("inventory record").into());
        }
        Ok(())
    }

    async fn list_stock(&self) -> StoreResult<Vec<StockOverview>> {
        let rows = sqlx::query(
            r#"
            SELECT
                i.inventory_id,
                p.name AS product_name,
                w.name AS warehouse_name,
                i.full_qty,
                i.empty_qty,
                i.updated_at
            FROM inventory i
            JOIN products p ON p.product_id = i.product_id
            JOIN warehouses w ON w.warehouse_id = i.warehouse_id
            ORDER BY i.inventory_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_stock", e))?;

        rows.iter()
            .map(|row| {
                Ok(StockOverview {
                    inventory_id: InventoryId::new(
                        row.try_get("inventory_id")
                            .map_err(|e| decode_err("stock_overview", e))?,
                    ),
                    product_name: row
                        .try_get("product_name")
                        .map_err(|e| decode_err("stock_overview", e))?,
                    warehouse_name: row
                        .try_get("warehouse_name")
                        .map_err(|e| decode_err("stock_overview", e))?,
                    full_qty: row
                        .try_get("full_qty")
                        .map_err(|e| decode_err("stock_overview", e))?,
                    empty_qty: row
                        .try_get("empty_qty")
                        .map_err(|e| decode_err("stock_overview", e))?,
                    updated_at: row
                        .try_get("updated_at")
                        .map_err(|e| decode_err("stock_overview", e))?,
                })
            })
            .collect()
    }

    #[instrument(skip(self, req), fields(customer_id = %req.customer_id, staff_id = %req.staff_id, line_items = req.lines.len()))]
    async fn place_order(&self, req: OrderRequest) -> StoreResult<OrderSummary> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_order", e))?;

        match workflow::place_order(&mut tx, &req, Utc::now()).await {
            Ok(summary) => {
                tx.commit()
                    .await
                    .map_err(|e| map_sqlx_error("commit_order", e))?;
                tracing::info!(
                    order_id = %summary.order_id,
                    total_price = summary.total_price,
                    line_count = summary.line_count,
                    lines_skipped = summary.lines_skipped,
                    "order placed"
                );
                Ok(summary)
            }
            Err(err) => {
                // Dropping the transaction would roll back too; doing it
                // explicitly lets a rollback failure reach the logs.
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "order rollback failed");
                }
                Err(err)
            }
        }
    }

    async fn order_details(&self, id: OrderId) -> StoreResult<OrderDetails> {
        let header = sqlx::query(
            r#"
            SELECT
                o.order_id,
                c.name AS customer_name,
                s.name AS staff_name,
                o.total_price,
                o.created_at
            FROM orders o
            JOIN customers c ON c.customer_id = o.customer_id
            JOIN staff s ON s.staff_id = o.staff_id
            WHERE o.order_id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("order_details", e))?
        .ok_or_else(|| DomainError::not_found("order"))?;

        let line_rows = sqlx::query(
            r#"
            SELECT
                l.order_line_id,
                p.name AS product_name,
                l.quantity,
                ph.price AS unit_price,
                l.recorded_at
            FROM order_lines l
            JOIN inventory i ON i.inventory_id = l.inventory_id
            JOIN products p ON p.product_id = i.product_id
            LEFT JOIN price_history ph ON ph.price_entry_id = l.price_entry_id
            WHERE l.order_id = $1
            ORDER BY l.order_line_id
            "#,
        )
        .bind(id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("order_details", e))?;

        let lines = line_rows
            .iter()
            .map(|row| {
                Ok(OrderDetailLine {
                    line_id: OrderLineId::new(
                        row.try_get("order_line_id")
                            .map_err(|e| decode_err("order_line", e))?,
                    ),
                    product_name: row
                        .try_get("product_name")
                        .map_err(|e| decode_err("order_line", e))?,
                    quantity: row
                        .try_get("quantity")
                        .map_err(|e| decode_err("order_line", e))?,
                    unit_price: row
                        .try_get("unit_price")
                        .map_err(|e| decode_err("order_line", e))?,
                    recorded_at: row
                        .try_get("recorded_at")
                        .map_err(|e| decode_err("order_line", e))?,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(OrderDetails {
            order_id: OrderId::new(
                header
                    .try_get("order_id")
                    .map_err(|e| decode_err("order", e))?,
            ),
            customer_name: header
                .try_get("customer_name")
                .map_err(|e| decode_err("order", e))?,
            staff_name: header
                .try_get("staff_name")
                .map_err(|e| decode_err("order", e))?,
            total_price: header
                .try_get("total_price")
                .map_err(|e| decode_err("order", e))?,
            created_at: header
                .try_get("created_at")
                .map_err(|e| decode_err("order", e))?,
            lines,
        })
    }

    async fn list_orders(&self) -> StoreResult<Vec<OrderOverview>> {
        let rows = sqlx::query(
            r#"
            SELECT
                o.order_id,
                c.name AS customer_name,
                s.name AS staff_name,
                o.total_price,
                COUNT(l.order_line_id) AS line_count,
                o.created_at
            FROM orders o
            JOIN customers c ON c.customer_id = o.customer_id
            JOIN staff s ON s.staff_id = o.staff_id
            LEFT JOIN order_lines l ON l.order_id = o.order_id
            GROUP BY o.order_id, c.name, s.name, o.total_price, o.created_at
            ORDER BY o.order_id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_orders", e))?;

        rows.iter()
            .map(|row| {
                Ok(OrderOverview {
                    order_id: OrderId::new(
                        row.try_get("order_id")
                            .map_err(|e| decode_err("order_overview", e))?,
                    ),
                    customer_name: row
                        .try_get("customer_name")
                        .map_err(|e| decode_err("order_overview", e))?,
                    staff_name: row
                        .try_get("staff_name")
                        .map_err(|e| decode_err("order_overview", e))?,
                    total_price: row
                        .try_get("total_price")
                        .map_err(|e| decode_err("order_overview", e))?,
                    line_count: row
                        .try_get("line_count")
                        .map_err(|e| decode_err("order_overview", e))?,
                    created_at: row
                        .try_get("created_at")
                        .map_err(|e| decode_err("order_overview", e))?,
                })
            })
            .collect()
    }

    async fn delete_order(&self, id: OrderId) -> StoreResult<()> {
        // Lines go with the order (ON DELETE CASCADE); inventory and price
        // history are untouched.
        let result = sqlx::query("DELETE FROM orders WHERE order_id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_order", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("order").into());
        }
        Ok(())
    }
}
