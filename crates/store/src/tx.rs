//! The transaction seam the order workflow runs against.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use gasdepot_catalog::Product;
use gasdepot_core::{
    CustomerId, InventoryId, OrderId, OrderLineId, PriceEntryId, ProductId, StaffId, WarehouseId,
};
use gasdepot_inventory::{StockMovement, StockRecord};
use gasdepot_pricing::PricePoint;

use crate::error::StoreResult;

/// One in-flight order-placement transaction.
///
/// Every method runs inside the same atomic unit: the caller commits on
/// success and rolls the whole order back on any error. Implementations
/// must not commit anything themselves.
///
/// `apply_movement` in particular exists only for the sale path; manual
/// stock entry goes through [`crate::Store::upsert_stock`] instead.
#[async_trait]
pub trait OrderTx: Send {
    async fn customer_exists(&mut self, id: CustomerId) -> StoreResult<bool>;

    async fn staff_exists(&mut self, id: StaffId) -> StoreResult<bool>;

    async fn product(&mut self, id: ProductId) -> StoreResult<Option<Product>>;

    /// Resolve the stock record a line sells from.
    ///
    /// With a warehouse this is the unique (product, warehouse) record.
    /// Without one, the lowest-numbered record for the product: a
    /// deterministic stand-in for "the active warehouse".
    async fn resolve_stock(
        &mut self,
        product_id: ProductId,
        warehouse_id: Option<WarehouseId>,
    ) -> StoreResult<Option<StockRecord>>;

    /// Latest price-history entry for the product within the calendar
    /// year+month of `at`, if any.
    async fn latest_price_in_month(
        &mut self,
        product_id: ProductId,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<PricePoint>>;

    async fn append_price(
        &mut self,
        product_id: ProductId,
        price: i64,
        at: DateTime<Utc>,
    ) -> StoreResult<PriceEntryId>;

    /// Insert an order header with total 0; returns the assigned id.
    async fn insert_order(
        &mut self,
        customer_id: CustomerId,
        staff_id: StaffId,
        at: DateTime<Utc>,
    ) -> StoreResult<OrderId>;

    async fn insert_line(
        &mut self,
        order_id: OrderId,
        inventory_id: InventoryId,
        quantity: i64,
        price_entry_id: Option<PriceEntryId>,
        at: DateTime<Utc>,
    ) -> StoreResult<OrderLineId>;

    /// Apply a sale movement and return the updated record.
    async fn apply_movement(
        &mut self,
        inventory_id: InventoryId,
        movement: StockMovement,
        at: DateTime<Utc>,
    ) -> StoreResult<StockRecord>;

    async fn set_order_total(&mut self, order_id: OrderId, total: i64) -> StoreResult<()>;
}
