//! The injected persistence facade.

use async_trait::async_trait;

use gasdepot_catalog::{NewProduct, NewWarehouse, Product, Warehouse};
use gasdepot_core::{CustomerId, InventoryId, OrderId, ProductId, StaffId, WarehouseId};
use gasdepot_inventory::{StockRecord, StockUpsert};
use gasdepot_parties::{Customer, NewCustomer, NewStaff, Staff};
use gasdepot_sales::{OrderDetails, OrderRequest, OrderSummary};

use crate::error::StoreResult;
use crate::read::{OrderOverview, StockOverview};

/// Everything the HTTP layer needs from persistence.
///
/// Handlers hold an `Arc<dyn Store>`; production wires [`crate::PgStore`],
/// tests substitute [`crate::MemStore`]. Catalog/party mutations are single
/// short-lived statements; `place_order` is the one multi-step transaction.
#[async_trait]
pub trait Store: Send + Sync {
    // Products
    async fn create_product(&self, new: NewProduct) -> StoreResult<Product>;
    async fn update_product(&self, id: ProductId, new: NewProduct) -> StoreResult<Product>;
    async fn delete_product(&self, id: ProductId) -> StoreResult<()>;
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    // Warehouses
    async fn create_warehouse(&self, new: NewWarehouse) -> StoreResult<Warehouse>;
    async fn update_warehouse(&self, id: WarehouseId, new: NewWarehouse) -> StoreResult<Warehouse>;
    async fn delete_warehouse(&self, id: WarehouseId) -> StoreResult<()>;
    async fn list_warehouses(&self) -> StoreResult<Vec<Warehouse>>;

    // Customers
    async fn create_customer(&self, new: NewCustomer) -> StoreResult<Customer>;
    async fn delete_customer(&self, id: CustomerId) -> StoreResult<()>;
    async fn list_customers(&self) -> StoreResult<Vec<Customer>>;

    // Staff
    async fn create_staff(&self, new: NewStaff) -> StoreResult<Staff>;
    async fn delete_staff(&self, id: StaffId) -> StoreResult<()>;
    async fn list_staff(&self) -> StoreResult<Vec<Staff>>;

    // Inventory ledger (manual entry)
    async fn upsert_stock(&self, upsert: StockUpsert) -> StoreResult<StockRecord>;
    async fn delete_stock(&self, id: InventoryId) -> StoreResult<()>;
    async fn list_stock(&self) -> StoreResult<Vec<StockOverview>>;

    // Orders
    async fn place_order(&self, req: OrderRequest) -> StoreResult<OrderSummary>;
    async fn order_details(&self, id: OrderId) -> StoreResult<OrderDetails>;
    async fn list_orders(&self) -> StoreResult<Vec<OrderOverview>>;
    async fn delete_order(&self, id: OrderId) -> StoreResult<()>;
}
