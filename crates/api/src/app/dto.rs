//! Request DTOs and their mapping into domain inputs.

use serde::Deserialize;

use gasdepot_core::{CustomerId, ProductId, StaffId, WarehouseId};
use gasdepot_inventory::StockUpsert;
use gasdepot_sales::{LineItem, OrderRequest};

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    /// One of: cylinder, accessory, stove.
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateWarehouseRequest {
    pub name: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateStaffRequest {
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct UpsertStockRequest {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub full_qty: i64,
    pub empty_qty: i64,
}

impl From<UpsertStockRequest> for StockUpsert {
    fn from(body: UpsertStockRequest) -> Self {
        StockUpsert {
            product_id: body.product_id,
            warehouse_id: body.warehouse_id,
            full_qty: body.full_qty,
            empty_qty: body.empty_qty,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    #[serde(default)]
    pub warehouse_id: Option<WarehouseId>,
    pub quantity: i64,
    pub unit_price: i64,
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub customer_id: CustomerId,
    pub staff_id: StaffId,
    pub lines: Vec<OrderLineRequest>,
}

impl From<PlaceOrderRequest> for OrderRequest {
    fn from(body: PlaceOrderRequest) -> Self {
        OrderRequest {
            customer_id: body.customer_id,
            staff_id: body.staff_id,
            lines: body
                .lines
                .into_iter()
                .map(|line| LineItem {
                    product_id: line.product_id,
                    warehouse_id: line.warehouse_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                })
                .collect(),
        }
    }
}
