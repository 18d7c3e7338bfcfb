//! Joined read-model rows for the dashboard-style list queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gasdepot_core::{InventoryId, OrderId};

/// Inventory joined with product and warehouse names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockOverview {
    pub inventory_id: InventoryId,
    pub product_name: String,
    pub warehouse_name: String,
    pub full_qty: i64,
    pub empty_qty: i64,
    pub updated_at: DateTime<Utc>,
}

/// Order header joined with party names plus its line count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOverview {
    pub order_id: OrderId,
    pub customer_name: String,
    pub staff_name: String,
    pub total_price: i64,
    pub line_count: i64,
    pub created_at: DateTime<Utc>,
}
