use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gasdepot_core::{
    CustomerId, DomainError, DomainResult, InventoryId, OrderId, OrderLineId, PriceEntryId,
    ProductId, StaffId, WarehouseId,
};

/// One requested line: product, quantity, unit price.
///
/// `warehouse_id` pins the stock row to sell from. When absent, the store
/// resolves the product's lowest-numbered inventory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<WarehouseId>,
    pub quantity: i64,
    /// Price in smallest currency unit.
    pub unit_price: i64,
}

/// A request to place an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub customer_id: CustomerId,
    pub staff_id: StaffId,
    pub lines: Vec<LineItem>,
}

impl OrderRequest {
    /// Input validation, applied before any mutation.
    pub fn validate(&self) -> DomainResult<()> {
        if self.lines.is_empty() {
            return Err(DomainError::validation("order must have at least one line"));
        }
        for (idx, line) in self.lines.iter().enumerate() {
            if line.quantity <= 0 {
                return Err(DomainError::validation(format!(
                    "line {idx}: quantity must be positive"
                )));
            }
            if line.unit_price < 0 {
                return Err(DomainError::validation(format!(
                    "line {idx}: unit price cannot be negative"
                )));
            }
        }
        Ok(())
    }
}

/// Order header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub staff_id: StaffId,
    /// Zero until every line has been processed.
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
}

/// Order line row.
///
/// Points at the inventory record it was fulfilled from (not the product
/// directly) and, when the line recorded a price change, at the new
/// price-history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub inventory_id: InventoryId,
    pub quantity: i64,
    pub price_entry_id: Option<PriceEntryId>,
    pub recorded_at: DateTime<Utc>,
}

/// What `place_order` hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub total_price: i64,
    /// Lines actually written (soft-skipped lines excluded).
    pub line_count: usize,
    /// Lines dropped because no inventory record resolved.
    pub lines_skipped: usize,
}

/// Order header joined with party names, for reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub order_id: OrderId,
    pub customer_name: String,
    pub staff_name: String,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderDetailLine>,
}

/// Order line joined with the product it sold and the price in effect.
///
/// `unit_price` comes from the line's price-history entry; `None` means the
/// line recorded no new entry (the submitted price matched the month's
/// latest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetailLine {
    pub line_id: OrderLineId,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Option<i64>,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i64, unit_price: i64) -> LineItem {
        LineItem {
            product_id: ProductId::new(1),
            warehouse_id: None,
            quantity,
            unit_price,
        }
    }

    fn request(lines: Vec<LineItem>) -> OrderRequest {
        OrderRequest {
            customer_id: CustomerId::new(1),
            staff_id: StaffId::new(1),
            lines,
        }
    }

    #[test]
    fn empty_line_list_is_rejected() {
        let err = request(vec![]).validate().unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("at least one line")),
            _ => panic!("expected Validation"),
        }
    }

    #[test]
    fn zero_and_negative_quantities_are_rejected() {
        assert!(request(vec![line(0, 100)]).validate().is_err());
        assert!(request(vec![line(-3, 100)]).validate().is_err());
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(request(vec![line(1, -1)]).validate().is_err());
    }

    #[test]
    fn free_of_charge_line_is_allowed() {
        assert!(request(vec![line(1, 0)]).validate().is_ok());
    }

    #[test]
    fn bad_line_is_reported_by_index() {
        let err = request(vec![line(1, 100), line(0, 100)])
            .validate()
            .unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("line 1")),
            _ => panic!("expected Validation"),
        }
    }
}
