use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gasdepot_catalog::ProductKind;
use gasdepot_core::{DomainError, DomainResult, InventoryId, ProductId, WarehouseId};

/// Stock counts for one product in one warehouse.
///
/// At most one record exists per (product, warehouse) pair. Quantities may
/// go negative after a sale; a negative full count reads as a backorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: InventoryId,
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub full_qty: i64,
    pub empty_qty: i64,
    pub updated_at: DateTime<Utc>,
}

impl StockRecord {
    /// Apply a movement in place and refresh the timestamp.
    pub fn apply(&mut self, movement: StockMovement, at: DateTime<Utc>) {
        self.full_qty += movement.full_delta;
        self.empty_qty += movement.empty_delta;
        self.updated_at = at;
    }

    pub fn is_backordered(&self) -> bool {
        self.full_qty < 0
    }
}

/// Manual stock entry: sets absolute quantities (overwrite, not increment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpsert {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub full_qty: i64,
    pub empty_qty: i64,
}

impl StockUpsert {
    pub fn validate(&self) -> DomainResult<()> {
        if self.full_qty < 0 || self.empty_qty < 0 {
            return Err(DomainError::validation(
                "stock quantities cannot be negative on manual entry",
            ));
        }
        Ok(())
    }
}

/// A signed adjustment to a stock record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub full_delta: i64,
    pub empty_delta: i64,
}

impl StockMovement {
    /// Movement caused by selling `quantity` units of a product.
    ///
    /// Cylinders follow the exchange model: each full unit sold brings an
    /// empty one back. Everything else just leaves the shelf.
    pub fn for_sale(kind: ProductKind, quantity: i64) -> Self {
        if kind.exchanges_empties() {
            Self {
                full_delta: -quantity,
                empty_delta: quantity,
            }
        } else {
            Self {
                full_delta: -quantity,
                empty_delta: 0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(full: i64, empty: i64) -> StockRecord {
        StockRecord {
            id: InventoryId::new(1),
            product_id: ProductId::new(1),
            warehouse_id: WarehouseId::new(1),
            full_qty: full,
            empty_qty: empty,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn cylinder_sale_swaps_full_for_empty() {
        let mut stock = record(10, 2);
        stock.apply(StockMovement::for_sale(ProductKind::Cylinder, 3), Utc::now());
        assert_eq!(stock.full_qty, 7);
        assert_eq!(stock.empty_qty, 5);
    }

    #[test]
    fn accessory_sale_only_decrements_full() {
        let mut stock = record(4, 0);
        stock.apply(StockMovement::for_sale(ProductKind::Accessory, 4), Utc::now());
        assert_eq!(stock.full_qty, 0);
        assert_eq!(stock.empty_qty, 0);
    }

    #[test]
    fn sale_past_zero_reads_as_backorder() {
        let mut stock = record(1, 0);
        stock.apply(StockMovement::for_sale(ProductKind::Stove, 3), Utc::now());
        assert_eq!(stock.full_qty, -2);
        assert!(stock.is_backordered());
    }

    #[test]
    fn negative_manual_entry_is_rejected() {
        let upsert = StockUpsert {
            product_id: ProductId::new(1),
            warehouse_id: WarehouseId::new(1),
            full_qty: -1,
            empty_qty: 0,
        };
        assert!(upsert.validate().is_err());
    }

    proptest! {
        // Exchange sales move units between the two columns without
        // changing the combined count.
        #[test]
        fn cylinder_sales_conserve_total_units(
            full in -1000i64..1000,
            empty in -1000i64..1000,
            qty in 1i64..100,
        ) {
            let mut stock = record(full, empty);
            stock.apply(StockMovement::for_sale(ProductKind::Cylinder, qty), Utc::now());
            prop_assert_eq!(stock.full_qty + stock.empty_qty, full + empty);
            prop_assert_eq!(stock.full_qty, full - qty);
        }

        #[test]
        fn non_exchange_sales_never_touch_empties(
            full in -1000i64..1000,
            empty in -1000i64..1000,
            qty in 1i64..100,
        ) {
            for kind in [ProductKind::Accessory, ProductKind::Stove] {
                let mut stock = record(full, empty);
                stock.apply(StockMovement::for_sale(kind, qty), Utc::now());
                prop_assert_eq!(stock.empty_qty, empty);
                prop_assert_eq!(stock.full_qty, full - qty);
            }
        }
    }
}
