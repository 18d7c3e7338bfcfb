//! Order placement.
//!
//! Runs entirely inside one [`OrderTx`]; the calling store implementation
//! owns begin/commit/rollback. Any error out of here must leave no trace of
//! the order once the caller rolls back.

use chrono::{DateTime, Utc};

use gasdepot_core::DomainError;
use gasdepot_inventory::StockMovement;
use gasdepot_pricing::needs_new_entry;
use gasdepot_sales::{OrderRequest, OrderSummary};

use crate::error::StoreResult;
use crate::tx::OrderTx;

/// Place an order: header, lines, price history, stock movements, total.
///
/// Lines whose product has no stock record are soft-skipped (no line row,
/// no stock mutation, no price entry); everything else about the order
/// still goes through. Validation and reference checks happen before the
/// header is written.
pub async fn place_order<T: OrderTx>(
    tx: &mut T,
    req: &OrderRequest,
    now: DateTime<Utc>,
) -> StoreResult<OrderSummary> {
    req.validate()?;

    if !tx.customer_exists(req.customer_id).await? {
        return Err(DomainError::not_found("customer").into());
    }
    if !tx.staff_exists(req.staff_id).await? {
        return Err(DomainError::not_found("staff").into());
    }

    let order_id = tx.insert_order(req.customer_id, req.staff_id, now).await?;

    let mut total: i64 = 0;
    let mut line_count = 0usize;
    let mut lines_skipped = 0usize;

    for line in &req.lines {
        let Some(stock) = tx.resolve_stock(line.product_id, line.warehouse_id).await? else {
            tracing::warn!(
                order_id = %order_id,
                product_id = %line.product_id,
                "no inventory record for product; skipping line"
            );
            lines_skipped += 1;
            continue;
        };

        let product = tx
            .product(line.product_id)
            .await?
            .ok_or_else(|| DomainError::not_found("product"))?;

        let latest = tx.latest_price_in_month(line.product_id, now).await?;
        let price_entry_id = if needs_new_entry(latest.map(|p| p.price), line.unit_price) {
            Some(tx.append_price(line.product_id, line.unit_price, now).await?)
        } else {
            None
        };

        tx.insert_line(order_id, stock.id, line.quantity, price_entry_id, now)
            .await?;

        let movement = StockMovement::for_sale(product.kind, line.quantity);
        let updated = tx.apply_movement(stock.id, movement, now).await?;
        if updated.is_backordered() {
            tracing::warn!(
                order_id = %order_id,
                inventory_id = %updated.id,
                full_qty = updated.full_qty,
                "sale drove stock negative; treating as backorder"
            );
        }

        total += line.quantity * line.unit_price;
        line_count += 1;
    }

    tx.set_order_total(order_id, total).await?;

    Ok(OrderSummary {
        order_id,
        total_price: total,
        line_count,
        lines_skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use gasdepot_catalog::{Product, ProductKind};
    use gasdepot_core::{CustomerId, ProductId, StaffId};
    use gasdepot_parties::{Customer, Staff};
    use gasdepot_sales::LineItem;

    use crate::memory::{MemState, MemTx};

    fn seeded_state() -> MemState {
        let mut state = MemState::default();
        state.seed_customer(Customer {
            id: CustomerId::new(1),
            name: "Binh".to_string(),
            phone: String::new(),
            address: String::new(),
        });
        state.seed_staff(Staff {
            id: StaffId::new(1),
            name: "Lan".to_string(),
            phone: String::new(),
        });
        state.seed_product(Product {
            id: ProductId::new(1),
            name: "12kg cylinder".to_string(),
            kind: ProductKind::Cylinder,
        });
        state
    }

    fn request(lines: Vec<LineItem>) -> OrderRequest {
        OrderRequest {
            customer_id: CustomerId::new(1),
            staff_id: StaffId::new(1),
            lines,
        }
    }

    #[tokio::test]
    async fn skipped_line_appends_no_price_history() {
        // Product exists but has no stock record at all.
        let mut state = seeded_state();
        let mut tx = MemTx::new(&mut state);

        let summary = place_order(
            &mut tx,
            &request(vec![LineItem {
                product_id: ProductId::new(1),
                warehouse_id: None,
                quantity: 2,
                unit_price: 40_000,
            }]),
            Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap(),
        )
        .await
        .unwrap();

        assert_eq!(summary.line_count, 0);
        assert_eq!(summary.lines_skipped, 1);
        assert_eq!(summary.total_price, 0);
        assert_eq!(state.price_entry_count(), 0);
        assert_eq!(state.order_line_count(), 0);
        // The header itself still exists inside the transaction; whether it
        // survives is the committing store's call.
        assert_eq!(state.order_count(), 1);
    }

    #[tokio::test]
    async fn same_price_in_a_new_month_records_again() {
        use gasdepot_core::{InventoryId, WarehouseId};
        use gasdepot_inventory::StockRecord;

        let mut state = seeded_state();
        state.seed_stock(StockRecord {
            id: InventoryId::new(1),
            product_id: ProductId::new(1),
            warehouse_id: WarehouseId::new(1),
            full_qty: 100,
            empty_qty: 0,
            updated_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        });
        let req = request(vec![LineItem {
            product_id: ProductId::new(1),
            warehouse_id: None,
            quantity: 1,
            unit_price: 50_000,
        }]);

        let june = Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap();
        let july = Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap();
        let later_in_july = Utc.with_ymd_and_hms(2024, 7, 20, 10, 0, 0).unwrap();

        for now in [june, july, later_in_july] {
            let mut tx = MemTx::new(&mut state);
            place_order(&mut tx, &req, now).await.unwrap();
        }

        // June and the first July order each record the price; the later
        // July order sees an identical price already on file this month.
        assert_eq!(state.price_entry_count(), 2);
    }

    #[tokio::test]
    async fn validation_happens_before_any_insert() {
        let mut state = seeded_state();
        let mut tx = MemTx::new(&mut state);

        let err = place_order(&mut tx, &request(vec![]), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::StoreError::Domain(DomainError::Validation(_))
        ));
        assert_eq!(state.order_count(), 0);
    }
}
