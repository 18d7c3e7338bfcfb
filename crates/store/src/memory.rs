//! In-memory store implementation.
//!
//! Intended for tests/dev. Not optimized for performance. Order placement
//! works on a snapshot of the state and commits it back only on success,
//! which gives the same all-or-nothing visibility as the SQL transaction.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use gasdepot_catalog::{NewProduct, NewWarehouse, Product, Warehouse};
use gasdepot_core::{
    CustomerId, DomainError, InventoryId, OrderId, OrderLineId, PriceEntryId, ProductId, StaffId,
    WarehouseId,
};
use gasdepot_inventory::{StockMovement, StockRecord, StockUpsert};
use gasdepot_parties::{Customer, NewCustomer, NewStaff, Staff};
use gasdepot_pricing::{same_calendar_month, PricePoint};
use gasdepot_sales::{Order, OrderDetailLine, OrderDetails, OrderLine, OrderRequest, OrderSummary};

use crate::error::{StoreError, StoreResult};
use crate::read::{OrderOverview, StockOverview};
use crate::store::Store;
use crate::tx::OrderTx;
use crate::workflow;

#[derive(Debug, Default, Clone)]
struct Sequences {
    product: i64,
    warehouse: i64,
    customer: i64,
    staff: i64,
    inventory: i64,
    price_entry: i64,
    order: i64,
    order_line: i64,
}

/// Whole-store state, keyed by raw ids (BTreeMap keeps listings id-ordered).
#[derive(Debug, Default, Clone)]
pub(crate) struct MemState {
    products: BTreeMap<i64, Product>,
    warehouses: BTreeMap<i64, Warehouse>,
    customers: BTreeMap<i64, Customer>,
    staff: BTreeMap<i64, Staff>,
    stock: BTreeMap<i64, StockRecord>,
    prices: BTreeMap<i64, PricePoint>,
    orders: BTreeMap<i64, Order>,
    lines: BTreeMap<i64, OrderLine>,
    seq: Sequences,
}

impl MemState {
    fn stock_for(&self, product_id: ProductId, warehouse_id: Option<WarehouseId>) -> Option<&StockRecord> {
        match warehouse_id {
            Some(w) => self
                .stock
                .values()
                .find(|s| s.product_id == product_id && s.warehouse_id == w),
            None => self
                .stock
                .values()
                .filter(|s| s.product_id == product_id)
                .min_by_key(|s| s.id),
        }
    }

    fn product_name(&self, inventory_id: InventoryId) -> String {
        self.stock
            .get(&inventory_id.as_i64())
            .and_then(|s| self.products.get(&s.product_id.as_i64()))
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
impl MemState {
    pub(crate) fn seed_customer(&mut self, customer: Customer) {
        self.seq.customer = self.seq.customer.max(customer.id.as_i64());
        self.customers.insert(customer.id.as_i64(), customer);
    }

    pub(crate) fn seed_staff(&mut self, staff: Staff) {
        self.seq.staff = self.seq.staff.max(staff.id.as_i64());
        self.staff.insert(staff.id.as_i64(), staff);
    }

    pub(crate) fn seed_product(&mut self, product: Product) {
        self.seq.product = self.seq.product.max(product.id.as_i64());
        self.products.insert(product.id.as_i64(), product);
    }

    pub(crate) fn seed_stock(&mut self, record: StockRecord) {
        self.seq.inventory = self.seq.inventory.max(record.id.as_i64());
        self.stock.insert(record.id.as_i64(), record);
    }

    pub(crate) fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub(crate) fn order_line_count(&self) -> usize {
        self.lines.len()
    }

    pub(crate) fn price_entry_count(&self) -> usize {
        self.prices.len()
    }
}

/// One order placement over a mutable [`MemState`] snapshot.
pub(crate) struct MemTx<'a> {
    state: &'a mut MemState,
    fail_total: bool,
}

impl<'a> MemTx<'a> {
    pub(crate) fn new(state: &'a mut MemState) -> Self {
        Self {
            state,
            fail_total: false,
        }
    }
}

#[async_trait]
impl OrderTx for MemTx<'_> {
    async fn customer_exists(&mut self, id: CustomerId) -> StoreResult<bool> {
        Ok(self.state.customers.contains_key(&id.as_i64()))
    }

    async fn staff_exists(&mut self, id: StaffId) -> StoreResult<bool> {
        Ok(self.state.staff.contains_key(&id.as_i64()))
    }

    async fn product(&mut self, id: ProductId) -> StoreResult<Option<Product>> {
        Ok(self.state.products.get(&id.as_i64()).cloned())
    }

    async fn resolve_stock(
        &mut self,
        product_id: ProductId,
        warehouse_id: Option<WarehouseId>,
    ) -> StoreResult<Option<StockRecord>> {
        Ok(self.state.stock_for(product_id, warehouse_id).cloned())
    }

    async fn latest_price_in_month(
        &mut self,
        product_id: ProductId,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<PricePoint>> {
        Ok(self
            .state
            .prices
            .values()
            .filter(|p| p.product_id == product_id && same_calendar_month(p.recorded_at, at))
            .max_by_key(|p| (p.recorded_at, p.id))
            .cloned())
    }

    async fn append_price(
        &mut self,
        product_id: ProductId,
        price: i64,
        at: DateTime<Utc>,
    ) -> StoreResult<PriceEntryId> {
        self.state.seq.price_entry += 1;
        let id = PriceEntryId::new(self.state.seq.price_entry);
        self.state.prices.insert(
            id.as_i64(),
            PricePoint {
                id,
                product_id,
                price,
                recorded_at: at,
            },
        );
        Ok(id)
    }

    async fn insert_order(
        &mut self,
        customer_id: CustomerId,
        staff_id: StaffId,
        at: DateTime<Utc>,
    ) -> StoreResult<OrderId> {
        self.state.seq.order += 1;
        let id = OrderId::new(self.state.seq.order);
        self.state.orders.insert(
            id.as_i64(),
            Order {
                id,
                customer_id,
                staff_id,
                total_price: 0,
                created_at: at,
            },
        );
        Ok(id)
    }

    async fn insert_line(
        &mut self,
        order_id: OrderId,
        inventory_id: InventoryId,
        quantity: i64,
        price_entry_id: Option<PriceEntryId>,
        at: DateTime<Utc>,
    ) -> StoreResult<OrderLineId> {
        self.state.seq.order_line += 1;
        let id = OrderLineId::new(self.state.seq.order_line);
        self.state.lines.insert(
            id.as_i64(),
            OrderLine {
                id,
                order_id,
                inventory_id,
                quantity,
                price_entry_id,
                recorded_at: at,
            },
        );
        Ok(id)
    }

    async fn apply_movement(
        &mut self,
        inventory_id: InventoryId,
        movement: StockMovement,
        at: DateTime<Utc>,
    ) -> StoreResult<StockRecord> {
        let record = self
            .state
            .stock
            .get_mut(&inventory_id.as_i64())
            .ok_or_else(|| DomainError::not_found("inventory record"))?;
        record.apply(movement, at);
        Ok(record.clone())
    }

    async fn set_order_total(&mut self, order_id: OrderId, total: i64) -> StoreResult<()> {
        if self.fail_total {
            return Err(StoreError::storage(
                "set_order_total",
                "injected fault for rollback testing",
            ));
        }
        let order = self
            .state
            .orders
            .get_mut(&order_id.as_i64())
            .ok_or_else(|| DomainError::not_found("order"))?;
        order.total_price = total;
        Ok(())
    }
}

/// In-memory [`Store`] double.
#[derive(Debug, Default)]
pub struct MemStore {
    state: RwLock<MemState>,
    fail_total_update: AtomicBool,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next order placement fail at the final total update,
    /// standing in for a storage fault mid-transaction.
    pub fn fail_next_total_update(&self) {
        self.fail_total_update.store(true, Ordering::SeqCst);
    }

    fn read_state(&self) -> StoreResult<RwLockReadGuard<'_, MemState>> {
        self.state
            .read()
            .map_err(|_| StoreError::storage("mem_store", "lock poisoned"))
    }

    fn write_state(&self) -> StoreResult<RwLockWriteGuard<'_, MemState>> {
        self.state
            .write()
            .map_err(|_| StoreError::storage("mem_store", "lock poisoned"))
    }
}

#[async_trait]
impl Store for MemStore {
    async fn create_product(&self, new: NewProduct) -> StoreResult<Product> {
        new.validate()?;
        let mut state = self.write_state()?;
        state.seq.product += 1;
        let product = Product {
            id: ProductId::new(state.seq.product),
            name: new.name,
            kind: new.kind,
        };
        state.products.insert(product.id.as_i64(), product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: ProductId, new: NewProduct) -> StoreResult<Product> {
        new.validate()?;
        let mut state = self.write_state()?;
        let product = state
            .products
            .get_mut(&id.as_i64())
            .ok_or_else(|| DomainError::not_found("product"))?;
        product.name = new.name;
        product.kind = new.kind;
        Ok(product.clone())
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<()> {
        let mut state = self.write_state()?;
        let referenced = state.stock.values().any(|s| s.product_id == id)
            || state.prices.values().any(|p| p.product_id == id);
        if referenced {
            return Err(DomainError::validation("product is still referenced").into());
        }
        state
            .products
            .remove(&id.as_i64())
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("product").into())
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.read_state()?.products.values().cloned().collect())
    }

    async fn create_warehouse(&self, new: NewWarehouse) -> StoreResult<Warehouse> {
        new.validate()?;
        let mut state = self.write_state()?;
        state.seq.warehouse += 1;
        let warehouse = Warehouse {
            id: WarehouseId::new(state.seq.warehouse),
            name: new.name,
            address: new.address,
        };
        state
            .warehouses
            .insert(warehouse.id.as_i64(), warehouse.clone());
        Ok(warehouse)
    }

    async fn update_warehouse(&self, id: WarehouseId, new: NewWarehouse) -> StoreResult<Warehouse> {
        new.validate()?;
        let mut state = self.write_state()?;
        let warehouse = state
            .warehouses
            .get_mut(&id.as_i64())
            .ok_or_else(|| DomainError::not_found("warehouse"))?;
        warehouse.name = new.name;
        warehouse.address = new.address;
        Ok(warehouse.clone())
    }

    async fn delete_warehouse(&self, id: WarehouseId) -> StoreResult<()> {
        let mut state = self.write_state()?;
        if state.stock.values().any(|s| s.warehouse_id == id) {
            return Err(DomainError::validation("warehouse is still referenced").into());
        }
        state
            .warehouses
            .remove(&id.as_i64())
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("warehouse").into())
    }

    async fn list_warehouses(&self) -> StoreResult<Vec<Warehouse>> {
        Ok(self.read_state()?.warehouses.values().cloned().collect())
    }

    async fn create_customer(&self, new: NewCustomer) -> StoreResult<Customer> {
        new.validate()?;
        let mut state = self.write_state()?;
        state.seq.customer += 1;
        let customer = Customer {
            id: CustomerId::new(state.seq.customer),
            name: new.name,
            phone: new.phone,
            address: new.address,
        };
        state
            .customers
            .insert(customer.id.as_i64(), customer.clone());
        Ok(customer)
    }

    async fn delete_customer(&self, id: CustomerId) -> StoreResult<()> {
        let mut state = self.write_state()?;
        if state.orders.values().any(|o| o.customer_id == id) {
            return Err(DomainError::validation("customer is still referenced").into());
        }
        state
            .customers
            .remove(&id.as_i64())
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("customer").into())
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        Ok(self.read_state()?.customers.values().cloned().collect())
    }

    async fn create_staff(&self, new: NewStaff) -> StoreResult<Staff> {
        new.validate()?;
        let mut state = self.write_state()?;
        state.seq.staff += 1;
        let staff = Staff {
            id: StaffId::new(state.seq.staff),
            name: new.name,
            phone: new.phone,
        };
        state.staff.insert(staff.id.as_i64(), staff.clone());
        Ok(staff)
    }

    async fn delete_staff(&self, id: StaffId) -> StoreResult<()> {
        let mut state = self.write_state()?;
        if state.orders.values().any(|o| o.staff_id == id) {
            return Err(DomainError::validation("staff member is still referenced").into());
        }
        state
            .staff
            .remove(&id.as_i64())
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("staff member").into())
    }

    async fn list_staff(&self) -> StoreResult<Vec<Staff>> {
        Ok(self.read_state()?.staff.values().cloned().collect())
    }

    async fn upsert_stock(&self, upsert: StockUpsert) -> StoreResult<StockRecord> {
        upsert.validate()?;
        let mut state = self.write_state()?;
        if !state.products.contains_key(&upsert.product_id.as_i64()) {
            return Err(DomainError::not_found("product").into());
        }
        if !state.warehouses.contains_key(&upsert.warehouse_id.as_i64()) {
            return Err(DomainError::not_found("warehouse").into());
        }

        let now = Utc::now();
        let existing = state
            .stock
            .values()
            .find(|s| s.product_id == upsert.product_id && s.warehouse_id == upsert.warehouse_id)
            .map(|s| s.id);

        let record = match existing {
            Some(id) => {
                let record = state
                    .stock
                    .get_mut(&id.as_i64())
                    .ok_or_else(|| DomainError::not_found("inventory record"))?;
                record.full_qty = upsert.full_qty;
                record.empty_qty = upsert.empty_qty;
                record.updated_at = now;
                record.clone()
            }
            None => {
                state.seq.inventory += 1;
                let record = StockRecord {
                    id: InventoryId::new(state.seq.inventory),
                    product_id: upsert.product_id,
                    warehouse_id: upsert.warehouse_id,
                    full_qty: upsert.full_qty,
                    empty_qty: upsert.empty_qty,
                    updated_at: now,
                };
                state.stock.insert(record.id.as_i64(), record.clone());
                record
            }
        };
        Ok(record)
    }

    async fn delete_stock(&self, id: InventoryId) -> StoreResult<()> {
        let mut state = self.write_state()?;
        if state.lines.values().any(|l| l.inventory_id == id) {
            return Err(
                DomainError::validation("inventory record is still referenced by order lines")
                    .into(),
            );
        }
        state
            .stock
            .remove(&id.as_i64())
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("inventory record").into())
    }

    async fn list_stock(&self) -> StoreResult<Vec<StockOverview>> {
        let state = self.read_state()?;
        Ok(state
            .stock
            .values()
            .map(|s| StockOverview {
                inventory_id: s.id,
                product_name: state
                    .products
                    .get(&s.product_id.as_i64())
                    .map(|p| p.name.clone())
                    .unwrap_or_default(),
                warehouse_name: state
                    .warehouses
                    .get(&s.warehouse_id.as_i64())
                    .map(|w| w.name.clone())
                    .unwrap_or_default(),
                full_qty: s.full_qty,
                empty_qty: s.empty_qty,
                updated_at: s.updated_at,
            })
            .collect())
    }

    async fn place_order(&self, req: OrderRequest) -> StoreResult<OrderSummary> {
        // Work on a snapshot; commit it back only if the workflow succeeds.
        let mut work = self.read_state()?.clone();
        let fail_total = self.fail_total_update.swap(false, Ordering::SeqCst);

        let summary = {
            let mut tx = MemTx {
                state: &mut work,
                fail_total,
            };
            workflow::place_order(&mut tx, &req, Utc::now()).await?
        };

        *self.write_state()? = work;
        Ok(summary)
    }

    async fn order_details(&self, id: OrderId) -> StoreResult<OrderDetails> {
        let state = self.read_state()?;
        let order = state
            .orders
            .get(&id.as_i64())
            .ok_or_else(|| DomainError::not_found("order"))?;

        let lines = state
            .lines
            .values()
            .filter(|l| l.order_id == id)
            .map(|l| OrderDetailLine {
                line_id: l.id,
                product_name: state.product_name(l.inventory_id),
                quantity: l.quantity,
                unit_price: l
                    .price_entry_id
                    .and_then(|pid| state.prices.get(&pid.as_i64()))
                    .map(|p| p.price),
                recorded_at: l.recorded_at,
            })
            .collect();

        Ok(OrderDetails {
            order_id: order.id,
            customer_name: state
                .customers
                .get(&order.customer_id.as_i64())
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            staff_name: state
                .staff
                .get(&order.staff_id.as_i64())
                .map(|s| s.name.clone())
                .unwrap_or_default(),
            total_price: order.total_price,
            created_at: order.created_at,
            lines,
        })
    }

    async fn list_orders(&self) -> StoreResult<Vec<OrderOverview>> {
        let state = self.read_state()?;
        Ok(state
            .orders
            .values()
            .rev()
            .map(|o| OrderOverview {
                order_id: o.id,
                customer_name: state
                    .customers
                    .get(&o.customer_id.as_i64())
                    .map(|c| c.name.clone())
                    .unwrap_or_default(),
                staff_name: state
                    .staff
                    .get(&o.staff_id.as_i64())
                    .map(|s| s.name.clone())
                    .unwrap_or_default(),
                total_price: o.total_price,
                line_count: state.lines.values().filter(|l| l.order_id == o.id).count() as i64,
                created_at: o.created_at,
            })
            .collect())
    }

    async fn delete_order(&self, id: OrderId) -> StoreResult<()> {
        let mut state = self.write_state()?;
        state
            .orders
            .remove(&id.as_i64())
            .ok_or_else(|| DomainError::not_found("order"))?;
        // Owned lines go with the order; inventory and price history stay.
        state.lines.retain(|_, l| l.order_id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gasdepot_catalog::ProductKind;
    use gasdepot_sales::LineItem;

    async fn seeded() -> MemStore {
        let store = MemStore::new();
        store
            .create_product(NewProduct {
                name: "12kg cylinder".to_string(),
                kind: ProductKind::Cylinder,
            })
            .await
            .unwrap();
        store
            .create_warehouse(NewWarehouse {
                name: "North depot".to_string(),
                address: "12 Tank St".to_string(),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn upsert_overwrites_quantities() {
        let store = seeded().await;
        let upsert = StockUpsert {
            product_id: ProductId::new(1),
            warehouse_id: WarehouseId::new(1),
            full_qty: 10,
            empty_qty: 2,
        };
        let first = store.upsert_stock(upsert.clone()).await.unwrap();

        let second = store
            .upsert_stock(StockUpsert {
                full_qty: 4,
                empty_qty: 9,
                ..upsert
            })
            .await
            .unwrap();

        // Same record, absolute overwrite (not an increment).
        assert_eq!(second.id, first.id);
        assert_eq!(second.full_qty, 4);
        assert_eq!(second.empty_qty, 9);
        assert_eq!(store.list_stock().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upsert_against_unknown_product_is_not_found() {
        let store = seeded().await;
        let err = store
            .upsert_stock(StockUpsert {
                product_id: ProductId::new(99),
                warehouse_id: WarehouseId::new(1),
                full_qty: 1,
                empty_qty: 0,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(DomainError::NotFound(ref what)) if what == "product"
        ));
    }

    #[tokio::test]
    async fn delete_product_with_stock_is_rejected() {
        let store = seeded().await;
        store
            .upsert_stock(StockUpsert {
                product_id: ProductId::new(1),
                warehouse_id: WarehouseId::new(1),
                full_qty: 1,
                empty_qty: 0,
            })
            .await
            .unwrap();

        let err = store.delete_product(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn delete_stock_sold_from_is_rejected() {
        let store = seeded().await;
        store
            .upsert_stock(StockUpsert {
                product_id: ProductId::new(1),
                warehouse_id: WarehouseId::new(1),
                full_qty: 5,
                empty_qty: 0,
            })
            .await
            .unwrap();
        store
            .create_customer(NewCustomer {
                name: "Binh".to_string(),
                phone: String::new(),
                address: String::new(),
            })
            .await
            .unwrap();
        store
            .create_staff(NewStaff {
                name: "Lan".to_string(),
                phone: String::new(),
            })
            .await
            .unwrap();
        store
            .place_order(OrderRequest {
                customer_id: CustomerId::new(1),
                staff_id: StaffId::new(1),
                lines: vec![LineItem {
                    product_id: ProductId::new(1),
                    warehouse_id: None,
                    quantity: 1,
                    unit_price: 100,
                }],
            })
            .await
            .unwrap();

        let err = store.delete_stock(InventoryId::new(1)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(DomainError::Validation(_))
        ));
    }
}
