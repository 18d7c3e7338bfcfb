//! `gasdepot-inventory` — per-(product, warehouse) stock ledger types.

pub mod stock;

pub use stock::{StockMovement, StockRecord, StockUpsert};
