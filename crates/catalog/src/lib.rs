//! `gasdepot-catalog` — product and warehouse reference data.

pub mod product;
pub mod warehouse;

pub use product::{NewProduct, Product, ProductKind};
pub use warehouse::{NewWarehouse, Warehouse};
