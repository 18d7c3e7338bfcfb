//! `gasdepot-sales` — sales orders: requests, records, read models.

pub mod order;

pub use order::{
    LineItem, Order, OrderDetailLine, OrderDetails, OrderLine, OrderRequest, OrderSummary,
};
