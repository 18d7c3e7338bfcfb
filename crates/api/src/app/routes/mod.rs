use axum::{routing::get, Router};

pub mod customers;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod staff;
pub mod system;
pub mod warehouses;

/// Router for all endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/dashboard", get(system::dashboard))
        .nest("/products", products::router())
        .nest("/warehouses", warehouses::router())
        .nest("/inventory", inventory::router())
        .nest("/customers", customers::router())
        .nest("/staff", staff::router())
        .nest("/orders", orders::router())
}
