//! HTTP API application wiring (Axum router + store injection).
//!
//! Structure:
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};

use gasdepot_store::Store;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router around an injected store handle.
///
/// Production wires the PostgreSQL store; tests pass the in-memory one.
pub fn build_app(store: Arc<dyn Store>) -> Router {
    routes::router().layer(Extension(store))
}
