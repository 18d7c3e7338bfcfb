use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use gasdepot_store::{Store, StoreError};

use crate::app::errors;

pub async fn health() -> axum::response::Response {
    (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
}

/// Everything the original index page showed, as one JSON document.
pub async fn dashboard(
    Extension(store): Extension<Arc<dyn Store>>,
) -> axum::response::Response {
    let assemble = async {
        Ok::<_, StoreError>(json!({
            "products": store.list_products().await?,
            "warehouses": store.list_warehouses().await?,
            "inventory": store.list_stock().await?,
            "customers": store.list_customers().await?,
            "staff": store.list_staff().await?,
            "orders": store.list_orders().await?,
        }))
    };

    match assemble.await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
