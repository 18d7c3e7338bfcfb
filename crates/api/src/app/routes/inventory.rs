use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post},
    Json, Router,
};

use gasdepot_core::InventoryId;
use gasdepot_store::Store;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(upsert_stock).get(list_stock))
        .route("/:id", delete(delete_stock))
}

/// Manual stock entry: sets absolute quantities, creating the record for
/// the (product, warehouse) pair if it does not exist yet.
pub async fn upsert_stock(
    Extension(store): Extension<Arc<dyn Store>>,
    Json(body): Json<dto::UpsertStockRequest>,
) -> axum::response::Response {
    match store.upsert_stock(body.into()).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_stock(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match store.delete_stock(InventoryId::new(id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_stock(
    Extension(store): Extension<Arc<dyn Store>>,
) -> axum::response::Response {
    match store.list_stock().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
