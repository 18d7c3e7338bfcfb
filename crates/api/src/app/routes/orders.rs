use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use gasdepot_core::OrderId;
use gasdepot_store::Store;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(place_order).get(list_orders))
        .route("/:id", get(order_details).delete(delete_order))
}

/// The one multi-step write: header, lines, price history and stock
/// movements land atomically, or not at all.
pub async fn place_order(
    Extension(store): Extension<Arc<dyn Store>>,
    Json(body): Json<dto::PlaceOrderRequest>,
) -> axum::response::Response {
    match store.place_order(body.into()).await {
        Ok(summary) => (StatusCode::CREATED, Json(summary)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn order_details(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match store.order_details(OrderId::new(id)).await {
        Ok(details) => (StatusCode::OK, Json(details)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_orders(
    Extension(store): Extension<Arc<dyn Store>>,
) -> axum::response::Response {
    match store.list_orders().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_order(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match store.delete_order(OrderId::new(id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
