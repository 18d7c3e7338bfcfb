use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{post, put},
    Json, Router,
};

use gasdepot_catalog::NewWarehouse;
use gasdepot_core::WarehouseId;
use gasdepot_store::Store;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_warehouse).get(list_warehouses))
        .route("/:id", put(update_warehouse).delete(delete_warehouse))
}

pub async fn create_warehouse(
    Extension(store): Extension<Arc<dyn Store>>,
    Json(body): Json<dto::CreateWarehouseRequest>,
) -> axum::response::Response {
    match store
        .create_warehouse(NewWarehouse {
            name: body.name,
            address: body.address,
        })
        .await
    {
        Ok(warehouse) => (StatusCode::CREATED, Json(warehouse)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_warehouse(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(id): Path<i64>,
    Json(body): Json<dto::CreateWarehouseRequest>,
) -> axum::response::Response {
    match store
        .update_warehouse(
            WarehouseId::new(id),
            NewWarehouse {
                name: body.name,
                address: body.address,
            },
        )
        .await
    {
        Ok(warehouse) => (StatusCode::OK, Json(warehouse)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_warehouse(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match store.delete_warehouse(WarehouseId::new(id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_warehouses(
    Extension(store): Extension<Arc<dyn Store>>,
) -> axum::response::Response {
    match store.list_warehouses().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
