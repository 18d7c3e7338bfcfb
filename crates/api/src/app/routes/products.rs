use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{post, put},
    Json, Router,
};

use gasdepot_catalog::{NewProduct, ProductKind};
use gasdepot_core::ProductId;
use gasdepot_store::Store;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:id", put(update_product).delete(delete_product))
}

fn parse_kind(raw: &str) -> Result<ProductKind, axum::response::Response> {
    raw.parse::<ProductKind>()
        .map_err(|e| errors::store_error_to_response(e.into()))
}

pub async fn create_product(
    Extension(store): Extension<Arc<dyn Store>>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    let kind = match parse_kind(&body.kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };

    match store
        .create_product(NewProduct {
            name: body.name,
            kind,
        })
        .await
    {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(id): Path<i64>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    let kind = match parse_kind(&body.kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };

    match store
        .update_product(
            ProductId::new(id),
            NewProduct {
                name: body.name,
                kind,
            },
        )
        .await
    {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match store.delete_product(ProductId::new(id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(store): Extension<Arc<dyn Store>>,
) -> axum::response::Response {
    match store.list_products().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
