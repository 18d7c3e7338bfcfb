use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post},
    Json, Router,
};

use gasdepot_core::CustomerId;
use gasdepot_parties::NewCustomer;
use gasdepot_store::Store;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_customer).get(list_customers))
        .route("/:id", delete(delete_customer))
}

pub async fn create_customer(
    Extension(store): Extension<Arc<dyn Store>>,
    Json(body): Json<dto::CreateCustomerRequest>,
) -> axum::response::Response {
    match store
        .create_customer(NewCustomer {
            name: body.name,
            phone: body.phone,
            address: body.address,
        })
        .await
    {
        Ok(customer) => (StatusCode::CREATED, Json(customer)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_customer(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match store.delete_customer(CustomerId::new(id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_customers(
    Extension(store): Extension<Arc<dyn Store>>,
) -> axum::response::Response {
    match store.list_customers().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
