use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post},
    Json, Router,
};

use gasdepot_core::StaffId;
use gasdepot_parties::NewStaff;
use gasdepot_store::Store;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_staff).get(list_staff))
        .route("/:id", delete(delete_staff))
}

pub async fn create_staff(
    Extension(store): Extension<Arc<dyn Store>>,
    Json(body): Json<dto::CreateStaffRequest>,
) -> axum::response::Response {
    match store
        .create_staff(NewStaff {
            name: body.name,
            phone: body.phone,
        })
        .await
    {
        Ok(staff) => (StatusCode::CREATED, Json(staff)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_staff(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match store.delete_staff(StaffId::new(id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_staff(
    Extension(store): Extension<Arc<dyn Store>>,
) -> axum::response::Response {
    match store.list_staff().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
