use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};

use gasdepot_store::MemStore;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, backed by the in-memory store, bound to an
        // ephemeral port.
        let app = gasdepot_api::app::build_app(Arc::new(MemStore::new()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn post_json(
    client: &reqwest::Client,
    base_url: &str,
    path: &str,
    body: Value,
) -> (StatusCode, Value) {
    let res = client
        .post(format!("{base_url}{path}"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = res.status();
    let body = res.json().await.unwrap();
    (status, body)
}

async fn get_json(client: &reqwest::Client, base_url: &str, path: &str) -> (StatusCode, Value) {
    let res = client
        .get(format!("{base_url}{path}"))
        .send()
        .await
        .unwrap();
    let status = res.status();
    let body = res.json().await.unwrap();
    (status, body)
}

/// Seed product/warehouse/stock/customer/staff; returns nothing, ids are
/// all 1 on a fresh store.
async fn seed_reference_data(client: &reqwest::Client, base_url: &str) {
    let (status, _) = post_json(
        client,
        base_url,
        "/products",
        json!({ "name": "12kg cylinder", "kind": "cylinder" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = post_json(
        client,
        base_url,
        "/warehouses",
        json!({ "name": "North depot", "address": "12 Tank St" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = post_json(
        client,
        base_url,
        "/inventory",
        json!({ "product_id": 1, "warehouse_id": 1, "full_qty": 10, "empty_qty": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_json(
        client,
        base_url,
        "/customers",
        json!({ "name": "Binh", "phone": "555-0101" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = post_json(
        client,
        base_url,
        "/staff",
        json!({ "name": "Lan", "phone": "555-0102" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn health_endpoint_responds() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = get_json(&client, &server.base_url, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn full_order_flow_over_http() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    seed_reference_data(&client, &server.base_url).await;

    let (status, summary) = post_json(
        &client,
        &server.base_url,
        "/orders",
        json!({
            "customer_id": 1,
            "staff_id": 1,
            "lines": [{ "product_id": 1, "quantity": 3, "unit_price": 50000 }]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(summary["total_price"], 150000);
    assert_eq!(summary["line_count"], 1);
    assert_eq!(summary["lines_skipped"], 0);

    // The cylinder exchange is visible in the stock listing.
    let (status, stock) = get_json(&client, &server.base_url, "/inventory").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stock["items"][0]["full_qty"], 7);
    assert_eq!(stock["items"][0]["empty_qty"], 5);

    // Order details join party and product names; the line carries the
    // freshly recorded unit price.
    let order_id = summary["order_id"].as_i64().unwrap();
    let (status, details) =
        get_json(&client, &server.base_url, &format!("/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["customer_name"], "Binh");
    assert_eq!(details["staff_name"], "Lan");
    assert_eq!(details["total_price"], 150000);
    assert_eq!(details["lines"][0]["product_name"], "12kg cylinder");
    assert_eq!(details["lines"][0]["unit_price"], 50000);

    // Dashboard aggregates every list.
    let (status, dashboard) = get_json(&client, &server.base_url, "/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["products"].as_array().unwrap().len(), 1);
    assert_eq!(dashboard["orders"][0]["line_count"], 1);
}

#[tokio::test]
async fn order_validation_errors_over_http() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    seed_reference_data(&client, &server.base_url).await;

    // Empty line list.
    let (status, body) = post_json(
        &client,
        &server.base_url,
        "/orders",
        json!({ "customer_id": 1, "staff_id": 1, "lines": [] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    // Unknown customer.
    let (status, body) = post_json(
        &client,
        &server.base_url,
        "/orders",
        json!({
            "customer_id": 99,
            "staff_id": 1,
            "lines": [{ "product_id": 1, "quantity": 1, "unit_price": 50000 }]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    // Neither attempt left an order behind.
    let (_, orders) = get_json(&client, &server.base_url, "/orders").await;
    assert_eq!(orders["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn product_crud_over_http() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = post_json(
        &client,
        &server.base_url,
        "/products",
        json!({ "name": "Two-burner stove", "kind": "stove" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();

    // Unknown kind is rejected up front.
    let (status, body) = post_json(
        &client,
        &server.base_url,
        "/products",
        json!({ "name": "Fridge", "kind": "fridge" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let res = client
        .put(format!("{}/products/{id}", server.base_url))
        .json(&json!({ "name": "Three-burner stove", "kind": "stove" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let (_, products) = get_json(&client, &server.base_url, "/products").await;
    assert_eq!(products["items"][0]["name"], "Three-burner stove");

    let res = client
        .delete(format!("{}/products/{id}", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .delete(format!("{}/products/{id}", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
