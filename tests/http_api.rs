use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use cashier_api::{repository::memory::MemoryStore, routes::create_app_router, state::AppState};
use http_body_util::BodyExt;
use rstest::rstest;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    create_app_router().with_state(AppState::in_memory(MemoryStore::new(), None))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn health_reports_backend() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["storage"], "in-memory");
}

#[tokio::test]
async fn unknown_path_is_404_envelope() {
    let (status, body) = send(&app(), "GET", "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not Found");
    assert_eq!(body["data"]["path"], "/nope");
}

#[tokio::test]
async fn catalog_and_checkout_round_trip() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/categories",
        Some(json!({ "name": "Makanan" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/products",
        Some(json!({ "name": "Indomie", "price": 3500, "stock": 10, "category_id": category_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["category"]["name"], "Makanan");
    let product_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/checkout",
        Some(json!({ "items": [{ "product_id": product_id, "quantity": 4 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["total_amount"], 14000);
    assert_eq!(body["data"]["details"][0]["subtotal"], 14000);
    let transaction_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(&app, "GET", &format!("/api/products/{product_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stock"], 6);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/transactions/{transaction_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["details"][0]["product_name"], "Indomie");

    let (status, body) = send(&app, "GET", "/api/transactions?page=1&per_page=5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["meta"]["per_page"], 5);

    let (status, body) = send(&app, "GET", "/api/report/today", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_revenue"], 14000);
    assert_eq!(body["data"]["total_transaction"], 1);
    assert_eq!(body["data"]["top_product"]["name"], "Indomie");
    assert_eq!(body["data"]["top_product"]["sold_qty"], 4);
}

#[rstest]
#[case::empty(json!({ "items": [] }), StatusCode::BAD_REQUEST, "validation_error")]
#[case::missing_items(json!({}), StatusCode::BAD_REQUEST, "validation_error")]
#[case::bad_quantity(json!({ "items": [{ "product_id": 1, "quantity": 0 }] }), StatusCode::BAD_REQUEST, "validation_error")]
#[case::unknown_product(json!({ "items": [{ "product_id": 999, "quantity": 1 }] }), StatusCode::NOT_FOUND, "not_found")]
#[tokio::test]
async fn checkout_errors_map_to_status(
    #[case] payload: Value,
    #[case] expected: StatusCode,
    #[case] kind: &str,
) {
    let (status, body) = send(&app(), "POST", "/api/checkout", Some(payload)).await;
    assert_eq!(status, expected);
    assert_eq!(body["data"]["kind"], kind);
}

#[tokio::test]
async fn oversell_is_rejected_with_detail() {
    let app = app();
    let (_, body) = send(
        &app,
        "POST",
        "/api/products",
        Some(json!({ "name": "Roti", "price": 16000, "stock": 3 })),
    )
    .await;
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/checkout",
        Some(json!({ "items": [{ "product_id": id, "quantity": 5 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["data"]["error"],
        "insufficient stock for product Roti (available: 3, requested: 5)"
    );

    let (_, body) = send(&app, "GET", &format!("/api/products/{id}"), None).await;
    assert_eq!(body["data"]["stock"], 3);
}

#[tokio::test]
async fn product_filters_and_partial_update() {
    let app = app();
    for (name, active) in [("Indomie Goreng", true), ("Indomie Soto", false), ("Kopi", true)] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/products",
            Some(json!({ "name": name, "price": 3000, "stock": 5, "active": active })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send(&app, "GET", "/api/products?name=indomie&active=true", None).await;
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Indomie Goreng");

    let (status, body) = send(&app, "PUT", "/api/products/3", Some(json!({ "price": 2500 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"], 2500);
    assert_eq!(body["data"]["name"], "Kopi");

    let (status, body) = send(&app, "PUT", "/api/products/3", Some(json!({ "price": -1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["error"], "price must not be negative");

    let (status, _) = send(&app, "DELETE", "/api/products/3", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, "GET", "/api/products/3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"]["error"], "product id 3 not found");
}

#[tokio::test]
async fn deleted_category_is_dropped_from_products() {
    let app = app();
    let (_, body) = send(&app, "POST", "/api/categories", Some(json!({ "name": "Minuman" }))).await;
    let category_id = body["data"]["id"].as_i64().unwrap();
    let (_, body) = send(
        &app,
        "POST",
        "/api/products",
        Some(json!({ "name": "Teh", "price": 5000, "stock": 5, "category_id": category_id })),
    )
    .await;
    let product_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = send(&app, "DELETE", &format!("/api/categories/{category_id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", &format!("/api/products/{product_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["category_id"], category_id);
    assert!(body["data"].get("category").is_none());
}

#[rstest]
#[case::missing_end("/api/report?start_date=2025-01-01", "start_date and end_date are required")]
#[case::inverted("/api/report?start_date=2025-02-01&end_date=2025-01-01", "start_date must not be after end_date")]
#[tokio::test]
async fn report_range_is_validated(#[case] uri: &str, #[case] message: &str) {
    let (status, body) = send(&app(), "GET", uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["error"], message);
}

#[tokio::test]
async fn report_over_empty_range_is_zero() {
    let (status, body) = send(
        &app(),
        "GET",
        "/api/report?start_date=2020-01-01&end_date=2020-01-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_revenue"], 0);
    assert_eq!(body["data"]["total_transaction"], 0);
    assert!(body["data"]["top_product"].is_null());
}

#[tokio::test]
async fn huge_page_number_yields_an_empty_page() {
    let (status, body) = send(
        &app(),
        "GET",
        "/api/transactions?page=9223372036854775807&per_page=100",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["meta"]["total"], 0);
}
