//! End-to-end tests for the product and cart routes, driven through the
//! full router over the in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use mongodb::bson::{doc, Document};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

use ibos_backend::app::build_app;
use ibos_backend::state::AppState;
use ibos_backend::store::MemoryStore;

fn app_with_products(products: Vec<Document>) -> axum::Router {
    let store = Arc::new(MemoryStore::with_products(products));
    build_app(AppState::from_parts(store, AppState::fake().config))
}

async fn send_get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));

    (status, body)
}

async fn send_post(app: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));

    (status, body)
}

#[tokio::test]
async fn test_root_liveness() {
    let app = app_with_products(vec![]);

    let request = Request::builder()
        .method("GET")
        .uri("/")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"Server is running");
}

#[tokio::test]
async fn test_products_empty_collection_is_404() {
    let app = app_with_products(vec![]);

    let (status, body) = send_get(&app, "/products").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No products found");
}

#[tokio::test]
async fn test_products_returns_every_document() {
    let app = app_with_products(vec![
        doc! { "_id": "p1", "name": "Widget", "price": 10 },
        doc! { "_id": "p2", "name": "Gadget" },
        doc! { "_id": "p3" },
    ]);

    let (status, body) = send_get(&app, "/products").await;

    assert_eq!(status, StatusCode::OK);
    let products = body.as_array().unwrap();
    assert_eq!(products.len(), 3);
    assert_eq!(products[0]["name"], "Widget");
    assert_eq!(products[0]["price"], 10);
}

#[tokio::test]
async fn test_cart_add_requires_email_and_product() {
    let app = app_with_products(vec![]);

    let cases = [
        json!({}),
        json!({ "email": "a@x.com" }),
        json!({ "product": { "_id": "p1" } }),
        json!({ "email": "", "product": { "_id": "p1" } }),
    ];
    for payload in cases {
        let (status, body) = send_post(&app, "/cart", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Email and product data are required");
    }

    // None of the rejected calls stored anything.
    let (status, _) = send_get(&app, "/cart/a@x.com").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cart_add_then_duplicate_then_read() {
    let app = app_with_products(vec![]);
    let payload = json!({ "email": "a@x.com", "product": { "_id": "p1", "name": "Widget" } });

    let (status, body) = send_post(&app, "/cart", payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Product added to cart");
    assert_eq!(body["result"]["acknowledged"], true);
    assert!(!body["result"]["insertedId"].as_str().unwrap().is_empty());

    // Re-adding the same product is a no-op, not an error.
    let (status, body) = send_post(&app, "/cart", payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "You already added this product to the cart");
    assert!(body.get("result").is_none());

    let (status, body) = send_get(&app, "/cart/a@x.com").await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["userEmail"], "a@x.com");
    assert_eq!(entries[0]["quantity"], 1);
    assert_eq!(entries[0]["product"]["_id"], "p1");
    assert_eq!(entries[0]["product"]["name"], "Widget");
    assert!(!entries[0]["addedAt"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_cart_same_product_for_different_users() {
    let app = app_with_products(vec![]);
    let product = json!({ "_id": "p1", "name": "Widget" });

    let (status, _) = send_post(
        &app,
        "/cart",
        json!({ "email": "a@x.com", "product": product.clone() }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) =
        send_post(&app, "/cart", json!({ "email": "b@x.com", "product": product })).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send_get(&app, "/cart/b@x.com").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cart_read_unknown_email_is_404() {
    let app = app_with_products(vec![]);

    let (status, body) = send_get(&app, "/cart/nobody@x.com").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No items found in cart for this user");
}

#[tokio::test]
async fn test_cart_read_lists_only_matching_entries() {
    let app = app_with_products(vec![]);
    for (email, id) in [("a@x.com", "p1"), ("a@x.com", "p2"), ("b@x.com", "p3")] {
        let (status, _) = send_post(
            &app,
            "/cart",
            json!({ "email": email, "product": { "_id": id } }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send_get(&app, "/cart/a@x.com").await;

    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e["userEmail"] == "a@x.com"));
}
