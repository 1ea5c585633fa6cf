//! Integration tests for the order placement workflow.
//!
//! These tests require a running API server, `PostgreSQL` with migrations
//! applied, and seeded products (cargo run -p clove-cli -- seed).
//!
//! Run with: cargo test -p clove-integration-tests -- --ignored

use clove_integration_tests::{api_base_url, client, login, signup_test_user};
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn some_product_id(client: &reqwest::Client) -> i64 {
    let products: Value = client
        .get(format!("{}/product", api_base_url()))
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("not JSON");

    products
        .as_array()
        .and_then(|p| p.first())
        .and_then(|p| p["product_id"].as_i64())
        .expect("catalog is empty; run `clove-cli seed` first")
}

fn order_payload(product_id: i64, with_payment: bool) -> Value {
    let mut payload = json!({
        "order_date": "2026-08-01T10:00:00Z",
        "status": "pending",
        "total_amount": "25.00",
        "details": [
            { "product_id": product_id, "quantity": 2, "price": "12.50" }
        ],
        "shipping_detail": {
            "shipping_address": "12 Vine Street, Springfield"
        }
    });
    if with_payment {
        payload["payment_detail"] = json!({
            "amount": "25.00",
            "payment_method": "card",
            "payment_status": "paid"
        });
    }
    payload
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_order_creation_returns_all_dependent_records() {
    let client = client();
    let (email, password) = signup_test_user(&client).await;
    let token = login(&client, &email, &password).await;
    let product_id = some_product_id(&client).await;

    let resp = client
        .post(format!("{}/order/create-multiple", api_base_url()))
        .bearer_auth(&token)
        .json(&json!({ "orders": [order_payload(product_id, true)] }))
        .send()
        .await
        .expect("request failed");
    assert!(resp.status().is_success());

    let body: Value = resp.json().await.expect("not JSON");
    let orders = body["orders"].as_array().expect("no orders array");
    assert_eq!(orders.len(), 1);

    // The order never exists without its dependent records.
    let order = &orders[0];
    assert_eq!(order["details"].as_array().map(Vec::len), Some(1));
    assert!(order["payment_detail"]["payment_id"].is_number());
    assert!(order["shipping_detail"]["shipping_id"].is_number());
    assert_eq!(order["product_ids"][0].as_i64(), Some(product_id));
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_batch_partial_failure_keeps_prefix_and_names_position() {
    let client = client();
    let (email, password) = signup_test_user(&client).await;
    let token = login(&client, &email, &password).await;
    let product_id = some_product_id(&client).await;

    // Order 2 is missing its payment detail; order 3 must never be attempted.
    let batch = json!({
        "orders": [
            order_payload(product_id, true),
            order_payload(product_id, false),
            order_payload(product_id, true),
        ]
    });

    let resp = client
        .post(format!("{}/order/create-multiple", api_base_url()))
        .bearer_auth(&token)
        .json(&batch)
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("not JSON");
    let message = body["message"].as_str().expect("no message");
    assert!(message.contains("order 2"), "message was: {message}");

    // Order 1 stays committed: exactly one order exists for this user.
    let mine: Value = client
        .get(format!("{}/order/my-orders", api_base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("not JSON");
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_create_orders_requires_login() {
    let client = client();
    let product_id = 1;

    let resp = client
        .post(format!("{}/order/create-multiple", api_base_url()))
        .json(&json!({ "orders": [order_payload(product_id, true)] }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_order_listing_is_admin_gated() {
    let client = client();
    let (email, password) = signup_test_user(&client).await;
    let token = login(&client, &email, &password).await;

    let resp = client
        .get(format!("{}/order", api_base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
