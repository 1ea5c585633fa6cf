//! Integration tests for the cart merge invariant.
//!
//! These tests require a running API server, `PostgreSQL` with migrations
//! applied, and at least one seeded product (cargo run -p clove-cli -- seed).
//!
//! Run with: cargo test -p clove-integration-tests -- --ignored

use clove_integration_tests::{api_base_url, client, login, signup_test_user};
use reqwest::StatusCode;
use serde_json::{Value, json};

/// Grab any product id from the catalog.
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

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_adding_same_product_twice_merges_quantities() {
    let client = client();
    let (email, password) = signup_test_user(&client).await;
    let token = login(&client, &email, &password).await;
    let product_id = some_product_id(&client).await;

    for quantity in [2, 3] {
        let resp = client
            .post(format!("{}/cart", api_base_url()))
            .bearer_auth(&token)
            .json(&json!({ "product_id": product_id, "quantity": quantity }))
            .send()
            .await
            .expect("request failed");
        assert!(resp.status().is_success());
    }

    let cart: Value = client
        .get(format!("{}/cart", api_base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("not JSON");

    let entries = cart.as_array().expect("cart is not an array");
    let matching: Vec<&Value> = entries
        .iter()
        .filter(|e| e["product_id"].as_i64() == Some(product_id))
        .collect();

    // One row per (user, product), quantities summed.
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0]["quantity"].as_i64(), Some(5));
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_add_unknown_product_is_not_found() {
    let client = client();
    let (email, password) = signup_test_user(&client).await;
    let token = login(&client, &email, &password).await;

    let resp = client
        .post(format!("{}/cart", api_base_url()))
        .bearer_auth(&token)
        .json(&json!({ "product_id": 999_999 }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_update_multiple_rejects_foreign_items() {
    let client = client();

    // User A owns a cart item; user B tries to update it.
    let (email_a, password_a) = signup_test_user(&client).await;
    let token_a = login(&client, &email_a, &password_a).await;
    let product_id = some_product_id(&client).await;

    let item: Value = client
        .post(format!("{}/cart", api_base_url()))
        .bearer_auth(&token_a)
        .json(&json!({ "product_id": product_id }))
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("not JSON");
    let cart_id = item["cart_id"].as_i64().expect("no cart_id");

    let (email_b, password_b) = signup_test_user(&client).await;
    let token_b = login(&client, &email_b, &password_b).await;

    let resp = client
        .put(format!("{}/cart/update-multiple", api_base_url()))
        .bearer_auth(&token_b)
        .json(&json!({ "items": [{ "cart_id": cart_id, "quantity": 9 }] }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_pagination_invariant() {
    let client = client();

    let page: Value = client
        .get(format!("{}/product/pagination?page=1&pageSize=3", api_base_url()))
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("not JSON");

    let data = page["data"].as_array().expect("no data array");
    assert!(data.len() <= 3);
    assert!(page["total_pages"].as_i64().expect("no total_pages") >= 0);

    // Non-numeric parameters fall back to the defaults instead of failing.
    let resp = client
        .get(format!(
            "{}/product/pagination?page=abc&pageSize=xyz",
            api_base_url()
        ))
        .send()
        .await
        .expect("request failed");
    assert!(resp.status().is_success());
}
