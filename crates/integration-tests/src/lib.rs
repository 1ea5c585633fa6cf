//! Integration tests for Clove Market.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply migrations
//! cargo run -p clove-cli -- migrate
//!
//! # Start the API
//! cargo run -p clove-api
//!
//! # Run integration tests
//! cargo test -p clove-integration-tests -- --ignored
//! ```
//!
//! Every test is `#[ignore]`d because it needs a running API server and a
//! `PostgreSQL` database. `API_BASE_URL` overrides the default
//! `http://localhost:3000`.

use reqwest::Client;
use serde_json::Value;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A plain HTTP client.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> Client {
    Client::builder().build().expect("Failed to create HTTP client")
}

/// Sign up a throwaway account and return `(email, password)`.
///
/// # Panics
///
/// Panics if the signup request fails.
pub async fn signup_test_user(client: &Client) -> (String, String) {
    let email = format!("it-{}@clovemarket.test", uuid::Uuid::new_v4());
    let password = "integration-test-password".to_string();

    let resp = client
        .post(format!("{}/auth/signup", api_base_url()))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("signup request failed");
    assert!(resp.status().is_success(), "signup failed: {}", resp.status());

    (email, password)
}

/// Log in and return the bearer token.
///
/// # Panics
///
/// Panics if the login request fails or returns no token.
pub async fn login(client: &Client, email: &str, password: &str) -> String {
    let resp = client
        .post(format!("{}/auth/login", api_base_url()))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("login request failed");
    assert!(resp.status().is_success(), "login failed: {}", resp.status());

    let body: Value = resp.json().await.expect("login response was not JSON");
    body["token"]
        .as_str()
        .expect("login response carried no token")
        .to_string()
}
