//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (verifies database)
//!
//! # Auth
//! POST /auth/login                      - Login, returns {token, role}
//! POST /auth/signup                     - Register a customer account
//! POST /auth/send-reset-password-email  - Email a password-reset link
//! POST /auth/reset-password             - Complete a password reset
//!
//! # Users
//! GET    /user                          - List all users (admin)
//! GET    /user/pagination               - Page customers (admin)
//! GET    /user/pagination-admin         - Page admins (admin)
//! POST   /user                          - Create a user (admin)
//! GET    /user/user/{id}                - Fetch one user
//! GET    /user/search/{name}            - Search users by name (admin)
//! GET    /user/get-info                 - Own account (auth)
//! PUT    /user/update-user/{id}         - Update profile
//! PUT    /user/update-authorization/{id} - Change role (admin)
//! PUT    /user/hidden-user/{id}         - Toggle visibility (admin)
//! DELETE /user/{id}                     - Delete (admin, no self-delete)
//! POST   /user/{id}/upload-avatar       - Avatar upload (auth, multipart)
//! PUT    /user/upload                   - Avatar upload (auth, multipart)
//!
//! # Products
//! GET    /product                       - Whole catalog
//! GET    /product/get-product/{id}      - Product detail
//! GET    /product/pagination            - Page the catalog
//! GET    /product/search/{name}         - Name search
//! GET    /product/top-selling           - Top 5 by units sold
//! GET    /product/related-products/{id} - Related by category/supplier
//! GET    /product/popular               - Top 10 by popularity
//! GET    /product/top-promotions        - Top 10 active promotions
//! GET    /product/new-products          - 10 newest
//! POST   /product                       - Create (admin, multipart)
//! PUT    /product/{id}                  - Update (admin)
//! PUT    /product/update-pictures/{id}  - Replace images (admin, multipart)
//! PUT    /product/hidden-product/{id}   - Toggle visibility (admin)
//! DELETE /product/{id}                  - Delete (admin)
//!
//! # Cart (auth)
//! POST   /cart                  - Add/merge a product
//! GET    /cart                  - Own cart with products
//! GET    /cart/user             - Own cart with products
//! PUT    /cart/update-multiple  - Bulk quantity update
//! DELETE /cart/delete-multiple  - Bulk delete
//!
//! # Orders
//! POST /order/create-multiple   - Place a batch of orders (auth)
//! GET  /order                   - All orders (admin)
//! GET  /order/pagination        - Page all orders (auth)
//! GET  /order/my-orders         - Own orders (auth)
//! PUT  /order/update-status/{id} - Change status (admin)
//! GET  /order-detail            - All line items (admin)
//! GET  /order-detail/order/{id} - Line items by order (auth)
//! GET  /order-detail/user/{id}  - Line items by user (auth)
//! GET  /payment-detail          - All payment details (admin)
//! GET  /payment-detail/{id}     - One payment detail (auth)
//! GET  /shipping-detail         - All shipping details (admin)
//! GET  /shipping-detail/{id}    - One shipping detail (auth)
//! ```

pub mod auth;
pub mod cart;
pub mod order_details;
pub mod orders;
pub mod payment_details;
pub mod products;
pub mod shipping_details;
pub mod users;

use axum::{
    Json, Router,
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};

use clove_core::PageParams;

use crate::state::AppState;

/// Plain `{message}` response body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    /// Wrap a message in a JSON response.
    #[must_use]
    pub fn json(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Raw pagination query parameters.
///
/// Kept as strings so absent or non-numeric values fall back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    #[serde(alias = "pageSize")]
    pub page_size: Option<String>,
}

impl PageQuery {
    /// Sanitize into [`PageParams`].
    #[must_use]
    pub fn params(&self) -> PageParams {
        PageParams::from_query(self.page.as_deref(), self.page_size.as_deref())
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .route(
            "/send-reset-password-email",
            post(auth::send_reset_password_email),
        )
        .route("/reset-password", post(auth::reset_password))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_all).post(users::create))
        .route("/pagination", get(users::paginate_customers))
        .route("/pagination-admin", get(users::paginate_admins))
        .route("/user/{id}", get(users::get_by_id))
        .route("/search/{name}", get(users::search))
        .route("/get-info", get(users::get_my_info))
        .route("/update-user/{id}", put(users::update))
        .route("/update-authorization/{id}", put(users::update_role))
        .route("/hidden-user/{id}", put(users::toggle_visibility))
        .route("/{id}", delete(users::delete))
        .route("/{id}/upload-avatar", post(users::upload_avatar))
        .route("/upload", put(users::upload_avatar))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list_all).post(products::create))
        .route("/get-product/{id}", get(products::get_detail))
        .route("/pagination", get(products::paginate))
        .route("/search/{name}", get(products::search))
        .route("/top-selling", get(products::top_selling))
        .route("/related-products/{id}", get(products::related))
        .route("/popular", get(products::popular))
        .route("/top-promotions", get(products::top_promotions))
        .route("/new-products", get(products::newest))
        .route("/update-pictures/{id}", put(products::update_pictures))
        .route("/hidden-product/{id}", put(products::toggle_visibility))
        .route("/{id}", put(products::update).delete(products::delete))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::list).post(cart::add))
        .route("/user", get(cart::list))
        .route("/update-multiple", put(cart::update_multiple))
        .route("/delete-multiple", delete(cart::delete_multiple))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list_all))
        .route("/create-multiple", post(orders::create_multiple))
        .route("/pagination", get(orders::paginate))
        .route("/my-orders", get(orders::my_orders))
        .route("/update-status/{id}", put(orders::update_status))
}

/// Create the order-detail routes router.
pub fn order_detail_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(order_details::list_all))
        .route("/order/{id}", get(order_details::by_order))
        .route("/user/{id}", get(order_details::by_user))
}

/// Create the payment-detail routes router.
pub fn payment_detail_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(payment_details::list_all))
        .route("/{id}", get(payment_details::get_by_id))
}

/// Create the shipping-detail routes router.
pub fn shipping_detail_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(shipping_details::list_all))
        .route("/{id}", get(shipping_details::get_by_id))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/user", user_routes())
        .nest("/product", product_routes())
        .nest("/cart", cart_routes())
        .nest("/order", order_routes())
        .nest("/order-detail", order_detail_routes())
        .nest("/payment-detail", payment_detail_routes())
        .nest("/shipping-detail", shipping_detail_routes())
}
