//! Order route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use clove_core::{OrderId, OrderStatus, Page};

use crate::db::orders::OrderRepository;
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::{CreatedOrder, Order, OrderWithUser};
use crate::routes::PageQuery;
use crate::services::authz::require_admin;
use crate::services::orders::{OrderService, OrderSpec};
use crate::state::AppState;

/// Batch order creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateOrdersRequest {
    pub orders: Vec<OrderSpec>,
}

/// Batch order creation response.
#[derive(Debug, Serialize)]
pub struct CreatedOrdersResponse {
    pub message: String,
    pub orders: Vec<CreatedOrder>,
}

/// Order status change request body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// `POST /order/create-multiple` - place a batch of orders.
///
/// Orders are created strictly in input order, each in its own transaction.
/// On failure the committed prefix stays committed and the error names the
/// failing position.
#[instrument(skip(state, body))]
pub async fn create_multiple(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<CreateOrdersRequest>,
) -> Result<Json<CreatedOrdersResponse>> {
    let orders = OrderService::new(state.pool())
        .create_orders(user_id, body.orders)
        .await?;

    Ok(Json(CreatedOrdersResponse {
        message: "Orders placed successfully".to_string(),
        orders,
    }))
}

/// `GET /order` - all orders with their users (admin).
#[instrument(skip(state))]
pub async fn list_all(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderWithUser>>> {
    require_admin(state.pool(), user_id).await?;

    let orders = OrderRepository::new(state.pool())
        .list_all_with_users()
        .await?;
    Ok(Json(orders))
}

/// `GET /order/pagination` - page through all orders (requires login).
#[instrument(skip(state))]
pub async fn paginate(
    CurrentUser(_user_id): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<OrderWithUser>>> {
    let params = query.params();
    let (orders, total) = OrderRepository::new(state.pool())
        .paginate_with_users(params)
        .await?;

    Ok(Json(Page::new(orders, params, total)))
}

/// `GET /order/my-orders` - the requesting user's orders.
#[instrument(skip(state))]
pub async fn my_orders(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderWithUser>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user_id)
        .await?;
    Ok(Json(orders))
}

/// `PUT /order/update-status/{id}` - change an order's status (admin).
#[instrument(skip(state, body))]
pub async fn update_status(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    require_admin(state.pool(), user_id).await?;

    let order = OrderRepository::new(state.pool())
        .update_status(OrderId::new(id), body.status)
        .await?;

    Ok(Json(order))
}
