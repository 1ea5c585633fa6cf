//! Order line-item read handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use clove_core::{OrderId, UserId};

use crate::db::orders::OrderRepository;
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::OrderDetailExpanded;
use crate::services::authz::require_admin;
use crate::state::AppState;

/// `GET /order-detail` - all line items across all orders (admin).
#[instrument(skip(state))]
pub async fn list_all(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderDetailExpanded>>> {
    require_admin(state.pool(), user_id).await?;

    let details = OrderRepository::new(state.pool()).details_all().await?;
    Ok(Json(details))
}

/// `GET /order-detail/order/{id}` - line items of one order.
#[instrument(skip(state))]
pub async fn by_order(
    CurrentUser(_user_id): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<OrderDetailExpanded>>> {
    let details = OrderRepository::new(state.pool())
        .details_for_order(OrderId::new(id))
        .await?;
    Ok(Json(details))
}

/// `GET /order-detail/user/{id}` - line items of all orders placed by a user.
#[instrument(skip(state))]
pub async fn by_user(
    CurrentUser(_user_id): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<OrderDetailExpanded>>> {
    let details = OrderRepository::new(state.pool())
        .details_for_user(UserId::new(id))
        .await?;
    Ok(Json(details))
}
