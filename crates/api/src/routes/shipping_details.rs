//! Shipping-detail read handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use clove_core::ShippingDetailId;

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::ShippingDetail;
use crate::services::authz::require_admin;
use crate::state::AppState;

/// `GET /shipping-detail` - all shipping details (admin).
#[instrument(skip(state))]
pub async fn list_all(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ShippingDetail>>> {
    require_admin(state.pool(), user_id).await?;

    let details = OrderRepository::new(state.pool()).shipping_list().await?;
    Ok(Json(details))
}

/// `GET /shipping-detail/{id}` - one shipping detail.
#[instrument(skip(state))]
pub async fn get_by_id(
    CurrentUser(_user_id): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ShippingDetail>> {
    let detail = OrderRepository::new(state.pool())
        .shipping_get(ShippingDetailId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("shipping detail {id}")))?;

    Ok(Json(detail))
}
