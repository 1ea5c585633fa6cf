//! Payment-detail read handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use clove_core::PaymentDetailId;

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::PaymentDetailWithOrder;
use crate::services::authz::require_admin;
use crate::state::AppState;

/// `GET /payment-detail` - all payment details with orders and users (admin).
#[instrument(skip(state))]
pub async fn list_all(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentDetailWithOrder>>> {
    require_admin(state.pool(), user_id).await?;

    let payments = OrderRepository::new(state.pool())
        .payments_with_orders()
        .await?;
    Ok(Json(payments))
}

/// `GET /payment-detail/{id}` - one payment detail with its order and user.
#[instrument(skip(state))]
pub async fn get_by_id(
    CurrentUser(_user_id): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PaymentDetailWithOrder>> {
    let payment = OrderRepository::new(state.pool())
        .payment_with_order(PaymentDetailId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("payment detail {id}")))?;

    Ok(Json(payment))
}
