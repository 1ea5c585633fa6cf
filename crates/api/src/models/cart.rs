//! Cart domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use clove_core::{CartItemId, ProductId, UserId};

use super::product::ProductWithImages;

/// One cart line item.
///
/// At most one row exists per (user, product) pair; re-adding the same
/// product merges into the existing row.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub cart_id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub added_date: DateTime<Utc>,
}

/// A cart line item joined with its product and images.
#[derive(Debug, Clone, Serialize)]
pub struct CartEntry {
    #[serde(flatten)]
    pub item: CartItem,
    pub product: ProductWithImages,
}
