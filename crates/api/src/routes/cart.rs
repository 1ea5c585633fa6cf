//! Cart route handlers. All cart operations require a logged-in user.

use std::collections::HashMap;

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use clove_core::{CartItemId, ProductId};

use crate::db::cart::CartRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{CartEntry, CartItem, ProductWithImages};
use crate::routes::MessageResponse;
use crate::state::AppState;

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: Option<i32>,
}

/// One entry of a bulk quantity update.
#[derive(Debug, Deserialize)]
pub struct UpdateCartItem {
    pub cart_id: CartItemId,
    pub quantity: i32,
}

/// Bulk quantity update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateCartItemsRequest {
    pub items: Vec<UpdateCartItem>,
}

/// One entry of a bulk delete.
#[derive(Debug, Deserialize)]
pub struct DeleteCartItem {
    pub cart_id: CartItemId,
}

/// Bulk delete request body.
#[derive(Debug, Deserialize)]
pub struct DeleteCartItemsRequest {
    pub items: Vec<DeleteCartItem>,
}

/// `POST /cart` - add a product to the requesting user's cart.
///
/// Re-adding a product merges into the existing row: the quantities add up
/// through a single upsert.
#[instrument(skip(state, body))]
pub async fn add(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<CartItem>> {
    let products = ProductRepository::new(state.pool());
    if products.get(body.product_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "product {}",
            body.product_id
        )));
    }

    let item = CartRepository::new(state.pool())
        .upsert_item(user_id, body.product_id, body.quantity.unwrap_or(1))
        .await?;

    Ok(Json(item))
}

/// `GET /cart` and `GET /cart/user` - the requesting user's cart with
/// product and image data.
#[instrument(skip(state))]
pub async fn list(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CartEntry>>> {
    let items = CartRepository::new(state.pool())
        .list_for_user(user_id)
        .await?;

    let products = ProductRepository::new(state.pool());
    let product_ids: Vec<ProductId> = items.iter().map(|i| i.product_id).collect();

    let mut by_id: HashMap<i32, ProductWithImages> = products
        .get_many(&product_ids)
        .await?
        .into_iter()
        .map(|p| {
            (
                p.product_id.as_i32(),
                ProductWithImages {
                    product: p,
                    images: Vec::new(),
                },
            )
        })
        .collect();

    for image in products.images_for_products(&product_ids).await? {
        if let Some(entry) = by_id.get_mut(&image.product_id.as_i32()) {
            entry.images.push(image);
        }
    }

    let entries = items
        .into_iter()
        .filter_map(|item| {
            by_id
                .get(&item.product_id.as_i32())
                .cloned()
                .map(|product| CartEntry { item, product })
        })
        .collect();

    Ok(Json(entries))
}

/// `PUT /cart/update-multiple` - set quantities for several cart items.
///
/// Items are processed in order; the first item that is missing or owned by
/// someone else aborts the rest. Items updated before the failure stay
/// updated.
#[instrument(skip(state, body))]
pub async fn update_multiple(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<UpdateCartItemsRequest>,
) -> Result<Json<MessageResponse>> {
    let cart = CartRepository::new(state.pool());

    for item in &body.items {
        cart.set_quantity(user_id, item.cart_id, item.quantity)
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::NotFound => {
                    AppError::NotFound(format!("cart item {}", item.cart_id))
                }
                other => AppError::Database(other),
            })?;
    }

    Ok(MessageResponse::json("Cart updated successfully"))
}

/// `DELETE /cart/delete-multiple` - remove several cart items.
///
/// Same ordering and partial-failure behavior as the bulk update.
#[instrument(skip(state, body))]
pub async fn delete_multiple(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<DeleteCartItemsRequest>,
) -> Result<Json<MessageResponse>> {
    let cart = CartRepository::new(state.pool());

    for item in &body.items {
        cart.delete_item(user_id, item.cart_id)
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::NotFound => {
                    AppError::NotFound(format!("cart item {}", item.cart_id))
                }
                other => AppError::Database(other),
            })?;
    }

    Ok(MessageResponse::json("Cart items deleted successfully"))
}
