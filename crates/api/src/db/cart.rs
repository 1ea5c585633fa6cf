//! Cart repository.
//!
//! The cart table is unique per (user, product); adding a product that is
//! already in the cart folds into the existing row via an upsert, so the
//! merge needs no prior read.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use clove_core::{CartItemId, ProductId, UserId};

use super::RepositoryError;
use crate::models::CartItem;

/// Internal row type for cart queries.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    cart_id: i32,
    user_id: i32,
    product_id: i32,
    quantity: i32,
    added_date: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            cart_id: CartItemId::new(row.cart_id),
            user_id: UserId::new(row.user_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            added_date: row.added_date,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a product to a user's cart, merging into an existing row.
    ///
    /// A single upsert backed by the (user, product) unique constraint:
    /// inserting a duplicate increments the stored quantity instead.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            r"
            INSERT INTO cart (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = cart.quantity + EXCLUDED.quantity
            RETURNING cart_id, user_id, product_id, quantity, added_date
            ",
        )
        .bind(user_id.as_i32())
        .bind(product_id.as_i32())
        .bind(quantity)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// All cart items for one user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT cart_id, user_id, product_id, quantity, added_date
            FROM cart
            WHERE user_id = $1
            ORDER BY added_date
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Set the quantity of one cart item, verifying ownership.
    ///
    /// The ownership check is part of the update predicate; a missing row or
    /// a row belonging to another user both surface as `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no owned row matched.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        cart_id: CartItemId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE cart
            SET quantity = $3
            WHERE cart_id = $1 AND user_id = $2
            ",
        )
        .bind(cart_id.as_i32())
        .bind(user_id.as_i32())
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete one cart item, verifying ownership.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no owned row matched.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete_item(
        &self,
        user_id: UserId,
        cart_id: CartItemId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM cart
            WHERE cart_id = $1 AND user_id = $2
            ",
        )
        .bind(cart_id.as_i32())
        .bind(user_id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
