//! Role authorization guard.
//!
//! Admin-gated mutations call [`require_admin`] first, before touching any
//! data. The guard is a fresh role lookup on every call; identity arrives
//! explicitly as the resolved `UserId`, never from ambient request state.

use sqlx::PgPool;
use thiserror::Error;

use clove_core::UserId;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;

/// Errors from authorization checks.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Requesting user is missing or not an admin.
    #[error("admin role required")]
    Forbidden,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Fail with `Forbidden` unless the user exists and has the admin role.
///
/// # Errors
///
/// Returns `AuthzError::Forbidden` if the user is absent or not an admin.
/// Returns `AuthzError::Repository` if the lookup fails.
pub async fn require_admin(pool: &PgPool, user_id: UserId) -> Result<(), AuthzError> {
    let role = UserRepository::new(pool).get_role(user_id).await?;

    match role {
        Some(role) if role.is_admin() => Ok(()),
        _ => Err(AuthzError::Forbidden),
    }
}
