//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! clove-cli admin create -e admin@example.com -n "Admin Name" -p <password>
//! ```
//!
//! # Environment Variables
//!
//! - `CLOVE_DATABASE_URL` - `PostgreSQL` connection string

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::info;

use clove_api::db::users::{NewUser, UserRepository};
use clove_api::services::auth::{hash_password, validate_password};
use clove_core::{Email, Role};

use super::{CommandError, database_url};

/// Create a new admin user.
///
/// # Errors
///
/// Returns an error if the email or password is invalid, the email is
/// already registered, or the database is unreachable.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<(), CommandError> {
    let email =
        Email::parse(email).map_err(|e| CommandError::InvalidInput(format!("email: {e}")))?;
    validate_password(password)
        .map_err(|e| CommandError::InvalidInput(format!("password: {e}")))?;
    let password_hash =
        hash_password(password).map_err(|e| CommandError::InvalidInput(e.to_string()))?;

    let database_url = database_url()?;
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let user = UserRepository::new(&pool)
        .create(NewUser {
            email: &email,
            password_hash: &password_hash,
            full_name: Some(name),
            phone: None,
            address: None,
            role: Role::Admin,
        })
        .await?;

    info!(user_id = %user.user_id, email = %user.email, "Admin user created");
    Ok(())
}
