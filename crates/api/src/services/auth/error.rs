//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::token::TokenError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] clove_core::EmailError),

    /// Invalid credentials (wrong password or unknown email).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Email is already registered.
    #[error("email already registered")]
    EmailTaken,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// No account for the given email (password-reset request).
    #[error("no account for that email")]
    UserNotFound,

    /// Reset token failed signature, expiry, or purpose verification.
    #[error("invalid or expired token")]
    InvalidOrExpiredToken,

    /// Token could not be signed.
    #[error("token error: {0}")]
    Token(TokenError),

    /// Reset email could not be delivered.
    #[error("email delivery failed: {0}")]
    EmailDelivery(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::InvalidOrExpired => Self::InvalidOrExpiredToken,
            TokenError::Signing(_) => Self::Token(e),
        }
    }
}
