//! Authentication middleware and extractors.
//!
//! Handlers receive the caller's identity through these extractors; the
//! resolved `UserId` is then passed explicitly into every service and
//! repository call.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use clove_core::UserId;

use crate::error::AppError;
use crate::services::token::TokenPurpose;
use crate::state::AppState;

/// Extractor that requires a valid login token.
///
/// Rejects the request with 401 when the `Authorization: Bearer` header is
/// missing or its token fails verification.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     CurrentUser(user_id): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, user {user_id}!")
/// }
/// ```
pub struct CurrentUser(pub UserId);

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Not logged in".to_string()))?;

        let user_id = state
            .tokens()
            .verify(token, TokenPurpose::Login)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(Self(user_id))
    }
}

/// Extractor that optionally resolves the current user.
///
/// Unlike `CurrentUser`, this does not reject the request when the caller is
/// anonymous or carries an invalid token.
pub struct OptionalUser(pub Option<UserId>);

impl<S> FromRequestParts<S> for OptionalUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let user_id = bearer_token(parts)
            .and_then(|token| state.tokens().verify(token, TokenPurpose::Login).ok());

        Ok(Self(user_id))
    }
}

/// Pull the token out of the `Authorization: Bearer` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
