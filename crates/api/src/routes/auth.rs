//! Authentication route handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use clove_core::Role;

use crate::error::Result;
use crate::models::User;
use crate::routes::MessageResponse;
use crate::services::auth::{AuthService, SignupProfile};
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: the bearer token and the account role.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

/// Signup request body.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Password-reset request body.
#[derive(Debug, Deserialize)]
pub struct SendResetRequest {
    pub email: String,
}

/// Password-reset completion body.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// `POST /auth/login`
#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let auth = auth_service(&state);
    let (token, role) = auth.login(&body.email, &body.password).await?;

    Ok(Json(LoginResponse { token, role }))
}

/// `POST /auth/signup`
#[instrument(skip(state, body))]
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<Json<User>> {
    let auth = auth_service(&state);
    let user = auth
        .signup(
            &body.email,
            &body.password,
            SignupProfile {
                full_name: body.full_name.as_deref(),
                phone: body.phone.as_deref(),
                address: body.address.as_deref(),
            },
        )
        .await?;

    Ok(Json(user))
}

/// `POST /auth/send-reset-password-email`
#[instrument(skip(state, body))]
pub async fn send_reset_password_email(
    State(state): State<AppState>,
    Json(body): Json<SendResetRequest>,
) -> Result<Json<MessageResponse>> {
    let auth = auth_service(&state);
    auth.request_password_reset(&body.email).await?;

    Ok(MessageResponse::json("Password reset email sent"))
}

/// `POST /auth/reset-password`
#[instrument(skip(state, body))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    let auth = auth_service(&state);
    auth.reset_password(&body.token, &body.new_password).await?;

    Ok(MessageResponse::json("Password reset successfully"))
}

fn auth_service(state: &AppState) -> AuthService<'_> {
    AuthService::new(
        state.pool(),
        state.tokens(),
        state.email(),
        &state.config().base_url,
    )
}
