//! User management route handlers.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use clove_core::{Page, Role, UserId};

use crate::db::users::{NewUser, UserRepository, UserUpdate};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::User;
use crate::routes::{MessageResponse, PageQuery};
use crate::services::auth::{hash_password, validate_password};
use crate::services::authz::require_admin;
use crate::services::uploads;
use crate::state::AppState;

/// Admin create-user request body.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
}

/// Profile update request body; absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub password: Option<String>,
}

/// Role change request body.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// `GET /user` - list all users (admin).
#[instrument(skip(state))]
pub async fn list_all(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>> {
    require_admin(state.pool(), user_id).await?;

    let users = UserRepository::new(state.pool()).list_all().await?;
    Ok(Json(users))
}

/// `GET /user/pagination` - page through customer accounts (admin).
#[instrument(skip(state))]
pub async fn paginate_customers(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<User>>> {
    require_admin(state.pool(), user_id).await?;

    let params = query.params();
    let (users, total) = UserRepository::new(state.pool())
        .paginate_by_role(Role::Customer, params)
        .await?;

    Ok(Json(Page::new(users, params, total)))
}

/// `GET /user/pagination-admin` - page through admin accounts (admin).
#[instrument(skip(state))]
pub async fn paginate_admins(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<User>>> {
    require_admin(state.pool(), user_id).await?;

    let params = query.params();
    let (users, total) = UserRepository::new(state.pool())
        .paginate_by_role(Role::Admin, params)
        .await?;

    Ok(Json(Page::new(users, params, total)))
}

/// `POST /user` - create a user (admin).
#[instrument(skip(state, body))]
pub async fn create(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<Json<User>> {
    require_admin(state.pool(), user_id).await?;

    let email = clove_core::Email::parse(&body.email)
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;
    validate_password(&body.password)?;
    let password_hash = hash_password(&body.password)?;

    let user = UserRepository::new(state.pool())
        .create(NewUser {
            email: &email,
            password_hash: &password_hash,
            full_name: body.full_name.as_deref(),
            phone: body.phone.as_deref(),
            address: body.address.as_deref(),
            role: body.role.unwrap_or(Role::Customer),
        })
        .await?;

    Ok(Json(user))
}

/// `GET /user/user/{id}` - fetch one user by id.
#[instrument(skip(state))]
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<User>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(UserId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;

    Ok(Json(user))
}

/// `GET /user/search/{name}` - search users by name (admin).
#[instrument(skip(state))]
pub async fn search(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<User>>> {
    require_admin(state.pool(), user_id).await?;

    let users = UserRepository::new(state.pool())
        .search_by_name(&name)
        .await?;
    Ok(Json(users))
}

/// `GET /user/get-info` - the requesting user's own record.
#[instrument(skip(state))]
pub async fn get_my_info(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<User>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("account".to_string()))?;

    Ok(Json(user))
}

/// `PUT /user/update-user/{id}` - update profile fields.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<User>> {
    // Re-hash when a new password is supplied.
    let password_hash = match body.password.as_deref() {
        Some(password) => {
            validate_password(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let user = UserRepository::new(state.pool())
        .update_profile(
            UserId::new(id),
            UserUpdate {
                full_name: body.full_name.as_deref(),
                phone: body.phone.as_deref(),
                address: body.address.as_deref(),
                password_hash: password_hash.as_deref(),
            },
        )
        .await?;

    Ok(Json(user))
}

/// `PUT /user/update-authorization/{id}` - change a user's role (admin).
#[instrument(skip(state, body))]
pub async fn update_role(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<Json<User>> {
    require_admin(state.pool(), user_id).await?;

    let user = UserRepository::new(state.pool())
        .update_role(UserId::new(id), body.role)
        .await?;

    Ok(Json(user))
}

/// `PUT /user/hidden-user/{id}` - toggle a user's visibility (admin).
#[instrument(skip(state))]
pub async fn toggle_visibility(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>> {
    require_admin(state.pool(), user_id).await?;

    let visible = UserRepository::new(state.pool())
        .toggle_visibility(UserId::new(id))
        .await?;

    let message = if visible {
        "User is now visible"
    } else {
        "User is now hidden"
    };
    Ok(MessageResponse::json(message))
}

/// `DELETE /user/{id}` - delete a user (admin; self-delete is refused).
#[instrument(skip(state))]
pub async fn delete(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>> {
    let target = UserId::new(id);

    // Self-delete is checked before the role gate, matching the message a
    // caller sees when both would apply.
    if target == user_id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    require_admin(state.pool(), user_id).await?;

    UserRepository::new(state.pool()).delete(target).await?;

    Ok(MessageResponse::json("User deleted successfully"))
}

/// `PUT /user/upload` and `POST /user/{id}/upload-avatar` - store a new
/// avatar for the requesting user (multipart field `avatar`).
#[instrument(skip(state, multipart))]
pub async fn upload_avatar(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<User>> {
    let mut stored: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("avatar") {
            continue;
        }

        let original = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;

        let dir = state.config().upload_dir.join("avatar");
        stored = Some(uploads::save_file(&dir, &original, &data).await?);
        break;
    }

    let avatar =
        stored.ok_or_else(|| AppError::BadRequest("avatar file is required".to_string()))?;

    let user = UserRepository::new(state.pool())
        .update_avatar(user_id, &avatar)
        .await?;

    Ok(Json(user))
}
