//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use clove_core::{Email, Role, UserId};

/// A user account (domain type).
///
/// The stored password hash deliberately never leaves the repository layer;
/// this type is safe to serialize into responses.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub user_id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name.
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Account role (customer or admin).
    pub role: Role,
    /// Whether the account is shown in listings.
    pub is_visible: bool,
    /// Stored avatar file name, if one was uploaded.
    pub avatar: Option<String>,
    /// When the account was created.
    pub creation_date: DateTime<Utc>,
}
