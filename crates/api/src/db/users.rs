//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use clove_core::{Email, PageParams, Role, UserId};

use super::RepositoryError;
use crate::models::User;

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    user_id: i32,
    email: String,
    full_name: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    role: Role,
    is_visible: bool,
    avatar: Option<String>,
    creation_date: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            user_id: UserId::new(row.user_id),
            email,
            full_name: row.full_name,
            phone: row.phone,
            address: row.address,
            role: row.role,
            is_visible: row.is_visible,
            avatar: row.avatar,
            creation_date: row.creation_date,
        })
    }
}

/// Fields for a new user record. The password arrives pre-hashed.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub email: &'a Email,
    pub password_hash: &'a str,
    pub full_name: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub role: Role,
}

/// Optional profile updates; `None` leaves the column unchanged.
#[derive(Debug, Default)]
pub struct UserUpdate<'a> {
    pub full_name: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub password_hash: Option<&'a str>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT user_id, email, full_name, phone, address, role,
                   is_visible, avatar, creation_date
            FROM users
            WHERE user_id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT user_id, email, full_name, phone, address, role,
                   is_visible, avatar, creation_date
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user together with their stored password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct WithHash {
            #[sqlx(flatten)]
            user: UserRow,
            password: String,
        }

        let row = sqlx::query_as::<_, WithHash>(
            r"
            SELECT user_id, email, full_name, phone, address, role,
                   is_visible, avatar, creation_date, password
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((r.user.try_into()?, r.password))).transpose()
    }

    /// Look up only a user's role, for authorization checks.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_role(&self, id: UserId) -> Result<Option<Role>, RepositoryError> {
        let role = sqlx::query_scalar::<_, Role>(
            r"
            SELECT role
            FROM users
            WHERE user_id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(role)
    }

    /// Get all users in a set of IDs, for batch joins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_many(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError> {
        let raw: Vec<i32> = ids.iter().map(UserId::as_i32).collect();

        let rows = sqlx::query_as::<_, UserRow>(
            r"
            SELECT user_id, email, full_name, phone, address, role,
                   is_visible, avatar, creation_date
            FROM users
            WHERE user_id = ANY($1)
            ",
        )
        .bind(&raw)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_user: NewUser<'_>) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (email, password, full_name, phone, address, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING user_id, email, full_name, phone, address, role,
                      is_visible, avatar, creation_date
            ",
        )
        .bind(new_user.email.as_str())
        .bind(new_user.password_hash)
        .bind(new_user.full_name)
        .bind(new_user.phone)
        .bind(new_user.address)
        .bind(new_user.role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "email already exists"))?;

        row.try_into()
    }

    /// List all users, visible accounts first, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r"
            SELECT user_id, email, full_name, phone, address, role,
                   is_visible, avatar, creation_date
            FROM users
            ORDER BY is_visible DESC, creation_date DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// One page of users with the given role, plus the total count for that
    /// role. Visible accounts first, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn paginate_by_role(
        &self,
        role: Role,
        params: PageParams,
    ) -> Result<(Vec<User>, i64), RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r"
            SELECT user_id, email, full_name, phone, address, role,
                   is_visible, avatar, creation_date
            FROM users
            WHERE role = $1
            ORDER BY is_visible DESC, creation_date DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(role)
        .bind(params.page_size())
        .bind(params.offset())
        .fetch_all(self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM users
            WHERE role = $1
            ",
        )
        .bind(role)
        .fetch_one(self.pool)
        .await?;

        let users = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((users, total))
    }

    /// Find users whose name contains the given fragment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn search_by_name(&self, fragment: &str) -> Result<Vec<User>, RepositoryError> {
        let pattern = format!("%{}%", fragment.replace('%', r"\%").replace('_', r"\_"));

        let rows = sqlx::query_as::<_, UserRow>(
            r"
            SELECT user_id, email, full_name, phone, address, role,
                   is_visible, avatar, creation_date
            FROM users
            WHERE full_name ILIKE $1
            ORDER BY is_visible DESC, creation_date DESC
            ",
        )
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Update a user's profile fields; `None` fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        id: UserId,
        update: UserUpdate<'_>,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                address = COALESCE($4, address),
                password = COALESCE($5, password)
            WHERE user_id = $1
            RETURNING user_id, email, full_name, phone, address, role,
                      is_visible, avatar, creation_date
            ",
        )
        .bind(id.as_i32())
        .bind(update.full_name)
        .bind(update.phone)
        .bind(update.address)
        .bind(update.password_hash)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Update a user's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_role(&self, id: UserId, role: Role) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE users
            SET role = $2
            WHERE user_id = $1
            RETURNING user_id, email, full_name, phone, address, role,
                      is_visible, avatar, creation_date
            ",
        )
        .bind(id.as_i32())
        .bind(role)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Overwrite a user's stored password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET password = $2
            WHERE user_id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Flip a user's visibility flag in a single atomic update.
    ///
    /// Returns the new visibility value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn toggle_visibility(&self, id: UserId) -> Result<bool, RepositoryError> {
        let visible = sqlx::query_scalar::<_, bool>(
            r"
            UPDATE users
            SET is_visible = NOT is_visible
            WHERE user_id = $1
            RETURNING is_visible
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(visible)
    }

    /// Store a new avatar file name for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_avatar(&self, id: UserId, avatar: &str) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE users
            SET avatar = $2
            WHERE user_id = $1
            RETURNING user_id, email, full_name, phone, address, role,
                      is_visible, avatar, creation_date
            ",
        )
        .bind(id.as_i32())
        .bind(avatar)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM users
            WHERE user_id = $1
            ",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
