//! Authentication service.
//!
//! Signup, login, and the password-reset token flow.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use clove_core::{Email, Role, UserId};

use crate::db::RepositoryError;
use crate::db::users::{NewUser, UserRepository};
use crate::models::User;
use crate::services::email::EmailService;
use crate::services::token::{TokenPurpose, TokenService};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Profile fields accepted at signup.
#[derive(Debug, Default)]
pub struct SignupProfile<'a> {
    pub full_name: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
}

/// Authentication service.
///
/// Handles registration, login token issuance, and password resets.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenService,
    email: Option<&'a EmailService>,
    base_url: &'a str,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        pool: &'a PgPool,
        tokens: &'a TokenService,
        email: Option<&'a EmailService>,
        base_url: &'a str,
    ) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
            email,
            base_url,
        }
    }

    /// Register a new customer account.
    ///
    /// The unique email constraint is the only duplicate check; a violation
    /// surfaces as `EmailTaken` without a prior read.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        profile: SignupProfile<'_>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(NewUser {
                email: &email,
                password_hash: &password_hash,
                full_name: profile.full_name,
                phone: profile.phone,
                address: profile.address,
                role: Role::Customer,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password, issuing a login token.
    ///
    /// Unknown email and wrong password produce the same error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, Role), AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = self.tokens.issue_login(user.user_id)?;

        Ok((token, user.role))
    }

    /// Issue a password-reset token and email the reset link.
    ///
    /// The token is not revoked if delivery fails.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account matches the email.
    /// Returns `AuthError::EmailDelivery` if the email cannot be sent.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let token = self.tokens.issue_password_reset(user.user_id)?;
        let reset_url = format!("{}/reset-password?token={token}", self.base_url);

        let mailer = self
            .email
            .ok_or_else(|| AuthError::EmailDelivery("email transport not configured".into()))?;

        mailer
            .send_password_reset(email.as_str(), &reset_url)
            .await
            .map_err(|e| AuthError::EmailDelivery(e.to_string()))?;

        Ok(())
    }

    /// Verify a reset token and overwrite the stored password hash.
    ///
    /// A valid unexpired token can be replayed; there is no single-use
    /// invalidation.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidOrExpiredToken` if verification fails.
    /// Returns `AuthError::WeakPassword` if the new password is too short.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let user_id = self.tokens.verify(token, TokenPurpose::PasswordReset)?;

        validate_password(new_password)?;
        let password_hash = hash_password(new_password)?;

        self.users
            .update_password(user_id, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::InvalidOrExpiredToken,
                other => AuthError::Repository(other),
            })?;

        Ok(())
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Validate password meets requirements.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_password_too_short() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
