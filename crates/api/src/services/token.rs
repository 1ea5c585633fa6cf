//! Signed-token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the user id, an expiry, and a purpose.
//! Login tokens live for 10 days; password-reset tokens for 1 hour. The
//! purpose claim keeps a login token from being replayed against the
//! password-reset endpoint.
//!
//! The signing secret comes from configuration; it is never a literal in
//! source.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use clove_core::UserId;

/// Lifetime of a login token.
const LOGIN_TTL_DAYS: i64 = 10;
/// Lifetime of a password-reset token.
const RESET_TTL_HOURS: i64 = 1;

/// Errors from token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token could not be signed.
    #[error("token signing failed")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// Signature, expiry, or purpose verification failed.
    #[error("invalid or expired token")]
    InvalidOrExpired,
}

/// What a token authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Bearer token for authenticated requests.
    Login,
    /// Short-lived token embedded in a password-reset link.
    PasswordReset,
}

/// JWT claims carried by every token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id the token was issued to.
    pub sub: i32,
    /// Token purpose.
    pub purpose: TokenPurpose,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Issues and verifies signed tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    /// Create a token service from the configured signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }

    /// Issue a login token with the standard 10-day expiry.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue_login(&self, user_id: UserId) -> Result<String, TokenError> {
        self.issue(user_id, TokenPurpose::Login, Duration::days(LOGIN_TTL_DAYS))
    }

    /// Issue a password-reset token with the standard 1-hour expiry.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue_password_reset(&self, user_id: UserId) -> Result<String, TokenError> {
        self.issue(
            user_id,
            TokenPurpose::PasswordReset,
            Duration::hours(RESET_TTL_HOURS),
        )
    }

    fn issue(
        &self,
        user_id: UserId,
        purpose: TokenPurpose,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.as_i32(),
            purpose,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(TokenError::Signing)
    }

    /// Verify a token's signature, expiry, and purpose; return the user id.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidOrExpired` for any verification failure,
    /// including a purpose mismatch.
    pub fn verify(&self, token: &str, purpose: TokenPurpose) -> Result<UserId, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| TokenError::InvalidOrExpired)?;

        if data.claims.purpose != purpose {
            return Err(TokenError::InvalidOrExpired);
        }

        Ok(UserId::new(data.claims.sub))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&SecretString::from("kD8#mQ2$vN5@pX9!wR4&zT7*uB1^cF6j"))
    }

    #[test]
    fn test_login_token_roundtrip() {
        let tokens = service();
        let token = tokens.issue_login(UserId::new(42)).unwrap();
        let user_id = tokens.verify(&token, TokenPurpose::Login).unwrap();
        assert_eq!(user_id, UserId::new(42));
    }

    #[test]
    fn test_reset_token_roundtrip() {
        let tokens = service();
        let token = tokens.issue_password_reset(UserId::new(7)).unwrap();
        let user_id = tokens.verify(&token, TokenPurpose::PasswordReset).unwrap();
        assert_eq!(user_id, UserId::new(7));
    }

    #[test]
    fn test_purpose_mismatch_rejected() {
        let tokens = service();
        let login = tokens.issue_login(UserId::new(1)).unwrap();
        assert!(matches!(
            tokens.verify(&login, TokenPurpose::PasswordReset),
            Err(TokenError::InvalidOrExpired)
        ));

        let reset = tokens.issue_password_reset(UserId::new(1)).unwrap();
        assert!(matches!(
            tokens.verify(&reset, TokenPurpose::Login),
            Err(TokenError::InvalidOrExpired)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service();
        // Well past the default validation leeway.
        let token = tokens
            .issue(UserId::new(1), TokenPurpose::Login, Duration::hours(-2))
            .unwrap();
        assert!(matches!(
            tokens.verify(&token, TokenPurpose::Login),
            Err(TokenError::InvalidOrExpired)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue_login(UserId::new(1)).unwrap();

        let other = TokenService::new(&SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6d"));
        assert!(matches!(
            other.verify(&token, TokenPurpose::Login),
            Err(TokenError::InvalidOrExpired)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(matches!(
            service().verify("not-a-jwt", TokenPurpose::Login),
            Err(TokenError::InvalidOrExpired)
        ));
    }
}
