use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use lazy_static::lazy_static;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{config::AppConfig, error::AppError, models::UserId};

/// AuthError
///
/// Failures of the credential and token primitives. None of these reach the client
/// verbatim: signing and hashing failures become `InternalError`, verification failures
/// become `Unauthorized`.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),

    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Expired | AuthError::InvalidToken(_) => {
                AppError::Unauthorized("Token is not valid".to_string())
            }
            other => AppError::InternalError(other.to_string()),
        }
    }
}

/// ClaimUser
///
/// The identity nested inside the token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimUser {
    pub id: UserId,
}

/// Claims
///
/// Payload of the bearer token: `{"user": {"id": ...}, "iat": ..., "exp": ...}`.
/// Tokens are stateless; expiry is the only way a token stops being accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user: ClaimUser,
    /// Issued At (iat), unix seconds.
    pub iat: usize,
    /// Expiration Time (exp), unix seconds.
    pub exp: usize,
}

/// TokenKeys
///
/// Signing and verification keys derived from the configured secret, together with the
/// lifetime stamped on every issued token.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// sign
    ///
    /// Issues a token bound to `user_id`, valid for the configured lifetime.
    pub fn sign(&self, user_id: UserId) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            user: ClaimUser { id: user_id },
            iat: now as usize,
            exp: (now + self.ttl_secs) as usize,
        };
        let token =
            encode(&Header::default(), &claims, &self.encoding).map_err(AuthError::Signing)?;
        tracing::debug!(user_id = %user_id, "token signed");
        Ok(token)
    }

    /// verify
    ///
    /// Checks the signature and expiry and returns the embedded claims. Expiry is exact:
    /// a token is rejected from the second its `exp` has passed.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(AuthError::Expired),
                _ => Err(AuthError::InvalidToken(e)),
            },
        }
    }
}

impl From<&AppConfig> for TokenKeys {
    fn from(config: &AppConfig) -> Self {
        TokenKeys::new(&config.jwt_secret, config.token_ttl_secs)
    }
}

/// Hashes a plaintext password into a PHC-format argon2 digest.
pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

lazy_static! {
    // Digest of a throwaway password, produced with the same parameters as real ones.
    static ref DUMMY_DIGEST: String =
        hash_password("resume-forge-dummy-password").unwrap_or_default();
}

/// A valid digest no password matches. Login verifies against it when the email is
/// unknown so that both failure paths pay for one argon2 verification.
pub fn dummy_digest() -> &'static str {
    &DUMMY_DIGEST
}

/// Checks a plaintext password against a stored digest. A malformed digest is an
/// error, a mismatch is `Ok(false)`.
pub fn verify_password(plain: &str, digest: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(digest).map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// AuthUser Extractor Result
///
/// The resolved identity of an authenticated request. Handlers use the id for every
/// ownership decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuthUser {
    pub id: UserId,
}

/// AuthUser Extractor Implementation
///
/// The access gate. Reads `Authorization: Bearer <token>`, verifies it with the keys
/// derived from the application state and yields the user id carried in the claims.
/// No store lookup happens here; a token for a deleted account still passes and the
/// downstream handler decides what a missing user means.
///
/// Rejection: `AppError::Unauthorized` (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = TokenKeys::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("No token, authorization denied".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Malformed authorization header".to_string()))?;

        let claims = keys.verify(token).inspect_err(|e| {
            tracing::warn!(error = %e, "rejected bearer token");
        })?;

        Ok(AuthUser {
            id: claims.user.id,
        })
    }
}
