//! Account registration, login and self-lookup.

use crate::{
    auth::{self, AuthError, TokenKeys},
    error::{AppError, AppResult},
    models::{NewUser, UserId, UserProfile},
    repository::RepositoryState,
};

/// AuthService
///
/// Registers and authenticates users against the credential store and issues bearer
/// tokens. Built per request from `AppState` via `FromRef`.
#[derive(Clone)]
pub struct AuthService {
    repo: RepositoryState,
    keys: TokenKeys,
}

impl AuthService {
    pub fn new(repo: RepositoryState, keys: TokenKeys) -> Self {
        Self { repo, keys }
    }

    /// register
    ///
    /// Creates an account and returns a token for it. Fails with `Conflict` when the
    /// (normalized) email is already registered, including when a concurrent
    /// registration wins the race at the store.
    pub async fn register(
        &self,
        name: Option<String>,
        email: Option<String>,
        password: Option<String>,
    ) -> AppResult<String> {
        let name = required(name, "Name is required")?;
        let email = normalize_email(&required(email, "Email is required")?);
        let password = required(password, "Password is required")?;

        if self.repo.find_user_by_email(&email).await?.is_some() {
            tracing::warn!(email = %email, "registration for existing email");
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let password_hash = hash_blocking(password).await?;

        let user = self
            .repo
            .create_user(NewUser {
                name: name.trim().to_string(),
                email,
                password_hash,
            })
            .await?;

        let token = self.keys.sign(user.id)?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(token)
    }

    /// login
    ///
    /// Exchanges email and password for a token. An unknown email and a wrong password
    /// both produce `InvalidCredentials`.
    pub async fn login(&self, email: Option<String>, password: Option<String>) -> AppResult<String> {
        let (Some(email), Some(password)) = (email, password) else {
            return Err(AppError::InvalidCredentials);
        };
        let email = normalize_email(&email);

        let Some(user) = self.repo.find_user_by_email(&email).await? else {
            // Costs one argon2 verification, like a wrong password.
            let _ = verify_blocking(password, auth::dummy_digest().to_string()).await;
            tracing::warn!("login for unknown email");
            return Err(AppError::InvalidCredentials);
        };

        let matches = verify_blocking(password, user.password_hash.clone()).await?;

        if !matches {
            tracing::warn!(user_id = %user.id, "login with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.keys.sign(user.id)?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(token)
    }

    /// Returns the public profile of the token holder.
    pub async fn who_am_i(&self, user_id: UserId) -> AppResult<UserProfile> {
        self.repo
            .get_user(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

fn required(value: Option<String>, message: &str) -> AppResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(message.to_string()))
}

/// Emails are compared case-insensitively and without surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn hash_blocking(password: String) -> Result<String, AppError> {
    let digest = tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    digest.map_err(|e: AuthError| e.into())
}

async fn verify_blocking(password: String, digest: String) -> Result<bool, AppError> {
    let matches = tokio::task::spawn_blocking(move || auth::verify_password(&password, &digest))
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))??;
    Ok(matches)
}
