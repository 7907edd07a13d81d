use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        password::{hash_password, verify_password, MAX_PASSWORD_BYTES},
        repo::{StoreError, UserStore},
        repo_types::{NewUser, User},
    },
    error::ApiError,
};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_USERNAME_LEN: usize = 64;

/// Hashed in place of a missing user's password so unknown emails cost the
/// same as wrong passwords.
const DUMMY_PASSWORD: &str = "stakeboard-dummy-password";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Create a user with a salted bcrypt hash of `password`.
pub async fn register(
    store: &dyn UserStore,
    email: &str,
    username: &str,
    password: &str,
    cost: u32,
) -> Result<User, ApiError> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::validation("Invalid email"));
    }
    let username = username.trim();
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
        warn!("invalid username");
        return Err(ApiError::validation(format!(
            "Username must be 1 to {} characters",
            MAX_USERNAME_LEN
        )));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(ApiError::validation("Password too short"));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        warn!("password too long");
        return Err(ApiError::validation(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }

    // Skip the hashing cost when the email is already taken.
    if store.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    let plain = password.to_owned();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&plain, cost))
        .await
        .context("hash task panicked")??;

    let user = store
        .insert(NewUser {
            email,
            username: username.to_owned(),
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StoreError::DuplicateEmail => {
                warn!("email registered concurrently");
                ApiError::DuplicateEmail
            }
            StoreError::Other(e) => ApiError::Internal(e),
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Check `password` against the stored hash for `email`.
///
/// `cost` is the bcrypt cost stored hashes use. An unknown email still pays
/// for one hash at that cost before failing.
pub async fn verify(
    store: &dyn UserStore,
    email: &str,
    password: &str,
    cost: u32,
) -> Result<User, ApiError> {
    let email = normalize_email(email);

    // No stored hash can match input bcrypt would truncate.
    if password.len() > MAX_PASSWORD_BYTES {
        warn!(email = %email, "login password too long");
        return Err(ApiError::InvalidCredentials);
    }

    let Some(user) = store.find_by_email(&email).await? else {
        tokio::task::spawn_blocking(move || hash_password(DUMMY_PASSWORD, cost))
            .await
            .context("hash task panicked")??;
        warn!(email = %email, "login unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    let plain = password.to_owned();
    let hash = user.password_hash.clone();
    let ok = tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
        .await
        .context("verify task panicked")??;

    if !ok {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    info!(user_id = %user.id, "user verified");
    Ok(user)
}
