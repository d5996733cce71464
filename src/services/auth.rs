use bcrypt::{hash, verify, BcryptError};

use crate::{
    db::UserStore,
    error::{AppError, AppResult},
    models::{NewUser, User},
};

pub fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    hash(password, cost)
        .map_err(|e: BcryptError| AppError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    verify(password, hash)
        .map_err(|e: BcryptError| AppError::Internal(format!("Failed to verify password: {}", e)))
}

/// Runs a CPU-heavy bcrypt call off the async executor
async fn blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
}

fn present(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Creates an account with a bcrypt-hashed password
pub async fn register(
    store: &dyn UserStore,
    username: &str,
    email: &str,
    password: &str,
    bcrypt_cost: u32,
) -> AppResult<User> {
    if !present(username) || !present(email) || !present(password) {
        return Err(AppError::InvalidInput("Missing required fields".to_string()));
    }

    if store.find_user(username).await?.is_some() {
        tracing::info!(username = %username, "Registration rejected, username taken");
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let password = password.to_string();
    let password_hash = blocking(move || hash_password(&password, bcrypt_cost)).await?;

    let user = store
        .create_user(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User created");

    Ok(user)
}

/// Checks a username/password pair
pub async fn login(store: &dyn UserStore, username: &str, password: &str) -> AppResult<User> {
    if !present(username) || password.is_empty() {
        return Err(AppError::InvalidInput(
            "Missing username or password".to_string(),
        ));
    }

    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    let user = store.find_user(username).await?.ok_or_else(invalid)?;

    let password = password.to_string();
    let stored_hash = user.password_hash.clone();
    let matches = blocking(move || verify_password(&password, &stored_hash)).await?;

    if !matches {
        tracing::info!(username = %username, "Login rejected");
        return Err(invalid());
    }

    Ok(user)
}
