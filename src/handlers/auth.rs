//! Authentication handlers

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use validator::Validate;

use crate::models::{AuthResponse, CredentialsRequest, User};
use crate::{AppError, AppResult, AppState};

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    req: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AppResult<Json<AuthResponse>> {
    let (username, password) = credentials(req)?;

    // Check if username already exists
    if User::find_by_username(&state.pool, &username).await?.is_some() {
        return Err(AppError::AlreadyExists("User already exists".to_string()));
    }

    let password_hash = hash_password(&password)?;

    let user = User::create(&state.pool, &username, password_hash)
        .await
        .map_err(duplicate_user)?;

    tracing::info!("New user registered: {} ({})", user.username, user.id);

    Ok(Json(AuthResponse {
        message: "User registered successfully".to_string(),
        username: user.username,
    }))
}

/// Login endpoint
pub async fn login(
    State(state): State<AppState>,
    req: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AppResult<Json<AuthResponse>> {
    let (username, password) = credentials(req)?;

    let user = User::find_by_username(&state.pool, &username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    verify_password(&password, &user.password_hash)?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        username: user.username,
    }))
}

/// A concurrent registration can insert between the lookup and our insert
fn duplicate_user(err: sqlx::Error) -> AppError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => AppError::AlreadyExists("User already exists".to_string()),
        _ => AppError::from(err),
    }
}

/// Unpack and validate a credentials body
fn credentials(req: Result<Json<CredentialsRequest>, JsonRejection>) -> AppResult<(String, String)> {
    let Json(req) = req?;
    req.validate()?;

    match (req.username, req.password) {
        (Some(username), Some(password)) => Ok((username, password)),
        _ => Err(AppError::ValidationError("Username and password required".to_string())),
    }
}

/// Argon2 with a fresh random salt, PHC string format
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalError(e.to_string()))
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<()> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::InternalError("Invalid password hash".to_string()))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::InvalidCredentials)
}
