//! Token and account routes.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;

use pvz_core::User;

use crate::auth::{AuthService, parse_role};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DummyLoginRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issue a token for a role without any account.
///
/// POST /dummyLogin. The body is the token as a bare JSON string, not an
/// object wrapping it; `/login` answers the same way.
pub async fn dummy_login(
    State(state): State<AppState>,
    body: Result<Json<DummyLoginRequest>, JsonRejection>,
) -> Result<Json<String>, AppError> {
    let Json(req) = body?;
    let role = parse_role(&req.role)?;
    let token = state.tokens().issue(&role.to_string(), role)?;
    Ok(Json(token))
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let Json(req) = body?;
    let user = AuthService::new(state.store())
        .register(&req.email, &req.password, &req.role)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Verify a password and issue a token for the account's role.
///
/// POST /login
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<String>, AppError> {
    let Json(req) = body?;
    let user = AuthService::new(state.store())
        .login(&req.email, &req.password)
        .await?;
    let token = state.tokens().issue(user.email.as_str(), user.role)?;
    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(token))
}
