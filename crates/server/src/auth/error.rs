//! Authentication error types.

use thiserror::Error;

use pvz_core::{EmailError, StoreError};

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Unknown role name.
    #[error("invalid role: {0}")]
    InvalidRole(String),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Bearer token missing.
    #[error("missing bearer token")]
    MissingToken,

    /// Bearer token expired.
    #[error("token expired")]
    ExpiredToken,

    /// Bearer token malformed or signed with another key.
    #[error("invalid token")]
    InvalidToken,

    /// Token could not be signed.
    #[error("token signing failed: {0}")]
    Signing(String),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Store error.
    #[error(transparent)]
    Store(#[from] StoreError),
}
