//! Authentication service.
//!
//! Provides password registration and login against the [`Store`], and
//! bearer tokens via [`TokenIssuer`].

mod error;
mod jwt;

pub use error::AuthError;
pub use jwt::{Claims, TokenIssuer, bearer_token};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{SubsecRound, Utc};
use tracing::instrument;

use pvz_core::error::USER_EMAIL_CONSTRAINT;
use pvz_core::{Email, Role, Store, StoreError, User, UserId};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
pub struct AuthService<'a> {
    store: &'a dyn Store,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Register a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidRole` if the role is unknown.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let role = parse_role(role)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = User {
            id: UserId::generate(),
            email,
            role,
            created_at: Utc::now().trunc_subsecs(6),
        };

        self.store
            .insert_user(&user, &password_hash)
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation { ref constraint }
                    if constraint == USER_EMAIL_CONSTRAINT =>
                {
                    AuthError::UserAlreadyExists
                }
                other => AuthError::Store(other),
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let stored = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &stored.password_hash)?;

        Ok(stored.user)
    }
}

/// Parse a role name, accepting `employee` as an alias for `staff`.
///
/// # Errors
///
/// Returns `AuthError::InvalidRole` for anything else.
pub fn parse_role(role: &str) -> Result<Role, AuthError> {
    role.parse().map_err(|_| AuthError::InvalidRole(role.to_string()))
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pvz_core::MemoryStore;

    use super::*;

    #[test]
    fn test_hash_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let user = auth
            .register("Staff@Example.com", "s3cure-pass", "employee")
            .await
            .unwrap();
        assert_eq!(user.role, Role::Staff);
        assert_eq!(user.email.as_str(), "staff@example.com");

        let logged_in = auth.login("staff@example.com", "s3cure-pass").await.unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_weak_passwords() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        auth.register("mod@example.com", "long-enough", "moderator")
            .await
            .unwrap();
        assert!(matches!(
            auth.register("mod@example.com", "long-enough", "moderator")
                .await,
            Err(AuthError::UserAlreadyExists)
        ));
        assert!(matches!(
            auth.register("new@example.com", "short", "moderator").await,
            Err(AuthError::WeakPassword(_))
        ));
        assert!(matches!(
            auth.register("new@example.com", "long-enough", "client").await,
            Err(AuthError::InvalidRole(_))
        ));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        auth.register("staff@example.com", "s3cure-pass", "staff")
            .await
            .unwrap();

        assert!(matches!(
            auth.login("staff@example.com", "wrong-pass").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("ghost@example.com", "s3cure-pass").await,
            Err(AuthError::InvalidCredentials)
        ));
    }
}
