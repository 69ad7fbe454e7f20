//! HS256 bearer tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use pvz_core::Role;

use super::AuthError;

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Email for password logins, the role name for dummy logins.
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("keys", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            ttl,
        }
    }

    /// Sign a token for `subject` with `role`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Signing` if encoding fails.
    pub fn issue(&self, subject: &str, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ExpiredToken` for an expired token and
    /// `AuthError::InvalidToken` for any other verification failure.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["sub", "exp"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            })
    }
}

/// Extract the token from an `Authorization` header value.
#[must_use]
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn issuer(secret: &str, ttl: Duration) -> TokenIssuer {
        TokenIssuer::new(&SecretString::from(secret), ttl)
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = issuer("k9$Lq2!vX7@pR4#tW8^zN3&bM6*cJ1%f", Duration::hours(72));
        let token = tokens.issue("staff@example.com", Role::Staff).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "staff@example.com");
        assert_eq!(claims.role, Role::Staff);
        assert_eq!(claims.exp - claims.iat, 72 * 3600);
    }

    #[test]
    fn test_foreign_key_is_rejected() {
        let ours = issuer("k9$Lq2!vX7@pR4#tW8^zN3&bM6*cJ1%f", Duration::hours(1));
        let theirs = issuer("Zt5#Qw8!Er2@Ty7$Ui4%Op1^As6&Df3*", Duration::hours(1));
        let token = theirs.issue("moderator", Role::Moderator).unwrap();

        assert!(matches!(ours.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = issuer("k9$Lq2!vX7@pR4#tW8^zN3&bM6*cJ1%f", Duration::hours(-2));
        let token = tokens.issue("staff", Role::Staff).unwrap();

        assert!(matches!(tokens.verify(&token), Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
    }
}
