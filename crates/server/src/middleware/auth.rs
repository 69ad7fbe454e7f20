//! Bearer-token extractor.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use pvz_core::Role;

use crate::auth::{AuthError, Claims, bearer_token};
use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// Rejects with 401 if the token is missing or invalid. Role checks are done
/// by the handler with [`AuthUser::require`].
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(user: AuthUser) -> Result<StatusCode, AppError> {
///     user.require(&[Role::Moderator])?;
///     Ok(StatusCode::NO_CONTENT)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Ensure the caller holds one of `roles`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` otherwise.
    pub fn require(&self, roles: &[Role]) -> Result<(), AppError> {
        if roles.contains(&self.0.role) {
            return Ok(());
        }
        tracing::debug!(role = %self.0.role, required = ?roles, "role check failed");
        Err(AppError::Forbidden(format!(
            "role {} may not perform this action",
            self.0.role
        )))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AuthError::MissingToken)?;

        let claims = state.tokens().verify(token)?;

        sentry::configure_scope(|scope| {
            scope.set_tag("role", claims.role);
        });

        Ok(Self(claims))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use chrono::Duration;
    use secrecy::SecretString;
    use tower::ServiceExt;

    use pvz_core::MemoryStore;

    use super::*;
    use crate::auth::TokenIssuer;

    async fn moderators_only(user: AuthUser) -> Result<&'static str, AppError> {
        user.require(&[Role::Moderator])?;
        Ok("welcome")
    }

    fn setup() -> (Router, TokenIssuer) {
        let tokens = TokenIssuer::new(
            &SecretString::from("k9$Lq2!vX7@pR4#tW8^zN3&bM6*cJ1%f"),
            Duration::hours(1),
        );
        let state = AppState::new(Arc::new(MemoryStore::new()), tokens.clone());
        let router = Router::new()
            .route("/", get(moderators_only))
            .with_state(state);
        (router, tokens)
    }

    async fn status_with(router: Router, authorization: Option<String>) -> StatusCode {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        router
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let (router, _) = setup();
        assert_eq!(status_with(router, None).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let (router, _) = setup();
        let status = status_with(router, Some("Bearer garbage".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_role_is_forbidden() {
        let (router, tokens) = setup();
        let token = tokens.issue("staff", Role::Staff).unwrap();
        let status = status_with(router, Some(format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_matching_role_passes() {
        let (router, tokens) = setup();
        let token = tokens.issue("moderator", Role::Moderator).unwrap();
        let status = status_with(router, Some(format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
    }
}
