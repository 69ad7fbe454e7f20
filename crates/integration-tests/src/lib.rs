//! Integration tests for the PVZ reception service.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (memory store)
//! cargo test -p pvz-integration-tests
//!
//! # Including the PostgreSQL suite
//! PVZ_TEST_DATABASE_URL=postgres://... cargo test -p pvz-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `reception_workflow` - State machine scenarios against the memory store
//! - `concurrency` - Racing writers on one pickup point
//! - `http_api` - Full router, auth and status mapping
//! - `postgres_store` - The same rules against a migrated database (ignored)

#![allow(clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use pvz_core::{MemoryStore, Role};
use pvz_server::{auth::TokenIssuer, routes, state::AppState};

/// Signing secret for test tokens.
pub const TEST_SECRET: &str = "integration-tests-signing-key-0123456789abcdef";

/// Router over a fresh memory store, plus a token issuer sharing its secret.
pub struct TestApp {
    pub router: Router,
    pub export: Router,
    pub store: MemoryStore,
    pub tokens: TokenIssuer,
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let tokens = TokenIssuer::new(
            &SecretString::from(TEST_SECRET.to_string()),
            chrono::Duration::hours(1),
        );
        let state = AppState::new(Arc::new(store.clone()), tokens.clone());
        Self {
            router: routes::app(state.clone()),
            export: routes::export_app(state),
            store,
            tokens,
        }
    }

    /// Bearer token for `role`, signed the way `/dummyLogin` signs it.
    #[must_use]
    pub fn token(&self, role: Role) -> String {
        self.tokens
            .issue(&role.to_string(), role)
            .expect("failed to sign test token")
    }

    /// Send one request through the API router.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        call(&self.router, method, uri, token, body).await
    }

    /// Send one request through the export router.
    pub async fn send_export(&self, uri: &str) -> (StatusCode, Value) {
        call(&self.export, Method::GET, uri, None, None).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

async fn call(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("failed to build request");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
