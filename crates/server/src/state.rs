//! Application state shared across handlers.

use std::sync::Arc;

use pvz_core::Store;

use crate::auth::TokenIssuer;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// store and the token issuer.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn Store>,
    tokens: TokenIssuer,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, tokens: TokenIssuer) -> Self {
        Self {
            inner: Arc::new(AppStateInner { store, tokens }),
        }
    }

    /// Get a reference to the backing store.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    /// Get a reference to the token issuer.
    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }
}
