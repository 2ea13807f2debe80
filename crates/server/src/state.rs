//! Shared state handed to every HTTP handler.

use crate::authenticator::{Authenticator, SharedAuthenticator, StaticCredentials};
use crate::config::AppConfig;
use crate::session::{SessionService, SessionStore};
use std::sync::Arc;

/// Everything the login, logout and guard handlers need.
///
/// Generic over the store so tests can run against [`crate::session::MemoryStore`]
/// while the server talks to Redis.
#[derive(Clone)]
pub struct AppState<S> {
    pub sessions: SessionService<S>,
    pub authenticator: SharedAuthenticator,
    pub config: Arc<AppConfig>,
}

impl<S: SessionStore> AppState<S> {
    /// State backed by `store`, authenticating against the credentials listed
    /// in the configuration.
    pub fn new(store: S, config: AppConfig) -> Self {
        let authenticator = Arc::new(StaticCredentials::from(config.credentials.as_slice()));
        Self {
            sessions: SessionService::new(store, config.token_ttl()),
            authenticator,
            config: Arc::new(config),
        }
    }

    /// Replace the development authenticator with the application's own.
    pub fn with_authenticator(mut self, authenticator: impl Authenticator + 'static) -> Self {
        self.authenticator = Arc::new(authenticator);
        self
    }

    pub fn secure_cookie(&self) -> bool {
        self.config.secure_cookie
    }
}
