//! Session token lifecycle.
//!
//! A login creates a record under `token:<access token>` holding, in order:
//! the fingerprint signature, the subject id, the client address and the
//! client user-agent. Records live in a [`SessionStore`] with a TTL that every
//! authorized request resets.

pub mod fingerprint;
pub mod issuer;
pub mod memory;
pub mod redis_store;
pub mod revoker;
pub mod store;
pub mod validator;

pub use issuer::{IssuedToken, TokenIssuer, generate_token};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use revoker::Revoker;
pub use store::{SessionStore, session_key};
pub use validator::SessionValidator;

use crate::error::SessionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Identifier of an authenticated principal, as stored in the session record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for SubjectId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for SubjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Issuer, validator and revoker sharing one store handle and TTL.
#[derive(Clone)]
pub struct SessionService<S> {
    issuer: TokenIssuer<S>,
    validator: SessionValidator<S>,
    revoker: Revoker<S>,
    ttl: Duration,
}

impl<S: SessionStore> SessionService<S> {
    pub fn new(store: S, ttl: Duration) -> Self {
        Self {
            issuer: TokenIssuer::new(store.clone(), ttl),
            validator: SessionValidator::new(store.clone(), ttl),
            revoker: Revoker::new(store),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn issue(
        &self,
        subject: &SubjectId,
        client_address: &str,
        user_agent: &str,
    ) -> Result<IssuedToken, SessionError> {
        self.issuer.issue(subject, client_address, user_agent).await
    }

    pub async fn validate(
        &self,
        token: Option<&str>,
        client_address: &str,
        user_agent: &str,
    ) -> Result<SubjectId, SessionError> {
        self.validator
            .validate(token, client_address, user_agent)
            .await
    }

    pub async fn revoke(&self, token: Option<&str>) -> Result<(), SessionError> {
        self.revoker.revoke(token).await
    }
}
