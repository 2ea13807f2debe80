//! Credential checks for the password grant.
//!
//! Verifying passwords is the embedding application's job. It plugs its own
//! check in through [`FnAuthenticator`]; without one, the server falls back to
//! [`StaticCredentials`], a fixed list meant for development and tests.

use crate::config::CredentialConfig;
use crate::session::SubjectId;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// Maps a username/password pair to the subject it belongs to.
pub trait Authenticator: Send + Sync {
    /// `None` when the credentials are not accepted.
    fn authenticate<'a>(
        &'a self,
        username: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Option<SubjectId>>;
}

/// Exact username/password pairs held in memory.
///
/// The subject id of a pair is its position in the list. Not a credential
/// store for production use: passwords are kept and compared in clear.
#[derive(Clone, Debug, Default)]
pub struct StaticCredentials {
    pairs: Vec<(String, String)>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.pairs.push((username.into(), password.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn lookup(&self, username: &str, password: &str) -> Option<SubjectId> {
        self.pairs
            .iter()
            .position(|(u, p)| u == username && p == password)
            .map(|index| SubjectId::from(index as u64))
    }
}

impl From<&[CredentialConfig]> for StaticCredentials {
    fn from(credentials: &[CredentialConfig]) -> Self {
        credentials
            .iter()
            .fold(StaticCredentials::new(), |acc, c| {
                acc.with_pair(c.username.clone(), c.password.clone())
            })
    }
}

impl Authenticator for StaticCredentials {
    fn authenticate<'a>(
        &'a self,
        username: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Option<SubjectId>> {
        Box::pin(std::future::ready(self.lookup(username, password)))
    }
}

/// Adapter for an application-supplied async check.
///
/// ```ignore
/// let auth = FnAuthenticator::new(move |username, password| {
///     let users = users.clone();
///     async move { users.verify(&username, &password).await }
/// });
/// ```
pub struct FnAuthenticator<F> {
    check: F,
}

impl<F, Fut> FnAuthenticator<F>
where
    F: Fn(String, String) -> Fut + Send + Sync,
    Fut: Future<Output = Option<SubjectId>> + Send + 'static,
{
    pub fn new(check: F) -> Self {
        Self { check }
    }
}

impl<F, Fut> Authenticator for FnAuthenticator<F>
where
    F: Fn(String, String) -> Fut + Send + Sync,
    Fut: Future<Output = Option<SubjectId>> + Send + 'static,
{
    fn authenticate<'a>(
        &'a self,
        username: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Option<SubjectId>> {
        Box::pin((self.check)(username.to_string(), password.to_string()))
    }
}

/// Shared handle used by the HTTP layer.
pub type SharedAuthenticator = Arc<dyn Authenticator>;
