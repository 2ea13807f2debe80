//! Session store abstraction.

use crate::error::StoreError;
use std::future::Future;
use std::time::Duration;

/// Key-value backend holding list-valued session records with a per-key expiry.
///
/// Implementations are cheap handles: cloning shares the underlying connection
/// or map, and every clone may be used from many requests at once. Each method
/// touches a single key, nothing here is transactional.
pub trait SessionStore: Clone + Send + Sync + 'static {
    /// Append `fields` in order to a new record at `key`, then set its expiry.
    ///
    /// A failure halfway through is not rolled back.
    fn create(
        &self,
        key: &str,
        fields: &[String],
        ttl: Duration,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// First `n` fields of the record, empty when the key does not exist.
    fn read_prefix(
        &self,
        key: &str,
        n: usize,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Reset the expiry of `key` without touching its content.
    ///
    /// Returns `false` if the key no longer exists.
    fn refresh_ttl(
        &self,
        key: &str,
        ttl: Duration,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Remove `key`. Deleting an absent key is not an error.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Store key for the session behind `token`.
pub fn session_key(token: &str) -> String {
    format!("token:{token}")
}
