use crate::error::StoreError;
use crate::session::store::SessionStore;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Clone, Debug)]
struct Entry {
    fields: Vec<String>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| Instant::now() >= expires_at)
    }
}

/// In-process session store with the same expiry semantics as Redis.
///
/// Used by the test suite and by the `memory` backend during development.
/// Expired entries read as absent and are purged lazily.
#[derive(Clone)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, Entry>>,
    last_cleanup: Arc<Mutex<Instant>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            last_cleanup: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_expired()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a live record exists at `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|e| !e.is_expired())
    }

    /// Remaining lifetime of `key`, if it exists and has an expiry.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let entry = self.entries.get(key)?;
        if entry.is_expired() {
            return None;
        }
        entry
            .expires_at
            .map(|expires_at| expires_at.saturating_duration_since(Instant::now()))
    }

    fn deadline(ttl: Duration) -> Result<Instant, StoreError> {
        Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| StoreError::Backend(format!("TTL of {}s is out of range", ttl.as_secs())))
    }

    fn maybe_cleanup(&self) {
        const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

        if let Ok(mut last_cleanup) = self.last_cleanup.try_lock() {
            if last_cleanup.elapsed() >= CLEANUP_INTERVAL {
                *last_cleanup = Instant::now();
                drop(last_cleanup);
                self.entries.retain(|_, entry| !entry.is_expired());
            }
        }
    }
}

impl SessionStore for MemoryStore {
    async fn create(&self, key: &str, fields: &[String], ttl: Duration) -> Result<(), StoreError> {
        self.maybe_cleanup();
        let expires_at = Self::deadline(ttl)?;

        let mut entry = self.entries.entry(key.to_string()).or_insert(Entry {
            fields: Vec::new(),
            expires_at: None,
        });
        if entry.is_expired() {
            entry.fields.clear();
        }
        entry.fields.extend(fields.iter().cloned());
        entry.expires_at = Some(expires_at);
        Ok(())
    }

    async fn read_prefix(&self, key: &str, n: usize) -> Result<Vec<String>, StoreError> {
        self.maybe_cleanup();

        Ok(self
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.fields.iter().take(n).cloned().collect())
            .unwrap_or_default())
    }

    async fn refresh_ttl(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let expires_at = Self::deadline(ttl)?;
        match self.entries.get_mut(key) {
            Some(mut entry) if !entry.is_expired() => {
                entry.expires_at = Some(expires_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn create_then_read_prefix() {
        let store = MemoryStore::new();
        store
            .create("k", &fields(&["a", "b", "c"]), Duration::from_secs(10))
            .await
            .unwrap();

        assert_eq!(store.read_prefix("k", 2).await.unwrap(), fields(&["a", "b"]));
        assert_eq!(store.read_prefix("k", 10).await.unwrap(), fields(&["a", "b", "c"]));
        assert!(store.read_prefix("missing", 2).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire() {
        let store = MemoryStore::new();
        store
            .create("k", &fields(&["a"]), Duration::from_secs(5))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(store.contains("k"));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!store.contains("k"));
        assert!(store.read_prefix("k", 1).await.unwrap().is_empty());
        assert!(!store.refresh_ttl("k", Duration::from_secs(5)).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_resets_expiry_only() {
        let store = MemoryStore::new();
        store
            .create("k", &fields(&["a", "b"]), Duration::from_secs(5))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(store.refresh_ttl("k", Duration::from_secs(5)).await.unwrap());
        assert_eq!(store.ttl("k"), Some(Duration::from_secs(5)));

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(store.read_prefix("k", 2).await.unwrap(), fields(&["a", "b"]));
    }

    #[tokio::test]
    async fn unrepresentable_ttl_is_an_error() {
        let store = MemoryStore::new();
        let err = store
            .create("k", &fields(&["a"]), Duration::from_secs(u64::MAX))
            .await;
        assert!(matches!(err, Err(StoreError::Backend(_))));
        assert!(store.is_empty());

        store
            .create("k", &fields(&["a"]), Duration::from_secs(5))
            .await
            .unwrap();
        let err = store.refresh_ttl("k", Duration::MAX).await;
        assert!(matches!(err, Err(StoreError::Backend(_))));
        assert!(store.contains("k"));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        store
            .create("k", &fields(&["a"]), Duration::from_secs(5))
            .await
            .unwrap();

        store.delete("k").await.unwrap();
        store.delete("k").await.unwrap();
        assert!(store.is_empty());
    }
}
