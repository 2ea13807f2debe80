use crate::error::StoreError;
use crate::session::store::SessionStore;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::future::Future;
use std::time::Duration;

/// Redis-backed session store.
///
/// Records are Redis lists written with `RPUSH` and expired with `EXPIRE`.
/// The [`ConnectionManager`] multiplexes a single connection, reconnects on its
/// own and is cheap to clone, so one handle serves every request.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    timeout: Duration,
}

impl RedisStore {
    /// Open a connection to the Redis server at `url`.
    #[tracing::instrument(skip(url))]
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| StoreError::Timeout(timeout))??;
        tracing::info!("Connected to session store");
        Ok(Self { conn, timeout })
    }

    /// Run a store call, giving up after the configured timeout.
    async fn bounded<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, op).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        }
    }
}

/// `EXPIRE` argument for `ttl`. Redis treats a negative value as "expire now".
fn expire_seconds(ttl: Duration) -> Result<i64, StoreError> {
    i64::try_from(ttl.as_secs())
        .map_err(|_| StoreError::Backend(format!("TTL of {}s is out of range", ttl.as_secs())))
}

impl SessionStore for RedisStore {
    async fn create(&self, key: &str, fields: &[String], ttl: Duration) -> Result<(), StoreError> {
        let seconds = expire_seconds(ttl)?;
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.rpush(key, fields).ignore().expire(key, seconds).ignore();
        self.bounded::<(), _>(pipe.query_async(&mut conn)).await
    }

    async fn read_prefix(&self, key: &str, n: usize) -> Result<Vec<String>, StoreError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        self.bounded(conn.lrange::<_, Vec<String>>(key, 0, n as isize - 1))
            .await
    }

    async fn refresh_ttl(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let seconds = expire_seconds(ttl)?;
        let mut conn = self.conn.clone();
        self.bounded(conn.expire::<_, bool>(key, seconds))
            .await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.del::<_, ()>(key)).await
    }
}
