use crate::{
    config::Config,
    error::{QueueError, Result},
    store::ListStore,
};
use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, ErrorKind, RedisError, RedisResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::info;

/// A [`ListStore`] backed by one multiplexed Redis connection.
///
/// The connection is cloned per command, which shares the underlying socket.
/// Every command is bounded by the configured timeout.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
    timeout: Duration,
}

impl RedisStore {
    /// Connects using `config` and checks the server answers `PING`.
    ///
    /// # Errors
    ///
    /// * [`QueueError::Validation`] or [`QueueError::InvalidUri`] for bad settings,
    ///   including ones the driver rejects (such as TLS without the `tls` feature)
    /// * [`QueueError::Connection`] if the server cannot be reached
    /// * [`QueueError::Timeout`] if connecting or the ping exceeds the timeout
    pub async fn connect(config: &Config) -> Result<Self> {
        config.validate()?;
        let url = config.connection_url()?;

        let client = redis::Client::open(url.as_str()).map_err(connect_error)?;
        let conn = timeout(config.timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| QueueError::Timeout(config.timeout.as_millis() as u64))?
            .map_err(connect_error)?;

        let store = Self {
            conn,
            timeout: config.timeout,
        };
        store.ping().await?;

        info!(host = url.host_str().unwrap_or_default(), "connected to redis");
        Ok(store)
    }

    async fn bounded<T, F>(&self, command: F) -> Result<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        timeout(self.timeout, command)
            .await
            .map_err(|_| QueueError::Timeout(self.timeout.as_millis() as u64))?
            .map_err(Into::into)
    }
}

/// Settings the driver rejects are configuration errors, not transport ones.
fn connect_error(e: RedisError) -> QueueError {
    match e.kind() {
        ErrorKind::InvalidClientConfig => QueueError::Validation(e.to_string()),
        _ => QueueError::Connection(e.to_string()),
    }
}

#[async_trait]
impl ListStore for RedisStore {
    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = self
            .bounded(async move { redis::cmd("PING").query_async(&mut conn).await })
            .await?;
        Ok(())
    }

    async fn len(&self, key: &str) -> Result<u64> {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.llen(key).await }).await
    }

    async fn push_tail(&self, key: &str, values: &[Vec<u8>]) -> Result<u64> {
        let mut cmd = redis::cmd("RPUSH");
        cmd.arg(key);
        for value in values {
            cmd.arg(value.as_slice());
        }
        let mut conn = self.conn.clone();
        self.bounded(async move { cmd.query_async(&mut conn).await })
            .await
    }

    async fn pop_head(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        self.bounded(async move { redis::cmd("LPOP").arg(key).query_async(&mut conn).await })
            .await
    }

    async fn index(&self, key: &str, index: i64) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.lindex(key, index as isize).await })
            .await
    }

    async fn set_index(&self, key: &str, index: i64, value: &[u8]) -> Result<()> {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.lset(key, index as isize, value).await })
            .await
    }

    async fn remove(&self, key: &str, count: i64, value: &[u8]) -> Result<u64> {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.lrem(key, count as isize, value).await })
            .await
    }

    async fn count_matching(&self, key: &str, value: &[u8]) -> Result<u64> {
        let mut conn = self.conn.clone();
        let positions: Vec<u64> = self
            .bounded(async move {
                redis::cmd("LPOS")
                    .arg(key)
                    .arg(value)
                    .arg("COUNT")
                    .arg(0)
                    .query_async(&mut conn)
                    .await
            })
            .await?;
        Ok(positions.len() as u64)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let deleted: u64 = self.bounded(async move { conn.del(key).await }).await?;
        Ok(deleted > 0)
    }
}
