use async_trait::async_trait;
use redis::AsyncCommands;

use crate::{CacheError, IdempotencyCache};

/// Redis-backed implementation, concurrent-safe via `redis`'s multiplexed
/// connection.
#[derive(Clone)]
pub struct RedisCache {
    client: redis::Client,
}

impl RedisCache {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    pub fn from_url(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(Self::new(client))
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, CacheError> {
        self.client.get_multiplexed_async_connection().await.map_err(|e| {
            tracing::warn!(target: "ledger-cache", error = %e, "could not reach the idempotency cache");
            CacheError::Backend(e.to_string())
        })
    }
}

#[async_trait]
impl IdempotencyCache for RedisCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        conn.get(key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn set_raw(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: () = conn
            .set_ex(key, value, ttl_seconds)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }
}
