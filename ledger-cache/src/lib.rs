//! Optional read-through idempotency cache (C5). Stores a previously
//! computed transfer response keyed by idempotency key, TTL 24 hours. This
//! is a latency optimization only — the wallet engine treats every cache
//! entry as advisory and the database's unique constraint on
//! `transaction_logs.idempotency_key` remains the sole idempotency source
//! of truth. Cache loss or staleness must never produce a duplicate
//! transfer, since a cache miss simply falls through to the normal replay
//! protocol.

use async_trait::async_trait;

mod redis_cache;

pub use redis_cache::RedisCache;

pub const IDEMPOTENCY_KEY_PREFIX: &str = "idempotency:";
pub const DEFAULT_TTL_SECONDS: u64 = 24 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// A small serialized-string cache abstraction. The wallet engine layers
/// its own (de)serialization of `TransferResponse` on top so that this
/// crate never needs to depend on the wallet engine's types.
#[async_trait]
pub trait IdempotencyCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set_raw(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError>;
}

pub fn cache_key(idempotency_key: &str) -> String {
    format!("{IDEMPOTENCY_KEY_PREFIX}{idempotency_key}")
}
