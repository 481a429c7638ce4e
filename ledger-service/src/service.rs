use std::sync::Arc;

use ledger_cache::{IdempotencyCache, RedisCache};
use ledger_interest::InterestEngine;
use ledger_persistence::PgStore;
use ledger_wallet::WalletEngine;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;

/// Shared application state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub wallet_engine: Arc<WalletEngine<PgStore>>,
    pub interest_engine: Arc<InterestEngine<PgStore>>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceStartError {
    #[error("failed to connect to the database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to run pending migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("failed to construct the idempotency cache client: {0}")]
    Cache(String),
}

/// Builds the pool, runs pending migrations, optionally wires the cache,
/// and returns the application state the router closes over. Mirrors the
/// teacher's `new_full` service-assembly step, minus the chain-specific
/// networking concerns that have no analog here.
pub async fn build_state(config: &Config) -> Result<AppState, ServiceStartError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url())
        .await?;

    sqlx::migrate!("../migrations").run(&pool).await?;

    let store = Arc::new(PgStore::new(pool));

    let cache: Option<Arc<dyn IdempotencyCache>> = if config.cache_enabled {
        let redis_cache =
            RedisCache::from_url(&config.redis_url()).map_err(|e| ServiceStartError::Cache(e.to_string()))?;
        Some(Arc::new(redis_cache))
    } else {
        None
    };

    let wallet_engine = Arc::new(match cache {
        Some(cache) => WalletEngine::with_cache(store.clone(), cache),
        None => WalletEngine::new(store.clone()),
    });
    let interest_engine = Arc::new(InterestEngine::new(store));

    tracing::info!(target: "ledger-service", "engines initialized");

    Ok(AppState {
        wallet_engine,
        interest_engine,
    })
}
