//! The shared persistence contract (C2): strongly-typed repository
//! operations over `wallets`, `transaction_logs`, `ledgers`, `accounts` and
//! `interest_logs`, transaction scopes with isolation level, row-level
//! exclusive locks, and unique-constraint violations surfaced as a
//! distinguishable error rather than an opaque database failure.

pub mod error;
pub mod isolation;
pub mod model;
pub mod postgres;
pub mod store;

pub use error::PersistenceError;
pub use isolation::IsolationLevel;
pub use postgres::PgStore;
pub use store::{LedgerStore, Tx};
