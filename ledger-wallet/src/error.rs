use ledger_persistence::PersistenceError;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// The wallet engine's error taxonomy (§7). Conditions that never mutate
/// state (`MissingIdempotencyKey`, `InvalidTransfer`) are distinguished from
/// ones that commit a `FAILED` log before surfacing (`WalletNotFound`,
/// `InsufficientFunds`).
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("idempotency key must not be empty")]
    MissingIdempotencyKey,

    #[error("invalid transfer: {0}")]
    InvalidTransfer(String),

    #[error("wallet not found: {0}")]
    WalletNotFound(Uuid),

    #[error("insufficient funds: available {available}, required {required}")]
    InsufficientFunds { available: Decimal, required: Decimal },

    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
