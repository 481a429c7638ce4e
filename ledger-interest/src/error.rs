use ledger_persistence::PersistenceError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum InterestError {
    #[error("invalid account: {0}")]
    InvalidAccount(String),

    #[error("account not found: {0}")]
    AccountNotFound(Uuid),

    #[error("interest calculation failed: {0}")]
    Calculation(#[from] ledger_decimal::DecimalError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
