use ledger_persistence::model::TransactionLog;
use serde::{Deserialize, Serialize};

/// The result of `execute_transfer`. On replay this carries the *original*
/// persisted fields — ids, timestamps, status — never a freshly generated
/// copy, so callers see stable values across retries (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferResponse {
    pub transaction_log: TransactionLog,
    pub success: bool,
    pub is_idempotent: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub idempotency_key: String,
    pub from_wallet_id: uuid::Uuid,
    pub to_wallet_id: uuid::Uuid,
    pub amount: rust_decimal::Decimal,
}
