//! Entity rows for the five persisted tables. These are plain data — no
//! back-links, no object graph — joined only through foreign-key fields, per
//! the cyclic-reference design note: a `Ledger` row points at its
//! `transaction_log_id`, a `TransactionLog` points at its wallet ids, and
//! callers join where they need richer views.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "transaction_status", rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "ledger_entry_type", rename_all = "UPPERCASE")]
pub enum EntryType {
    Debit,
    Credit,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Wallet {
    pub id: Uuid,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct TransactionLog {
    pub id: Uuid,
    pub idempotency_key: String,
    pub from_wallet_id: Uuid,
    pub to_wallet_id: Uuid,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTransactionLog {
    pub idempotency_key: String,
    pub from_wallet_id: Uuid,
    pub to_wallet_id: Uuid,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub transaction_log_id: Uuid,
    pub entry_type: EntryType,
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub wallet_id: Uuid,
    pub transaction_log_id: Uuid,
    pub entry_type: EntryType,
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub description: Option<String>,
}

/// A ledger row joined with the status of the transaction log it belongs
/// to, for `get_ledger`'s "joined transaction-log context" requirement.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct LedgerEntryView {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub transaction_log_id: Uuid,
    pub entry_type: EntryType,
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub idempotency_key: String,
    pub transaction_status: TransactionStatus,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct InterestLog {
    pub id: Uuid,
    pub account_id: Uuid,
    pub calculation_date: NaiveDate,
    pub principal_balance: Decimal,
    pub interest_amount: Decimal,
    pub new_balance: Decimal,
    pub annual_rate: Decimal,
    pub days_in_year: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInterestLog {
    pub account_id: Uuid,
    pub calculation_date: NaiveDate,
    pub principal_balance: Decimal,
    pub interest_amount: Decimal,
    pub new_balance: Decimal,
    pub annual_rate: Decimal,
    pub days_in_year: i32,
}
