use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::isolation::IsolationLevel;
use crate::model::{
    Account, InterestLog, LedgerEntry, LedgerEntryView, NewInterestLog, NewLedgerEntry,
    NewTransactionLog, TransactionLog, Wallet,
};

/// An owned transaction handle. `sqlx`'s pooled transactions borrow a
/// connection out of the pool for their own lifetime, so this carries no
/// external lifetime and can be threaded through an engine's state machine
/// like any other owned value.
pub type Tx = Transaction<'static, Postgres>;

/// The persistence contract (§4.2). Find operations never take a lock; only
/// the `_for_update` variant does. Writes to wallet/account balances are
/// only exposed inside a transaction.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn begin(&self, isolation: IsolationLevel) -> Result<Tx, PersistenceError>;
    async fn commit(&self, tx: Tx) -> Result<(), PersistenceError>;
    async fn rollback(&self, tx: Tx) -> Result<(), PersistenceError>;

    async fn create_wallet(&self, initial_balance: Decimal) -> Result<Wallet, PersistenceError>;
    async fn get_wallet(&self, id: Uuid) -> Result<Option<Wallet>, PersistenceError>;
    async fn lock_wallet_for_update(
        &self,
        tx: &mut Tx,
        id: Uuid,
    ) -> Result<Option<Wallet>, PersistenceError>;
    async fn update_wallet_balance(
        &self,
        tx: &mut Tx,
        id: Uuid,
        new_balance: Decimal,
    ) -> Result<(), PersistenceError>;

    async fn find_transaction_log_by_key(
        &self,
        idempotency_key: &str,
    ) -> Result<Option<TransactionLog>, PersistenceError>;
    async fn insert_transaction_log(
        &self,
        tx: &mut Tx,
        row: NewTransactionLog,
    ) -> Result<TransactionLog, PersistenceError>;
    async fn mark_transaction_completed(
        &self,
        tx: &mut Tx,
        id: Uuid,
    ) -> Result<TransactionLog, PersistenceError>;
    async fn mark_transaction_failed(
        &self,
        tx: &mut Tx,
        id: Uuid,
        error_message: &str,
    ) -> Result<TransactionLog, PersistenceError>;
    async fn get_transaction_history(
        &self,
        wallet_id: Uuid,
        limit: i64,
    ) -> Result<Vec<TransactionLog>, PersistenceError>;

    async fn insert_ledger_entry(
        &self,
        tx: &mut Tx,
        row: NewLedgerEntry,
    ) -> Result<LedgerEntry, PersistenceError>;
    async fn get_ledger(
        &self,
        wallet_id: Uuid,
        limit: i64,
    ) -> Result<Vec<LedgerEntryView>, PersistenceError>;

    async fn create_account(&self, initial_balance: Decimal) -> Result<Account, PersistenceError>;
    async fn get_account(&self, id: Uuid) -> Result<Option<Account>, PersistenceError>;
    async fn update_account_balance(
        &self,
        tx: &mut Tx,
        id: Uuid,
        new_balance: Decimal,
    ) -> Result<(), PersistenceError>;

    async fn find_interest_log(
        &self,
        account_id: Uuid,
        calculation_date: NaiveDate,
    ) -> Result<Option<InterestLog>, PersistenceError>;
    async fn insert_interest_log(
        &self,
        tx: &mut Tx,
        row: NewInterestLog,
    ) -> Result<InterestLog, PersistenceError>;
    async fn get_interest_history(
        &self,
        account_id: Uuid,
        limit: i64,
    ) -> Result<Vec<InterestLog>, PersistenceError>;
}
