use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::isolation::IsolationLevel;
use crate::model::{
    Account, InterestLog, LedgerEntry, LedgerEntryView, NewInterestLog, NewLedgerEntry,
    NewTransactionLog, TransactionLog, Wallet,
};
use crate::store::{LedgerStore, Tx};

/// Postgres-backed implementation of the persistence contract.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn begin(&self, isolation: IsolationLevel) -> Result<Tx, PersistenceError> {
        let mut tx = self.pool.begin().await?;
        let set_isolation = format!("SET TRANSACTION ISOLATION LEVEL {}", isolation.as_sql());
        sqlx::query(&set_isolation).execute(&mut *tx).await?;
        Ok(tx)
    }

    async fn commit(&self, tx: Tx) -> Result<(), PersistenceError> {
        tx.commit().await.map_err(PersistenceError::classify)
    }

    async fn rollback(&self, tx: Tx) -> Result<(), PersistenceError> {
        tx.rollback().await.map_err(PersistenceError::classify)
    }

    async fn create_wallet(&self, initial_balance: Decimal) -> Result<Wallet, PersistenceError> {
        sqlx::query_as::<_, Wallet>(
            "INSERT INTO wallets (id, balance, created_at, updated_at)
             VALUES ($1, $2, now(), now())
             RETURNING id, balance, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(initial_balance)
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn get_wallet(&self, id: Uuid) -> Result<Option<Wallet>, PersistenceError> {
        sqlx::query_as::<_, Wallet>(
            "SELECT id, balance, created_at, updated_at FROM wallets WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn lock_wallet_for_update(
        &self,
        tx: &mut Tx,
        id: Uuid,
    ) -> Result<Option<Wallet>, PersistenceError> {
        sqlx::query_as::<_, Wallet>(
            "SELECT id, balance, created_at, updated_at FROM wallets WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(PersistenceError::classify)
    }

    async fn update_wallet_balance(
        &self,
        tx: &mut Tx,
        id: Uuid,
        new_balance: Decimal,
    ) -> Result<(), PersistenceError> {
        sqlx::query("UPDATE wallets SET balance = $1, updated_at = now() WHERE id = $2")
            .bind(new_balance)
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(PersistenceError::classify)?;
        Ok(())
    }

    async fn find_transaction_log_by_key(
        &self,
        idempotency_key: &str,
    ) -> Result<Option<TransactionLog>, PersistenceError> {
        sqlx::query_as::<_, TransactionLog>(
            "SELECT id, idempotency_key, from_wallet_id, to_wallet_id, amount, status,
                    error_message, created_at, updated_at
             FROM transaction_logs WHERE idempotency_key = $1",
        )
        .bind(idempotency_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn insert_transaction_log(
        &self,
        tx: &mut Tx,
        row: NewTransactionLog,
    ) -> Result<TransactionLog, PersistenceError> {
        sqlx::query_as::<_, TransactionLog>(
            "INSERT INTO transaction_logs
                (id, idempotency_key, from_wallet_id, to_wallet_id, amount, status,
                 error_message, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, 'PENDING', NULL, now(), now())
             RETURNING id, idempotency_key, from_wallet_id, to_wallet_id, amount, status,
                       error_message, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&row.idempotency_key)
        .bind(row.from_wallet_id)
        .bind(row.to_wallet_id)
        .bind(row.amount)
        .fetch_one(&mut **tx)
        .await
        .map_err(PersistenceError::classify)
    }

    async fn mark_transaction_completed(
        &self,
        tx: &mut Tx,
        id: Uuid,
    ) -> Result<TransactionLog, PersistenceError> {
        sqlx::query_as::<_, TransactionLog>(
            "UPDATE transaction_logs SET status = 'COMPLETED', updated_at = now()
             WHERE id = $1
             RETURNING id, idempotency_key, from_wallet_id, to_wallet_id, amount, status,
                       error_message, created_at, updated_at",
        )
        .bind(id)
        .fetch_one(&mut **tx)
        .await
        .map_err(PersistenceError::classify)
    }

    async fn mark_transaction_failed(
        &self,
        tx: &mut Tx,
        id: Uuid,
        error_message: &str,
    ) -> Result<TransactionLog, PersistenceError> {
        sqlx::query_as::<_, TransactionLog>(
            "UPDATE transaction_logs SET status = 'FAILED', error_message = $2, updated_at = now()
             WHERE id = $1
             RETURNING id, idempotency_key, from_wallet_id, to_wallet_id, amount, status,
                       error_message, created_at, updated_at",
        )
        .bind(id)
        .bind(error_message)
        .fetch_one(&mut **tx)
        .await
        .map_err(PersistenceError::classify)
    }

    async fn get_transaction_history(
        &self,
        wallet_id: Uuid,
        limit: i64,
    ) -> Result<Vec<TransactionLog>, PersistenceError> {
        sqlx::query_as::<_, TransactionLog>(
            "SELECT id, idempotency_key, from_wallet_id, to_wallet_id, amount, status,
                    error_message, created_at, updated_at
             FROM transaction_logs
             WHERE from_wallet_id = $1 OR to_wallet_id = $1
             ORDER BY created_at DESC
             LIMIT $2",
        )
        .bind(wallet_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn insert_ledger_entry(
        &self,
        tx: &mut Tx,
        row: NewLedgerEntry,
    ) -> Result<LedgerEntry, PersistenceError> {
        sqlx::query_as::<_, LedgerEntry>(
            "INSERT INTO ledgers
                (id, wallet_id, transaction_log_id, entry_type, amount,
                 balance_before, balance_after, description, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now())
             RETURNING id, wallet_id, transaction_log_id, entry_type, amount,
                       balance_before, balance_after, description, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(row.wallet_id)
        .bind(row.transaction_log_id)
        .bind(row.entry_type)
        .bind(row.amount)
        .bind(row.balance_before)
        .bind(row.balance_after)
        .bind(&row.description)
        .fetch_one(&mut **tx)
        .await
        .map_err(PersistenceError::classify)
    }

    async fn get_ledger(
        &self,
        wallet_id: Uuid,
        limit: i64,
    ) -> Result<Vec<LedgerEntryView>, PersistenceError> {
        sqlx::query_as::<_, LedgerEntryView>(
            "SELECT l.id, l.wallet_id, l.transaction_log_id, l.entry_type, l.amount,
                    l.balance_before, l.balance_after, l.description, l.created_at,
                    t.idempotency_key, t.status AS transaction_status
             FROM ledgers l
             JOIN transaction_logs t ON t.id = l.transaction_log_id
             WHERE l.wallet_id = $1
             ORDER BY l.created_at DESC
             LIMIT $2",
        )
        .bind(wallet_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn create_account(&self, initial_balance: Decimal) -> Result<Account, PersistenceError> {
        sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (id, balance, created_at, updated_at)
             VALUES ($1, $2, now(), now())
             RETURNING id, balance, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(initial_balance)
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn get_account(&self, id: Uuid) -> Result<Option<Account>, PersistenceError> {
        sqlx::query_as::<_, Account>(
            "SELECT id, balance, created_at, updated_at FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn update_account_balance(
        &self,
        tx: &mut Tx,
        id: Uuid,
        new_balance: Decimal,
    ) -> Result<(), PersistenceError> {
        sqlx::query("UPDATE accounts SET balance = $1, updated_at = now() WHERE id = $2")
            .bind(new_balance)
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(PersistenceError::classify)?;
        Ok(())
    }

    async fn find_interest_log(
        &self,
        account_id: Uuid,
        calculation_date: NaiveDate,
    ) -> Result<Option<InterestLog>, PersistenceError> {
        sqlx::query_as::<_, InterestLog>(
            "SELECT id, account_id, calculation_date, principal_balance, interest_amount,
                    new_balance, annual_rate, days_in_year, created_at
             FROM interest_logs WHERE account_id = $1 AND calculation_date = $2",
        )
        .bind(account_id)
        .bind(calculation_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn insert_interest_log(
        &self,
        tx: &mut Tx,
        row: NewInterestLog,
    ) -> Result<InterestLog, PersistenceError> {
        sqlx::query_as::<_, InterestLog>(
            "INSERT INTO interest_logs
                (id, account_id, calculation_date, principal_balance, interest_amount,
                 new_balance, annual_rate, days_in_year, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now())
             RETURNING id, account_id, calculation_date, principal_balance, interest_amount,
                       new_balance, annual_rate, days_in_year, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(row.account_id)
        .bind(row.calculation_date)
        .bind(row.principal_balance)
        .bind(row.interest_amount)
        .bind(row.new_balance)
        .bind(row.annual_rate)
        .bind(row.days_in_year)
        .fetch_one(&mut **tx)
        .await
        .map_err(PersistenceError::classify)
    }

    async fn get_interest_history(
        &self,
        account_id: Uuid,
        limit: i64,
    ) -> Result<Vec<InterestLog>, PersistenceError> {
        sqlx::query_as::<_, InterestLog>(
            "SELECT id, account_id, calculation_date, principal_balance, interest_amount,
                    new_balance, annual_rate, days_in_year, created_at
             FROM interest_logs
             WHERE account_id = $1
             ORDER BY calculation_date DESC
             LIMIT $2",
        )
        .bind(account_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }
}

