use std::cmp::Ordering;
use std::sync::Arc;

use ledger_cache::IdempotencyCache;
use ledger_persistence::model::{EntryType, NewLedgerEntry, NewTransactionLog, TransactionStatus, Wallet};
use ledger_persistence::{IsolationLevel, LedgerStore, PersistenceError, Tx};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::TransferError;
use crate::response::{TransferRequest, TransferResponse};

const DEFAULT_HISTORY_LIMIT: i64 = 50;
const MAX_SERIALIZATION_RETRIES: u32 = 3;

/// Outcome of the locking/validation/mutation steps (D–I), before the
/// caller decides how to finish the surrounding transaction.
enum StepOutcome {
    Completed(ledger_persistence::model::TransactionLog),
    CallerFailed(TransferError),
}

pub struct WalletEngine<S: LedgerStore> {
    store: Arc<S>,
    cache: Option<Arc<dyn IdempotencyCache>>,
}

impl<S: LedgerStore> WalletEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store, cache: None }
    }

    pub fn with_cache(store: Arc<S>, cache: Arc<dyn IdempotencyCache>) -> Self {
        Self {
            store,
            cache: Some(cache),
        }
    }

    pub async fn create_wallet(&self, initial_balance: Decimal) -> Result<Wallet, TransferError> {
        if ledger_decimal::is_negative(initial_balance) {
            return Err(TransferError::InvalidTransfer(
                "initial balance must not be negative".into(),
            ));
        }
        Ok(self.store.create_wallet(initial_balance).await?)
    }

    pub async fn get_wallet(&self, id: Uuid) -> Result<Option<Wallet>, TransferError> {
        Ok(self.store.get_wallet(id).await?)
    }

    pub async fn get_transaction_history(
        &self,
        wallet_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<ledger_persistence::model::TransactionLog>, TransferError> {
        Ok(self
            .store
            .get_transaction_history(wallet_id, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
            .await?)
    }

    pub async fn get_ledger(
        &self,
        wallet_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<ledger_persistence::model::LedgerEntryView>, TransferError> {
        Ok(self
            .store
            .get_ledger(wallet_id, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
            .await?)
    }

    /// Executes the transfer state machine (§4.3). Duplicate submissions of
    /// the same `idempotency_key` — concurrent or sequential — always
    /// return the one canonical result; the mutating state machine (steps
    /// D–I) runs for at most one of them.
    pub async fn execute_transfer(
        &self,
        req: TransferRequest,
    ) -> Result<TransferResponse, TransferError> {
        if req.idempotency_key.trim().is_empty() {
            return Err(TransferError::MissingIdempotencyKey);
        }
        if req.amount <= Decimal::ZERO {
            return Err(TransferError::InvalidTransfer(
                "amount must be positive".into(),
            ));
        }
        if req.from_wallet_id == req.to_wallet_id {
            return Err(TransferError::InvalidTransfer(
                "from_wallet_id and to_wallet_id must differ".into(),
            ));
        }

        if let Some(cache) = &self.cache {
            if let Some(cached) = self.cache_lookup(cache.as_ref(), &req.idempotency_key).await {
                return Ok(cached);
            }
        }

        // Step A: fast path, no transaction.
        if let Some(existing) = self
            .store
            .find_transaction_log_by_key(&req.idempotency_key)
            .await?
        {
            let response = replay_response(existing);
            self.cache_store(&req.idempotency_key, &response).await;
            return Ok(response);
        }

        let mut attempt = 0;
        loop {
            match self.try_execute(&req).await {
                Ok(response) => {
                    self.cache_store(&req.idempotency_key, &response).await;
                    return Ok(response);
                }
                Err(TransferError::Persistence(PersistenceError::SerializationFailure))
                    if attempt < MAX_SERIALIZATION_RETRIES =>
                {
                    attempt += 1;
                    tracing::warn!(
                        idempotency_key = %req.idempotency_key,
                        attempt,
                        "retrying transfer after serialization failure"
                    );
                    continue;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn cache_lookup(
        &self,
        cache: &dyn IdempotencyCache,
        idempotency_key: &str,
    ) -> Option<TransferResponse> {
        let key = ledger_cache::cache_key(idempotency_key);
        match cache.get_raw(&key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(response) => Some(response),
                Err(err) => {
                    tracing::warn!(error = %err, "discarding unparseable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(error = %err, "idempotency cache lookup failed, falling through");
                None
            }
        }
    }

    async fn cache_store(&self, idempotency_key: &str, response: &TransferResponse) {
        let Some(cache) = &self.cache else {
            return;
        };
        let key = ledger_cache::cache_key(idempotency_key);
        match serde_json::to_string(response) {
            Ok(raw) => {
                if let Err(err) = cache
                    .set_raw(&key, &raw, ledger_cache::DEFAULT_TTL_SECONDS)
                    .await
                {
                    tracing::warn!(error = %err, "failed to populate idempotency cache");
                }
            }
            Err(err) => tracing::warn!(error = %err, "failed to serialize transfer response"),
        }
    }

    /// Steps B–J: open the transaction, insert the PENDING log (step C),
    /// and either complete, replay on a unique-violation race, or fail.
    async fn try_execute(&self, req: &TransferRequest) -> Result<TransferResponse, TransferError> {
        let mut tx = self.store.begin(IsolationLevel::Serializable).await?;

        let new_log = NewTransactionLog {
            idempotency_key: req.idempotency_key.clone(),
            from_wallet_id: req.from_wallet_id,
            to_wallet_id: req.to_wallet_id,
            amount: req.amount,
        };

        let log = match self.store.insert_transaction_log(&mut tx, new_log).await {
            Ok(log) => log,
            Err(PersistenceError::UniqueViolation { .. }) => {
                let _ = self.store.rollback(tx).await;
                let existing = self
                    .store
                    .find_transaction_log_by_key(&req.idempotency_key)
                    .await?
                    .ok_or_else(|| {
                        TransferError::InternalInconsistency(
                            "transaction log vanished after a unique-key race".into(),
                        )
                    })?;
                return Ok(replay_response(existing));
            }
            Err(err) => {
                let _ = self.store.rollback(tx).await;
                return Err(err.into());
            }
        };
        let log_id = log.id;

        match self.run_steps(&mut tx, req, log).await {
            Ok(StepOutcome::Completed(completed)) => {
                self.store.commit(tx).await?;
                Ok(TransferResponse {
                    transaction_log: completed,
                    success: true,
                    is_idempotent: false,
                    message: None,
                })
            }
            Ok(StepOutcome::CallerFailed(error)) => {
                self.store.commit(tx).await?;
                Err(error)
            }
            Err(err) => {
                let _ = self.store.rollback(tx).await;
                if let Err(mark_err) = self.best_effort_mark_failed(log_id, &err.to_string()).await
                {
                    tracing::warn!(
                        transaction_log_id = %log_id,
                        error = %mark_err,
                        "best-effort FAILED mark did not persist"
                    );
                }
                Err(err)
            }
        }
    }

    /// Steps D (lock ordering) through I (commit-ready COMPLETED log).
    async fn run_steps(
        &self,
        tx: &mut Tx,
        req: &TransferRequest,
        log: ledger_persistence::model::TransactionLog,
    ) -> Result<StepOutcome, TransferError> {
        let mut ordered = [req.from_wallet_id, req.to_wallet_id];
        ordered.sort();
        let [first, second] = ordered;

        let locked_first = self.store.lock_wallet_for_update(tx, first).await?;
        let locked_second = self.store.lock_wallet_for_update(tx, second).await?;

        let resolve = |id: Uuid| -> Option<Wallet> {
            if id == first {
                locked_first.clone()
            } else {
                locked_second.clone()
            }
        };

        let from_wallet = resolve(req.from_wallet_id);
        let to_wallet = resolve(req.to_wallet_id);

        let (from_wallet, to_wallet) = match (from_wallet, to_wallet) {
            (Some(f), Some(t)) => (f, t),
            (from, _) => {
                let missing = if from.is_none() {
                    req.from_wallet_id
                } else {
                    req.to_wallet_id
                };
                self.store
                    .mark_transaction_failed(tx, log.id, &format!("wallet {missing} not found"))
                    .await?;
                return Ok(StepOutcome::CallerFailed(TransferError::WalletNotFound(
                    missing,
                )));
            }
        };

        if ledger_decimal::compare(from_wallet.balance, req.amount) == Ordering::Less {
            let message = format!(
                "insufficient funds: available {}, required {}",
                ledger_decimal::to_fixed(from_wallet.balance, 2),
                ledger_decimal::to_fixed(req.amount, 2),
            );
            self.store
                .mark_transaction_failed(tx, log.id, &message)
                .await?;
            return Ok(StepOutcome::CallerFailed(TransferError::InsufficientFunds {
                available: from_wallet.balance,
                required: req.amount,
            }));
        }

        let from_after = ledger_decimal::sub(from_wallet.balance, req.amount)
            .map_err(|e| TransferError::InternalInconsistency(e.to_string()))?;
        let to_after = ledger_decimal::add(to_wallet.balance, req.amount)
            .map_err(|e| TransferError::InternalInconsistency(e.to_string()))?;

        self.store
            .update_wallet_balance(tx, from_wallet.id, from_after)
            .await?;
        self.store
            .update_wallet_balance(tx, to_wallet.id, to_after)
            .await?;

        self.store
            .insert_ledger_entry(
                tx,
                NewLedgerEntry {
                    wallet_id: from_wallet.id,
                    transaction_log_id: log.id,
                    entry_type: EntryType::Debit,
                    amount: req.amount,
                    balance_before: from_wallet.balance,
                    balance_after: from_after,
                    description: Some(format!(
                        "transfer {} -> {}",
                        from_wallet.id, to_wallet.id
                    )),
                },
            )
            .await?;

        self.store
            .insert_ledger_entry(
                tx,
                NewLedgerEntry {
                    wallet_id: to_wallet.id,
                    transaction_log_id: log.id,
                    entry_type: EntryType::Credit,
                    amount: req.amount,
                    balance_before: to_wallet.balance,
                    balance_after: to_after,
                    description: Some(format!(
                        "transfer {} -> {}",
                        from_wallet.id, to_wallet.id
                    )),
                },
            )
            .await?;

        let completed = self.store.mark_transaction_completed(tx, log.id).await?;
        Ok(StepOutcome::Completed(completed))
    }

    async fn best_effort_mark_failed(
        &self,
        log_id: Uuid,
        message: &str,
    ) -> Result<(), PersistenceError> {
        let mut tx = self.store.begin(IsolationLevel::ReadCommitted).await?;
        self.store.mark_transaction_failed(&mut tx, log_id, message).await?;
        self.store.commit(tx).await
    }
}

fn replay_response(log: ledger_persistence::model::TransactionLog) -> TransferResponse {
    let message = match log.status {
        TransactionStatus::Pending => Some("previously pending".to_string()),
        TransactionStatus::Failed => log.error_message.clone(),
        TransactionStatus::Completed => None,
    };
    TransferResponse {
        success: matches!(log.status, TransactionStatus::Completed),
        is_idempotent: true,
        message,
        transaction_log: log,
    }
}
