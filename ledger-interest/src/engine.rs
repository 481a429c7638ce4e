use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use ledger_persistence::model::{Account, InterestLog, NewInterestLog};
use ledger_persistence::{IsolationLevel, LedgerStore, PersistenceError};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::InterestError;
use crate::formula;
use crate::response::InterestCalculation;

const DEFAULT_HISTORY_LIMIT: i64 = 30;
const RATE_SCALE: u32 = 6;
const AMOUNT_SCALE: u32 = 8;

pub struct InterestEngine<S: LedgerStore> {
    store: Arc<S>,
}

impl<S: LedgerStore> InterestEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn create_account(&self, initial_balance: Decimal) -> Result<Account, InterestError> {
        if ledger_decimal::is_negative(initial_balance) {
            return Err(InterestError::InvalidAccount(
                "initial balance must not be negative".into(),
            ));
        }
        Ok(self.store.create_account(initial_balance).await?)
    }

    pub async fn get_account(&self, id: Uuid) -> Result<Option<Account>, InterestError> {
        Ok(self.store.get_account(id).await?)
    }

    pub async fn get_interest_history(
        &self,
        account_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<InterestLog>, InterestError> {
        Ok(self
            .store
            .get_interest_history(account_id, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
            .await?)
    }

    /// Applies one day of interest for `account_id` on `calculation_date`
    /// (§4.4). Idempotent: a second call for the same `(account_id, date)`
    /// returns the original log rather than applying interest twice.
    pub async fn calculate_daily_interest(
        &self,
        account_id: Uuid,
        calculation_date: NaiveDate,
    ) -> Result<InterestCalculation, InterestError> {
        let year = calculation_date.year();
        let daily_rate = formula::daily_rate(year)?;

        if let Some(existing) = self
            .store
            .find_interest_log(account_id, calculation_date)
            .await?
        {
            return Ok(InterestCalculation {
                interest_log: existing,
                is_new: false,
                daily_rate: ledger_decimal::round(daily_rate, RATE_SCALE),
            });
        }

        let account = self
            .store
            .get_account(account_id)
            .await?
            .ok_or(InterestError::AccountNotFound(account_id))?;

        let principal = account.balance;
        let interest_amount = formula::interest(principal, daily_rate)?;
        let new_balance = formula::new_balance(principal, interest_amount)?;

        let new_log = NewInterestLog {
            account_id,
            calculation_date,
            principal_balance: ledger_decimal::round(principal, AMOUNT_SCALE),
            interest_amount: ledger_decimal::round(interest_amount, AMOUNT_SCALE),
            new_balance: ledger_decimal::round(new_balance, AMOUNT_SCALE),
            annual_rate: ledger_decimal::round(formula::annual_rate(), RATE_SCALE),
            days_in_year: formula::days_in_year(year) as i32,
        };

        let mut tx = self.store.begin(IsolationLevel::ReadCommitted).await?;
        let inserted = match self.store.insert_interest_log(&mut tx, new_log).await {
            Ok(log) => log,
            Err(PersistenceError::UniqueViolation { .. }) => {
                let _ = self.store.rollback(tx).await;
                tracing::warn!(
                    target: "ledger-interest",
                    %account_id,
                    %calculation_date,
                    "lost the race to apply today's interest, replaying existing log"
                );
                let existing = self
                    .store
                    .find_interest_log(account_id, calculation_date)
                    .await?
                    .ok_or_else(|| {
                        InterestError::Persistence(PersistenceError::NotFound)
                    })?;
                return Ok(InterestCalculation {
                    interest_log: existing,
                    is_new: false,
                    daily_rate: ledger_decimal::round(daily_rate, RATE_SCALE),
                });
            }
            Err(err) => {
                let _ = self.store.rollback(tx).await;
                return Err(err.into());
            }
        };

        self.store
            .update_account_balance(
                &mut tx,
                account_id,
                ledger_decimal::round(new_balance, AMOUNT_SCALE),
            )
            .await?;
        self.store.commit(tx).await?;

        Ok(InterestCalculation {
            interest_log: inserted,
            is_new: true,
            daily_rate: ledger_decimal::round(daily_rate, RATE_SCALE),
        })
    }

    /// Applies interest for every calendar day in `[start, end]` inclusive,
    /// one transaction per day, so compounding happens naturally as each
    /// step reads the account's already-updated balance. Partial progress
    /// persists if a later day errors.
    pub async fn calculate_interest_for_date_range(
        &self,
        account_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<InterestCalculation>, InterestError> {
        let mut results = Vec::new();
        let mut date = start;
        while date <= end {
            let result = self.calculate_daily_interest(account_id, date).await?;
            results.push(result);
            date = date
                .succ_opt()
                .expect("NaiveDate::succ_opt overflowed far beyond any realistic calendar date");
        }
        Ok(results)
    }
}
