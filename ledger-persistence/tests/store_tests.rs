//! Direct coverage of the repository contract, independent of either
//! engine. Each test gets a freshly migrated, isolated database.

use chrono::NaiveDate;
use ledger_persistence::model::{EntryType, NewInterestLog, NewLedgerEntry, NewTransactionLog};
use ledger_persistence::{IsolationLevel, LedgerStore, PersistenceError, PgStore};
use rust_decimal_macros::dec;
use sqlx::PgPool;

#[sqlx::test(migrations = "../migrations")]
async fn create_and_get_wallet_round_trips(pool: PgPool) {
    let store = PgStore::new(pool);
    let wallet = store.create_wallet(dec!(50.00)).await.unwrap();

    let fetched = store.get_wallet(wallet.id).await.unwrap().unwrap();
    assert_eq!(fetched.balance, dec!(50.00));

    assert!(store.get_wallet(uuid::Uuid::new_v4()).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../migrations")]
async fn lock_wallet_for_update_returns_none_for_missing_wallet(pool: PgPool) {
    let store = PgStore::new(pool);
    let mut tx = store.begin(IsolationLevel::Serializable).await.unwrap();
    let missing = store
        .lock_wallet_for_update(&mut tx, uuid::Uuid::new_v4())
        .await
        .unwrap();
    assert!(missing.is_none());
    store.rollback(tx).await.unwrap();
}

#[sqlx::test(migrations = "../migrations")]
async fn duplicate_idempotency_key_is_classified_as_unique_violation(pool: PgPool) {
    let store = PgStore::new(pool);
    let a = store.create_wallet(dec!(100.00)).await.unwrap();
    let b = store.create_wallet(dec!(0.00)).await.unwrap();

    let mut tx1 = store.begin(IsolationLevel::Serializable).await.unwrap();
    store
        .insert_transaction_log(
            &mut tx1,
            NewTransactionLog {
                idempotency_key: "dup-key".into(),
                from_wallet_id: a.id,
                to_wallet_id: b.id,
                amount: dec!(10.00),
            },
        )
        .await
        .unwrap();
    store.commit(tx1).await.unwrap();

    let mut tx2 = store.begin(IsolationLevel::Serializable).await.unwrap();
    let err = store
        .insert_transaction_log(
            &mut tx2,
            NewTransactionLog {
                idempotency_key: "dup-key".into(),
                from_wallet_id: a.id,
                to_wallet_id: b.id,
                amount: dec!(10.00),
            },
        )
        .await
        .unwrap_err();
    store.rollback(tx2).await.unwrap();

    assert!(matches!(err, PersistenceError::UniqueViolation { .. }));
}

#[sqlx::test(migrations = "../migrations")]
async fn ledger_entries_join_their_transaction_log_status(pool: PgPool) {
    let store = PgStore::new(pool);
    let a = store.create_wallet(dec!(100.00)).await.unwrap();
    let b = store.create_wallet(dec!(0.00)).await.unwrap();

    let mut tx = store.begin(IsolationLevel::Serializable).await.unwrap();
    let log = store
        .insert_transaction_log(
            &mut tx,
            NewTransactionLog {
                idempotency_key: "join-test".into(),
                from_wallet_id: a.id,
                to_wallet_id: b.id,
                amount: dec!(10.00),
            },
        )
        .await
        .unwrap();
    store
        .insert_ledger_entry(
            &mut tx,
            NewLedgerEntry {
                wallet_id: a.id,
                transaction_log_id: log.id,
                entry_type: EntryType::Debit,
                amount: dec!(10.00),
                balance_before: dec!(100.00),
                balance_after: dec!(90.00),
                description: None,
            },
        )
        .await
        .unwrap();
    store.mark_transaction_completed(&mut tx, log.id).await.unwrap();
    store.commit(tx).await.unwrap();

    let ledger = store.get_ledger(a.id, 10).await.unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].idempotency_key, "join-test");
    assert_eq!(
        ledger[0].transaction_status,
        ledger_persistence::model::TransactionStatus::Completed
    );
}

#[sqlx::test(migrations = "../migrations")]
async fn duplicate_interest_log_for_the_same_day_is_a_unique_violation(pool: PgPool) {
    let store = PgStore::new(pool);
    let account = store.create_account(dec!(1000)).await.unwrap();
    let date = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();

    let mut tx1 = store.begin(IsolationLevel::ReadCommitted).await.unwrap();
    store
        .insert_interest_log(
            &mut tx1,
            NewInterestLog {
                account_id: account.id,
                calculation_date: date,
                principal_balance: dec!(1000.00000000),
                interest_amount: dec!(0.75342466),
                new_balance: dec!(1000.75342466),
                annual_rate: dec!(0.275000),
                days_in_year: 365,
            },
        )
        .await
        .unwrap();
    store.commit(tx1).await.unwrap();

    let mut tx2 = store.begin(IsolationLevel::ReadCommitted).await.unwrap();
    let err = store
        .insert_interest_log(
            &mut tx2,
            NewInterestLog {
                account_id: account.id,
                calculation_date: date,
                principal_balance: dec!(1000.00000000),
                interest_amount: dec!(0.75342466),
                new_balance: dec!(1000.75342466),
                annual_rate: dec!(0.275000),
                days_in_year: 365,
            },
        )
        .await
        .unwrap_err();
    store.rollback(tx2).await.unwrap();

    assert!(matches!(err, PersistenceError::UniqueViolation { .. }));
}
