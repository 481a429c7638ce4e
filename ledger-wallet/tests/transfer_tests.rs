//! Integration tests against a real Postgres instance. Each test gets a
//! freshly migrated, isolated database from `sqlx::test`.

use std::sync::Arc;

use ledger_persistence::PgStore;
use ledger_wallet::{TransferError, TransferRequest, WalletEngine};
use rust_decimal_macros::dec;
use sqlx::PgPool;

fn engine(pool: PgPool) -> WalletEngine<PgStore> {
    WalletEngine::new(Arc::new(PgStore::new(pool)))
}

#[sqlx::test(migrations = "../migrations")]
async fn basic_transfer_moves_funds_and_writes_double_entry(pool: PgPool) {
    let engine = engine(pool);
    let from = engine.create_wallet(dec!(100.00)).await.unwrap();
    let to = engine.create_wallet(dec!(0.00)).await.unwrap();

    let response = engine
        .execute_transfer(TransferRequest {
            idempotency_key: "txn-1".into(),
            from_wallet_id: from.id,
            to_wallet_id: to.id,
            amount: dec!(40.00),
        })
        .await
        .unwrap();

    assert!(response.success);
    assert!(!response.is_idempotent);

    let from_after = engine.get_wallet(from.id).await.unwrap().unwrap();
    let to_after = engine.get_wallet(to.id).await.unwrap().unwrap();
    assert_eq!(from_after.balance, dec!(60.00));
    assert_eq!(to_after.balance, dec!(40.00));

    let ledger = engine.get_ledger(from.id, None).await.unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].balance_after, dec!(60.00));
}

#[sqlx::test(migrations = "../migrations")]
async fn replaying_the_same_idempotency_key_does_not_double_move_funds(pool: PgPool) {
    let engine = engine(pool);
    let from = engine.create_wallet(dec!(100.00)).await.unwrap();
    let to = engine.create_wallet(dec!(0.00)).await.unwrap();

    let req = TransferRequest {
        idempotency_key: "txn-replay".into(),
        from_wallet_id: from.id,
        to_wallet_id: to.id,
        amount: dec!(25.00),
    };

    let first = engine.execute_transfer(req.clone()).await.unwrap();
    let second = engine.execute_transfer(req).await.unwrap();

    assert_eq!(first.transaction_log.id, second.transaction_log.id);
    assert!(second.is_idempotent);

    let from_after = engine.get_wallet(from.id).await.unwrap().unwrap();
    assert_eq!(from_after.balance, dec!(75.00));
}

#[sqlx::test(migrations = "../migrations")]
async fn insufficient_funds_marks_the_log_failed_without_moving_money(pool: PgPool) {
    let engine = engine(pool);
    let from = engine.create_wallet(dec!(10.00)).await.unwrap();
    let to = engine.create_wallet(dec!(0.00)).await.unwrap();

    let err = engine
        .execute_transfer(TransferRequest {
            idempotency_key: "txn-insufficient".into(),
            from_wallet_id: from.id,
            to_wallet_id: to.id,
            amount: dec!(50.00),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::InsufficientFunds { .. }));

    let from_after = engine.get_wallet(from.id).await.unwrap().unwrap();
    assert_eq!(from_after.balance, dec!(10.00));

    let history = engine.get_transaction_history(from.id, None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].error_message.is_some());
}

#[sqlx::test(migrations = "../migrations")]
async fn transfer_to_a_missing_wallet_fails_without_panicking(pool: PgPool) {
    let engine = engine(pool);
    let from = engine.create_wallet(dec!(10.00)).await.unwrap();

    let err = engine
        .execute_transfer(TransferRequest {
            idempotency_key: "txn-missing".into(),
            from_wallet_id: from.id,
            to_wallet_id: uuid::Uuid::new_v4(),
            amount: dec!(1.00),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::WalletNotFound(_)));
}

#[sqlx::test(migrations = "../migrations")]
async fn concurrent_opposite_direction_transfers_do_not_deadlock(pool: PgPool) {
    let engine = Arc::new(engine(pool));
    let a = engine.create_wallet(dec!(100.00)).await.unwrap();
    let b = engine.create_wallet(dec!(100.00)).await.unwrap();

    let e1 = engine.clone();
    let (a1, b1) = (a.id, b.id);
    let forward = tokio::spawn(async move {
        e1.execute_transfer(TransferRequest {
            idempotency_key: "a-to-b".into(),
            from_wallet_id: a1,
            to_wallet_id: b1,
            amount: dec!(10.00),
        })
        .await
    });

    let e2 = engine.clone();
    let (a2, b2) = (a.id, b.id);
    let backward = tokio::spawn(async move {
        e2.execute_transfer(TransferRequest {
            idempotency_key: "b-to-a".into(),
            from_wallet_id: b2,
            to_wallet_id: a2,
            amount: dec!(5.00),
        })
        .await
    });

    let (r1, r2) = tokio::join!(forward, backward);
    r1.unwrap().unwrap();
    r2.unwrap().unwrap();

    let a_after = engine.get_wallet(a.id).await.unwrap().unwrap();
    let b_after = engine.get_wallet(b.id).await.unwrap().unwrap();
    assert_eq!(a_after.balance, dec!(95.00));
    assert_eq!(b_after.balance, dec!(105.00));
}

#[sqlx::test(migrations = "../migrations")]
async fn rejects_a_zero_amount_transfer(pool: PgPool) {
    let engine = engine(pool);
    let from = engine.create_wallet(dec!(10.00)).await.unwrap();
    let to = engine.create_wallet(dec!(0.00)).await.unwrap();

    let err = engine
        .execute_transfer(TransferRequest {
            idempotency_key: "txn-zero".into(),
            from_wallet_id: from.id,
            to_wallet_id: to.id,
            amount: dec!(0.00),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::InvalidTransfer(_)));
}

#[sqlx::test(migrations = "../migrations")]
async fn rejects_a_self_transfer(pool: PgPool) {
    let engine = engine(pool);
    let wallet = engine.create_wallet(dec!(10.00)).await.unwrap();

    let err = engine
        .execute_transfer(TransferRequest {
            idempotency_key: "txn-self".into(),
            from_wallet_id: wallet.id,
            to_wallet_id: wallet.id,
            amount: dec!(1.00),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::InvalidTransfer(_)));
}
