//! Integration tests against a real Postgres instance.

use std::sync::Arc;

use chrono::NaiveDate;
use ledger_interest::InterestEngine;
use ledger_persistence::PgStore;
use rust_decimal_macros::dec;
use sqlx::PgPool;

fn engine(pool: PgPool) -> InterestEngine<PgStore> {
    InterestEngine::new(Arc::new(PgStore::new(pool)))
}

#[sqlx::test(migrations = "../migrations")]
async fn single_day_non_leap_year_interest_matches_s5(pool: PgPool) {
    let engine = engine(pool);
    let account = engine.create_account(dec!(10000.00000000)).await.unwrap();
    let date = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();

    let result = engine
        .calculate_daily_interest(account.id, date)
        .await
        .unwrap();

    assert!(result.is_new);
    assert_eq!(
        ledger_decimal::to_fixed(result.interest_log.interest_amount, 8),
        "7.53424658"
    );
    assert_eq!(
        ledger_decimal::to_fixed(result.interest_log.new_balance, 8),
        "10007.53424658"
    );
    assert_eq!(result.interest_log.days_in_year, 365);

    let after = engine.get_account(account.id).await.unwrap().unwrap();
    assert_eq!(
        ledger_decimal::to_fixed(after.balance, 8),
        "10007.53424658"
    );

    let replay = engine
        .calculate_daily_interest(account.id, date)
        .await
        .unwrap();
    assert!(!replay.is_new);
    assert_eq!(replay.interest_log.id, result.interest_log.id);

    let unchanged = engine.get_account(account.id).await.unwrap().unwrap();
    assert_eq!(unchanged.balance, after.balance);

    let history = engine.get_interest_history(account.id, None).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[sqlx::test(migrations = "../migrations")]
async fn full_leap_year_compounding_matches_s6(pool: PgPool) {
    let engine = engine(pool);
    let account = engine.create_account(dec!(10000)).await.unwrap();

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();

    let results = engine
        .calculate_interest_for_date_range(account.id, start, end)
        .await
        .unwrap();

    assert_eq!(results.len(), 366);
    assert!(results.iter().all(|r| r.interest_log.days_in_year == 366));

    let after = engine.get_account(account.id).await.unwrap().unwrap();
    assert_eq!(ledger_decimal::to_fixed(after.balance, 2), "13163.95");

    let history = engine.get_interest_history(account.id, None).await.unwrap();
    assert_eq!(history.len(), 30);
}
