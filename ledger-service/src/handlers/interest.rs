use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::service::AppState;

#[derive(Deserialize)]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub initial_balance: Option<Decimal>,
}

#[derive(Serialize)]
pub struct AccountView {
    pub id: Uuid,
    pub balance: String,
}

impl From<ledger_persistence::model::Account> for AccountView {
    fn from(account: ledger_persistence::model::Account) -> Self {
        Self {
            id: account.id,
            balance: ledger_decimal::to_fixed(account.balance, 8),
        }
    }
}

pub async fn create_account(
    State(state): State<AppState>,
    Json(body): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountView>), ServiceError> {
    let account = state
        .interest_engine
        .create_account(body.initial_balance.unwrap_or(Decimal::ZERO))
        .await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

pub async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<AccountView>, ServiceError> {
    match state.interest_engine.get_account(account_id).await? {
        Some(account) => Ok(Json(account.into())),
        None => Err(ledger_interest::InterestError::AccountNotFound(account_id).into()),
    }
}

#[derive(Deserialize)]
pub struct CalculateInterestRequest {
    /// Defaults to the current UTC calendar date (§6).
    pub date: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct InterestCalculationView {
    pub is_new: bool,
    pub calculation_date: NaiveDate,
    pub principal_balance: String,
    pub interest_amount: String,
    pub new_balance: String,
    pub daily_rate: String,
}

pub async fn calculate_daily_interest(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
    Json(body): Json<CalculateInterestRequest>,
) -> Result<(StatusCode, Json<InterestCalculationView>), ServiceError> {
    let date = body.date.unwrap_or_else(|| Utc::now().date_naive());
    let result = state
        .interest_engine
        .calculate_daily_interest(account_id, date)
        .await?;

    let status = if result.is_new {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(InterestCalculationView {
            is_new: result.is_new,
            calculation_date: result.interest_log.calculation_date,
            principal_balance: ledger_decimal::to_fixed(result.interest_log.principal_balance, 8),
            interest_amount: ledger_decimal::to_fixed(result.interest_log.interest_amount, 8),
            new_balance: ledger_decimal::to_fixed(result.interest_log.new_balance, 8),
            daily_rate: ledger_decimal::to_fixed(result.daily_rate, 6),
        }),
    ))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

pub async fn list_interest_history(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ledger_persistence::model::InterestLog>>, ServiceError> {
    let history = state
        .interest_engine
        .get_interest_history(account_id, query.limit)
        .await?;
    Ok(Json(history))
}
