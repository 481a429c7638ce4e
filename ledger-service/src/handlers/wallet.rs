use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::service::AppState;

#[derive(Deserialize)]
pub struct CreateWalletRequest {
    #[serde(default)]
    pub initial_balance: Option<Decimal>,
}

#[derive(Serialize)]
pub struct WalletView {
    pub id: Uuid,
    pub balance: String,
}

impl From<ledger_persistence::model::Wallet> for WalletView {
    fn from(wallet: ledger_persistence::model::Wallet) -> Self {
        Self {
            id: wallet.id,
            balance: ledger_decimal::to_fixed(wallet.balance, 2),
        }
    }
}

pub async fn create_wallet(
    State(state): State<AppState>,
    Json(body): Json<CreateWalletRequest>,
) -> Result<(StatusCode, Json<WalletView>), ServiceError> {
    let wallet = state
        .wallet_engine
        .create_wallet(body.initial_balance.unwrap_or(Decimal::ZERO))
        .await?;
    Ok((StatusCode::CREATED, Json(wallet.into())))
}

pub async fn get_wallet(
    State(state): State<AppState>,
    Path(wallet_id): Path<Uuid>,
) -> Result<Json<WalletView>, ServiceError> {
    match state.wallet_engine.get_wallet(wallet_id).await? {
        Some(wallet) => Ok(Json(wallet.into())),
        None => Err(ledger_wallet::TransferError::WalletNotFound(wallet_id).into()),
    }
}

#[derive(Deserialize)]
pub struct TransferRequestBody {
    pub from_wallet_id: Uuid,
    pub to_wallet_id: Uuid,
    pub amount: Decimal,
    pub idempotency_key: String,
}

#[derive(Serialize)]
pub struct TransferResponseBody {
    pub transaction_id: Uuid,
    pub status: String,
    pub is_idempotent: bool,
    pub message: Option<String>,
}

pub async fn transfer(
    State(state): State<AppState>,
    Json(body): Json<TransferRequestBody>,
) -> Result<(StatusCode, Json<TransferResponseBody>), ServiceError> {
    let response = state
        .wallet_engine
        .execute_transfer(ledger_wallet::TransferRequest {
            idempotency_key: body.idempotency_key,
            from_wallet_id: body.from_wallet_id,
            to_wallet_id: body.to_wallet_id,
            amount: body.amount,
        })
        .await?;

    let status = if response.is_idempotent {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((
        status,
        Json(TransferResponseBody {
            transaction_id: response.transaction_log.id,
            status: format!("{:?}", response.transaction_log.status),
            is_idempotent: response.is_idempotent,
            message: response.message,
        }),
    ))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Path(wallet_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ledger_persistence::model::TransactionLog>>, ServiceError> {
    let history = state
        .wallet_engine
        .get_transaction_history(wallet_id, query.limit)
        .await?;
    Ok(Json(history))
}

pub async fn list_ledger(
    State(state): State<AppState>,
    Path(wallet_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ledger_persistence::model::LedgerEntryView>>, ServiceError> {
    let ledger = state.wallet_engine.get_ledger(wallet_id, query.limit).await?;
    Ok(Json(ledger))
}
