use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ledger_interest::InterestError;
use ledger_wallet::TransferError;
use serde::Serialize;

/// Translates `TransferError`/`InterestError` into the status table from
/// §6: validation failures are Bad Request, missing entities are Not
/// Found, everything else — including persistence faults that escaped the
/// engine's own retry handling — is an Internal Error. Route handlers
/// never inspect engine error variants directly; they convert once, here.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Interest(#[from] InterestError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::Transfer(TransferError::MissingIdempotencyKey)
            | ServiceError::Transfer(TransferError::InvalidTransfer(_))
            | ServiceError::Transfer(TransferError::InsufficientFunds { .. })
            | ServiceError::Interest(InterestError::InvalidAccount(_)) => StatusCode::BAD_REQUEST,

            ServiceError::Transfer(TransferError::WalletNotFound(_))
            | ServiceError::Interest(InterestError::AccountNotFound(_)) => StatusCode::NOT_FOUND,

            ServiceError::Transfer(TransferError::InternalInconsistency(_))
            | ServiceError::Transfer(TransferError::Persistence(_))
            | ServiceError::Interest(InterestError::Calculation(_))
            | ServiceError::Interest(InterestError::Persistence(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(target: "ledger-service", error = %self, "request failed");
        }

        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
