mod interest;
mod wallet;

use axum::http::HeaderName;
use axum::routing::{get, post};
use axum::Router;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::service::AppState;

pub fn router(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .route("/wallets", post(wallet::create_wallet))
        .route("/wallets/:wallet_id", get(wallet::get_wallet))
        .route("/wallets/:wallet_id/transactions", get(wallet::list_transactions))
        .route("/wallets/:wallet_id/ledger", get(wallet::list_ledger))
        .route("/transfers", post(wallet::transfer))
        .route("/accounts", post(interest::create_account))
        .route("/accounts/:account_id", get(interest::get_account))
        .route(
            "/accounts/:account_id/interest",
            post(interest::calculate_daily_interest).get(interest::list_interest_history),
        )
        .layer(SetRequestIdLayer::new(request_id_header.clone(), MakeRequestUuid))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
