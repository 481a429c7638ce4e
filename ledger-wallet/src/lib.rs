//! Wallet transfer engine (C3): idempotent, deadlock-free, double-entry
//! transfers between two-decimal-place wallets.

mod engine;
mod error;
mod response;

pub use engine::WalletEngine;
pub use error::TransferError;
pub use response::{TransferRequest, TransferResponse};
