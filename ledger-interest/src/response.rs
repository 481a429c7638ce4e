use ledger_persistence::model::InterestLog;
use rust_decimal::Decimal;

/// Result of `calculate_daily_interest`. On replay (`is_new = false`) the
/// `interest_log` carries the originally persisted fields, never a
/// freshly recomputed copy — only `daily_rate` is recomputed, purely for
/// display.
#[derive(Debug, Clone, PartialEq)]
pub struct InterestCalculation {
    pub interest_log: InterestLog,
    pub is_new: bool,
    pub daily_rate: Decimal,
}
