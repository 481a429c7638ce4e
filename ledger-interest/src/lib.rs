//! Daily compounding interest engine (C4): leap-year-aware daily rate,
//! idempotent per-day application, natural compounding across a date range.

mod engine;
mod error;
mod formula;
mod response;

pub use engine::InterestEngine;
pub use error::InterestError;
pub use formula::{annual_rate, days_in_year, is_leap};
pub use response::InterestCalculation;
