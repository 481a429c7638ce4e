//! Pure interest-rate math (§4.4). No I/O, no process-global state besides
//! the decimal rounding policy every calculation routes through.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// The fixed nominal annual rate every account accrues at.
pub fn annual_rate() -> Decimal {
    dec!(0.275)
}

pub fn is_leap(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_year(year: i32) -> u32 {
    if is_leap(year) {
        366
    } else {
        365
    }
}

/// `ANNUAL_RATE / days_in_year(year)`, at the decimal crate's internal
/// division precision, rounded half-up per the process-wide policy.
pub fn daily_rate(year: i32) -> Result<Decimal, ledger_decimal::DecimalError> {
    ledger_decimal::div(annual_rate(), Decimal::from(days_in_year(year)))
}

pub fn interest(principal: Decimal, rate: Decimal) -> Result<Decimal, ledger_decimal::DecimalError> {
    ledger_decimal::mul(principal, rate)
}

pub fn new_balance(
    principal: Decimal,
    interest_amount: Decimal,
) -> Result<Decimal, ledger_decimal::DecimalError> {
    ledger_decimal::add(principal, interest_amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leap_years_follow_the_gregorian_rule() {
        assert!(is_leap(2000));
        assert!(!is_leap(1900));
        assert!(is_leap(2024));
        assert!(!is_leap(2023));
    }

    #[test]
    fn days_in_year_matches_leap_status() {
        assert_eq!(days_in_year(2023), 365);
        assert_eq!(days_in_year(2024), 366);
    }

    #[test]
    fn non_leap_year_single_day_interest_matches_s5() {
        let rate = daily_rate(2023).unwrap();
        let interest = interest(dec!(10000), rate).unwrap();
        assert_eq!(ledger_decimal::to_fixed(interest, 8), "7.53424658");
    }
}
