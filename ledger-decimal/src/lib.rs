//! Exact fixed-point decimal arithmetic.
//!
//! Binary floating point is never acceptable for money: every arithmetic
//! operation in this crate works on [`rust_decimal::Decimal`] and rounds
//! half-up, matching the precision and rounding policy set once at process
//! startup via [`init`]. Both the wallet transfer engine and the interest
//! engine route every monetary computation through here.

use std::cmp::Ordering;
use std::sync::OnceLock;

use rust_decimal::{Decimal, RoundingStrategy};

/// Minimum significant-digit precision required by the division operator.
/// rust_decimal caps internal precision at 28-29 digits; 24 leaves headroom
/// above the spec's 20-significant-digit floor while still fitting inside
/// a single `Decimal`.
const DIV_INTERNAL_SCALE: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    pub rounding: RoundingStrategy,
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            rounding: RoundingStrategy::MidpointAwayFromZero,
        }
    }
}

static PRECISION: OnceLock<Precision> = OnceLock::new();

/// Sets the process-wide rounding policy. Must be called once, before any
/// arithmetic in this crate runs. Subsequent calls are no-ops if the value
/// is identical, and panic otherwise — settings are fixed at startup and
/// never mutated (see the interest engine's determinism requirement).
pub fn init(precision: Precision) {
    match PRECISION.set(precision) {
        Ok(()) => {}
        Err(_) => {
            let existing = PRECISION.get().expect("just failed to set, so it's set");
            assert_eq!(
                *existing, precision,
                "decimal precision/rounding was already initialized with different settings"
            );
        }
    }
}

fn precision() -> Precision {
    *PRECISION.get_or_init(Precision::default)
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum DecimalError {
    #[error("could not parse '{0}' as an exact decimal")]
    Parse(String),
    #[error("decimal operation overflowed")]
    Overflow,
    #[error("division by zero")]
    DivisionByZero,
}

/// Parses a decimal from its canonical textual form with no implicit
/// rounding. Round-trips with [`to_fixed`]: `from_string(to_fixed(x, s)) ==
/// x` whenever `x` already has scale `<= s`.
pub fn from_string(s: &str) -> Result<Decimal, DecimalError> {
    Decimal::from_str_exact(s.trim()).map_err(|_| DecimalError::Parse(s.to_string()))
}

pub fn add(a: Decimal, b: Decimal) -> Result<Decimal, DecimalError> {
    a.checked_add(b).ok_or(DecimalError::Overflow)
}

pub fn sub(a: Decimal, b: Decimal) -> Result<Decimal, DecimalError> {
    a.checked_sub(b).ok_or(DecimalError::Overflow)
}

pub fn mul(a: Decimal, b: Decimal) -> Result<Decimal, DecimalError> {
    a.checked_mul(b).ok_or(DecimalError::Overflow)
}

/// Divides `a / b` at `DIV_INTERNAL_SCALE` digits of precision, rounding
/// half-up per the process-wide policy. Callers narrow to their entity's
/// persisted scale with [`to_fixed`].
pub fn div(a: Decimal, b: Decimal) -> Result<Decimal, DecimalError> {
    if b.is_zero() {
        return Err(DecimalError::DivisionByZero);
    }
    let raw = a.checked_div(b).ok_or(DecimalError::Overflow)?;
    Ok(raw.round_dp_with_strategy(DIV_INTERNAL_SCALE, precision().rounding))
}

pub fn compare(a: Decimal, b: Decimal) -> Ordering {
    a.cmp(&b)
}

pub fn is_negative(a: Decimal) -> bool {
    a.is_sign_negative() && !a.is_zero()
}

/// Rounds `a` to exactly `scale` fractional digits per the process-wide
/// rounding policy, staying in `Decimal` for further arithmetic or storage.
pub fn round(a: Decimal, scale: u32) -> Decimal {
    a.round_dp_with_strategy(scale, precision().rounding)
}

/// Renders `a` rounded half-up to exactly `scale` fractional digits, in
/// plain `d.dddd…` form — no exponent, no digit grouping.
pub fn to_fixed(a: Decimal, scale: u32) -> String {
    format!("{:.*}", scale as usize, round(a, scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn to_fixed_pads_and_rounds_half_up() {
        assert_eq!(to_fixed(dec!(10), 2), "10.00");
        assert_eq!(to_fixed(dec!(10.005), 2), "10.01");
        assert_eq!(to_fixed(dec!(-10.005), 2), "-10.01");
    }

    #[test]
    fn from_string_round_trips_through_to_fixed() {
        let original = from_string("10007.53424658").unwrap();
        let rendered = to_fixed(original, 8);
        assert_eq!(from_string(&rendered).unwrap(), original);
    }

    #[test]
    fn from_string_rejects_garbage() {
        assert!(from_string("not-a-number").is_err());
    }

    #[test]
    fn div_rounds_half_up_at_internal_scale() {
        let principal = dec!(10000);
        let rate = div(dec!(0.275), dec!(365)).unwrap();
        let interest = mul(principal, rate).unwrap();
        assert_eq!(to_fixed(interest, 8), "7.53424658");
    }

    #[test]
    fn div_by_zero_is_an_error() {
        assert_eq!(div(dec!(1), dec!(0)), Err(DecimalError::DivisionByZero));
    }

    #[test]
    fn is_negative_excludes_zero() {
        assert!(!is_negative(dec!(0)));
        assert!(is_negative(dec!(-0.01)));
        assert!(!is_negative(dec!(0.01)));
    }

    #[test]
    fn init_is_idempotent_for_identical_settings() {
        init(Precision::default());
        init(Precision::default());
    }
}
