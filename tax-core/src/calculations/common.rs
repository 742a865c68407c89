//! Decimal helpers shared by the estimator and result formatting.

use rust_decimal::{Decimal, RoundingStrategy};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Rounds to cents, with midpoints going away from zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(25700.005)), dec!(25700.01));
/// assert_eq!(round_half_up(dec!(-0.125)), dec!(-0.13));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `amount * percent / 100`, or `None` on overflow.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(50000), dec!(13.4)), Some(dec!(6700)));
/// ```
pub fn percent_of(
    amount: Decimal,
    percent: Decimal,
) -> Option<Decimal> {
    amount.checked_mul(percent)?.checked_div(HUNDRED)
}

/// `part / whole * 100`, defined as zero when `whole` is zero.
pub fn percentage(
    part: Decimal,
    whole: Decimal,
) -> Option<Decimal> {
    if whole.is_zero() {
        return Some(Decimal::ZERO);
    }
    part.checked_div(whole)?.checked_mul(HUNDRED)
}
