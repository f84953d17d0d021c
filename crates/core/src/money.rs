//! Exact money arithmetic.
//!
//! All amounts (HT, TVA, TTC, payments, expenses) are `Decimal` in dirhams.
//! No binary floating point is involved, so totals reconcile exactly; the
//! settlement tolerance below only absorbs sub-centime remainders left by
//! percentage taxes.
//!
//! `Decimal` panics on overflow with the plain operators, so every helper
//! that combines caller-supplied amounts goes through the checked variants
//! and reports an amount that does not fit as a Validation error.

use rust_decimal_macros::dec;

use crate::error::{DomainError, DomainResult};

pub use rust_decimal::Decimal;

/// Remaining balances at or below this amount count as settled.
pub const SETTLEMENT_EPSILON: Decimal = dec!(0.01);

fn out_of_range() -> DomainError {
    DomainError::validation("amount exceeds the supported range")
}

/// `base × rate / 100`, kept exact.
///
/// The rate is applied as the fraction `rate / 100` so bases near the top of
/// the range do not overflow on an intermediate product.
pub fn percent_of(base: Decimal, rate: u32) -> DomainResult<Decimal> {
    base.checked_mul(Decimal::new(i64::from(rate), 2))
        .ok_or_else(out_of_range)
}

/// Multiply a unit price by an integer quantity.
pub fn extend(unit_price: Decimal, quantity: i64) -> DomainResult<Decimal> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(out_of_range)
}

pub fn add(a: Decimal, b: Decimal) -> DomainResult<Decimal> {
    a.checked_add(b).ok_or_else(out_of_range)
}

pub fn sub(a: Decimal, b: Decimal) -> DomainResult<Decimal> {
    a.checked_sub(b).ok_or_else(out_of_range)
}

/// Sum that fails instead of panicking when the total leaves `Decimal` range.
pub fn sum<I>(amounts: I) -> DomainResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().try_fold(Decimal::ZERO, add)
}

/// Whether an outstanding amount is within the settlement tolerance.
pub fn is_settled(remaining: Decimal) -> bool {
    remaining <= SETTLEMENT_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_of_is_exact() {
        assert_eq!(percent_of(dec!(200), 20).unwrap(), dec!(40));
        assert_eq!(percent_of(dec!(19.99), 7).unwrap(), dec!(1.3993));
    }

    #[test]
    fn settlement_tolerance_is_one_centime() {
        assert!(is_settled(dec!(0.01)));
        assert!(is_settled(dec!(0)));
        assert!(!is_settled(dec!(0.011)));
    }

    #[test]
    fn extend_near_the_top_of_the_range_is_rejected() {
        assert!(matches!(
            extend(Decimal::MAX, 10),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            extend(dec!(100000000000000000000), i64::MAX),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            extend(Decimal::MAX, -2),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(extend(Decimal::MAX, 1).unwrap(), Decimal::MAX);
    }

    #[test]
    fn percent_of_stays_within_range_for_tax_rates() {
        assert!(percent_of(Decimal::MAX, 20).unwrap() < Decimal::MAX);
        assert!(matches!(
            percent_of(Decimal::MAX, 150),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn sums_that_leave_the_range_are_rejected() {
        assert_eq!(sum([dec!(1), dec!(2.5)]).unwrap(), dec!(3.5));
        assert_eq!(sum(std::iter::empty()).unwrap(), Decimal::ZERO);
        assert!(matches!(
            sum([Decimal::MAX, dec!(1)]),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            sub(Decimal::MIN, dec!(1)),
            Err(DomainError::Validation(_))
        ));
    }
}
