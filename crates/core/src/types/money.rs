//! Money amounts in whole currency units.
//!
//! Catalog prices, line totals, subtotals and tax are all whole units of a
//! single store currency (rupees for the default INR deployment). The payment
//! gateway wants minor units (paise), which [`Amount::to_minor_units`]
//! produces. All arithmetic is checked; callers decide what overflow means.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Tax rate applied to every order subtotal (5%).
pub const TAX_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Minor units per whole currency unit.
const MINOR_UNITS_PER_UNIT: i64 = 100;

/// A non-fractional money amount in the store currency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Create an amount from whole currency units.
    #[must_use]
    pub const fn new(units: i64) -> Self {
        Self(units)
    }

    /// Get the amount in whole currency units.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Whether the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Add two amounts, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Multiply a unit price by a quantity, returning `None` on overflow.
    #[must_use]
    pub fn checked_mul_qty(self, qty: u32) -> Option<Self> {
        self.0.checked_mul(i64::from(qty)).map(Self)
    }

    /// Tax on this amount at `rate`, rounded to the nearest whole unit.
    ///
    /// Uses exact decimal arithmetic and round-half-to-even, so `10 * 5%`
    /// (0.5) rounds to 0 and `30 * 5%` (1.5) rounds to 2.
    #[must_use]
    pub fn tax_at(self, rate: Decimal) -> Option<Self> {
        let tax = Decimal::from(self.0)
            .checked_mul(rate)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
        tax.to_i64().map(Self)
    }

    /// Convert to the gateway's minor units (x100).
    #[must_use]
    pub fn to_minor_units(self) -> Option<i64> {
        self.0.checked_mul(MINOR_UNITS_PER_UNIT)
    }
}

impl core::fmt::Display for Amount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Amount {
    fn from(units: i64) -> Self {
        Self(units)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_is_five_percent() {
        assert_eq!(TAX_RATE, Decimal::new(5, 2));
    }

    #[test]
    fn test_tax_on_round_subtotal() {
        assert_eq!(Amount::new(200).tax_at(TAX_RATE), Some(Amount::new(10)));
    }

    #[test]
    fn test_tax_rounds_half_to_even() {
        // 0.5 -> 0, 1.5 -> 2, 2.5 -> 2, 3.5 -> 4
        assert_eq!(Amount::new(10).tax_at(TAX_RATE), Some(Amount::new(0)));
        assert_eq!(Amount::new(30).tax_at(TAX_RATE), Some(Amount::new(2)));
        assert_eq!(Amount::new(50).tax_at(TAX_RATE), Some(Amount::new(2)));
        assert_eq!(Amount::new(70).tax_at(TAX_RATE), Some(Amount::new(4)));
    }

    #[test]
    fn test_tax_rounds_non_midpoints_to_nearest() {
        // 0.6 -> 1, 0.45 -> 0
        assert_eq!(Amount::new(12).tax_at(TAX_RATE), Some(Amount::new(1)));
        assert_eq!(Amount::new(9).tax_at(TAX_RATE), Some(Amount::new(0)));
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(Amount::new(210).to_minor_units(), Some(21_000));
        assert_eq!(Amount::new(i64::MAX).to_minor_units(), None);
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(
            Amount::new(100).checked_mul_qty(3),
            Some(Amount::new(300))
        );
        assert_eq!(Amount::new(i64::MAX).checked_mul_qty(2), None);
        assert_eq!(Amount::new(i64::MAX).checked_add(Amount::new(1)), None);
    }

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Amount::new(499)).unwrap(), "499");
        let parsed: Amount = serde_json::from_str("1299").unwrap();
        assert_eq!(parsed, Amount::new(1299));
    }
}
