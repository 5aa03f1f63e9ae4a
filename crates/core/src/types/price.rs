//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts are kept in the shop currency's standard unit (rupees, not
//! paisa). The currency itself is a display concern driven by the shop's
//! general settings, so a [`Price`] only carries the amount and renders
//! with whatever symbol the caller supplies.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of currency units.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Get the underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns `true` if the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Format for display with a currency symbol (e.g., "Rs 4,000").
    #[must_use]
    pub fn display_with(&self, symbol: &str) -> String {
        format!("{symbol} {}", format_amount(self.0))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_amount(self.0))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Format an amount with comma thousands separators.
///
/// The fractional part is kept exactly as the decimal carries it.
///
/// ```
/// use classic_carry_core::format_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_amount(Decimal::from(4000)), "4,000");
/// assert_eq!(format_amount(Decimal::new(123456789, 2)), "1,234,567.89");
/// ```
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let rendered = amount.to_string();
    let (sign, unsigned) = rendered
        .strip_prefix('-')
        .map_or(("", rendered.as_str()), |rest| ("-", rest));
    let (integer, fraction) = unsigned
        .split_once('.')
        .map_or((unsigned, None), |(i, f)| (i, Some(f)));

    let digits: Vec<char> = integer.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_small_values() {
        assert_eq!(format_amount(Decimal::ZERO), "0");
        assert_eq!(format_amount(Decimal::from(999)), "999");
    }

    #[test]
    fn test_format_amount_groups_thousands() {
        assert_eq!(format_amount(Decimal::from(1000)), "1,000");
        assert_eq!(format_amount(Decimal::from(25_000)), "25,000");
        assert_eq!(format_amount(Decimal::from(1_234_567)), "1,234,567");
    }

    #[test]
    fn test_format_amount_keeps_fraction_and_sign() {
        assert_eq!(format_amount(Decimal::new(150_050, 2)), "1,500.50");
        assert_eq!(format_amount(Decimal::from(-2000)), "-2,000");
    }

    #[test]
    fn test_display_with_symbol() {
        assert_eq!(Price::from_units(4000).display_with("Rs"), "Rs 4,000");
    }

    #[test]
    fn test_times_and_sum() {
        let line = Price::from_units(1000).times(3);
        assert_eq!(line, Price::from_units(3000));

        let total: Price = [Price::from_units(10), Price::from_units(5)].into_iter().sum();
        assert_eq!(total, Price::from_units(15));
    }

    #[test]
    fn test_deserializes_from_number_or_string() {
        let from_number: Price = serde_json::from_str("1999.5").unwrap();
        assert_eq!(from_number.amount(), Decimal::new(19995, 1));

        let from_text: Price = serde_json::from_str("\"200\"").unwrap();
        assert_eq!(from_text, Price::from_units(200));
    }

    #[test]
    fn test_is_negative() {
        assert!(Price::from_units(-1).is_negative());
        assert!(!Price::ZERO.is_negative());
        assert!(!Price::from_units(1).is_negative());
    }
}
