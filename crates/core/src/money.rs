use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

pub const CURRENCY: &str = "KES";

/// A shilling amount kept at two decimal places at most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn amount(self) -> Decimal {
        self.0
    }

    pub fn to_f64(self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

/// Groups the integer part with commas and keeps at most two fraction digits,
/// dropping trailing zeros ("1,500", "1,500.5").
pub fn format_number(value: Decimal) -> String {
    let rounded = value.round_dp(2).normalize();
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(&f);
    }
    out
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CURRENCY} {}", format_number(self.0))
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn display_groups_thousands() {
        assert_eq!(Money::from_decimal(d("1234567")).to_string(), "KES 1,234,567");
        assert_eq!(Money::from_decimal(d("950")).to_string(), "KES 950");
    }

    #[test]
    fn display_keeps_significant_fraction() {
        assert_eq!(Money::from_decimal(d("1500.50")).to_string(), "KES 1,500.5");
        assert_eq!(Money::from_decimal(d("2000.00")).to_string(), "KES 2,000");
    }

    #[test]
    fn format_number_negative() {
        assert_eq!(format_number(d("-12500")), "-12,500");
    }

    #[test]
    fn from_decimal_rounds_to_cents() {
        assert_eq!(Money::from_decimal(d("10.005")).amount(), d("10.00"));
        assert_eq!(Money::from_decimal(d("10.015")).amount(), d("10.02"));
    }

    #[test]
    fn arithmetic_and_sum() {
        let total: Money = [d("100"), d("250.5")].into_iter().map(Money::from).sum();
        assert_eq!(total.amount(), d("350.5"));
        assert_eq!((total - Money::from(d("50"))).amount(), d("300.5"));
    }
}
