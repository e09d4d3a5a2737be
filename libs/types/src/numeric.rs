//! 256-bit fixed-point types for prices and amounts
//!
//! All internal quantities are 18-decimal fixed-point integers carried in
//! 256 bits. Products (`price * amount`) go through a 512-bit intermediate so
//! they never wrap; narrowing back to 256 bits is checked. Serialized as
//! decimal strings to prevent JSON number precision loss.

use primitive_types::{U256, U512};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Multiply two 256-bit values and divide by a third, with a 512-bit
/// intermediate. Returns `None` when the divisor is zero or the quotient
/// does not fit back into 256 bits.
pub fn mul_div(a: U256, b: U256, divisor: U256) -> Option<U256> {
    if divisor.is_zero() {
        return None;
    }
    let wide = a.full_mul(b) / U512::from(divisor);
    narrow(wide)
}

fn narrow(wide: U512) -> Option<U256> {
    if (wide >> 256).is_zero() {
        let mut limbs = [0u64; 4];
        limbs.copy_from_slice(&wide.0[..4]);
        Some(U256(limbs))
    } else {
        None
    }
}

/// Price type: quote units per one base unit, scaled by the market's price
/// precision and quantized to a multiple of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(U256);

impl Price {
    pub fn new(value: U256) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(U256::zero())
    }

    /// Create from integer (for testing/convenience)
    pub fn from_u64(value: u64) -> Self {
        Self(U256::from(value))
    }

    pub fn from_u128(value: u128) -> Self {
        Self(U256::from(value))
    }

    /// Create from a decimal string, `None` if it does not parse
    pub fn from_dec_str(s: &str) -> Option<Self> {
        U256::from_dec_str(s).ok().map(Self)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Whether this price sits on the discrete grid defined by `precision`.
    pub fn is_aligned_to(&self, precision: Price) -> bool {
        !precision.0.is_zero() && (self.0 % precision.0).is_zero()
    }

    /// One grid step down, `None` at or below the first step.
    pub fn step_down(&self, precision: Price) -> Option<Price> {
        let next = self.0.checked_sub(precision.0)?;
        if next.is_zero() {
            None
        } else {
            Some(Self(next))
        }
    }

    /// One grid step up, `None` on 256-bit overflow.
    pub fn step_up(&self, precision: Price) -> Option<Price> {
        self.0.checked_add(precision.0).map(Self)
    }

    /// Quote value of `amount` base units at this price:
    /// `price * amount / precision`, exact whenever the price is aligned.
    pub fn quote_value(&self, amount: Amount, precision: Price) -> Option<Amount> {
        mul_div(self.0, amount.0, precision.0).map(Amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Amount type: a base-asset or quote-asset quantity in canonical 18-decimal
/// units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(U256);

impl Amount {
    pub fn new(value: U256) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(U256::zero())
    }

    /// Create from integer (for testing/convenience)
    pub fn from_u64(value: u64) -> Self {
        Self(U256::from(value))
    }

    pub fn from_u128(value: u128) -> Self {
        Self(U256::from(value))
    }

    /// Create from a decimal string, `None` if it does not parse
    pub fn from_dec_str(s: &str) -> Option<Self> {
        U256::from_dec_str(s).ok().map(Self)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// Narrow to `u64`, `None` if the value does not fit.
    pub fn as_u64(&self) -> Option<u64> {
        if self.0 > U256::from(u64::MAX) {
            None
        } else {
            Some(self.0.low_u64())
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    pub fn saturating_add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }

    pub fn min(self, rhs: Amount) -> Amount {
        if self.0 <= rhs.0 {
            self
        } else {
            rhs
        }
    }
}

// Arithmetic operators panic on wrap, mirroring integer overflow semantics.
// Engine code goes through the checked methods and maps failures to errors.
impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        assert!(self.0 >= rhs.0, "Amount subtraction would underflow");
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Custom serialization to preserve precision
macro_rules! string_serde {
    ($name:ident) => {
        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                let value = U256::from_dec_str(&s).map_err(serde::de::Error::custom)?;
                Ok(Self(value))
            }
        }
    };
}

string_serde!(Price);
string_serde!(Amount);

#[cfg(test)]
mod tests {
    use super::*;

    fn e18(units: u64) -> U256 {
        U256::from(units) * U256::exp10(18)
    }

    #[test]
    fn test_mul_div_basic() {
        let result = mul_div(U256::from(6), U256::from(7), U256::from(2)).unwrap();
        assert_eq!(result, U256::from(21));
    }

    #[test]
    fn test_mul_div_zero_divisor() {
        assert!(mul_div(U256::from(1), U256::from(1), U256::zero()).is_none());
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        // a * b overflows 256 bits, but the quotient fits
        let a = U256::MAX;
        let result = mul_div(a, U256::from(10), U256::from(10)).unwrap();
        assert_eq!(result, a);
    }

    #[test]
    fn test_mul_div_narrowing_overflow() {
        assert!(mul_div(U256::MAX, U256::from(2), U256::from(1)).is_none());
    }

    #[test]
    fn test_quote_value() {
        // 1 base at price 2000 (both 18-decimal) = 2000 quote
        let price = Price::new(e18(2000));
        let amount = Amount::new(e18(1));
        let precision = Price::new(U256::exp10(18));

        let quote = price.quote_value(amount, precision).unwrap();
        assert_eq!(quote, Amount::new(e18(2000)));
    }

    #[test]
    fn test_price_alignment() {
        let precision = Price::new(U256::exp10(18));
        assert!(Price::new(e18(2000)).is_aligned_to(precision));
        assert!(!Price::new(e18(2000) + U256::one()).is_aligned_to(precision));
    }

    #[test]
    fn test_price_step_down_stops_at_zero() {
        let precision = Price::new(U256::exp10(18));
        let price = Price::new(U256::exp10(18));
        assert_eq!(price.step_down(precision), None, "zero is not a price");

        let two = Price::new(e18(2));
        assert_eq!(two.step_down(precision), Some(Price::new(e18(1))));
    }

    #[test]
    fn test_price_step_up_overflow() {
        let precision = Price::new(U256::one());
        assert!(Price::new(U256::MAX).step_up(precision).is_none());
    }

    #[test]
    fn test_amount_checked_arithmetic() {
        let a = Amount::from_u64(10);
        let b = Amount::from_u64(3);

        assert_eq!(a.checked_add(b), Some(Amount::from_u64(13)));
        assert_eq!(a.checked_sub(b), Some(Amount::from_u64(7)));
        assert_eq!(b.checked_sub(a), None);
        assert_eq!(Amount::new(U256::MAX).checked_add(Amount::from_u64(1)), None);
    }

    #[test]
    #[should_panic(expected = "Amount subtraction would underflow")]
    fn test_amount_sub_underflow_panics() {
        let _ = Amount::from_u64(1) - Amount::from_u64(2);
    }

    #[test]
    fn test_amount_as_u64() {
        assert_eq!(Amount::from_u64(7).as_u64(), Some(7));
        assert_eq!(Amount::new(U256::from(u64::MAX) + U256::one()).as_u64(), None);
    }

    #[test]
    fn test_amount_min() {
        let a = Amount::from_u64(5);
        let b = Amount::from_u64(9);
        assert_eq!(a.min(b), a);
        assert_eq!(b.min(a), a);
    }

    #[test]
    fn test_string_serialization() {
        let amount = Amount::new(e18(2000));
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"2000000000000000000000\"");

        let deserialized: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(amount, deserialized);
    }

    #[test]
    fn test_price_serialization_round_trip() {
        let price = Price::new(e18(1999));
        let json = serde_json::to_string(&price).unwrap();
        let deserialized: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(price, deserialized);
    }

    #[test]
    fn test_from_dec_str() {
        let amount = Amount::from_dec_str("2000000000000000000000").unwrap();
        assert_eq!(amount, Amount::new(e18(2000)));
        assert!(Amount::from_dec_str("not a number").is_none());
        assert!(Price::from_dec_str("12").is_some());
    }
}
