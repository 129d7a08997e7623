//! Exact rational numbers for box sides and bounds.
//!
//! `Rational` wraps an arbitrary-precision `BigRational`, so every value is kept in
//! lowest terms with a positive denominator and never loses precision. The only
//! intentional approximations are the explicit `floor` and `ceil` calls.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error raised when a textual rational cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseRationalError {
    Empty,
    ZeroDenominator(String),
    Invalid(String),
}

impl fmt::Display for ParseRationalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseRationalError::Empty => write!(f, "Empty rational literal"),
            ParseRationalError::ZeroDenominator(raw) => {
                write!(f, "Rational '{}' has a zero denominator", raw)
            }
            ParseRationalError::Invalid(raw) => write!(f, "Could not parse '{}' as rational", raw),
        }
    }
}

impl std::error::Error for ParseRationalError {}

/// Exact fraction of two arbitrary-precision integers.
///
/// # Examples
/// ```
/// use boxbound::rational::Rational;
///
/// let half: Rational = "1/2".parse().unwrap();
/// let third = Rational::new(1, 3);
/// assert_eq!(half.clone() + third, Rational::new(5, 6));
/// assert_eq!("1.05".parse::<Rational>().unwrap(), Rational::new(21, 20));
/// assert_eq!(Rational::new(7, 2).floor(), Rational::from(3u32));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rational(BigRational);

impl Rational {
    /// Creates `numer / denom`, reduced to lowest terms.
    ///
    /// # Panics
    /// Panics when `denom` is zero.
    pub fn new(numer: impl Into<BigInt>, denom: impl Into<BigInt>) -> Self {
        Self(BigRational::new(numer.into(), denom.into()))
    }

    /// Creates an integral rational.
    pub fn from_integer(value: impl Into<BigInt>) -> Self {
        Self(BigRational::from_integer(value.into()))
    }

    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    pub fn one() -> Self {
        Self(BigRational::one())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }

    /// Numerator in lowest terms.
    pub fn numer(&self) -> &BigInt {
        self.0.numer()
    }

    /// Denominator in lowest terms (always positive).
    pub fn denom(&self) -> &BigInt {
        self.0.denom()
    }

    /// Largest integer not greater than `self`.
    pub fn floor(&self) -> Self {
        Self(self.0.floor())
    }

    /// Smallest integer not less than `self`.
    pub fn ceil(&self) -> Self {
        Self(self.0.ceil())
    }

    /// Borrows the underlying `BigRational`.
    pub fn as_big_rational(&self) -> &BigRational {
        &self.0
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<BigRational> for Rational {
    fn from(value: BigRational) -> Self {
        Self(value)
    }
}

impl From<BigInt> for Rational {
    fn from(value: BigInt) -> Self {
        Self::from_integer(value)
    }
}

impl From<u32> for Rational {
    fn from(value: u32) -> Self {
        Self::from_integer(value)
    }
}

impl From<u64> for Rational {
    fn from(value: u64) -> Self {
        Self::from_integer(value)
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_integer() {
            write!(f, "{}", self.0.numer())
        } else {
            write!(f, "{}/{}", self.0.numer(), self.0.denom())
        }
    }
}

fn parse_integer(raw: &str, literal: &str) -> Result<BigInt, ParseRationalError> {
    raw.trim()
        .parse::<BigInt>()
        .map_err(|_| ParseRationalError::Invalid(literal.to_string()))
}

/// Accepts `p`, `p/q` and decimal literals `p.q` (read as `p + q / 10^digits(q)`).
impl FromStr for Rational {
    type Err = ParseRationalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let literal = s.trim();
        if literal.is_empty() {
            return Err(ParseRationalError::Empty);
        }

        if let Some((numer, denom)) = literal.split_once('/') {
            let numer = parse_integer(numer, literal)?;
            let denom = parse_integer(denom, literal)?;
            if denom.is_zero() {
                return Err(ParseRationalError::ZeroDenominator(literal.to_string()));
            }
            return Ok(Self::new(numer, denom));
        }

        if let Some((whole, fraction)) = literal.split_once('.') {
            if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseRationalError::Invalid(literal.to_string()));
            }
            let negative = whole.trim_start().starts_with('-');
            let whole = parse_integer(whole, literal)?.abs();
            let fraction_value = parse_integer(fraction, literal)?;
            let scale = num_traits::pow(BigInt::from(10u32), fraction.len());
            let magnitude = whole * &scale + fraction_value;
            let numer = if negative { -magnitude } else { magnitude };
            return Ok(Self::new(numer, scale));
        }

        parse_integer(literal, literal).map(Self::from_integer)
    }
}

macro_rules! forward_binop {
    ($imp:ident, $method:ident) => {
        impl $imp for Rational {
            type Output = Rational;

            #[inline]
            fn $method(self, rhs: Rational) -> Rational {
                Rational(self.0.$method(rhs.0))
            }
        }

        impl<'a> $imp<&'a Rational> for Rational {
            type Output = Rational;

            #[inline]
            fn $method(self, rhs: &'a Rational) -> Rational {
                Rational(self.0.$method(&rhs.0))
            }
        }

        impl<'a, 'b> $imp<&'b Rational> for &'a Rational {
            type Output = Rational;

            #[inline]
            fn $method(self, rhs: &'b Rational) -> Rational {
                Rational((&self.0).$method(&rhs.0))
            }
        }
    };
}

macro_rules! forward_assign {
    ($imp:ident, $method:ident) => {
        impl $imp for Rational {
            #[inline]
            fn $method(&mut self, rhs: Rational) {
                self.0.$method(rhs.0);
            }
        }

        impl<'a> $imp<&'a Rational> for Rational {
            #[inline]
            fn $method(&mut self, rhs: &'a Rational) {
                self.0.$method(&rhs.0);
            }
        }
    };
}

forward_binop!(Add, add);
forward_binop!(Sub, sub);
forward_binop!(Mul, mul);
forward_binop!(Div, div);
forward_assign!(AddAssign, add_assign);
forward_assign!(SubAssign, sub_assign);
forward_assign!(MulAssign, mul_assign);
forward_assign!(DivAssign, div_assign);

impl<'a> Sum<&'a Rational> for Rational {
    fn sum<I: Iterator<Item = &'a Rational>>(iter: I) -> Self {
        iter.fold(Rational::zero(), |acc, value| acc + value)
    }
}

impl Sum for Rational {
    fn sum<I: Iterator<Item = Rational>>(iter: I) -> Self {
        iter.fold(Rational::zero(), |acc, value| acc + value)
    }
}

/// Serialized in its textual form (`"3/2"`, `"4"`) so large values survive JSON.
impl Serialize for Rational {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct RationalVisitor;

impl Visitor<'_> for RationalVisitor {
    type Value = Rational;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a rational such as \"3/2\", \"1.25\" or an integer")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Rational, E> {
        value.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Rational, E> {
        Ok(Rational::from(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Rational, E> {
        Ok(Rational::from(value))
    }
}

impl<'de> Deserialize<'de> for Rational {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RationalVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_reduces_to_lowest_terms() {
        let value = Rational::new(6, -4);
        assert_eq!(value.numer(), &BigInt::from(-3));
        assert_eq!(value.denom(), &BigInt::from(2));
    }

    #[test]
    fn parses_all_literal_forms() {
        assert_eq!("7".parse::<Rational>().unwrap(), Rational::from(7u32));
        assert_eq!("3/6".parse::<Rational>().unwrap(), Rational::new(1, 2));
        assert_eq!("2.5".parse::<Rational>().unwrap(), Rational::new(5, 2));
        // digits(q) counts the written digits, leading zeros included
        assert_eq!("1.05".parse::<Rational>().unwrap(), Rational::new(105, 100));
        assert_eq!("-0.5".parse::<Rational>().unwrap(), Rational::new(-1, 2));
        assert_eq!(" 12 ".parse::<Rational>().unwrap(), Rational::from(12u32));
    }

    #[test]
    fn rejects_malformed_literals() {
        assert_eq!("".parse::<Rational>(), Err(ParseRationalError::Empty));
        assert!(matches!(
            "1/0".parse::<Rational>(),
            Err(ParseRationalError::ZeroDenominator(_))
        ));
        assert!("abc".parse::<Rational>().is_err());
        assert!("1.".parse::<Rational>().is_err());
        assert!("1.x".parse::<Rational>().is_err());
        assert!("1/2/3".parse::<Rational>().is_err());
    }

    #[test]
    fn floor_and_ceil_are_exact() {
        let value = Rational::new(7, 3);
        assert_eq!(value.floor(), Rational::from(2u32));
        assert_eq!(value.ceil(), Rational::from(3u32));

        let integral = Rational::from(4u32);
        assert_eq!(integral.floor(), integral);
        assert_eq!(integral.ceil(), integral);
    }

    #[test]
    fn arithmetic_and_ordering() {
        let a = Rational::new(1, 2);
        let b = Rational::new(1, 3);
        assert_eq!(&a + &b, Rational::new(5, 6));
        assert_eq!(&a - &b, Rational::new(1, 6));
        assert_eq!(&a * &b, Rational::new(1, 6));
        assert_eq!(&a / &b, Rational::new(3, 2));
        assert!(a > b);

        let mut acc = Rational::zero();
        acc += &a;
        acc *= Rational::from(4u32);
        acc /= &b;
        acc -= Rational::one();
        assert_eq!(acc, Rational::from(5u32));

        let total: Rational = [a, b].iter().sum();
        assert_eq!(total, Rational::new(5, 6));
    }

    #[test]
    fn display_uses_integer_form_when_possible() {
        assert_eq!(Rational::new(4, 2).to_string(), "2");
        assert_eq!(Rational::new(3, 9).to_string(), "1/3");
    }

    #[test]
    fn serde_uses_text_form() {
        let value = Rational::new(3, 2);
        assert_eq!(serde_json::to_string(&value).unwrap(), "\"3/2\"");
        let parsed: Rational = serde_json::from_str("\"1.5\"").unwrap();
        assert_eq!(parsed, value);
        let integral: Rational = serde_json::from_str("8").unwrap();
        assert_eq!(integral, Rational::from(8u32));
    }
}
