//! Arbitrary-precision Ion decimals.
//!
//! A [`Decimal`] is `coefficient × 10^exponent` with an arbitrary-precision
//! coefficient. The sign is kept separately from the magnitude so `-0d0` and
//! `0d0` stay distinct, as Ion requires.

use crate::{Error, Result};
use num_bigint::{BigInt, BigUint, Sign};
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

/// An exact decimal value: `(-1)^negative × magnitude × 10^exponent`.
///
/// Equality is structural: `1.0` (`10d-1`) and `1.00` (`100d-2`) are different
/// decimals, matching the Ion data model.
///
/// # Examples
///
/// ```rust
/// use ion_json::Decimal;
///
/// let d: Decimal = "1.50".parse().unwrap();
/// assert_eq!(d.coefficient_string(), "150");
/// assert_eq!(d.exponent(), -2);
/// assert_eq!(d.to_string(), "150d-2");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Decimal {
    negative: bool,
    magnitude: BigUint,
    exponent: i64,
}

impl Decimal {
    /// Creates a decimal from a signed coefficient and an exponent.
    pub fn new(coefficient: impl Into<BigInt>, exponent: i64) -> Self {
        let (sign, magnitude) = coefficient.into().into_parts();
        Decimal {
            negative: sign == Sign::Minus,
            magnitude,
            exponent,
        }
    }

    /// Creates a decimal from its sign, magnitude and exponent.
    ///
    /// This is the only way to build a negative zero coefficient.
    pub fn from_parts(negative: bool, magnitude: BigUint, exponent: i64) -> Self {
        Decimal {
            negative,
            magnitude,
            exponent,
        }
    }

    /// Rebuilds a decimal from the stringified coefficient and exponent of its tagged form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] if either string is not an integer and
    /// [`Error::UnrepresentableMagnitude`] if the exponent does not fit in an `i64`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ion_json::Decimal;
    ///
    /// let d = Decimal::from_strings("-0", "3").unwrap();
    /// assert!(d.is_negative_zero());
    /// assert_eq!(d.exponent(), 3);
    /// ```
    pub fn from_strings(coefficient: &str, exponent: &str) -> Result<Self> {
        let (negative, digits) = match coefficient.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, coefficient),
        };
        let magnitude = parse_magnitude(digits)
            .ok_or_else(|| Error::malformed(format!("invalid decimal coefficient {:?}", coefficient)))?;
        let exponent = parse_exponent(exponent)?;
        Ok(Decimal {
            negative,
            magnitude,
            exponent,
        })
    }

    /// Returns the signed coefficient. A negative zero is returned as zero.
    #[must_use]
    pub fn coefficient(&self) -> BigInt {
        let sign = if self.negative { Sign::Minus } else { Sign::Plus };
        BigInt::from_biguint(sign, self.magnitude.clone())
    }

    #[inline]
    #[must_use]
    pub fn magnitude(&self) -> &BigUint {
        &self.magnitude
    }

    #[inline]
    #[must_use]
    pub const fn exponent(&self) -> i64 {
        self.exponent
    }

    #[inline]
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.negative
    }

    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.magnitude.bits() == 0
    }

    #[inline]
    #[must_use]
    pub fn is_negative_zero(&self) -> bool {
        self.negative && self.is_zero()
    }

    /// Returns the coefficient as decimal digits, with `-` for negative values (including `-0`).
    #[must_use]
    pub fn coefficient_string(&self) -> String {
        if self.negative {
            format!("-{}", self.magnitude)
        } else {
            self.magnitude.to_string()
        }
    }
}

fn parse_magnitude(digits: &str) -> Option<BigUint> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::from_str(digits).ok()
}

fn parse_exponent(text: &str) -> Result<i64> {
    text.parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            Error::magnitude(format!("decimal exponent {} does not fit in 64 bits", text))
        }
        _ => Error::malformed(format!("invalid decimal exponent {:?}", text)),
    })
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.coefficient_string(), self.exponent)
    }
}

/// Parses Ion text decimal syntax: `123.45`, `-0.`, `1.5d3`, `12D-2`.
impl FromStr for Decimal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::malformed(format!("invalid decimal {:?}", s));

        let (negative, rest) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (mantissa, exponent) = match rest.find(|c: char| c == 'd' || c == 'D') {
            Some(idx) => (&rest[..idx], parse_exponent(&rest[idx + 1..])?),
            None => (rest, 0),
        };
        let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if whole.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let mut digits = String::with_capacity(whole.len() + fraction.len());
        digits.push_str(whole);
        digits.push_str(fraction);
        let magnitude = parse_magnitude(&digits).ok_or_else(invalid)?;

        let exponent = i64::try_from(fraction.len())
            .ok()
            .and_then(|len| exponent.checked_sub(len))
            .ok_or_else(|| Error::magnitude(format!("decimal exponent of {} overflows", s)))?;

        Ok(Decimal {
            negative,
            magnitude,
            exponent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fractional() {
        let d: Decimal = "123.450".parse().unwrap();
        assert_eq!(d.coefficient(), BigInt::from(123450));
        assert_eq!(d.exponent(), -3);
        assert!(!d.is_negative());
    }

    #[test]
    fn test_parse_exponent_forms() {
        let d: Decimal = "1.5d3".parse().unwrap();
        assert_eq!(d.coefficient(), BigInt::from(15));
        assert_eq!(d.exponent(), 2);

        let d: Decimal = "-12D-2".parse().unwrap();
        assert_eq!(d.coefficient(), BigInt::from(-12));
        assert_eq!(d.exponent(), -2);

        let d: Decimal = "7.".parse().unwrap();
        assert_eq!(d.coefficient(), BigInt::from(7));
        assert_eq!(d.exponent(), 0);
    }

    #[test]
    fn test_negative_zero_preserved() {
        let d: Decimal = "-0.0".parse().unwrap();
        assert!(d.is_negative_zero());
        assert_eq!(d.coefficient_string(), "-0");
        assert_eq!(d.to_string(), "-0d-1");
        assert_ne!(d, "0.0".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_invalid_decimals() {
        assert!(matches!(".5".parse::<Decimal>(), Err(Error::MalformedInput(_))));
        assert!(matches!("1.2.3".parse::<Decimal>(), Err(Error::MalformedInput(_))));
        assert!(matches!(
            "1d99999999999999999999".parse::<Decimal>(),
            Err(Error::UnrepresentableMagnitude(_))
        ));
    }

    #[test]
    fn test_from_strings() {
        let d = Decimal::from_strings("314159", "-5").unwrap();
        assert_eq!(d.to_string(), "314159d-5");
        assert!(matches!(
            Decimal::from_strings("12a", "0"),
            Err(Error::MalformedInput(_))
        ));
        assert!(matches!(
            Decimal::from_strings("1", "9223372036854775808"),
            Err(Error::UnrepresentableMagnitude(_))
        ));
    }

    #[test]
    fn test_big_coefficient() {
        let digits = "123456789012345678901234567890";
        let d = Decimal::from_strings(digits, "0").unwrap();
        assert_eq!(d.coefficient_string(), digits);
    }
}
