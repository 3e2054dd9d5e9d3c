//! Fixed-point money amounts.
//!
//! Amounts are stored as a whole number of cents so that sums over many
//! transactions are exact and do not depend on the order of summation.

use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub},
    str::FromStr,
};

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Serialize, Serializer};

/// An amount of money in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    /// Zero dollars.
    pub const ZERO: Amount = Amount(0);

    /// The largest amount a form may enter: one trillion dollars.
    pub const MAX: Amount = Amount(100_000_000_000_000);

    /// Create an amount from a whole number of cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The amount as a whole number of cents.
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Whether the amount is strictly greater than zero.
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// The amount in dollars as a float, for display and charting only.
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

/// The reasons a string could not be parsed as an [Amount].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AmountParseError {
    /// The string was empty or only whitespace.
    #[error("no amount was given")]
    Empty,
    /// The string contained something other than a decimal number.
    #[error("the amount is not a number")]
    NotANumber,
    /// The number had more than two digits after the decimal point.
    #[error("the amount has more than two decimal places")]
    TooManyDecimals,
    /// The number is larger than [Amount::MAX].
    #[error("the amount is too large")]
    OutOfRange,
}

impl FromStr for Amount {
    type Err = AmountParseError;

    /// Parse a decimal dollar amount such as `"150.75"`, `"12"` or `".5"`.
    ///
    /// The magnitude may not exceed [Amount::MAX].
    ///
    /// Negative amounts are accepted here so that callers can report them as
    /// non-positive rather than as malformed.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();

        if text.is_empty() {
            return Err(AmountParseError::Empty);
        }

        let (is_negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(AmountParseError::NotANumber);
        }

        if !whole.bytes().all(|byte| byte.is_ascii_digit())
            || !fraction.bytes().all(|byte| byte.is_ascii_digit())
        {
            return Err(AmountParseError::NotANumber);
        }

        if fraction.len() > 2 {
            return Err(AmountParseError::TooManyDecimals);
        }

        let whole_cents = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<i64>()
                .map_err(|_| AmountParseError::OutOfRange)?
                .checked_mul(100)
                .ok_or(AmountParseError::OutOfRange)?
        };

        let fraction_cents = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| AmountParseError::NotANumber)? * 10,
            _ => fraction.parse::<i64>().map_err(|_| AmountParseError::NotANumber)?,
        };

        let cents = whole_cents
            .checked_add(fraction_cents)
            .filter(|&cents| cents <= Amount::MAX.0)
            .ok_or(AmountParseError::OutOfRange)?;

        Ok(Self(if is_negative { -cents } else { cents }))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();

        write!(f, "{sign}{}.{:02}", cents / 100, cents % 100)
    }
}

// Arithmetic saturates so that totals over stored records can never panic.
impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        Amount(self.0.saturating_neg())
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Amounts are sent to external services as a JSON number of dollars.
impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.as_f64())
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Amount)
    }
}

#[cfg(test)]
mod tests {
    use super::{Amount, AmountParseError};

    #[test]
    fn parses_decimal_amounts() {
        let cases = [
            ("150.75", 15075),
            ("12", 1200),
            ("12.3", 1230),
            (".5", 50),
            ("0.01", 1),
            ("  75.20 ", 7520),
            ("+3", 300),
            ("-3.50", -350),
            ("0", 0),
        ];

        for (text, want_cents) in cases {
            let got = text.parse::<Amount>();

            assert_eq!(
                got,
                Ok(Amount::from_cents(want_cents)),
                "parsing {text:?}"
            );
        }
    }

    #[test]
    fn rejects_malformed_amounts() {
        let cases = [
            ("", AmountParseError::Empty),
            ("   ", AmountParseError::Empty),
            ("abc", AmountParseError::NotANumber),
            ("1.2.3", AmountParseError::NotANumber),
            (".", AmountParseError::NotANumber),
            ("1e3", AmountParseError::NotANumber),
            ("--1", AmountParseError::NotANumber),
            ("1.234", AmountParseError::TooManyDecimals),
            ("99999999999999999999", AmountParseError::OutOfRange),
            ("92233720368547758", AmountParseError::OutOfRange),
            ("1000000000000.01", AmountParseError::OutOfRange),
            ("-1000000000000.01", AmountParseError::OutOfRange),
        ];

        for (text, want_error) in cases {
            assert_eq!(text.parse::<Amount>(), Err(want_error), "parsing {text:?}");
        }
    }

    #[test]
    fn accepts_the_largest_amount() {
        assert_eq!("1000000000000".parse::<Amount>(), Ok(Amount::MAX));
    }

    #[test]
    fn arithmetic_saturates_instead_of_overflowing() {
        let huge = Amount::from_cents(i64::MAX);
        let mut total = huge;
        total += huge;

        assert_eq!(huge + huge, huge);
        assert_eq!(total, huge);
        assert_eq!(Amount::from_cents(i64::MIN) - huge, Amount::from_cents(i64::MIN));
        assert_eq!([huge, huge, huge].iter().sum::<Amount>(), huge);
        assert_eq!(-Amount::from_cents(i64::MIN), huge);
    }

    #[test]
    fn displays_two_decimal_places() {
        assert_eq!(Amount::from_cents(477405).to_string(), "4774.05");
        assert_eq!(Amount::from_cents(7520).to_string(), "75.20");
        assert_eq!(Amount::from_cents(-350).to_string(), "-3.50");
        assert_eq!(Amount::from_cents(5).to_string(), "0.05");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn sums_exactly() {
        let amounts = ["150.75", "75.20", "0.10", "0.20"]
            .map(|text| text.parse::<Amount>().unwrap());

        let total: Amount = amounts.iter().sum();

        assert_eq!(total, Amount::from_cents(22625));
    }

    #[test]
    fn serializes_as_dollars() {
        let json = serde_json::to_string(&Amount::from_cents(22595)).unwrap();

        assert_eq!(json, "225.95");
    }
}
