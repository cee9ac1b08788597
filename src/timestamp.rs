//! Ion timestamps with precision and offset.
//!
//! An Ion timestamp is more than an instant: it remembers how precise it is
//! (`2007T` is a year, not January 1st at midnight), how many fractional digits
//! its seconds carry, and whether its offset is known (`-00:00` means unknown).
//! [`Timestamp`] stores exactly that, keeping the fields in local time.
//!
//! Calendar validation and the local/UTC conversion needed by the binary
//! encoding are delegated to `chrono`.

use crate::{Decimal, Error, Result};
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike,
};
use num_bigint::BigUint;
use std::fmt;
use std::str::FromStr;

/// How much of a timestamp is significant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Precision {
    Year,
    Month,
    Day,
    Minute,
    Second,
}

/// An Ion timestamp.
///
/// Fields below the precision are held at their minimum (`1` for month/day,
/// `0` for time fields) so equality is structural.
///
/// # Examples
///
/// ```rust
/// use ion_json::{Precision, Timestamp};
///
/// let ts: Timestamp = "2007-02-23T12:14:33.079-08:00".parse().unwrap();
/// assert_eq!(ts.precision(), Precision::Second);
/// assert_eq!(ts.offset_minutes(), Some(-480));
/// assert_eq!(ts.to_string(), "2007-02-23T12:14:33.079-08:00");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Timestamp {
    precision: Precision,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    fraction: Option<Decimal>,
    offset: Option<i16>,
}

const MAX_OFFSET_MINUTES: i32 = 24 * 60;

impl Timestamp {
    /// Creates a year-precision timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrepresentableMagnitude`] if the year is outside `1..=9999`.
    pub fn from_year(year: u16) -> Result<Self> {
        Self::build(Precision::Year, year, 1, 1, 0, 0, 0, None, None)
    }

    /// Creates a day-precision timestamp.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ion_json::Timestamp;
    ///
    /// let ts = Timestamp::from_ymd(2024, 2, 29).unwrap();
    /// assert_eq!(ts.to_string(), "2024-02-29");
    /// assert!(Timestamp::from_ymd(2023, 2, 29).is_err());
    /// ```
    pub fn from_ymd(year: u16, month: u8, day: u8) -> Result<Self> {
        Self::build(Precision::Day, year, month, day, 0, 0, 0, None, None)
    }

    /// Creates a second-precision timestamp from a `chrono` date-time.
    ///
    /// Sub-second nanoseconds become fractional digits with trailing zeros removed.
    pub fn from_datetime(dt: &DateTime<FixedOffset>) -> Result<Self> {
        let year = u16::try_from(dt.year())
            .map_err(|_| Error::magnitude(format!("year {} is outside 1..=9999", dt.year())))?;
        let nanos = dt.nanosecond().min(999_999_999);
        let fraction = if nanos == 0 {
            None
        } else {
            let mut coefficient = nanos;
            let mut exponent = -9i64;
            while coefficient % 10 == 0 {
                coefficient /= 10;
                exponent += 1;
            }
            Some(Decimal::from_parts(false, BigUint::from(coefficient), exponent))
        };
        let offset = i16::try_from(dt.offset().local_minus_utc() / 60)
            .map_err(|_| Error::magnitude("timestamp offset out of range"))?;
        Self::build(
            Precision::Second,
            year,
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
            fraction,
            Some(offset),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn build(
        precision: Precision,
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        fraction: Option<Decimal>,
        offset: Option<i16>,
    ) -> Result<Self> {
        if !(1..=9999).contains(&year) {
            return Err(Error::magnitude(format!("year {} is outside 1..=9999", year)));
        }
        if NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day)).is_none() {
            return Err(Error::malformed(format!(
                "invalid calendar date {:04}-{:02}-{:02}",
                year, month, day
            )));
        }
        if hour > 23 || minute > 59 || second > 59 {
            return Err(Error::malformed(format!(
                "invalid time of day {:02}:{:02}:{:02}",
                hour, minute, second
            )));
        }
        if let Some(minutes) = offset {
            if i32::from(minutes).abs() >= MAX_OFFSET_MINUTES {
                return Err(Error::magnitude(format!("offset of {} minutes", minutes)));
            }
        }

        let fraction = match fraction {
            Some(fraction) if precision == Precision::Second => normalize_fraction(fraction)?,
            Some(_) => return Err(Error::malformed("fractional seconds without seconds")),
            None => None,
        };

        // Date-only timestamps never carry a known offset.
        let offset = if precision >= Precision::Minute {
            offset
        } else {
            None
        };

        Ok(Timestamp {
            precision,
            year,
            month,
            day,
            hour,
            minute,
            second,
            fraction,
            offset,
        })
    }

    /// Rebuilds a timestamp whose time fields were stored in UTC (the binary layout).
    pub(crate) fn from_utc(
        precision: Precision,
        utc: NaiveDateTime,
        fraction: Option<Decimal>,
        offset: Option<i16>,
    ) -> Result<Self> {
        let local = if precision >= Precision::Minute {
            let shift = Duration::minutes(i64::from(offset.unwrap_or(0)));
            utc.checked_add_signed(shift)
                .ok_or_else(|| Error::magnitude("timestamp offset moves date out of range"))?
        } else {
            utc
        };
        let year = u16::try_from(local.year())
            .map_err(|_| Error::magnitude(format!("year {} is outside 1..=9999", local.year())))?;
        Self::build(
            precision,
            year,
            local.month() as u8,
            local.day() as u8,
            local.hour() as u8,
            local.minute() as u8,
            local.second() as u8,
            fraction,
            offset,
        )
    }

    /// Returns the date and time fields converted to UTC.
    ///
    /// Date-only precisions and unknown offsets are returned unchanged. The UTC
    /// year must stay within 1..=9999 or the result could not be read back.
    pub(crate) fn utc_fields(&self) -> Result<NaiveDateTime> {
        let local = self.local_naive(0)?;
        if self.precision < Precision::Minute {
            return Ok(local);
        }
        let shift = Duration::minutes(i64::from(self.offset.unwrap_or(0)));
        local
            .checked_sub_signed(shift)
            .filter(|utc| (1..=9999).contains(&utc.year()))
            .ok_or_else(|| {
                Error::magnitude(format!("timestamp {} falls outside years 1..=9999 in UTC", self))
            })
    }

    fn local_naive(&self, nanos: u32) -> Result<NaiveDateTime> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
        .and_then(|date| {
            date.and_hms_nano_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
                nanos,
            )
        })
        .ok_or_else(|| Error::malformed(format!("invalid timestamp {}", self)))
    }

    /// Converts to a `chrono` date-time, truncating fractions below a nanosecond.
    ///
    /// An unknown offset is treated as UTC. Returns `None` only if `chrono`
    /// cannot represent the result.
    #[must_use]
    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        let nanos = self.fraction.as_ref().map_or(Some(0), fraction_nanos)?;
        let naive = self.local_naive(nanos).ok()?;
        let offset = FixedOffset::east_opt(i32::from(self.offset.unwrap_or(0)) * 60)?;
        offset.from_local_datetime(&naive).single()
    }

    #[inline]
    #[must_use]
    pub const fn precision(&self) -> Precision {
        self.precision
    }

    #[inline]
    #[must_use]
    pub const fn year(&self) -> u16 {
        self.year
    }

    #[inline]
    #[must_use]
    pub const fn month(&self) -> u8 {
        self.month
    }

    #[inline]
    #[must_use]
    pub const fn day(&self) -> u8 {
        self.day
    }

    #[inline]
    #[must_use]
    pub const fn hour(&self) -> u8 {
        self.hour
    }

    #[inline]
    #[must_use]
    pub const fn minute(&self) -> u8 {
        self.minute
    }

    #[inline]
    #[must_use]
    pub const fn second(&self) -> u8 {
        self.second
    }

    /// Fractional seconds as a decimal in `[0, 1)` with a negative exponent.
    #[inline]
    #[must_use]
    pub fn fraction(&self) -> Option<&Decimal> {
        self.fraction.as_ref()
    }

    /// Offset from UTC in minutes, or `None` when unknown (`-00:00`).
    #[inline]
    #[must_use]
    pub const fn offset_minutes(&self) -> Option<i16> {
        self.offset
    }
}

/// Checks a fractional-seconds decimal; a zero fraction with no digits is dropped.
fn normalize_fraction(fraction: Decimal) -> Result<Option<Decimal>> {
    if fraction.is_negative() && !fraction.is_zero() {
        return Err(Error::malformed("negative fractional seconds"));
    }
    if fraction.exponent() >= 0 {
        return if fraction.is_zero() {
            Ok(None)
        } else {
            Err(Error::malformed("fractional seconds must be less than one"))
        };
    }
    let width = fraction.exponent().unsigned_abs();
    let digits = fraction.magnitude().to_string().len() as u64;
    if !fraction.is_zero() && digits > width {
        return Err(Error::malformed("fractional seconds must be less than one"));
    }
    Ok(Some(Decimal::from_parts(
        false,
        fraction.magnitude().clone(),
        fraction.exponent(),
    )))
}

fn fraction_nanos(fraction: &Decimal) -> Option<u32> {
    let exponent = fraction.exponent();
    let ten = BigUint::from(10u32);
    let nanos = if exponent >= -9 {
        fraction.magnitude() * ten.pow(u32::try_from(9 + exponent).ok()?)
    } else {
        fraction.magnitude() / ten.pow(u32::try_from(-exponent - 9).ok()?)
    };
    u32::try_from(&nanos).ok()
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.precision {
            Precision::Year => return write!(f, "{:04}T", self.year),
            Precision::Month => return write!(f, "{:04}-{:02}T", self.year, self.month),
            Precision::Day => {
                return write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
            }
            Precision::Minute | Precision::Second => {}
        }

        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        )?;
        if self.precision == Precision::Second {
            write!(f, ":{:02}", self.second)?;
            if let Some(fraction) = &self.fraction {
                let width = fraction.exponent().unsigned_abs() as usize;
                write!(f, ".{:0>width$}", fraction.magnitude().to_string(), width = width)?;
            }
        }
        match self.offset {
            None => f.write_str("-00:00"),
            Some(0) => f.write_str("Z"),
            Some(minutes) => {
                let sign = if minutes < 0 { '-' } else { '+' };
                let abs = minutes.unsigned_abs();
                write!(f, "{}{:02}:{:02}", sign, abs / 60, abs % 60)
            }
        }
    }
}

/// Parses the Ion text timestamp syntax.
impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TimestampScanner {
            text: s,
            bytes: s.as_bytes(),
            pos: 0,
        }
        .scan()
    }
}

struct TimestampScanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> TimestampScanner<'a> {
    fn invalid(&self) -> Error {
        Error::malformed(format!("invalid timestamp {:?}", self.text))
    }

    fn digits(&mut self, count: usize) -> Result<u16> {
        let end = self.pos + count;
        let slice = self.bytes.get(self.pos..end).ok_or_else(|| self.invalid())?;
        if !slice.iter().all(u8::is_ascii_digit) {
            return Err(self.invalid());
        }
        self.pos = end;
        Ok(slice
            .iter()
            .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0')))
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.bytes.get(self.pos) == Some(&byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.invalid())
        }
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.bytes.get(self.pos) == Some(&byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos == self.bytes.len()
    }

    fn finish(&self, ts: Timestamp) -> Result<Timestamp> {
        if self.at_end() {
            Ok(ts)
        } else {
            Err(self.invalid())
        }
    }

    fn scan(mut self) -> Result<Timestamp> {
        let year = self.digits(4)?;
        if self.eat(b'T') {
            let ts = Timestamp::build(Precision::Year, year, 1, 1, 0, 0, 0, None, None)?;
            return self.finish(ts);
        }
        self.expect(b'-')?;
        let month = self.digits(2)? as u8;
        if self.eat(b'T') {
            let ts = Timestamp::build(Precision::Month, year, month, 1, 0, 0, 0, None, None)?;
            return self.finish(ts);
        }
        self.expect(b'-')?;
        let day = self.digits(2)? as u8;
        if !self.at_end() {
            self.expect(b'T')?;
        }
        if self.at_end() {
            return Timestamp::build(Precision::Day, year, month, day, 0, 0, 0, None, None);
        }

        let hour = self.digits(2)? as u8;
        self.expect(b':')?;
        let minute = self.digits(2)? as u8;
        let mut precision = Precision::Minute;
        let mut second = 0u8;
        let mut fraction = None;
        if self.eat(b':') {
            precision = Precision::Second;
            second = self.digits(2)? as u8;
            if self.eat(b'.') {
                let start = self.pos;
                while self.bytes.get(self.pos).is_some_and(u8::is_ascii_digit) {
                    self.pos += 1;
                }
                let digits = &self.text[start..self.pos];
                if digits.is_empty() {
                    return Err(self.invalid());
                }
                let magnitude = BigUint::from_str(digits).map_err(|_| self.invalid())?;
                fraction = Some(Decimal::from_parts(false, magnitude, -(digits.len() as i64)));
            }
        }

        let offset = self.offset()?;
        let ts = Timestamp::build(
            precision, year, month, day, hour, minute, second, fraction, offset,
        )?;
        self.finish(ts)
    }

    fn offset(&mut self) -> Result<Option<i16>> {
        if self.eat(b'Z') || self.eat(b'z') {
            return Ok(Some(0));
        }
        let negative = if self.eat(b'-') {
            true
        } else {
            self.expect(b'+')?;
            false
        };
        let hours = self.digits(2)? as i16;
        self.expect(b':')?;
        let minutes = self.digits(2)? as i16;
        if minutes > 59 {
            return Err(self.invalid());
        }
        let total = hours * 60 + minutes;
        Ok(match (negative, total) {
            (true, 0) => None,
            (true, total) => Some(-total),
            (false, total) => Some(total),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_each_precision() {
        let cases = [
            ("2007T", Precision::Year),
            ("2007-02T", Precision::Month),
            ("2007-02-23", Precision::Day),
            ("2007-02-23T12:14Z", Precision::Minute),
            ("2007-02-23T12:14:33Z", Precision::Second),
            ("2007-02-23T12:14:33.079-08:00", Precision::Second),
        ];
        for (text, precision) in cases {
            let ts: Timestamp = text.parse().unwrap();
            assert_eq!(ts.precision(), precision, "{}", text);
            assert_eq!(ts.to_string(), text);
        }
    }

    #[test]
    fn test_day_with_trailing_t() {
        let ts: Timestamp = "2007-02-23T".parse().unwrap();
        assert_eq!(ts.to_string(), "2007-02-23");
    }

    #[test]
    fn test_unknown_offset() {
        let ts: Timestamp = "2007-02-23T12:14-00:00".parse().unwrap();
        assert_eq!(ts.offset_minutes(), None);
        assert_eq!(ts.to_string(), "2007-02-23T12:14-00:00");

        let utc: Timestamp = "2007-02-23T12:14+00:00".parse().unwrap();
        assert_eq!(utc.offset_minutes(), Some(0));
        assert_eq!(utc.to_string(), "2007-02-23T12:14Z");
    }

    #[test]
    fn test_fraction_keeps_leading_and_trailing_zeros() {
        let ts: Timestamp = "2001-01-01T00:00:00.0100Z".parse().unwrap();
        let fraction = ts.fraction().unwrap();
        assert_eq!(fraction.exponent(), -4);
        assert_eq!(ts.to_string(), "2001-01-01T00:00:00.0100Z");
    }

    #[test]
    fn test_invalid_timestamps() {
        for text in [
            "2007",
            "2007-13T",
            "2007-02-30",
            "2007-02-23T25:00Z",
            "2007-02-23T12:14",
            "2007-02-23T12:14:33.Z",
            "2007-02-23T12:14+8:00",
            "0000T",
        ] {
            assert!(text.parse::<Timestamp>().is_err(), "{}", text);
        }
    }

    #[test]
    fn test_utc_roundtrip() {
        let ts: Timestamp = "2000-01-01T00:30:15.5+01:00".parse().unwrap();
        let utc = ts.utc_fields().unwrap();
        assert_eq!(utc.year(), 1999);
        assert_eq!(utc.hour(), 23);
        assert_eq!(utc.minute(), 30);

        let back = Timestamp::from_utc(
            ts.precision(),
            utc,
            ts.fraction().cloned(),
            ts.offset_minutes(),
        )
        .unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn test_chrono_conversion() {
        let dt = DateTime::parse_from_rfc3339("2024-05-06T07:08:09.120-05:30").unwrap();
        let ts = Timestamp::from_datetime(&dt).unwrap();
        assert_eq!(ts.to_string(), "2024-05-06T07:08:09.12-05:30");
        assert_eq!(ts.to_datetime(), Some(dt));
    }

    #[test]
    fn test_utc_year_stays_in_range() {
        for text in ["0001-01-01T00:00+01:00", "9999-12-31T23:30-01:00"] {
            let ts: Timestamp = text.parse().unwrap();
            assert!(
                matches!(ts.utc_fields(), Err(Error::UnrepresentableMagnitude(_))),
                "{}",
                text
            );
        }
        for text in ["0001-01-01T01:00+01:00", "9999-12-31T22:59-01:00", "0001-01-01"] {
            let ts: Timestamp = text.parse().unwrap();
            assert!(ts.utc_fields().is_ok(), "{}", text);
        }
    }
}
