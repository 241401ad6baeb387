// This is a part of safe-instant.
// See README.md and LICENSE.txt for details.

//! Calendar intervals.

use core::fmt;
use core::str::FromStr;

use crate::error::DateTimeError;
use crate::native;

/// A calendar interval: years, months and days, followed by an exact time of day part.
///
/// Every component is non-negative and the direction is carried by a separate sign. Months and
/// years are applied with chrono's month arithmetic, so `P1M` from January 31st lands on the
/// last day of February.
///
/// Intervals come from [`SafeInstant::diff`](crate::SafeInstant::diff), from
/// [`Interval::parse`], or from the `with_*` builders on [`Interval::ZERO`].
///
/// Two intervals are equal when their components and sign are equal. The elapsed day count
/// recorded by `diff` is not compared.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    years: u32,
    months: u32,
    days: u32,
    hours: u32,
    minutes: u32,
    seconds: u32,
    nanoseconds: u32,
    invert: bool,
    total_days: Option<i64>,
}

impl Interval {
    /// The empty interval.
    pub const ZERO: Interval = Interval {
        years: 0,
        months: 0,
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
        nanoseconds: 0,
        invert: false,
        total_days: None,
    };

    /// Parses an ISO 8601 duration such as `P1Y2M10DT2H30M` or `PT0.5S`.
    ///
    /// Weeks (`P2W`) are folded into days. A leading `-` makes the interval negative.
    ///
    /// # Errors
    ///
    /// Returns a [`DateTimeError`] if the designator is malformed or a component overflows.
    ///
    /// # Example
    ///
    /// ```
    /// use safe_instant::Interval;
    ///
    /// let iv = Interval::parse("P1Y2M10DT2H30M")?;
    /// assert_eq!((iv.years(), iv.months(), iv.days()), (1, 2, 10));
    /// assert_eq!((iv.hours(), iv.minutes(), iv.seconds()), (2, 30, 0));
    /// assert!(Interval::parse("P1H").is_err());
    /// # Ok::<(), safe_instant::DateTimeError>(())
    /// ```
    pub fn parse(spec: &str) -> Result<Interval, DateTimeError> {
        native::parse_interval(spec).ok_or_else(DateTimeError::last)
    }

    /// Returns a copy with the years set.
    #[must_use]
    pub const fn with_years(mut self, years: u32) -> Interval {
        self.years = years;
        self
    }

    /// Returns a copy with the months set.
    #[must_use]
    pub const fn with_months(mut self, months: u32) -> Interval {
        self.months = months;
        self
    }

    /// Returns a copy with the days set.
    #[must_use]
    pub const fn with_days(mut self, days: u32) -> Interval {
        self.days = days;
        self
    }

    /// Returns a copy with the hours set.
    #[must_use]
    pub const fn with_hours(mut self, hours: u32) -> Interval {
        self.hours = hours;
        self
    }

    /// Returns a copy with the minutes set.
    #[must_use]
    pub const fn with_minutes(mut self, minutes: u32) -> Interval {
        self.minutes = minutes;
        self
    }

    /// Returns a copy with the seconds set.
    #[must_use]
    pub const fn with_seconds(mut self, seconds: u32) -> Interval {
        self.seconds = seconds;
        self
    }

    /// Returns a copy with the sub-second part set. Values of one second or more are clamped
    /// to 999,999,999.
    #[must_use]
    pub const fn with_nanoseconds(mut self, nanoseconds: u32) -> Interval {
        self.nanoseconds = if nanoseconds > 999_999_999 { 999_999_999 } else { nanoseconds };
        self
    }

    /// Returns the same interval pointing the other way.
    #[must_use]
    pub const fn negated(mut self) -> Interval {
        self.invert = !self.invert;
        self
    }

    pub(crate) const fn with_total_days(mut self, total_days: i64) -> Interval {
        self.total_days = Some(total_days);
        self
    }

    /// Whole years.
    #[inline]
    pub const fn years(&self) -> u32 {
        self.years
    }

    /// Whole months, not counting the years.
    #[inline]
    pub const fn months(&self) -> u32 {
        self.months
    }

    /// Whole days, not counting the months.
    #[inline]
    pub const fn days(&self) -> u32 {
        self.days
    }

    /// Whole hours.
    #[inline]
    pub const fn hours(&self) -> u32 {
        self.hours
    }

    /// Whole minutes.
    #[inline]
    pub const fn minutes(&self) -> u32 {
        self.minutes
    }

    /// Whole seconds.
    #[inline]
    pub const fn seconds(&self) -> u32 {
        self.seconds
    }

    /// The sub-second part in nanoseconds.
    #[inline]
    pub const fn nanoseconds(&self) -> u32 {
        self.nanoseconds
    }

    /// `true` if the interval points backwards in time.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.invert
    }

    /// `true` if every component is zero.
    pub const fn is_zero(&self) -> bool {
        self.years == 0
            && self.months == 0
            && self.days == 0
            && self.hours == 0
            && self.minutes == 0
            && self.seconds == 0
            && self.nanoseconds == 0
    }

    /// The number of whole days between the two instants this interval was computed from.
    ///
    /// Only intervals produced by [`SafeInstant::diff`](crate::SafeInstant::diff) carry it.
    #[inline]
    pub const fn total_days(&self) -> Option<i64> {
        self.total_days
    }

    /// The years and months folded into a single month count.
    pub(crate) fn total_months(&self) -> Option<u32> {
        self.years.checked_mul(12)?.checked_add(self.months)
    }
}

impl PartialEq for Interval {
    fn eq(&self, other: &Self) -> bool {
        self.years == other.years
            && self.months == other.months
            && self.days == other.days
            && self.hours == other.hours
            && self.minutes == other.minutes
            && self.seconds == other.seconds
            && self.nanoseconds == other.nanoseconds
            && self.invert == other.invert
    }
}

impl Eq for Interval {}

impl Default for Interval {
    fn default() -> Self {
        Interval::ZERO
    }
}

/// Renders the ISO 8601 designator, e.g. `P1MT2H` or `-PT0.25S`.
impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.invert {
            f.write_str("-")?;
        }
        f.write_str("P")?;
        if self.is_zero() {
            return f.write_str("T0S");
        }
        for (value, unit) in [(self.years, 'Y'), (self.months, 'M'), (self.days, 'D')] {
            if value != 0 {
                write!(f, "{}{}", value, unit)?;
            }
        }
        if self.hours == 0 && self.minutes == 0 && self.seconds == 0 && self.nanoseconds == 0 {
            return Ok(());
        }
        f.write_str("T")?;
        if self.hours != 0 {
            write!(f, "{}H", self.hours)?;
        }
        if self.minutes != 0 {
            write!(f, "{}M", self.minutes)?;
        }
        if self.nanoseconds != 0 {
            let frac = format!("{:09}", self.nanoseconds);
            write!(f, "{}.{}S", self.seconds, frac.trim_end_matches('0'))?;
        } else if self.seconds != 0 {
            write!(f, "{}S", self.seconds)?;
        }
        Ok(())
    }
}

impl FromStr for Interval {
    type Err = DateTimeError;

    fn from_str(s: &str) -> Result<Interval, DateTimeError> {
        Interval::parse(s)
    }
}

/// Parses an ISO 8601 duration designator, reporting the reason on failure.
///
/// Called through the trusted layer, which records the reason as a diagnostic.
pub(crate) fn parse_designator(spec: &str) -> Result<Interval, &'static str> {
    let (invert, rest) = match spec.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, spec.strip_prefix('+').unwrap_or(spec)),
    };
    let mut body = rest.strip_prefix('P').ok_or("duration must start with 'P'")?;
    if body.is_empty() {
        return Err("duration has no components");
    }

    let mut iv = Interval { invert, ..Interval::ZERO };
    let mut in_time = false;
    // position of the last designator seen; designators must come in decreasing order
    let mut rank = 0u8;
    let mut seen_time_component = false;

    while !body.is_empty() {
        if let Some(after) = body.strip_prefix('T') {
            if in_time {
                return Err("duplicate time designator 'T'");
            }
            in_time = true;
            body = after;
            continue;
        }

        let digits = body.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return Err("expected a number");
        }
        let value: u32 = body[..digits].parse().map_err(|_| "component out of range")?;
        body = &body[digits..];

        let mut nanos = None;
        if let Some(after) = body.strip_prefix(['.', ',']) {
            let frac_len = after.bytes().take_while(u8::is_ascii_digit).count();
            if frac_len == 0 || frac_len > 9 {
                return Err("fraction must have between 1 and 9 digits");
            }
            let frac: u32 = after[..frac_len].parse().map_err(|_| "component out of range")?;
            nanos = Some(frac * 10u32.pow(9 - frac_len as u32));
            body = &after[frac_len..];
        }

        let unit = body.chars().next().ok_or("missing designator")?;
        body = &body[unit.len_utf8()..];
        let next_rank = match (in_time, unit) {
            (false, 'Y') => 1,
            (false, 'M') => 2,
            (false, 'W') => 3,
            (false, 'D') => 4,
            (true, 'H') => 5,
            (true, 'M') => 6,
            (true, 'S') => 7,
            _ => return Err("unknown designator"),
        };
        if next_rank <= rank {
            return Err("designators out of order");
        }
        rank = next_rank;
        if nanos.is_some() && unit != 'S' {
            return Err("only seconds may have a fraction");
        }

        match next_rank {
            1 => iv.years = value,
            2 => iv.months = value,
            3 => iv.days = value.checked_mul(7).ok_or("component out of range")?,
            4 => iv.days = iv.days.checked_add(value).ok_or("component out of range")?,
            5 => iv.hours = value,
            6 => iv.minutes = value,
            _ => {
                iv.seconds = value;
                iv.nanoseconds = nanos.unwrap_or(0);
            }
        }
        if in_time {
            seen_time_component = true;
        }
    }

    if in_time && !seen_time_component {
        return Err("time designator 'T' without components");
    }
    Ok(iv)
}

#[cfg(feature = "serde")]
mod serde {
    use core::fmt;

    use serde::{de, ser};

    use super::Interval;

    /// Serialize into an ISO 8601 duration string.
    impl ser::Serialize for Interval {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: ser::Serializer,
        {
            serializer.collect_str(self)
        }
    }

    struct IntervalVisitor;

    impl<'de> de::Visitor<'de> for IntervalVisitor {
        type Value = Interval;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an ISO 8601 duration string")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            value.parse().map_err(E::custom)
        }
    }

    impl<'de> de::Deserialize<'de> for Interval {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: de::Deserializer<'de>,
        {
            deserializer.deserialize_str(IntervalVisitor)
        }
    }
}
