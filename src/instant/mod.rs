// This is a part of safe-instant.
// See README.md and LICENSE.txt for details.

//! An immutable date and time with a fixed offset and a single failure channel.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};

use crate::error::{DateTimeError, ExpressionError};
use crate::interval::Interval;
use crate::native;
use crate::traits::DateTimeLike;

#[cfg(feature = "serde")]
mod serde;

#[cfg(test)]
mod tests;

/// An immutable date and time with a fixed UTC offset.
///
/// `SafeInstant` holds one [`DateTime<FixedOffset>`] and forwards every operation to it. Its
/// observable state is always exactly that inner value. Operations that look like mutations
/// (`modify`, `with_date`, `add`...) leave `self` alone and return a new `SafeInstant`.
///
/// Whenever chrono would report failure through a sentinel (`None`, or a formatter error that
/// makes `to_string()` panic), the operation returns a [`DateTimeError`] instead. Errors that
/// chrono, or the expression parser, already report in structured form are passed on unchanged.
///
/// Comparison, equality and hashing look at the instant on the UTC timeline, so two values with
/// different offsets can be equal. They can also be compared directly with any chrono
/// [`DateTime`].
///
/// # Example
///
/// ```
/// use safe_instant::SafeInstant;
///
/// let a = SafeInstant::new("2024-01-01 00:00:00", None)?;
/// let b = a.modify("+1 day")?;
/// assert!(b > a);
/// assert_eq!(a.format("%F")?, "2024-01-01");
/// assert!(a.with_date(2024, 2, 30).is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SafeInstant {
    inner: DateTime<FixedOffset>,
}

impl SafeInstant {
    /// Makes a new `SafeInstant` from a time expression.
    ///
    /// The expression is an optional absolute part followed by relative adjustments:
    ///
    /// - absolute: `@1700000000`, RFC 3339 (`2024-01-01T10:00:00+02:00`), `2024-01-01`,
    ///   `2024-01-01T10:00[:00[.000]]` or `2024-01-01 10:00[:00[.000]]`, optionally followed by
    ///   an offset (`Z`, `UTC`, `+02`, `+0200`, `+02:00`);
    /// - relative: `now`, `today`, `midnight`, `noon`, `tomorrow`, `yesterday`, a time of day
    ///   like `14:30`, amounts like `+1 month`, `-2days` or `3 weeks`, and `ago`.
    ///
    /// A time of day is applied before the relative amounts, so `"+1 hour 10:30"` and
    /// `"10:30 +1 hour"` mean the same. A date without an offset is read in `tz`, or in UTC
    /// when `tz` is `None`. Without an absolute part the expression starts from the current
    /// time, which needs the `clock` feature.
    ///
    /// # Errors
    ///
    /// A malformed expression is reported as an [`ExpressionError`], unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use safe_instant::{FixedOffset, SafeInstant};
    ///
    /// let tz = FixedOffset::east_opt(3600);
    /// let dt = SafeInstant::new("2024-03-01 08:00 +2 hours", tz)?;
    /// assert_eq!(dt.to_string(), "2024-03-01 10:00:00 +01:00");
    /// assert!(SafeInstant::new("next blue moon", None).is_err());
    /// # Ok::<(), safe_instant::ExpressionError>(())
    /// ```
    pub fn new(expression: &str, tz: Option<FixedOffset>) -> Result<SafeInstant, ExpressionError> {
        native::parse_expression(expression, tz).map(SafeInstant::from_inner)
    }

    /// The current time in UTC.
    #[cfg(feature = "clock")]
    #[must_use]
    pub fn now() -> SafeInstant {
        SafeInstant::from_inner(chrono::Utc::now().fixed_offset())
    }

    /// Parses a string with a chrono format string.
    ///
    /// An offset in the input wins over `tz`, and `tz` wins over UTC. A missing time of day
    /// means midnight. A time of day that is only partly given (an hour without minutes) is an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns a [`DateTimeError`] if the input does not match the format, or if it describes a
    /// date that does not exist.
    ///
    /// # Example
    ///
    /// ```
    /// use safe_instant::SafeInstant;
    ///
    /// let leap = SafeInstant::parse_from_str("%Y-%m-%d", "2024-02-29", None)?;
    /// assert_eq!(leap.format("%Y-%m-%d")?, "2024-02-29");
    /// assert!(SafeInstant::parse_from_str("%Y-%m-%d", "2023-02-29", None).is_err());
    /// # Ok::<(), safe_instant::DateTimeError>(())
    /// ```
    pub fn parse_from_str(
        fmt: &str,
        s: &str,
        tz: Option<FixedOffset>,
    ) -> Result<SafeInstant, DateTimeError> {
        native::parse_from_str(fmt, s, tz)
            .map(SafeInstant::from_inner)
            .ok_or_else(DateTimeError::last)
    }

    /// Makes a new `SafeInstant` from any chrono [`DateTime`], keeping its current offset.
    #[must_use]
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> SafeInstant {
        SafeInstant::from_inner(dt.fixed_offset())
    }

    /// Makes a new `SafeInstant` from anything that implements [`DateTimeLike`].
    #[must_use]
    pub fn from_interface(value: &impl DateTimeLike) -> SafeInstant {
        SafeInstant::from_inner(value.to_fixed_offset())
    }

    #[inline]
    const fn from_inner(inner: DateTime<FixedOffset>) -> SafeInstant {
        SafeInstant { inner }
    }

    /// The wrapped chrono value.
    #[inline]
    pub const fn inner(&self) -> &DateTime<FixedOffset> {
        &self.inner
    }

    /// Unwraps the chrono value.
    #[inline]
    pub const fn into_inner(self) -> DateTime<FixedOffset> {
        self.inner
    }

    /// Renders the value with a chrono format string.
    ///
    /// # Errors
    ///
    /// Returns a [`DateTimeError`] if the format string contains an unknown specifier. chrono's
    /// own `format(..).to_string()` would panic in that case.
    pub fn format(&self, fmt: &str) -> Result<String, DateTimeError> {
        native::format(&self.inner, fmt).ok_or_else(DateTimeError::last)
    }

    /// The calendar interval from `self` to `other`, measured in `self`'s offset.
    ///
    /// The interval is negative when `other` is earlier, unless `absolute` is set.
    ///
    /// # Errors
    ///
    /// Returns a [`DateTimeError`] if the local time of `self` or of `other` seen from
    /// `self`'s offset lies outside chrono's range.
    pub fn diff(
        &self,
        other: &impl DateTimeLike,
        absolute: bool,
    ) -> Result<Interval, DateTimeError> {
        native::diff(&self.inner, &other.to_fixed_offset(), absolute)
            .ok_or_else(DateTimeError::last)
    }

    /// Applies a time expression to this value, see [`SafeInstant::new`] for the grammar.
    ///
    /// A date without an offset is read in this value's offset. A time of day is set before
    /// any relative amount is added, wherever it appears in the expression.
    ///
    /// # Errors
    ///
    /// Returns a [`DateTimeError`] if the expression cannot be parsed or moves the date out of
    /// range.
    ///
    /// # Example
    ///
    /// ```
    /// use safe_instant::SafeInstant;
    ///
    /// let dt = SafeInstant::new("2024-01-31 09:00:00", None)?;
    /// assert_eq!(dt.modify("+1 month")?.format("%F")?, "2024-02-29");
    /// assert_eq!(dt.modify("tomorrow noon")?.format("%F %T")?, "2024-02-01 12:00:00");
    /// assert!(dt.modify("+1 fortnite").is_err());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn modify(&self, expression: &str) -> Result<SafeInstant, DateTimeError> {
        native::modify(&self.inner, expression)
            .map(SafeInstant::from_inner)
            .ok_or_else(DateTimeError::last)
    }

    /// Replaces the local calendar date, keeping the time of day and offset.
    ///
    /// # Errors
    ///
    /// Returns a [`DateTimeError`] if the date does not exist.
    pub fn with_date(&self, year: i32, month: u32, day: u32) -> Result<SafeInstant, DateTimeError> {
        native::with_date(&self.inner, year, month, day)
            .map(SafeInstant::from_inner)
            .ok_or_else(DateTimeError::last)
    }

    /// Replaces the local date with an ISO 8601 week date. `day_of_week` runs from 1 (Monday)
    /// to 7 (Sunday).
    ///
    /// # Errors
    ///
    /// Returns a [`DateTimeError`] if the week date does not exist.
    pub fn with_iso_date(
        &self,
        year: i32,
        week: u32,
        day_of_week: u32,
    ) -> Result<SafeInstant, DateTimeError> {
        native::with_iso_date(&self.inner, year, week, day_of_week)
            .map(SafeInstant::from_inner)
            .ok_or_else(DateTimeError::last)
    }

    /// Replaces the local time of day.
    ///
    /// # Errors
    ///
    /// Returns a [`DateTimeError`] for an invalid time. As in chrono, `second = 59` with
    /// `microsecond >= 1_000_000` is accepted as a leap second.
    pub fn with_time(
        &self,
        hour: u32,
        minute: u32,
        second: u32,
        microsecond: u32,
    ) -> Result<SafeInstant, DateTimeError> {
        native::with_time(&self.inner, hour, minute, second, microsecond)
            .map(SafeInstant::from_inner)
            .ok_or_else(DateTimeError::last)
    }

    /// Moves to the given number of seconds since the Unix epoch, keeping the offset. The
    /// sub-second part is reset to zero.
    ///
    /// # Errors
    ///
    /// Returns a [`DateTimeError`] if the timestamp is out of range.
    pub fn with_timestamp(&self, secs: i64) -> Result<SafeInstant, DateTimeError> {
        native::with_timestamp(&self.inner, secs)
            .map(SafeInstant::from_inner)
            .ok_or_else(DateTimeError::last)
    }

    /// The same instant seen from another offset.
    ///
    /// # Errors
    ///
    /// Returns a [`DateTimeError`] if the local time in `tz` would be out of range.
    pub fn with_timezone(&self, tz: FixedOffset) -> Result<SafeInstant, DateTimeError> {
        native::with_timezone(&self.inner, tz)
            .map(SafeInstant::from_inner)
            .ok_or_else(DateTimeError::last)
    }

    /// Moves forward by `interval`: months first, then days, then the time part.
    ///
    /// # Errors
    ///
    /// Returns a [`DateTimeError`] if the result, or its local time, is out of range.
    #[allow(clippy::should_implement_trait)]
    pub fn add(&self, interval: &Interval) -> Result<SafeInstant, DateTimeError> {
        native::shift(&self.inner, interval, false)
            .map(SafeInstant::from_inner)
            .ok_or_else(DateTimeError::last)
    }

    /// Moves backwards by `interval`: months first, then days, then the time part.
    ///
    /// # Errors
    ///
    /// Returns a [`DateTimeError`] if the result, or its local time, is out of range.
    #[allow(clippy::should_implement_trait)]
    pub fn sub(&self, interval: &Interval) -> Result<SafeInstant, DateTimeError> {
        native::shift(&self.inner, interval, true)
            .map(SafeInstant::from_inner)
            .ok_or_else(DateTimeError::last)
    }

    /// Seconds east of UTC.
    ///
    /// # Errors
    ///
    /// Returns a [`DateTimeError`] if the offset cannot be determined.
    pub fn offset(&self) -> Result<i32, DateTimeError> {
        native::offset(&self.inner).ok_or_else(DateTimeError::last)
    }

    /// The offset from UTC.
    #[inline]
    pub fn timezone(&self) -> FixedOffset {
        *self.inner.offset()
    }

    /// Seconds since 1970-01-01 00:00:00 UTC.
    #[inline]
    pub fn timestamp(&self) -> i64 {
        self.inner.timestamp()
    }

    /// The local date and time, without the offset.
    ///
    /// # Errors
    ///
    /// Returns a [`DateTimeError`] if the local time lies outside chrono's range. This only
    /// happens for values taken over from a chrono [`DateTime`] that was already in that state.
    pub fn naive_local(&self) -> Result<NaiveDateTime, DateTimeError> {
        native::naive_local(&self.inner).ok_or_else(DateTimeError::last)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for SafeInstant {
    fn from(dt: DateTime<Tz>) -> SafeInstant {
        SafeInstant::from_datetime(&dt)
    }
}

impl From<SafeInstant> for DateTime<FixedOffset> {
    fn from(instant: SafeInstant) -> DateTime<FixedOffset> {
        instant.into_inner()
    }
}

/// Parses a time expression with no explicit timezone, like `SafeInstant::new(s, None)`.
impl FromStr for SafeInstant {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<SafeInstant, ExpressionError> {
        SafeInstant::new(s, None)
    }
}

impl<Tz: TimeZone> PartialEq<DateTime<Tz>> for SafeInstant {
    fn eq(&self, other: &DateTime<Tz>) -> bool {
        self.inner == *other
    }
}

impl<Tz: TimeZone> PartialOrd<DateTime<Tz>> for SafeInstant {
    fn partial_cmp(&self, other: &DateTime<Tz>) -> Option<Ordering> {
        self.inner.partial_cmp(other)
    }
}

impl fmt::Debug for SafeInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for SafeInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}
