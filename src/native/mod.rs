// This is a part of safe-instant.
// See README.md and LICENSE.txt for details.

//! The boundary with chrono.
//!
//! Each function here performs one delegated operation on a `DateTime<FixedOffset>` and reports
//! failure the way chrono does for most of its API: by returning `None`. Before returning
//! `None` it leaves a description of the failure in the [last-error slot](crate::diagnostic).
//! Callers must turn the `None` into a [`DateTimeError`](crate::DateTimeError) right away.

use core::fmt::Write;

use chrono::format::{parse as parse_items, ParseErrorKind, Parsed, StrftimeItems};
use chrono::{
    DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeDelta, TimeZone, Utc, Weekday,
};

use crate::diagnostic;
use crate::error::{ExpressionError, ExpressionErrorKind};
use crate::interval::{self, Interval};

pub(crate) mod expr;

use expr::{Adjustment, Anchor};

/// Records the diagnostic and returns the sentinel.
#[inline]
fn fail<T>(operation: &'static str, message: impl Into<String>) -> Option<T> {
    diagnostic::record(operation, message);
    None
}

fn utc() -> FixedOffset {
    Utc.fix()
}

/// Resolves a time expression. Failures are structured errors, not sentinels.
pub(crate) fn parse_expression(
    input: &str,
    tz: Option<FixedOffset>,
) -> Result<DateTime<FixedOffset>, ExpressionError> {
    let expression = expr::parse(input)
        .map_err(|err| ExpressionError::new(input, err.position, err.kind))?;
    let zone = tz.unwrap_or_else(utc);
    let out_of_range = || ExpressionError::new(input, 0, ExpressionErrorKind::OutOfRange);

    let base = match expression.anchor {
        Some(anchor) => resolve_anchor(anchor, zone).ok_or_else(out_of_range)?,
        None => now_in(zone)
            .ok_or_else(|| ExpressionError::new(input, 0, ExpressionErrorKind::NoClock))?,
    };
    apply(base, &expression.adjustments).ok_or_else(out_of_range)
}

#[cfg(feature = "clock")]
pub(crate) fn now_in(zone: FixedOffset) -> Option<DateTime<FixedOffset>> {
    Some(Utc::now().with_timezone(&zone))
}

#[cfg(not(feature = "clock"))]
pub(crate) fn now_in(_zone: FixedOffset) -> Option<DateTime<FixedOffset>> {
    None
}

fn resolve_anchor(anchor: Anchor, zone: FixedOffset) -> Option<DateTime<FixedOffset>> {
    match anchor {
        Anchor::Timestamp(secs) => DateTime::from_timestamp(secs, 0).map(|dt| dt.fixed_offset()),
        Anchor::Fixed(dt) => Some(dt),
        Anchor::Local(naive) => zone.from_local_datetime(&naive).single(),
    }
}

fn apply(
    mut dt: DateTime<FixedOffset>,
    adjustments: &[Adjustment],
) -> Option<DateTime<FixedOffset>> {
    // the time of day is set first, relative amounts are added on top of it
    let (times, relative): (Vec<&Adjustment>, Vec<&Adjustment>) =
        adjustments.iter().partition(|adjustment| matches!(adjustment, Adjustment::Time(_)));
    for adjustment in times.into_iter().chain(relative) {
        dt = match *adjustment {
            Adjustment::Months(n) => {
                let months = Months::new(u32::try_from(n.unsigned_abs()).ok()?);
                if n < 0 {
                    dt.checked_sub_months(months)?
                } else {
                    dt.checked_add_months(months)?
                }
            }
            Adjustment::Days(n) => {
                let days = Days::new(n.unsigned_abs());
                if n < 0 {
                    dt.checked_sub_days(days)?
                } else {
                    dt.checked_add_days(days)?
                }
            }
            Adjustment::Delta(delta) => dt.checked_add_signed(delta)?,
            Adjustment::Time(time) => relocal(&dt, local(&dt)?.date().and_time(time))?,
        };
        local(&dt)?;
    }
    Some(dt)
}

/// Places a local date and time in the offset of `dt`.
fn relocal(dt: &DateTime<FixedOffset>, local: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    dt.offset().from_local_datetime(&local).single()
}

/// The local date and time of `dt`, or `None` if it falls outside the range of
/// `NaiveDateTime`.
///
/// chrono's `DateTime::naive_local` panics in that case.
pub(crate) fn local(dt: &DateTime<FixedOffset>) -> Option<NaiveDateTime> {
    TimeDelta::try_seconds(i64::from(dt.offset().local_minus_utc()))
        .and_then(|offset| dt.naive_utc().checked_add_signed(offset))
}

pub(crate) fn naive_local(dt: &DateTime<FixedOffset>) -> Option<NaiveDateTime> {
    match local(dt) {
        Some(local) => Some(local),
        None => fail("SafeInstant::naive_local", format!("local time of {} is out of range", dt)),
    }
}

pub(crate) fn modify(dt: &DateTime<FixedOffset>, input: &str) -> Option<DateTime<FixedOffset>> {
    const OP: &str = "SafeInstant::modify";
    let expression = match expr::parse(input) {
        Ok(expression) => expression,
        Err(err) => {
            return fail(OP, ExpressionError::new(input, err.position, err.kind).to_string())
        }
    };
    let base = match expression.anchor {
        Some(anchor) => match resolve_anchor(anchor, *dt.offset()) {
            Some(base) => base,
            None => return fail(OP, format!("time string ({}) is out of range", input)),
        },
        None => *dt,
    };
    match apply(base, &expression.adjustments) {
        Some(modified) => Some(modified),
        None => fail(OP, format!("time string ({}) moves the date out of range", input)),
    }
}

pub(crate) fn parse_from_str(
    fmt: &str,
    s: &str,
    tz: Option<FixedOffset>,
) -> Option<DateTime<FixedOffset>> {
    const OP: &str = "SafeInstant::parse_from_str";
    let mut parsed = Parsed::new();
    if let Err(err) = parse_items(&mut parsed, s, StrftimeItems::new(fmt)) {
        return fail(OP, format!("({}) does not match format ({}): {}", s, fmt, err));
    }

    let offset = parsed.to_fixed_offset().unwrap_or_else(|_| tz.unwrap_or_else(utc));
    let local = match parsed.to_naive_datetime_with_offset(offset.local_minus_utc()) {
        Ok(local) => local,
        // no time of day at all means midnight, a partial one is an error
        Err(err) if err.kind() == ParseErrorKind::NotEnough && !has_time_field(&parsed) => {
            match parsed.to_naive_date() {
                Ok(date) => date.and_time(NaiveTime::MIN),
                Err(err) => return fail(OP, format!("({}) is not a valid date: {}", s, err)),
            }
        }
        Err(err) => return fail(OP, format!("({}) is not a valid date: {}", s, err)),
    };
    match offset.from_local_datetime(&local).single() {
        Some(dt) => Some(dt),
        None => fail(OP, format!("({}) is out of range", s)),
    }
}

fn has_time_field(parsed: &Parsed) -> bool {
    parsed.hour_div_12().is_some()
        || parsed.hour_mod_12().is_some()
        || parsed.minute().is_some()
        || parsed.second().is_some()
        || parsed.nanosecond().is_some()
}

pub(crate) fn format(dt: &DateTime<FixedOffset>, fmt: &str) -> Option<String> {
    let mut out = String::new();
    match write!(out, "{}", dt.format(fmt)) {
        Ok(()) => Some(out),
        Err(_) => fail("SafeInstant::format", format!("invalid format string ({})", fmt)),
    }
}

/// Calendar difference from `a` to `b`, measured in the offset of `a`.
pub(crate) fn diff(
    a: &DateTime<FixedOffset>,
    b: &DateTime<FixedOffset>,
    absolute: bool,
) -> Option<Interval> {
    let other = b.with_timezone(a.offset());
    let (here, there) = match (local(a), local(&other)) {
        (Some(here), Some(there)) => (here, there),
        _ => return fail("SafeInstant::diff", format!("local time out of range in {}", a.offset())),
    };
    let invert = there < here;
    let (start, end) = if invert { (there, here) } else { (here, there) };

    // `end` is never earlier than `start`, so the span is not negative
    let mut months =
        ((end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32) as u32;
    // month arithmetic clamps to the end of the month, so the first guess can overshoot
    let anchor = loop {
        match start.checked_add_months(Months::new(months)) {
            Some(anchor) if anchor <= end => break anchor,
            _ if months > 0 => months -= 1,
            _ => break start,
        }
    };

    // less than a month is left
    let rest = end.signed_duration_since(anchor);
    let days = rest.num_days();
    let secs = rest.num_seconds() - days * 86_400;

    let interval = Interval::ZERO
        .with_years(months / 12)
        .with_months(months % 12)
        .with_days(days as u32)
        .with_hours((secs / 3600) as u32)
        .with_minutes((secs % 3600 / 60) as u32)
        .with_seconds((secs % 60) as u32)
        .with_nanoseconds(rest.subsec_nanos() as u32)
        .with_total_days(end.signed_duration_since(start).num_days());
    Some(if invert && !absolute { interval.negated() } else { interval })
}

pub(crate) fn with_date(
    dt: &DateTime<FixedOffset>,
    year: i32,
    month: u32,
    day: u32,
) -> Option<DateTime<FixedOffset>> {
    const OP: &str = "SafeInstant::with_date";
    let date = match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => return fail(OP, format!("invalid date {}-{:02}-{:02}", year, month, day)),
    };
    match local(dt).and_then(|local| relocal(dt, date.and_time(local.time()))) {
        Some(dt) => Some(dt),
        None => fail(OP, "date out of range"),
    }
}

pub(crate) fn with_iso_date(
    dt: &DateTime<FixedOffset>,
    year: i32,
    week: u32,
    day_of_week: u32,
) -> Option<DateTime<FixedOffset>> {
    const OP: &str = "SafeInstant::with_iso_date";
    let weekday = match day_of_week {
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        6 => Weekday::Sat,
        7 => Weekday::Sun,
        _ => return fail(OP, format!("invalid ISO day of week {}", day_of_week)),
    };
    let date = match NaiveDate::from_isoywd_opt(year, week, weekday) {
        Some(date) => date,
        None => {
            let message = format!("invalid ISO week date {}-W{:02}-{}", year, week, day_of_week);
            return fail(OP, message);
        }
    };
    match local(dt).and_then(|local| relocal(dt, date.and_time(local.time()))) {
        Some(dt) => Some(dt),
        None => fail(OP, "date out of range"),
    }
}

pub(crate) fn with_time(
    dt: &DateTime<FixedOffset>,
    hour: u32,
    minute: u32,
    second: u32,
    microsecond: u32,
) -> Option<DateTime<FixedOffset>> {
    const OP: &str = "SafeInstant::with_time";
    let time = match NaiveTime::from_hms_micro_opt(hour, minute, second, microsecond) {
        Some(time) => time,
        None => {
            return fail(
                OP,
                format!("invalid time {:02}:{:02}:{:02}.{:06}", hour, minute, second, microsecond),
            )
        }
    };
    match local(dt).and_then(|local| relocal(dt, local.date().and_time(time))) {
        Some(dt) => Some(dt),
        None => fail(OP, "date out of range"),
    }
}

pub(crate) fn with_timestamp(
    dt: &DateTime<FixedOffset>,
    secs: i64,
) -> Option<DateTime<FixedOffset>> {
    const OP: &str = "SafeInstant::with_timestamp";
    match DateTime::from_timestamp(secs, 0).map(|utc| utc.with_timezone(dt.offset())) {
        Some(moved) if local(&moved).is_some() => Some(moved),
        _ => fail(OP, format!("timestamp {} is out of range", secs)),
    }
}

pub(crate) fn with_timezone(
    dt: &DateTime<FixedOffset>,
    tz: FixedOffset,
) -> Option<DateTime<FixedOffset>> {
    let moved = dt.with_timezone(&tz);
    if local(&moved).is_some() {
        Some(moved)
    } else {
        fail("SafeInstant::with_timezone", format!("local time out of range in {}", tz))
    }
}

/// Moves `dt` by `interval`, or against it when `backwards` is set.
pub(crate) fn shift(
    dt: &DateTime<FixedOffset>,
    interval: &Interval,
    backwards: bool,
) -> Option<DateTime<FixedOffset>> {
    let op = if backwards { "SafeInstant::sub" } else { "SafeInstant::add" };
    let out_of_range = || fail(op, format!("interval ({}) moves the date out of range", interval));

    let months = match interval.total_months() {
        Some(months) => Months::new(months),
        None => return out_of_range(),
    };
    let days = Days::new(u64::from(interval.days()));
    let secs = i64::from(interval.hours()) * 3600
        + i64::from(interval.minutes()) * 60
        + i64::from(interval.seconds());
    let nanos = TimeDelta::nanoseconds(i64::from(interval.nanoseconds()));
    let time = match TimeDelta::try_seconds(secs).and_then(|secs| secs.checked_add(&nanos)) {
        Some(time) => time,
        None => return out_of_range(),
    };

    let moved = if interval.is_negative() != backwards {
        dt.checked_sub_months(months)
            .and_then(|dt| dt.checked_sub_days(days))
            .and_then(|dt| dt.checked_sub_signed(time))
    } else {
        dt.checked_add_months(months)
            .and_then(|dt| dt.checked_add_days(days))
            .and_then(|dt| dt.checked_add_signed(time))
    };
    moved.filter(|moved| local(moved).is_some()).or_else(out_of_range)
}

/// A `FixedOffset` always knows its offset, so this never records a diagnostic.
pub(crate) fn offset(dt: &DateTime<FixedOffset>) -> Option<i32> {
    Some(dt.offset().local_minus_utc())
}

pub(crate) fn parse_interval(spec: &str) -> Option<Interval> {
    match interval::parse_designator(spec) {
        Ok(interval) => Some(interval),
        Err(reason) => {
            fail("Interval::parse", format!("unknown or bad format ({}): {}", spec, reason))
        }
    }
}
