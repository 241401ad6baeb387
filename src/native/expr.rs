// This is a part of safe-instant.
// See README.md and LICENSE.txt for details.

//! Time expressions such as `"2024-01-01 10:00 +02:00"`, `"+1 month"` or `"3 days ago"`.
//!
//! An expression is an optional absolute anchor followed by relative adjustments. Parsing does
//! not look at any clock or offset. [`super`] decides what a missing anchor or a naive
//! anchor means.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc,
};

use crate::error::ExpressionErrorKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Anchor {
    /// `@<seconds>`, always in UTC.
    Timestamp(i64),
    /// A date and time that carried its own offset.
    Fixed(DateTime<FixedOffset>),
    /// A date and time without an offset.
    Local(NaiveDateTime),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Adjustment {
    Months(i64),
    Days(i64),
    Delta(TimeDelta),
    /// Replaces the time of day, keeping the local date.
    Time(NaiveTime),
}

impl Adjustment {
    fn negate(self) -> Result<Adjustment, ExpressionErrorKind> {
        Ok(match self {
            Adjustment::Months(n) => {
                Adjustment::Months(n.checked_neg().ok_or(ExpressionErrorKind::OutOfRange)?)
            }
            Adjustment::Days(n) => {
                Adjustment::Days(n.checked_neg().ok_or(ExpressionErrorKind::OutOfRange)?)
            }
            Adjustment::Delta(delta) => Adjustment::Delta(-delta),
            Adjustment::Time(time) => Adjustment::Time(time),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Expression {
    pub(crate) anchor: Option<Anchor>,
    pub(crate) adjustments: Vec<Adjustment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SyntaxError {
    pub(crate) position: usize,
    pub(crate) kind: ExpressionErrorKind,
}

impl SyntaxError {
    fn at(position: usize, reason: &'static str) -> SyntaxError {
        SyntaxError { position, kind: ExpressionErrorKind::Invalid(reason) }
    }
}

pub(crate) fn parse(input: &str) -> Result<Expression, SyntaxError> {
    let tokens: Vec<(usize, &str)> = input
        .split_whitespace()
        .map(|tok| (tok.as_ptr() as usize - input.as_ptr() as usize, tok))
        .collect();

    let (anchor, mut idx) = match parse_anchor(&tokens)? {
        Some((anchor, consumed)) => (Some(anchor), consumed),
        None => (None, 0),
    };

    let mut adjustments = Vec::new();
    while let Some(&(pos, tok)) = tokens.get(idx) {
        idx += 1;
        match tok.to_ascii_lowercase().as_str() {
            "now" => {}
            "today" | "midnight" => adjustments.push(Adjustment::Time(NaiveTime::MIN)),
            "noon" => adjustments.push(Adjustment::Time(clock_time(pos, 12, 0)?)),
            "tomorrow" => {
                adjustments.push(Adjustment::Days(1));
                adjustments.push(Adjustment::Time(NaiveTime::MIN));
            }
            "yesterday" => {
                adjustments.push(Adjustment::Days(-1));
                adjustments.push(Adjustment::Time(NaiveTime::MIN));
            }
            "ago" => {
                for adjustment in adjustments.iter_mut() {
                    *adjustment =
                        adjustment.negate().map_err(|kind| SyntaxError { position: pos, kind })?;
                }
            }
            _ => {
                if let Some(time) = parse_time_of_day(tok) {
                    adjustments.push(Adjustment::Time(time));
                    continue;
                }
                let (amount, inline_unit) =
                    split_number(tok).ok_or_else(|| SyntaxError::at(pos, "unexpected token"))?;
                let (unit_pos, unit) = if inline_unit.is_empty() {
                    let next = tokens
                        .get(idx)
                        .copied()
                        .ok_or_else(|| SyntaxError::at(input.len(), "missing unit"))?;
                    idx += 1;
                    next
                } else {
                    (pos + (tok.len() - inline_unit.len()), inline_unit)
                };
                let adjustment = unit_adjustment(amount, unit)
                    .map_err(|kind| SyntaxError { position: unit_pos, kind })?;
                adjustments.push(adjustment);
            }
        }
    }

    Ok(Expression { anchor, adjustments })
}

/// Recognizes an absolute date at the start of the expression.
///
/// Returns the anchor and the number of tokens it used.
fn parse_anchor(tokens: &[(usize, &str)]) -> Result<Option<(Anchor, usize)>, SyntaxError> {
    let (pos, first) = match tokens.first() {
        Some(&token) => token,
        None => return Ok(None),
    };

    if let Some(secs) = first.strip_prefix('@') {
        return match secs.parse::<i64>() {
            Ok(secs) => Ok(Some((Anchor::Timestamp(secs), 1))),
            Err(_) => Err(SyntaxError::at(pos, "invalid timestamp")),
        };
    }

    if !looks_like_date(first) {
        return Ok(None);
    }

    let (naive, consumed) = if let Some(naive) = tokens.get(1).and_then(|&(_, second)| {
        let joined = format!("{} {}", first, second);
        parse_naive(&joined, &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"])
    }) {
        (naive, 2)
    } else if let Ok(fixed) = DateTime::parse_from_rfc3339(first) {
        return Ok(Some((Anchor::Fixed(fixed), 1)));
    } else if let Some(naive) = parse_naive(first, &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]) {
        (naive, 1)
    } else if let Ok(date) = NaiveDate::parse_from_str(first, "%Y-%m-%d") {
        (date.and_time(NaiveTime::MIN), 1)
    } else {
        return Err(SyntaxError::at(pos, "invalid date"));
    };

    // an offset may follow, unless it is really the amount of a relative adjustment
    if let Some(&(offset_pos, tok)) = tokens.get(consumed) {
        let amount_follows = tokens.get(consumed + 1).map_or(false, |&(_, unit)| is_unit(unit));
        if let (Some(offset), false) = (parse_offset(tok), amount_follows) {
            let fixed = offset.from_local_datetime(&naive).single().ok_or(SyntaxError {
                position: offset_pos,
                kind: ExpressionErrorKind::OutOfRange,
            })?;
            return Ok(Some((Anchor::Fixed(fixed), consumed + 1)));
        }
    }

    Ok(Some((Anchor::Local(naive), consumed)))
}

fn looks_like_date(tok: &str) -> bool {
    let digits = tok.bytes().take_while(u8::is_ascii_digit).count();
    digits >= 4 && tok.as_bytes().get(digits) == Some(&b'-')
}

fn parse_naive(s: &str, formats: &[&str]) -> Option<NaiveDateTime> {
    formats.iter().find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

fn parse_time_of_day(tok: &str) -> Option<NaiveTime> {
    if !tok.contains(':') {
        return None;
    }
    NaiveTime::parse_from_str(tok, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(tok, "%H:%M"))
        .ok()
}

fn clock_time(pos: usize, hour: u32, min: u32) -> Result<NaiveTime, SyntaxError> {
    NaiveTime::from_hms_opt(hour, min, 0)
        .ok_or(SyntaxError { position: pos, kind: ExpressionErrorKind::OutOfRange })
}

/// `Z`, `UTC`, `GMT`, `+HH`, `+HHMM` or `+HH:MM`.
fn parse_offset(tok: &str) -> Option<FixedOffset> {
    if ["z", "utc", "gmt"].iter().any(|name| tok.eq_ignore_ascii_case(name)) {
        return Some(Utc.fix());
    }
    let (sign, rest) = match tok.as_bytes().first()? {
        b'+' => (1, &tok[1..]),
        b'-' => (-1, &tok[1..]),
        _ => return None,
    };
    let (hours, minutes) = match rest.len() {
        2 => (rest, "00"),
        4 => (rest.get(..2)?, rest.get(2..)?),
        5 if rest.as_bytes()[2] == b':' => (rest.get(..2)?, rest.get(3..)?),
        _ => return None,
    };
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Splits `"+3days"` into `(3, "days")`. The unit part may be empty.
fn split_number(tok: &str) -> Option<(i64, &str)> {
    let sign_len = usize::from(matches!(tok.as_bytes().first(), Some(b'+' | b'-')));
    let digits = tok.as_bytes()[sign_len..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let amount = tok[..sign_len + digits].parse().ok()?;
    Some((amount, &tok[sign_len + digits..]))
}

fn is_unit(tok: &str) -> bool {
    unit_adjustment(0, tok).is_ok()
}

fn unit_adjustment(amount: i64, unit: &str) -> Result<Adjustment, ExpressionErrorKind> {
    let overflow = ExpressionErrorKind::OutOfRange;
    let delta = |delta: Option<TimeDelta>| delta.map(Adjustment::Delta).ok_or(overflow);
    match unit.to_ascii_lowercase().as_str() {
        "usec" | "usecs" | "microsecond" | "microseconds" => {
            Ok(Adjustment::Delta(TimeDelta::microseconds(amount)))
        }
        "msec" | "msecs" | "millisecond" | "milliseconds" => {
            delta(TimeDelta::try_milliseconds(amount))
        }
        "sec" | "secs" | "second" | "seconds" => delta(TimeDelta::try_seconds(amount)),
        "min" | "mins" | "minute" | "minutes" => delta(TimeDelta::try_minutes(amount)),
        "hour" | "hours" => delta(TimeDelta::try_hours(amount)),
        "day" | "days" => Ok(Adjustment::Days(amount)),
        "week" | "weeks" => amount.checked_mul(7).map(Adjustment::Days).ok_or(overflow),
        "fortnight" | "fortnights" => amount.checked_mul(14).map(Adjustment::Days).ok_or(overflow),
        "month" | "months" => Ok(Adjustment::Months(amount)),
        "year" | "years" => amount.checked_mul(12).map(Adjustment::Months).ok_or(overflow),
        _ => Err(ExpressionErrorKind::Invalid("unknown unit")),
    }
}
