use std::collections::HashSet;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};

use super::SafeInstant;
use crate::diagnostic;
use crate::error::ExpressionErrorKind;
use crate::interval::Interval;

fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> SafeInstant {
    SafeInstant::from(Utc.with_ymd_and_hms(y, m, d, h, mi, s).unwrap())
}

fn east(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours * 3600).unwrap()
}

#[test]
fn test_new_with_anchor() {
    let dt = SafeInstant::new("2024-01-01 00:00:00", None).unwrap();
    assert_eq!(dt, ymd_hms(2024, 1, 1, 0, 0, 0));
    assert_eq!(dt.offset().unwrap(), 0);

    let dt = SafeInstant::new("2024-01-01 00:00:00", Some(east(9))).unwrap();
    assert_eq!(dt.timezone(), east(9));
    assert_eq!(dt, ymd_hms(2023, 12, 31, 15, 0, 0));

    // an explicit offset wins over the timezone argument
    let dt = SafeInstant::new("2024-01-01T00:00:00+02:00", Some(east(9))).unwrap();
    assert_eq!(dt.timezone(), east(2));

    // timestamps are always UTC
    let dt = SafeInstant::new("@86400", Some(east(9))).unwrap();
    assert_eq!(dt.timestamp(), 86_400);
    assert_eq!(dt.offset().unwrap(), 0);
}

#[test]
fn test_new_with_adjustments() {
    let dt = SafeInstant::new("2024-01-01 +1 month +2 days 10:30", None).unwrap();
    assert_eq!(dt, ymd_hms(2024, 2, 3, 10, 30, 0));

    let dt = SafeInstant::new("2024-03-10 12:00:00 2 days ago", None).unwrap();
    assert_eq!(dt, ymd_hms(2024, 3, 8, 12, 0, 0));

    let dt = SafeInstant::new("2024-03-10 12:00:00 yesterday", None).unwrap();
    assert_eq!(dt, ymd_hms(2024, 3, 9, 0, 0, 0));
}

#[test]
#[cfg(feature = "clock")]
fn test_new_relative_to_now() {
    let before = Utc::now();
    let dt = SafeInstant::new("+1 day", None).unwrap();
    let after = Utc::now();
    assert!(dt > before + chrono::TimeDelta::try_hours(23).unwrap());
    assert!(dt <= after + chrono::TimeDelta::try_days(1).unwrap());

    let today = SafeInstant::new("today", Some(east(3))).unwrap();
    assert_eq!(today.naive_local().unwrap().time(), chrono::NaiveTime::MIN);
    assert_eq!(today.timezone(), east(3));

    assert!(SafeInstant::now() >= before);
}

#[test]
fn test_new_propagates_expression_error() {
    let err = SafeInstant::new("2024-01-01 +1 fortnite", None).unwrap_err();
    assert_eq!(err.kind(), ExpressionErrorKind::Invalid("unknown unit"));
    assert_eq!(err.position(), 14);
    assert_eq!(err.input(), "2024-01-01 +1 fortnite");

    let err = SafeInstant::new("2024-02-30", None).unwrap_err();
    assert_eq!(err.kind(), ExpressionErrorKind::Invalid("invalid date"));

    let err = SafeInstant::new("9999-12-31 +300000 years", None).unwrap_err();
    assert_eq!(err.kind(), ExpressionErrorKind::OutOfRange);

    // the native error does not go through the last-error slot
    assert_eq!(diagnostic::last_error(), None);

    assert!("not a date".parse::<SafeInstant>().is_err());
    assert_eq!("2024-01-01".parse::<SafeInstant>().unwrap(), ymd_hms(2024, 1, 1, 0, 0, 0));
}

#[test]
fn test_parse_from_str() {
    let dt =
        SafeInstant::parse_from_str("%Y-%m-%d %H:%M:%S", "2024-06-30 23:59:58", None).unwrap();
    assert_eq!(dt, ymd_hms(2024, 6, 30, 23, 59, 58));

    // missing time of day is midnight
    let dt = SafeInstant::parse_from_str("%Y-%m-%d", "2024-02-29", Some(east(1))).unwrap();
    let midnight = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap().and_hms_opt(0, 0, 0).unwrap();
    assert_eq!(dt.naive_local().unwrap(), midnight);
    assert_eq!(dt.timezone(), east(1));

    // parsed offset wins
    let dt =
        SafeInstant::parse_from_str("%Y-%m-%d %H:%M %z", "2024-06-01 08:00 +0300", Some(east(1)))
            .unwrap();
    assert_eq!(dt.timezone(), east(3));
    assert_eq!(dt, ymd_hms(2024, 6, 1, 5, 0, 0));

    // timestamps
    let dt = SafeInstant::parse_from_str("%s", "1700000000", None).unwrap();
    assert_eq!(dt.timestamp(), 1_700_000_000);
}

#[test]
fn test_parse_from_str_failures() {
    for (fmt, s) in [
        ("%Y-%m-%d", "2024-02-30"),
        ("%Y-%m-%d", "2023-02-29"),
        ("%Y-%m-%d", "2024/02/01"),
        ("%Y-%m-%d", "2024-02-01 extra"),
        ("%H:%M", "10:30"),
        ("%Y-%m-%d %Q", "2024-02-01 x"),
        ("%Y-%m-%d %H", "2024-01-01 10"),
        ("%Y-%m-%d %I:%M", "2024-01-01 10:30"),
    ] {
        let err = SafeInstant::parse_from_str(fmt, s, None).unwrap_err();
        assert_eq!(err.operation(), "SafeInstant::parse_from_str");
        assert!(err.message().contains(s), "{:?} should mention {:?}", err.message(), s);
    }
    assert_eq!(diagnostic::last_error(), None);
}

#[test]
fn test_parse_from_str_time_parts() {
    // hours and minutes are enough, seconds default to zero
    let dt = SafeInstant::parse_from_str("%Y-%m-%d %H:%M", "2024-01-01 10:30", None).unwrap();
    assert_eq!(dt, ymd_hms(2024, 1, 1, 10, 30, 0));
    assert_eq!(dt.format("%Y-%m-%d %H:%M").unwrap(), "2024-01-01 10:30");

    // an hour alone is not silently turned into midnight
    let err = SafeInstant::parse_from_str("%Y-%m-%d %H", "2024-01-01 10", None).unwrap_err();
    assert_eq!(err.operation(), "SafeInstant::parse_from_str");
    assert!(SafeInstant::parse_from_str("%Y-%m-%d %M", "2024-01-01 30", None).is_err());

    // no time fields at all still means midnight
    let dt = SafeInstant::parse_from_str("%d.%m.%Y", "01.01.2024", None).unwrap();
    assert_eq!(dt, ymd_hms(2024, 1, 1, 0, 0, 0));
}

#[test]
fn test_format() {
    let dt = ymd_hms(2024, 2, 29, 13, 5, 9).with_timezone(east(2)).unwrap();
    assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").unwrap(), "2024-02-29 15:05:09");
    assert_eq!(dt.format("%:z").unwrap(), "+02:00");
    // an empty result is a success, not a failure
    assert_eq!(dt.format("").unwrap(), "");

    let err = dt.format("%Y-%Q").unwrap_err();
    assert_eq!(err.to_string(), "SafeInstant::format(): invalid format string (%Y-%Q)");
}

#[test]
fn test_modify() {
    let dt = SafeInstant::new("2024-01-01 00:00:00", None).unwrap();
    let next = dt.modify("+1 month").unwrap();
    assert_eq!(next.format("%Y-%m-%d %H:%M:%S").unwrap(), "2024-02-01 00:00:00");

    assert_eq!(dt.modify("-1 day").unwrap(), ymd_hms(2023, 12, 31, 0, 0, 0));
    assert_eq!(dt.modify("noon").unwrap(), ymd_hms(2024, 1, 1, 12, 0, 0));
    assert_eq!(dt.modify("1 week 3 hours ago").unwrap(), ymd_hms(2023, 12, 24, 21, 0, 0));
    assert_eq!(dt.modify("").unwrap(), dt);

    // an absolute date is read in the receiver's offset
    let tokyo = dt.with_timezone(east(9)).unwrap();
    let moved = tokyo.modify("2024-05-05 09:00").unwrap();
    assert_eq!(moved.timezone(), east(9));
    assert_eq!(moved, ymd_hms(2024, 5, 5, 0, 0, 0));
}

#[test]
fn test_time_of_day_comes_before_relative_amounts() {
    let dt = ymd_hms(2024, 3, 1, 0, 0, 0);
    let expected = ymd_hms(2024, 3, 1, 11, 30, 0);
    assert_eq!(dt.modify("10:30 +1 hour").unwrap(), expected);
    assert_eq!(dt.modify("+1 hour 10:30").unwrap(), expected);
    assert_eq!(SafeInstant::new("2024-03-01 +1 hour 10:30", None).unwrap(), expected);
    assert_eq!(SafeInstant::new("2024-03-01 10:30 +1 hour", None).unwrap(), expected);

    assert_eq!(dt.modify("+2 days noon").unwrap(), ymd_hms(2024, 3, 3, 12, 0, 0));
    assert_eq!(dt.modify("+90 minutes midnight").unwrap(), ymd_hms(2024, 3, 1, 1, 30, 0));
}

#[test]
fn test_modify_failures() {
    let dt = ymd_hms(2024, 1, 1, 0, 0, 0);

    let err = dt.modify("+1 fortnite").unwrap_err();
    assert_eq!(err.operation(), "SafeInstant::modify");
    assert_eq!(
        err.message(),
        "failed to parse time string (+1 fortnite) at position 3: unknown unit"
    );

    let err = dt.modify("+300000 years").unwrap_err();
    assert_eq!(err.message(), "time string (+300000 years) moves the date out of range");

    assert!(dt.modify("sometime").is_err());
    assert_eq!(diagnostic::last_error(), None);
}

#[test]
fn test_with_date_and_time() {
    let dt = ymd_hms(2024, 1, 15, 8, 30, 0);
    assert_eq!(dt.with_date(2020, 2, 29).unwrap(), ymd_hms(2020, 2, 29, 8, 30, 0));
    assert_eq!(dt.with_time(23, 59, 59, 0).unwrap(), ymd_hms(2024, 1, 15, 23, 59, 59));

    let precise = dt.with_time(1, 2, 3, 456_789).unwrap();
    assert_eq!(precise.inner().nanosecond(), 456_789_000);

    let err = dt.with_date(2023, 2, 29).unwrap_err();
    assert_eq!(err.to_string(), "SafeInstant::with_date(): invalid date 2023-02-29");
    assert!(dt.with_date(2024, 13, 1).is_err());
    assert!(dt.with_date(2024, 0, 1).is_err());

    let err = dt.with_time(24, 0, 0, 0).unwrap_err();
    assert_eq!(err.to_string(), "SafeInstant::with_time(): invalid time 24:00:00.000000");
    assert!(dt.with_time(12, 60, 0, 0).is_err());
}

#[test]
fn test_with_iso_date() {
    let dt = ymd_hms(2024, 1, 15, 8, 30, 0);
    // 2020-W53-7 is 2021-01-03
    let iso = dt.with_iso_date(2020, 53, 7).unwrap();
    assert_eq!(iso, ymd_hms(2021, 1, 3, 8, 30, 0));
    assert_eq!(dt.with_iso_date(2024, 1, 1).unwrap(), ymd_hms(2024, 1, 1, 8, 30, 0));

    assert!(dt.with_iso_date(2021, 53, 1).is_err());
    assert!(dt.with_iso_date(2024, 0, 1).is_err());
    let err = dt.with_iso_date(2024, 10, 8).unwrap_err();
    assert_eq!(err.message(), "invalid ISO day of week 8");
}

#[test]
fn test_with_timestamp() {
    let dt = ymd_hms(2024, 1, 15, 8, 30, 0).with_timezone(east(-4)).unwrap();
    for ts in [0, 1, -1, 1_700_000_000, -62_135_596_800, 253_402_300_799] {
        let moved = dt.with_timestamp(ts).unwrap();
        assert_eq!(moved.timestamp(), ts);
        assert_eq!(moved.timezone(), east(-4));
    }
    let err = dt.with_timestamp(i64::MAX).unwrap_err();
    assert_eq!(err.operation(), "SafeInstant::with_timestamp");
}

#[test]
fn test_with_timezone() {
    let dt = ymd_hms(2024, 1, 15, 8, 30, 0);
    let shifted = dt.with_timezone(east(-8)).unwrap();
    assert_eq!(shifted, dt);
    assert_eq!(shifted.naive_local().unwrap().hour(), 0);
    assert_eq!(shifted.offset().unwrap(), -8 * 3600);

    let edge = SafeInstant::from(DateTime::<Utc>::MAX_UTC);
    assert!(edge.with_timezone(east(1)).is_err());
    assert!(edge.with_timezone(east(-1)).is_ok());
}

#[test]
fn test_add_and_sub() {
    let dt = ymd_hms(2024, 1, 31, 22, 0, 0);
    let iv = Interval::ZERO.with_days(1).with_hours(3);
    assert_eq!(dt.add(&iv).unwrap(), ymd_hms(2024, 2, 2, 1, 0, 0));
    assert_eq!(dt.sub(&iv).unwrap(), ymd_hms(2024, 1, 30, 19, 0, 0));
    assert_eq!(dt.add(&iv.negated()).unwrap(), dt.sub(&iv).unwrap());

    // month arithmetic clamps to the end of the month
    let month = Interval::ZERO.with_months(1);
    assert_eq!(dt.add(&month).unwrap(), ymd_hms(2024, 2, 29, 22, 0, 0));

    let err = dt.add(&Interval::ZERO.with_years(300_000)).unwrap_err();
    assert_eq!(err.operation(), "SafeInstant::add");
    let err = dt.sub(&Interval::ZERO.with_years(300_000)).unwrap_err();
    assert_eq!(err.operation(), "SafeInstant::sub");
}

/// `+262142-12-31T22:59:59.999999999+01:00`, ninety minutes before the local time runs out.
fn near_max() -> SafeInstant {
    SafeInstant::from(DateTime::<Utc>::MAX_UTC)
        .modify("-2 hours")
        .unwrap()
        .with_timezone(east(1))
        .unwrap()
}

/// `-262143-01-01T01:00:00-01:00`, one hour after the local time starts.
fn near_min() -> SafeInstant {
    SafeInstant::from(DateTime::<Utc>::MIN_UTC)
        .modify("+2 hours")
        .unwrap()
        .with_timezone(east(-1))
        .unwrap()
}

#[test]
fn test_arithmetic_at_the_end_of_range() {
    let dt = near_max();
    let short = Interval::ZERO.with_minutes(30);
    let long = Interval::ZERO.with_minutes(90);

    let ok = dt.add(&short).unwrap();
    assert_eq!(ok.naive_local().unwrap().time().minute(), 29);
    assert!(dt.modify("+30 minutes").is_ok());

    let err = dt.add(&long).unwrap_err();
    assert_eq!(err.operation(), "SafeInstant::add");
    let err = dt.sub(&long.negated()).unwrap_err();
    assert_eq!(err.operation(), "SafeInstant::sub");
    let err = dt.modify("+90 minutes").unwrap_err();
    assert_eq!(err.operation(), "SafeInstant::modify");
    assert!(dt.modify("+1 day").is_err());
    assert!(dt.modify("tomorrow").is_err());
    assert_eq!(diagnostic::last_error(), None);
}

#[test]
fn test_arithmetic_at_the_start_of_range() {
    let dt = near_min();
    let long = Interval::ZERO.with_minutes(90);

    assert!(dt.sub(&Interval::ZERO.with_minutes(30)).is_ok());
    assert_eq!(dt.sub(&long).unwrap_err().operation(), "SafeInstant::sub");
    assert_eq!(dt.add(&long.negated()).unwrap_err().operation(), "SafeInstant::add");
    assert_eq!(dt.modify("-90 minutes").unwrap_err().operation(), "SafeInstant::modify");
    assert!(dt.modify("yesterday").is_err());
}

#[test]
fn test_local_time_out_of_range() {
    // chrono can hold an instant whose local time is not representable
    let edge = SafeInstant::from(DateTime::<Utc>::MAX_UTC.with_timezone(&east(1)));
    let err = edge.naive_local().unwrap_err();
    assert_eq!(err.operation(), "SafeInstant::naive_local");

    // none of these panic
    assert!(edge.with_date(2024, 1, 1).is_err());
    assert!(edge.with_time(0, 0, 0, 0).is_err());
    assert!(edge.with_iso_date(2024, 1, 1).is_err());
    assert!(edge.diff(&ymd_hms(2024, 1, 1, 0, 0, 0), false).is_err());
    assert_eq!(edge.timestamp(), DateTime::<Utc>::MAX_UTC.timestamp());

    let near = near_max();
    let err = near.diff(&DateTime::<Utc>::MAX_UTC, false).unwrap_err();
    assert_eq!(err.operation(), "SafeInstant::diff");
    assert!(SafeInstant::from(DateTime::<Utc>::MAX_UTC).diff(&near, false).is_ok());
}

#[test]
fn test_new_at_the_end_of_range() {
    let last = DateTime::<Utc>::MAX_UTC.timestamp();
    let dt = SafeInstant::new(&format!("@{} -1 second", last), None).unwrap();
    assert_eq!(dt.timestamp(), last - 1);

    let err = SafeInstant::new(&format!("@{} +1 second", last), None).unwrap_err();
    assert_eq!(err.kind(), ExpressionErrorKind::OutOfRange);
    let err = SafeInstant::new(&format!("@{} tomorrow", last), Some(east(1))).unwrap_err();
    assert_eq!(err.kind(), ExpressionErrorKind::OutOfRange);
}

#[test]
fn test_diff() {
    let a = ymd_hms(2023, 11, 15, 10, 0, 0);
    let b = ymd_hms(2025, 1, 16, 12, 30, 15);
    let iv = a.diff(&b, false).unwrap();
    assert_eq!(
        iv,
        Interval::ZERO
            .with_years(1)
            .with_months(2)
            .with_days(1)
            .with_hours(2)
            .with_minutes(30)
            .with_seconds(15)
    );
    assert_eq!(iv.total_days(), Some(428));
    assert_eq!(a.add(&iv).unwrap(), b);

    let back = b.diff(&a, false).unwrap();
    assert!(back.is_negative());
    assert!(!b.diff(&a, true).unwrap().is_negative());

    // a chrono value works as the other side
    let chrono_b: DateTime<Utc> = b.into_inner().with_timezone(&Utc);
    assert_eq!(a.diff(&chrono_b, false).unwrap(), iv);

    assert_eq!(a.diff(&a, false).unwrap(), Interval::ZERO);
}

#[test]
fn test_immutability_and_comparison() {
    let a = ymd_hms(2024, 1, 1, 0, 0, 0);
    let b = SafeInstant::from_interface(&a);
    assert_eq!(a, b);
    assert!(a >= b && a <= b);

    let snapshot = a;
    let later = a.modify("+1 day").unwrap();
    assert_eq!(a, snapshot);
    assert!(later > a);
    assert!(a < later);

    // the same instant seen from another offset is equal and hashes the same
    let tokyo = a.with_timezone(east(9)).unwrap();
    assert_eq!(tokyo, a);
    let set: HashSet<SafeInstant> = [a, tokyo, later].into_iter().collect();
    assert_eq!(set.len(), 2);

    // failed operations leave the receiver as it was
    assert!(a.with_date(2023, 2, 29).is_err());
    assert_eq!(a, snapshot);
}

#[test]
fn test_chrono_interop() {
    let utc = Utc.with_ymd_and_hms(2024, 7, 1, 6, 0, 0).unwrap();
    let mut mutable = utc.fixed_offset();
    let safe = SafeInstant::from_datetime(&mutable);
    mutable += chrono::TimeDelta::try_hours(1).unwrap();

    assert_eq!(safe, utc);
    assert!(safe < mutable);
    assert_eq!(DateTime::<FixedOffset>::from(safe), utc);
    assert_eq!(safe.inner().year(), 2024);
}

#[test]
fn test_display_and_debug() {
    let dt = ymd_hms(2024, 1, 2, 3, 4, 5).with_timezone(east(1)).unwrap();
    assert_eq!(dt.to_string(), "2024-01-02 04:04:05 +01:00");
    assert_eq!(format!("{:?}", dt), "2024-01-02T04:04:05+01:00");
}

#[test]
fn test_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SafeInstant>();
    assert_send_sync::<Interval>();
}
