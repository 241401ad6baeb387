// This is a part of safe-instant.
// See README.md and LICENSE.txt for details.

use chrono::{DateTime, FixedOffset, TimeZone};

use crate::SafeInstant;

/// The read-only surface shared by [`SafeInstant`] and chrono's [`DateTime`].
///
/// Functions that only need to look at an instant can accept `&impl DateTimeLike` and work
/// with either type, e.g. [`SafeInstant::diff`] and [`SafeInstant::from_interface`].
pub trait DateTimeLike {
    /// The same instant, expressed with its fixed UTC offset.
    fn to_fixed_offset(&self) -> DateTime<FixedOffset>;

    /// Seconds since 1970-01-01 00:00:00 UTC.
    fn unix_timestamp(&self) -> i64 {
        self.to_fixed_offset().timestamp()
    }

    /// Seconds east of UTC.
    fn utc_offset(&self) -> i32 {
        self.to_fixed_offset().offset().local_minus_utc()
    }
}

impl<Tz: TimeZone> DateTimeLike for DateTime<Tz> {
    #[inline]
    fn to_fixed_offset(&self) -> DateTime<FixedOffset> {
        self.fixed_offset()
    }
}

impl DateTimeLike for SafeInstant {
    #[inline]
    fn to_fixed_offset(&self) -> DateTime<FixedOffset> {
        *self.inner()
    }
}

impl<T: DateTimeLike + ?Sized> DateTimeLike for &T {
    #[inline]
    fn to_fixed_offset(&self) -> DateTime<FixedOffset> {
        (**self).to_fixed_offset()
    }
}
