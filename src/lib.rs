// This is a part of safe-instant.
// See README.md and LICENSE.txt for details.

//! # safe-instant: date and time values that never fail quietly
//!
//! [`SafeInstant`] is an immutable date and time with a fixed UTC offset. It wraps a
//! [`chrono::DateTime<FixedOffset>`](chrono::DateTime) and offers the same set of operations,
//! but every one of them either produces a valid value or fails with a [`DateTimeError`].
//!
//! chrono reports many failures through a quiet sentinel: `None` from the `*_opt` and
//! `checked_*` families, or a `fmt::Error` hidden inside a `DelayedFormat` that makes
//! `to_string()` panic. This crate checks every one of those at the point of delegation and
//! turns it into a `DateTimeError`. The message comes from the last-error slot in
//! [`diagnostic`], which the failing operation filled in.
//!
//! Errors that are already structured are passed through untouched. The constructor's
//! [`ExpressionError`] is one of them.
//!
//! ### Example
//!
//! ```
//! use safe_instant::SafeInstant;
//!
//! let start = SafeInstant::new("2024-01-01 00:00:00", None)?;
//! let later = start.modify("+1 month")?;
//! assert_eq!(later.format("%Y-%m-%d %H:%M:%S")?, "2024-02-01 00:00:00");
//! assert!(later > start);
//!
//! let err = SafeInstant::parse_from_str("%Y-%m-%d", "2024-02-30", None).unwrap_err();
//! assert_eq!(err.operation(), "SafeInstant::parse_from_str");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Intervals
//!
//! [`SafeInstant::diff`] produces an [`Interval`]. The same type is accepted by
//! [`SafeInstant::add`] and [`SafeInstant::sub`], and it can be parsed from an ISO 8601
//! duration:
//!
//! ```
//! use safe_instant::{Interval, SafeInstant};
//!
//! let a = SafeInstant::new("2024-03-10 08:00:00", None)?;
//! let step: Interval = "P1DT2H".parse()?;
//! let b = a.add(&step)?;
//! assert_eq!(a.diff(&b, false)?, Interval::ZERO.with_days(1).with_hours(2));
//! assert_eq!(b.sub(&step)?, a);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Features
//!
//! - `clock` (default): enables [`SafeInstant::now`] and time expressions without an
//!   explicit anchor such as `"+1 day"`.
//! - `serde`: serializes `SafeInstant` as an RFC 3339 string and `Interval` as an ISO 8601
//!   duration.
//! - `tracing`: emits a `debug` event every time a sentinel failure is turned into a
//!   [`DateTimeError`].

#![warn(missing_docs)]
#![deny(missing_debug_implementations)]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod diagnostic;

mod error;
pub use error::{DateTimeError, ExpressionError, ExpressionErrorKind};

mod instant;
pub use instant::SafeInstant;

mod interval;
pub use interval::Interval;

mod native;

mod traits;
pub use traits::DateTimeLike;

/// The chrono types that appear in this crate's public API.
pub use chrono::{DateTime, FixedOffset};
