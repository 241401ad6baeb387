// This is a part of safe-instant.
// See README.md and LICENSE.txt for details.

use core::fmt;

use crate::diagnostic;

/// The error returned when the trusted date and time layer reports a quiet failure.
///
/// Every operation of [`SafeInstant`](crate::SafeInstant) that chrono can refuse (an invalid
/// calendar date, an unknown format specifier, an arithmetic overflow...) returns this type
/// instead of a sentinel. The message is the diagnostic that the failing operation left in the
/// [last-error slot](crate::diagnostic) at the moment of failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeError {
    operation: &'static str,
    message: String,
}

impl DateTimeError {
    /// Builds an error out of the diagnostic the trusted layer just recorded.
    ///
    /// Must be called right after the sentinel check: any other call into the trusted layer
    /// in between could replace the diagnostic.
    pub(crate) fn last() -> Self {
        let err = match diagnostic::take() {
            Some(diag) => DateTimeError { operation: diag.operation, message: diag.message },
            None => DateTimeError {
                operation: "SafeInstant",
                message: String::from("unknown date/time failure"),
            },
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            operation = err.operation,
            message = %err.message,
            "date/time operation reported a sentinel failure"
        );

        err
    }

    /// The name of the operation that failed, e.g. `"SafeInstant::modify"`.
    #[inline]
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// The diagnostic message, without the operation prefix.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DateTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(): {}", self.operation, self.message)
    }
}

impl std::error::Error for DateTimeError {}

/// The category of an [`ExpressionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ExpressionErrorKind {
    /// The expression contains something that is not part of the grammar.
    Invalid(&'static str),

    /// The expression is well formed but the date it describes cannot be represented.
    OutOfRange,

    /// The expression has no absolute anchor and the `clock` feature is disabled, so there is
    /// no current time to start from.
    NoClock,
}

/// The error raised by [`SafeInstant::new`](crate::SafeInstant::new) for a malformed time
/// expression.
///
/// This is the trusted layer's own structured error. It is returned as is and never turned
/// into a [`DateTimeError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionError {
    input: String,
    position: usize,
    kind: ExpressionErrorKind,
}

impl ExpressionError {
    pub(crate) fn new(input: &str, position: usize, kind: ExpressionErrorKind) -> Self {
        ExpressionError { input: input.to_owned(), position, kind }
    }

    /// The category of the error.
    #[inline]
    pub fn kind(&self) -> ExpressionErrorKind {
        self.kind
    }

    /// Byte offset into the expression where the problem was found.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// The full expression that was rejected.
    #[inline]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse time string ({}) at position {}: ", self.input, self.position)?;
        match self.kind {
            ExpressionErrorKind::Invalid(reason) => f.write_str(reason),
            ExpressionErrorKind::OutOfRange => f.write_str("date out of range"),
            ExpressionErrorKind::NoClock => {
                f.write_str("no current time without the `clock` feature")
            }
        }
    }
}

impl std::error::Error for ExpressionError {}
