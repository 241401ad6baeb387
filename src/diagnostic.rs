// This is a part of safe-instant.
// See README.md and LICENSE.txt for details.

//! The last-error slot of the trusted date and time layer.
//!
//! When a delegated operation fails quietly it leaves a human-readable description here
//! before it returns its sentinel, much like `errno`. [`DateTimeError`](crate::DateTimeError)
//! takes the description out of the slot right after the sentinel is seen.
//!
//! The slot is per thread. A failure on one thread never shows up in another thread's errors.

use core::cell::RefCell;

thread_local! {
    static LAST_ERROR: RefCell<Option<Diagnostic>> = const { RefCell::new(None) };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Diagnostic {
    pub(crate) operation: &'static str,
    pub(crate) message: String,
}

/// Overwrites the slot. Only the trusted layer calls this, right before it returns `None`.
pub(crate) fn record(operation: &'static str, message: impl Into<String>) {
    let diag = Diagnostic { operation, message: message.into() };
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(diag));
}

/// Empties the slot and returns what it held.
pub(crate) fn take() -> Option<Diagnostic> {
    LAST_ERROR.with(|slot| slot.borrow_mut().take())
}

/// Returns the message of the most recent failure on this thread that has not been turned
/// into an error yet.
///
/// Every failing [`SafeInstant`](crate::SafeInstant) operation consumes its own diagnostic, so
/// this is normally `None`.
pub fn last_error() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow().as_ref().map(|diag| diag.message.clone()))
}
