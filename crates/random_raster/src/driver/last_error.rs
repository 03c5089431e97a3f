//! Per-thread record of the last failed open.
//!
//! [`Driver::open`](super::Driver::open) returns `Option`; the reason for a `None` after a
//! source was identified is kept here until the next open on the same thread.
use std::cell::RefCell;

use crate::error::{Error, ErrorKind};

/// Snapshot of a recorded failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LastError {
    pub kind: ErrorKind,
    /// Kind of the innermost cause.
    pub root_kind: ErrorKind,
    pub message: String,
}

thread_local! {
    static LAST_ERROR: RefCell<Option<LastError>> = const { RefCell::new(None) };
}

/// Clears the recorded failure of the current thread.
pub fn error_reset() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// Message of the last failure, or an empty string.
pub fn last_error_msg() -> String {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|e| e.message.clone())
            .unwrap_or_default()
    })
}

/// Root kind of the last failure.
pub fn last_error_kind() -> Option<ErrorKind> {
    LAST_ERROR.with(|slot| slot.borrow().as_ref().map(|e| e.root_kind))
}

pub fn last_error() -> Option<LastError> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

pub(crate) fn set_last_error(err: &Error) {
    let record = LastError {
        kind: err.kind(),
        root_kind: err.root_kind(),
        message: err.to_string(),
    };
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(record));
}
