//! Unwrap helpers with good error messages.

use std::fmt::Debug;

/// Unwrap a `Result`, panicking with the error value.
///
/// # Panics
///
/// Panics if the result is `Err`.
#[track_caller]
#[expect(clippy::panic, reason = "test helper")]
pub fn must<T, E: Debug>(result: Result<T, E>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("must: unexpected Err: {e:?}"),
    }
}

/// Unwrap an `Option`, panicking with `msg` if `None`.
///
/// # Panics
///
/// Panics if the option is `None`.
#[track_caller]
#[expect(clippy::panic, reason = "test helper")]
pub fn must_some<T>(option: Option<T>, msg: &str) -> T {
    match option {
        Some(v) => v,
        None => panic!("must_some: {msg}"),
    }
}
