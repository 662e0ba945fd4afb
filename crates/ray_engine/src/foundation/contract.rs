//! Contract violations
//!
//! Misuse of the device API (stale handles, handles of the wrong kind,
//! unsupported modes or flags) is a programming error in the caller. It is
//! reported once through `log::error!` and then terminates: a panic in
//! debug builds and tests, an abort under the release profile.
//!
//! Recoverable scene-authoring mistakes such as a missing required parameter
//! never go through here; they are returned as [`ObjectError`].
//!
//! [`ObjectError`]: crate::object::ObjectError

use std::fmt::Display;

/// Report a contract violation and terminate
#[track_caller]
pub fn violation(message: impl Display) -> ! {
    log::error!("contract violation: {message}");
    panic!("contract violation: {message}");
}

/// Turn lookups that must succeed into contract violations
pub trait Expect<T> {
    /// Unwrap the value or report `what` as a contract violation
    fn or_violation(self, what: impl Display) -> T;
}

impl<T> Expect<T> for Option<T> {
    #[track_caller]
    fn or_violation(self, what: impl Display) -> T {
        match self {
            Some(value) => value,
            None => violation(what),
        }
    }
}

impl<T, E: Display> Expect<T> for Result<T, E> {
    #[track_caller]
    fn or_violation(self, what: impl Display) -> T {
        match self {
            Ok(value) => value,
            Err(err) => violation(format_args!("{what}: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_violation_passes_values_through() {
        assert_eq!(Some(3).or_violation("missing"), 3);
        assert_eq!(Ok::<_, String>(4).or_violation("failed"), 4);
    }

    #[test]
    #[should_panic(expected = "contract violation: invalid handle")]
    fn test_none_is_a_violation() {
        let value: Option<u32> = None;
        value.or_violation("invalid handle");
    }

    #[test]
    #[should_panic(expected = "contract violation: bad depth: zero")]
    fn test_err_is_a_violation() {
        let value: Result<u32, &str> = Err("zero");
        value.or_violation("bad depth");
    }
}
