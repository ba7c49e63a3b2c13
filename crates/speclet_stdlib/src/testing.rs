//! Checks for test bodies.
//!
//! These are intended to be used from `do_it!` statements or directly inside a body closure:
//!
//! ```rust
//! use speclet_stdlib::{Failure, expect_eq, expect_true};
//!
//! fn body() -> Result<(), Failure> {
//!     expect_true(1 < 2)?;
//!     expect_eq(2 + 2, 4)
//! }
//! assert!(body().is_ok());
//! ```

use std::fmt::Debug;

use speclet_core::failure::{Failure, expect};

/// Check that a condition is true.
///
/// ## Errors
/// - [`Failure::Expectation`] if `condition` is false.
pub fn expect_true(condition: bool) -> Result<(), Failure> {
    expect("condition", condition)
}

/// Check that a condition is false.
///
/// ## Errors
/// - [`Failure::Expectation`] if `condition` is true.
pub fn expect_false(condition: bool) -> Result<(), Failure> {
    expect("!condition", !condition)
}

/// Check that two values are equal.
///
/// ## Errors
/// - [`Failure::Comparison`] if `left != right`.
pub fn expect_eq<T: PartialEq + Debug>(left: T, right: T) -> Result<(), Failure> {
    compare("left == right", left == right, &left, &right)
}

/// Check that two values are not equal.
///
/// ## Errors
/// - [`Failure::Comparison`] if `left == right`.
pub fn expect_ne<T: PartialEq + Debug>(left: T, right: T) -> Result<(), Failure> {
    compare("left != right", left != right, &left, &right)
}

/// Explicitly fail with a message.
///
/// ## Errors
/// Always returns [`Failure::Message`].
pub fn fail(msg: impl Into<String>) -> Result<(), Failure> {
    Err(Failure::message(msg))
}

fn compare<T: Debug>(expression: &str, holds: bool, left: &T, right: &T) -> Result<(), Failure> {
    if holds {
        Ok(())
    } else {
        Err(Failure::Comparison {
            expression: expression.to_string(),
            left: format!("{left:?}"),
            right: format!("{right:?}"),
        })
    }
}

/// Check an expression, reporting its source text on failure.
///
/// ```rust
/// use speclet_stdlib::Failure;
///
/// let x = 2;
/// assert_eq!(
///     speclet_stdlib::expect!(x > 3),
///     Err(Failure::Expectation { expression: "x > 3".into(), value: "false".into() })
/// );
/// ```
#[macro_export]
macro_rules! expect {
    ($value:expr) => {
        $crate::expect(stringify!($value), $value)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparisons_render_both_sides() {
        assert_eq!(
            expect_eq(1, 2),
            Err(Failure::Comparison {
                expression: "left == right".into(),
                left: "1".into(),
                right: "2".into(),
            })
        );
        assert!(expect_ne("a", "b").is_ok());
    }

    #[test]
    fn test_boolean_checks() {
        assert!(expect_true(true).is_ok());
        assert!(expect_false(true).is_err());
        assert_eq!(fail("nope"), Err(Failure::message("nope")));
    }
}
