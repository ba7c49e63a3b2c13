//! Failure signals and the truthiness rule behind `expect`.
//!
//! A test body signals failure by returning `Err(Failure)`. Runners must propagate the value
//! unchanged: the core never swallows or reclassifies a failure.

use core::fmt::Debug;

use serde_json::Value;
use thiserror::Error;

use crate::metadata::json_truthy;

/// Why a test case (or one of its fixtures) did not pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Failure {
    #[error("expected `{expression}` to be truthy, got {value}")]
    Expectation { expression: String, value: String },

    #[error("expected `{expression}`\n  left:  {left}\n  right: {right}")]
    Comparison {
        expression: String,
        left: String,
        right: String,
    },

    #[error("{0}")]
    Message(String),

    #[error("no fixture named `{0}` is bound in this context")]
    MissingContext(String),

    #[error("fixture `{name}` does not hold a `{expected}`")]
    ContextType { name: String, expected: &'static str },

    #[error("fixture `{name}` failed: {cause}")]
    Fixture { name: String, cause: Box<Failure> },

    #[error("panicked: {0}")]
    Panic(String),
}

impl Failure {
    pub fn message(msg: impl Into<String>) -> Self {
        Failure::Message(msg.into())
    }

    /// Wrap the failure of the fixture expression bound to `name`.
    pub fn fixture(name: impl Into<String>, cause: Failure) -> Self {
        Failure::Fixture {
            name: name.into(),
            cause: Box::new(cause),
        }
    }
}

/// Values an expectation can test.
///
/// `false` and "nothing" (`None`, JSON `null`) are falsy, everything else is truthy.
pub trait Truthy: Debug {
    fn is_truthy(&self) -> bool;
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

impl<T: Debug> Truthy for Option<T> {
    fn is_truthy(&self) -> bool {
        self.is_some()
    }
}

impl Truthy for Value {
    fn is_truthy(&self) -> bool {
        json_truthy(self)
    }
}

/// The assertion primitive: `Ok(())` when `value` is truthy, otherwise a [`Failure::Expectation`]
/// carrying the expression text and the evaluated value.
///
/// ## Examples
/// ```rust
/// use speclet_core::failure::{Failure, expect};
///
/// assert!(expect("1 + 1 == 2", 1 + 1 == 2).is_ok());
/// assert_eq!(
///     expect("None::<u8>", None::<u8>),
///     Err(Failure::Expectation { expression: "None::<u8>".into(), value: "None".into() })
/// );
/// ```
pub fn expect<T: Truthy>(expression: &str, value: T) -> Result<(), Failure> {
    if value.is_truthy() {
        Ok(())
    } else {
        Err(Failure::Expectation {
            expression: expression.to_string(),
            value: format!("{value:?}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness_rules() {
        assert!(true.is_truthy());
        assert!(!false.is_truthy());
        assert!(Some(0).is_truthy());
        assert!(!None::<i32>.is_truthy());
        assert!(json!(0).is_truthy());
        assert!(json!("").is_truthy());
        assert!(!json!(null).is_truthy());
        assert!(!json!(false).is_truthy());
    }

    #[test]
    fn test_expect_reports_expression_and_value() {
        let err = expect("x > 3", false).unwrap_err();
        assert_eq!(err.to_string(), "expected `x > 3` to be truthy, got false");
    }

    #[test]
    fn test_fixture_failure_names_the_binding() {
        let err = Failure::fixture("db", Failure::message("connection refused"));
        assert_eq!(err.to_string(), "fixture `db` failed: connection refused");
    }
}
