//! Integration tests for `speclet_stdlib::testing`.
//!
//! These lock in the user-facing failure text a reporter prints for each helper.

use speclet_stdlib::{Failure, expect_eq, expect_false, expect_ne, fail};

#[test]
/// A failed equality shows both sides on their own lines.
fn expect_eq_message_lists_both_sides() {
    let err = expect_eq(vec![1, 2], vec![1, 3]).unwrap_err();
    assert_eq!(err.to_string(), "expected `left == right`\n  left:  [1, 2]\n  right: [1, 3]");
}

#[test]
fn expect_ne_fails_on_equal_values() {
    assert!(matches!(expect_ne(5, 5), Err(Failure::Comparison { .. })));
}

#[test]
fn expect_macro_keeps_the_source_text() {
    let name: Option<&str> = None;
    let err = speclet_stdlib::expect!(name).unwrap_err();
    assert_eq!(err.to_string(), "expected `name` to be truthy, got None");
}

#[test]
/// Helpers chain with `?` and stop at the first failure.
fn helpers_chain_with_question_mark() {
    fn body() -> Result<(), Failure> {
        expect_false(false)?;
        fail("stopped here")?;
        expect_eq(1, 2)
    }
    assert_eq!(body(), Err(Failure::message("stopped here")));
}
