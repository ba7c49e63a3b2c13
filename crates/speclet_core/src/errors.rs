//! Declaration-time errors.
//!
//! These are caller errors in the shape of a declaration: they are raised while the tree is being
//! built (or while a deferred suite is realized), never while a test case executes.

use miette::Diagnostic;
use thiserror::Error;

use crate::failure::Failure;

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum DeclError {
    #[error("binding list has odd length {len}")]
    #[diagnostic(
        code(speclet::decl::odd_bindings),
        help("bindings alternate name, expression, name, expression, ...")
    )]
    OddBindings { len: usize },

    #[error("binding slot {index} must be a name")]
    #[diagnostic(code(speclet::decl::binding_name))]
    BindingName { index: usize },

    #[error("binding slot {index} must be an expression, found the name `{found}`")]
    #[diagnostic(code(speclet::decl::binding_expr))]
    BindingExpr { index: usize, found: String },

    #[error("duplicate binding name `{name}`")]
    #[diagnostic(
        code(speclet::decl::duplicate_binding),
        help("a nested `using` may shadow a name, but one binding list may bind it only once")
    )]
    DuplicateBinding { name: String },

    #[error("`{form}` got a {kind} at body position {position}")]
    #[diagnostic(
        code(speclet::decl::misplaced_argument),
        help("optional slots are read left to right: name, doc string, attributes, bindings")
    )]
    MisplacedArgument {
        form: &'static str,
        kind: &'static str,
        position: usize,
    },

    #[error("`{form}` cannot take a {kind} in its body")]
    #[diagnostic(code(speclet::decl::body_kind))]
    BodyKind { form: &'static str, kind: &'static str },

    #[error("`it` takes at most one expression, got {count}")]
    #[diagnostic(code(speclet::decl::too_many_expressions), help("use `do_it` for several statements"))]
    TooManyExpressions { count: usize },

    #[error("`given` bindings failed: {0}")]
    #[diagnostic(code(speclet::decl::given))]
    Given(Failure),
}
