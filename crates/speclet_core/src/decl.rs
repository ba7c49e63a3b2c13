//! Declaration builders.
//!
//! Each builder takes the [`DeclSite`] of the declaration and its argument list, classifies the list
//! with [`DeclArgs::parse`], and produces one tree node with merged [`Metadata`].
//!
//! | Builder | Produces | Evaluated |
//! |---------|----------|-----------|
//! | [`describe`] | a registered [`Suite`] | lazily, on realization |
//! | [`testing`] | an anonymous [`Suite`] | lazily, on realization |
//! | [`it`] | a [`TestCase`] with at most one expression | eagerly |
//! | [`do_it`] | a [`TestCase`] with any number of statements | eagerly |
//! | [`using`] / [`using_once`] | a [`Suite`] carrying fixtures | eagerly |
//! | [`given`] | a spliced child list, no node | eagerly |

use crate::args::{Arg, DeclArgs, Slots, flatten_children, flatten_expressions, flatten_statements};
use crate::bindings::Bindings;
use crate::context::{Context, Lifecycle};
use crate::errors::DeclError;
use crate::failure::Failure;
use crate::inject::inject;
use crate::metadata::{DeclSite, Metadata};
use crate::registry::{Registry, SuiteName};
use crate::tree::{Suite, TestCase, TestSequence};

/// Declare a suite and register it under a generated name.
///
/// The thunk is not called here. Calling `describe` twice with the same arguments registers two
/// distinct suites.
pub fn describe<F>(registry: &mut Registry, site: DeclSite, thunk: F) -> SuiteName
where
    F: Fn() -> Vec<Arg> + Send + Sync + 'static,
{
    let suite = testing(site.clone(), thunk);
    registry.register(site, suite)
}

/// Declare an anonymous suite. The thunk runs each time the suite is realized.
pub fn testing<F>(site: DeclSite, thunk: F) -> Suite
where
    F: Fn() -> Vec<Arg> + Send + Sync + 'static,
{
    Suite::deferred(move || realize_testing(&site, thunk()))
}

#[tracing::instrument(level = "debug", skip_all, fields(site = %site))]
fn realize_testing(site: &DeclSite, args: Vec<Arg>) -> Result<TestSequence, DeclError> {
    let (sequence, _) = build_sequence("testing", site, args, Slots::Plain)?;
    Ok(sequence)
}

fn build_sequence(
    form: &'static str,
    site: &DeclSite,
    args: Vec<Arg>,
    slots: Slots,
) -> Result<(TestSequence, Option<Bindings>), DeclError> {
    let parsed = DeclArgs::parse(form, args, slots)?;
    let doc = parsed.joined_doc();
    let children = flatten_children(form, parsed.body)?;
    let meta = Metadata::merge(&children, site, doc, parsed.attributes.as_ref());
    Ok((TestSequence::new(meta, children), parsed.bindings))
}

/// Declare a test case checking one expression.
///
/// ## Errors
/// - [`DeclError::TooManyExpressions`] for more than one expression.
/// - Any error of [`DeclArgs::parse`] or a non-expression in the body.
pub fn it(site: DeclSite, args: Vec<Arg>) -> Result<TestCase, DeclError> {
    let parsed = DeclArgs::parse("it", args, Slots::Plain)?;
    let doc = parsed.joined_doc();
    let mut exprs = flatten_expressions("it", parsed.body)?;
    if exprs.len() > 1 {
        return Err(DeclError::TooManyExpressions { count: exprs.len() });
    }

    let meta = Metadata::merge(&exprs, &site, doc, parsed.attributes.as_ref());
    let expr = exprs.pop();
    Ok(TestCase::new(meta, move |ctx| match &expr {
        Some(expr) => expr.check(ctx),
        None => Ok(()),
    }))
}

/// Declare a test case running statements in order. Return values are ignored.
pub fn do_it(site: DeclSite, args: Vec<Arg>) -> Result<TestCase, DeclError> {
    let parsed = DeclArgs::parse("do_it", args, Slots::Plain)?;
    let doc = parsed.joined_doc();
    let stmts = flatten_statements("do_it", parsed.body)?;

    let meta = Metadata::merge(&stmts, &site, doc, parsed.attributes.as_ref());
    Ok(TestCase::new(meta, move |ctx| stmts.iter().try_for_each(|stmt| stmt.run(ctx))))
}

/// Declare a suite whose bindings are evaluated afresh for every test case below it.
pub fn using(site: DeclSite, args: Vec<Arg>) -> Result<Suite, DeclError> {
    fixture_suite("using", &site, args, Lifecycle::PerTest)
}

/// Declare a suite whose bindings are evaluated once per activation and shared below it.
pub fn using_once(site: DeclSite, args: Vec<Arg>) -> Result<Suite, DeclError> {
    fixture_suite("using_once", &site, args, Lifecycle::Once)
}

fn fixture_suite(form: &'static str, site: &DeclSite, args: Vec<Arg>, lifecycle: Lifecycle) -> Result<Suite, DeclError> {
    let (sequence, bindings) = build_sequence(form, site, args, Slots::WithBindings)?;
    let bindings = bindings.unwrap_or_default();
    tracing::debug!(form, site = %site, names = ?bindings.names(), "injecting fixtures");
    Ok(Suite::from_sequence(inject(sequence, &bindings, lifecycle)))
}

/// Evaluate `bindings` now and splice the children built from them into the enclosing body.
///
/// `given` creates no node and no metadata. The closure receives the evaluated context and usually
/// copies the values it needs into the expressions it builds.
///
/// ## Errors
/// - [`DeclError::Given`] when a binding (or the closure) fails.
pub fn given<F, R>(bindings: &Bindings, children: F) -> Result<Arg, DeclError>
where
    F: FnOnce(&Context) -> Result<R, Failure>,
    R: Into<Arg>,
{
    let ctx = bindings.evaluate(&Context::new()).map_err(DeclError::Given)?;
    let spliced = children(&ctx).map_err(DeclError::Given)?;
    Ok(Arg::List(vec![spliced.into()]))
}
