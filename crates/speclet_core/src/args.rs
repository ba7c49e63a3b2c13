//! Declaration arguments and the shared argument-parsing protocol.
//!
//! Every declaration form receives a flat list of [`Arg`]s. [`DeclArgs::parse`] classifies the list
//! strictly left to right:
//!
//! 1. a leading [`Arg::Symbol`] becomes the declaration name,
//! 2. then a leading [`Arg::Doc`] becomes the doc string,
//! 3. then a leading [`Arg::Attrs`] becomes the attribute map,
//! 4. then, for fixture-carrying forms only, a leading [`Arg::Bindings`] becomes the binding list,
//! 5. everything left is the body.
//!
//! ## Notes
//! - The classification is greedy, not a search: `(attrs, "doc")` leaves `"doc"` in the body, where it
//!   is rejected.
//! - A failed nested declaration travels as [`Arg::Error`] and surfaces as the error of the enclosing
//!   declaration.

use std::sync::Arc;

use crate::bindings::Bindings;
use crate::context::Context;
use crate::errors::DeclError;
use crate::failure::{Failure, Truthy, expect};
use crate::metadata::{Attributes, Symbol, join_doc};
use crate::tree::{Node, Suite, TestCase};

type Check = dyn Fn(&Context) -> Result<(), Failure> + Send + Sync;

/// A single expression evaluated through `expect`, remembered with its source text.
#[derive(Clone)]
pub struct Expr {
    source: String,
    check: Arc<Check>,
}

impl Expr {
    pub fn new<T, F>(source: impl Into<String>, eval: F) -> Self
    where
        T: Truthy,
        F: Fn(&Context) -> Result<T, Failure> + Send + Sync + 'static,
    {
        let source = source.into();
        let text = source.clone();
        Self {
            source,
            check: Arc::new(move |ctx: &Context| expect(&text, eval(ctx)?)),
        }
    }

    /// A literal truth value.
    pub fn constant(value: bool) -> Self {
        Self::new(value.to_string(), move |_| Ok(value))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate and assert truthiness.
    pub fn check(&self, ctx: &Context) -> Result<(), Failure> {
        (self.check)(ctx)
    }
}

impl std::fmt::Debug for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Expr").field(&self.source).finish()
    }
}

/// A statement of a `do_it` body. Its return value is ignored.
#[derive(Clone)]
pub struct Stmt {
    run: Arc<Check>,
}

impl Stmt {
    pub fn new<R, F>(run: F) -> Self
    where
        F: Fn(&Context) -> Result<R, Failure> + Send + Sync + 'static,
    {
        Self {
            run: Arc::new(move |ctx: &Context| run(ctx).map(|_| ())),
        }
    }

    pub fn run(&self, ctx: &Context) -> Result<(), Failure> {
        (self.run)(ctx)
    }
}

impl std::fmt::Debug for Stmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Stmt(..)")
    }
}

/// What a statement may evaluate to: nothing, or a result whose error signals failure.
pub trait Outcome {
    fn into_outcome(self) -> Result<(), Failure>;
}

impl Outcome for () {
    fn into_outcome(self) -> Result<(), Failure> {
        Ok(())
    }
}

impl<T> Outcome for Result<T, Failure> {
    fn into_outcome(self) -> Result<(), Failure> {
        self.map(|_| ())
    }
}

impl From<Expr> for Stmt {
    fn from(expr: Expr) -> Self {
        Self { run: expr.check }
    }
}

/// One argument of a declaration form.
#[derive(Debug, Clone)]
pub enum Arg {
    Symbol(Symbol),
    Doc(String),
    Attrs(Attributes),
    Bindings(Bindings),
    Node(Node),
    /// Nested children, flattened in place.
    List(Vec<Arg>),
    Expr(Expr),
    Stmt(Stmt),
    /// An absent child; dropped.
    Nil,
    Error(DeclError),
}

impl Arg {
    fn kind(&self) -> &'static str {
        match self {
            Arg::Symbol(_) => "symbol",
            Arg::Doc(_) => "doc string",
            Arg::Attrs(_) => "attribute map",
            Arg::Bindings(_) => "binding list",
            Arg::Node(Node::Suite(_)) => "suite",
            Arg::Node(Node::Case(_)) => "test case",
            Arg::List(_) => "list",
            Arg::Expr(_) => "expression",
            Arg::Stmt(_) => "statement",
            Arg::Nil => "nil",
            Arg::Error(_) => "error",
        }
    }

    fn first_error(args: &[Arg]) -> Option<&DeclError> {
        args.iter().find_map(|arg| match arg {
            Arg::Error(err) => Some(err),
            Arg::List(items) => Arg::first_error(items),
            _ => None,
        })
    }
}

impl From<Symbol> for Arg {
    fn from(symbol: Symbol) -> Self {
        Arg::Symbol(symbol)
    }
}

impl From<&str> for Arg {
    fn from(doc: &str) -> Self {
        Arg::Doc(doc.to_string())
    }
}

impl From<String> for Arg {
    fn from(doc: String) -> Self {
        Arg::Doc(doc)
    }
}

impl From<Attributes> for Arg {
    fn from(attributes: Attributes) -> Self {
        Arg::Attrs(attributes)
    }
}

impl From<Bindings> for Arg {
    fn from(bindings: Bindings) -> Self {
        Arg::Bindings(bindings)
    }
}

impl From<Node> for Arg {
    fn from(node: Node) -> Self {
        Arg::Node(node)
    }
}

impl From<Suite> for Arg {
    fn from(suite: Suite) -> Self {
        Arg::Node(Node::Suite(suite))
    }
}

impl From<TestCase> for Arg {
    fn from(case: TestCase) -> Self {
        Arg::Node(Node::Case(case))
    }
}

impl From<Expr> for Arg {
    fn from(expr: Expr) -> Self {
        Arg::Expr(expr)
    }
}

impl From<Stmt> for Arg {
    fn from(stmt: Stmt) -> Self {
        Arg::Stmt(stmt)
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Expr(Expr::constant(value))
    }
}

impl From<DeclError> for Arg {
    fn from(err: DeclError) -> Self {
        Arg::Error(err)
    }
}

impl<T: Into<Arg>> From<Vec<T>> for Arg {
    fn from(items: Vec<T>) -> Self {
        Arg::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(item: Option<T>) -> Self {
        item.map_or(Arg::Nil, Into::into)
    }
}

impl<T: Into<Arg>> From<Result<T, DeclError>> for Arg {
    fn from(result: Result<T, DeclError>) -> Self {
        result.map_or_else(Arg::Error, Into::into)
    }
}

/// Which optional slots a form reads before its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slots {
    Plain,
    WithBindings,
}

/// A parsed declaration.
#[derive(Debug, Clone, Default)]
pub struct DeclArgs {
    pub symbol: Option<Symbol>,
    pub doc: Option<String>,
    pub attributes: Option<Attributes>,
    pub bindings: Option<Bindings>,
    pub body: Vec<Arg>,
}

impl DeclArgs {
    /// Classify `args` for the form named `form`.
    ///
    /// ## Errors
    /// - The first [`Arg::Error`] found anywhere in `args`, unchanged.
    pub fn parse(form: &'static str, args: Vec<Arg>, slots: Slots) -> Result<Self, DeclError> {
        if let Some(err) = Arg::first_error(&args) {
            return Err(err.clone());
        }
        tracing::trace!(form, arg_count = args.len(), "parsing declaration");

        let mut rest = args.into_iter().peekable();
        let symbol = match rest.next_if(|arg| matches!(arg, Arg::Symbol(_))) {
            Some(Arg::Symbol(symbol)) => Some(symbol),
            _ => None,
        };
        let doc = match rest.next_if(|arg| matches!(arg, Arg::Doc(_))) {
            Some(Arg::Doc(doc)) => Some(doc),
            _ => None,
        };
        let attributes = match rest.next_if(|arg| matches!(arg, Arg::Attrs(_))) {
            Some(Arg::Attrs(attributes)) => Some(attributes),
            _ => None,
        };
        let bindings = match slots {
            Slots::WithBindings => match rest.next_if(|arg| matches!(arg, Arg::Bindings(_))) {
                Some(Arg::Bindings(bindings)) => Some(bindings),
                _ => None,
            },
            Slots::Plain => None,
        };

        Ok(Self {
            symbol,
            doc,
            attributes,
            bindings,
            body: rest.collect(),
        })
    }

    /// The declaration symbol and doc string joined (see [`join_doc`]).
    pub fn joined_doc(&self) -> Option<String> {
        join_doc(self.symbol.as_ref(), self.doc.as_deref())
    }
}

/// Flatten a suite body into child nodes, dropping nils.
pub(crate) fn flatten_children(form: &'static str, body: Vec<Arg>) -> Result<Vec<Node>, DeclError> {
    leaves(body)?
        .into_iter()
        .enumerate()
        .map(|(position, arg)| match arg {
            Arg::Node(node) => Ok(node),
            other => Err(reject(form, &other, position)),
        })
        .collect()
}

/// Flatten a `do_it` body into statements. Expressions are accepted as statements.
pub(crate) fn flatten_statements(form: &'static str, body: Vec<Arg>) -> Result<Vec<Stmt>, DeclError> {
    leaves(body)?
        .into_iter()
        .enumerate()
        .map(|(position, arg)| match arg {
            Arg::Stmt(stmt) => Ok(stmt),
            Arg::Expr(expr) => Ok(expr.into()),
            other => Err(reject(form, &other, position)),
        })
        .collect()
}

/// Flatten an `it` body into expressions.
pub(crate) fn flatten_expressions(form: &'static str, body: Vec<Arg>) -> Result<Vec<Expr>, DeclError> {
    leaves(body)?
        .into_iter()
        .enumerate()
        .map(|(position, arg)| match arg {
            Arg::Expr(expr) => Ok(expr),
            other => Err(reject(form, &other, position)),
        })
        .collect()
}

/// Recursive, order-preserving flattening of nested lists; nils are dropped.
fn leaves(body: Vec<Arg>) -> Result<Vec<Arg>, DeclError> {
    fn walk(body: Vec<Arg>, out: &mut Vec<Arg>) -> Result<(), DeclError> {
        for arg in body {
            match arg {
                Arg::Nil => {}
                Arg::List(items) => walk(items, out)?,
                Arg::Error(err) => return Err(err),
                leaf => out.push(leaf),
            }
        }
        Ok(())
    }

    let mut out = Vec::with_capacity(body.len());
    walk(body, &mut out)?;
    Ok(out)
}

fn reject(form: &'static str, arg: &Arg, position: usize) -> DeclError {
    match arg {
        Arg::Symbol(_) | Arg::Doc(_) | Arg::Attrs(_) | Arg::Bindings(_) => DeclError::MisplacedArgument {
            form,
            kind: arg.kind(),
            position,
        },
        _ => DeclError::BodyKind { form, kind: arg.kind() },
    }
}
