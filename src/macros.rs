//! Declaration macros.
//!
//! Thin sugar over the builders of `speclet_core`: each macro captures the declaration site and
//! converts its arguments with `Arg::from`, so names, doc strings, attribute maps, binding lists,
//! nested declarations and expressions can be mixed freely.
//!
//! ```rust
//! use speclet::{Registry, describe, expr, it, sym, testing, using, bindings};
//!
//! let mut registry = Registry::new();
//! describe!(&mut registry, sym("inc"), "adds one",
//!     it!("to zero", expr!(0 + 1 == 1)),
//!     using!(bindings!(|ctx| x = 1_i64, y = *ctx.get::<i64>("x")? + 1),
//!         it!("sees both", expr!(|ctx| *ctx.get::<i64>("x")? + *ctx.get::<i64>("y")? == 3)),
//!     ),
//!     testing!("later"),
//! );
//! assert_eq!(registry.len(), 1);
//! ```

/// The declaration site of the invocation.
///
/// `site!(attrs)` attaches form-level metadata, merged below the explicit attribute map.
#[macro_export]
macro_rules! site {
    () => {
        $crate::DeclSite::new(file!(), line!(), column!(), module_path!())
    };
    ($meta:expr) => {
        $crate::site!().with_meta($meta)
    };
}

/// Register a suite: `describe!(&mut registry, args...)`.
///
/// The registry expression must be a `&mut Registry`. Any declaration macro accepts a leading
/// `meta = attrs;` to attach form-level metadata, which explicit attribute maps still override:
/// `describe!(&mut registry, meta = attrs!(tier = "slow"); "imports", ...)`.
#[macro_export]
macro_rules! describe {
    ($registry:expr, meta = $meta:expr; $($arg:expr),* $(,)?) => {
        $crate::describe($registry, $crate::site!($meta), move || ::std::vec![$($crate::Arg::from($arg)),*])
    };
    ($registry:expr $(, $arg:expr)* $(,)?) => {
        $crate::describe($registry, $crate::site!(), move || ::std::vec![$($crate::Arg::from($arg)),*])
    };
}

/// An anonymous suite. Its arguments are evaluated on every realization.
#[macro_export]
macro_rules! testing {
    (meta = $meta:expr; $($arg:expr),* $(,)?) => {
        $crate::testing($crate::site!($meta), move || ::std::vec![$($crate::Arg::from($arg)),*])
    };
    ($($arg:expr),* $(,)?) => {
        $crate::testing($crate::site!(), move || ::std::vec![$($crate::Arg::from($arg)),*])
    };
}

/// A test case with at most one expression.
#[macro_export]
macro_rules! it {
    (meta = $meta:expr; $($arg:expr),* $(,)?) => {
        $crate::it($crate::site!($meta), ::std::vec![$($crate::Arg::from($arg)),*])
    };
    ($($arg:expr),* $(,)?) => {
        $crate::it($crate::site!(), ::std::vec![$($crate::Arg::from($arg)),*])
    };
}

/// A test case running statements in order.
#[macro_export]
macro_rules! do_it {
    (meta = $meta:expr; $($arg:expr),* $(,)?) => {
        $crate::do_it($crate::site!($meta), ::std::vec![$($crate::Arg::from($arg)),*])
    };
    ($($arg:expr),* $(,)?) => {
        $crate::do_it($crate::site!(), ::std::vec![$($crate::Arg::from($arg)),*])
    };
}

/// A suite with per-test fixtures.
#[macro_export]
macro_rules! using {
    (meta = $meta:expr; $($arg:expr),* $(,)?) => {
        $crate::using($crate::site!($meta), ::std::vec![$($crate::Arg::from($arg)),*])
    };
    ($($arg:expr),* $(,)?) => {
        $crate::using($crate::site!(), ::std::vec![$($crate::Arg::from($arg)),*])
    };
}

/// A suite with fixtures evaluated once per activation.
#[macro_export]
macro_rules! using_once {
    (meta = $meta:expr; $($arg:expr),* $(,)?) => {
        $crate::using_once($crate::site!($meta), ::std::vec![$($crate::Arg::from($arg)),*])
    };
    ($($arg:expr),* $(,)?) => {
        $crate::using_once($crate::site!(), ::std::vec![$($crate::Arg::from($arg)),*])
    };
}

/// Evaluate a `bindings!` list now and splice the children built from it.
///
/// ```rust
/// use speclet::{bindings, expr, given, it};
///
/// let spliced = given!(bindings!(n = 5), |ctx| {
///     let n = *ctx.get::<i32>("n")?;
///     it!("n is 5", expr!(n == 5))
/// });
/// assert!(spliced.is_ok());
/// ```
#[macro_export]
macro_rules! given {
    ($bindings:expr, |$ctx:ident| $children:expr $(,)?) => {
        match $bindings {
            ::std::result::Result::Ok(bindings) => $crate::given(&bindings, |$ctx: &$crate::Context| {
                ::std::result::Result::Ok::<_, $crate::Failure>($children)
            }),
            ::std::result::Result::Err(err) => ::std::result::Result::Err(err),
        }
    };
}

/// A binding list: `bindings!(x = 1, y = 2)`, or `bindings!(|ctx| x = 1, y = *ctx.get::<i32>("x")? + 1)`
/// when later expressions read earlier names.
#[macro_export]
macro_rules! bindings {
    (|$ctx:ident| $($name:ident = $value:expr),+ $(,)?) => {
        $crate::Bindings::try_from_pairs(::std::vec![
            $((
                stringify!($name),
                $crate::Fixture::new(move |$ctx: &$crate::Context| {
                    let _ = $ctx;
                    ::std::result::Result::Ok::<_, $crate::Failure>($value)
                }),
            )),+
        ])
    };
    ($($name:ident = $value:expr),+ $(,)?) => {
        $crate::Bindings::try_from_pairs(::std::vec![
            $((
                stringify!($name),
                $crate::Fixture::new(move |_: &$crate::Context| ::std::result::Result::Ok::<_, $crate::Failure>($value)),
            )),+
        ])
    };
}

/// An expression checked with `expect`: `expr!(a == b)` or `expr!(|ctx| ...)`.
#[macro_export]
macro_rules! expr {
    (|$ctx:ident| $body:expr) => {
        $crate::Expr::new(stringify!($body), move |$ctx: &$crate::Context| {
            ::std::result::Result::Ok::<_, $crate::Failure>($body)
        })
    };
    ($body:expr) => {
        $crate::Expr::new(stringify!($body), move |_: &$crate::Context| {
            ::std::result::Result::Ok::<_, $crate::Failure>($body)
        })
    };
}

/// A `do_it` statement. It evaluates to `()` or to a `Result<_, Failure>`; an `Err` fails the test.
#[macro_export]
macro_rules! stmt {
    (|$ctx:ident| $body:expr) => {
        $crate::Stmt::new(move |$ctx: &$crate::Context| -> ::std::result::Result<(), $crate::Failure> {
            $crate::Outcome::into_outcome($body)
        })
    };
    ($body:expr) => {
        $crate::Stmt::new(move |_: &$crate::Context| -> ::std::result::Result<(), $crate::Failure> {
            $crate::Outcome::into_outcome($body)
        })
    };
}

/// An attribute map: `attrs!(slow = true, pending = "waiting on fixtures")`.
#[macro_export]
macro_rules! attrs {
    ($($key:ident = $value:expr),* $(,)?) => {
        $crate::Attributes::new()$(.with(stringify!($key), $value))*
    };
}
