//! Test runner boundary interfaces
//!
//! This module defines trait-based abstractions for the two runner operations that touch user code:
//! - Suite discovery (picking registrations to run)
//! - Test execution (invoking a body and classifying its outcome)
//!
//! Default implementations are what `run_registry` uses. Tests swap them for recording fakes.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};
use speclet_core::{DeclError, Failure, Registration, Registry};
use thiserror::Error;

use super::test_runner::{TestInfo, TestResult};

/// Errors the runner reports in place of a test outcome.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum RunError {
    #[error("suite `{suite}` could not be realized")]
    #[diagnostic(code(speclet::run::realize))]
    Realize {
        suite: String,
        #[source]
        #[diagnostic_source]
        source: DeclError,
    },

    #[error("suite `{suite}` panicked while being realized: {message}")]
    #[diagnostic(
        code(speclet::run::realize_panic),
        help("declaration code inside `describe!`/`testing!` runs when the suite is realized")
    )]
    RealizePanic { suite: String, message: String },

    #[error("once fixture `{name}` failed: {source}")]
    #[diagnostic(
        code(speclet::run::once_fixture),
        help("every test case below the fixture's `using_once` fails with it")
    )]
    OnceFixture {
        name: String,
        #[source]
        source: Failure,
    },
}

impl RunError {
    /// Multi-line report with diagnostic codes, causes and help text, without colours.
    pub fn render(&self) -> String {
        let mut out = String::new();
        match GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor()).render_report(&mut out, self) {
            Ok(()) => out.trim_end().to_string(),
            Err(_) => self.to_string(),
        }
    }
}

// ============================================================================
// Suite Discovery Interface
// ============================================================================

/// Pick the registrations a run should visit.
pub trait SuiteDiscovery {
    fn discover<'r>(&self, registry: &'r Registry, filter: Option<&str>) -> Vec<&'r Registration>;
}

/// Keyword selection on registration name or suite doc.
pub struct DefaultSuiteDiscovery;

impl SuiteDiscovery for DefaultSuiteDiscovery {
    fn discover<'r>(&self, registry: &'r Registry, filter: Option<&str>) -> Vec<&'r Registration> {
        registry.select(filter)
    }
}

// ============================================================================
// Test Executor Interface
// ============================================================================

/// Execute one test body and classify the outcome.
///
/// Implementations must report `Ok` as passed and every `Err` or panic as failed. They never turn a
/// failure into a pass or into pending.
pub trait TestExecutor {
    fn execute(&self, test: &TestInfo, body: &dyn Fn() -> Result<(), Failure>) -> TestResult;
}

/// In-process execution with panic capture and timing.
pub struct DefaultTestExecutor;

impl TestExecutor for DefaultTestExecutor {
    fn execute(&self, test: &TestInfo, body: &dyn Fn() -> Result<(), Failure>) -> TestResult {
        let start = Instant::now();
        let outcome = catch_failure(body);
        let duration = start.elapsed();

        match outcome {
            Ok(()) => TestResult::Passed(duration),
            Err(failure) => {
                tracing::debug!(test = %test.id(), %failure, "test failed");
                TestResult::Failed(duration, failure.to_string())
            }
        }
    }
}

/// Run `f`, turning a panic into [`Failure::Panic`].
pub fn catch_failure<T>(f: impl FnOnce() -> Result<T, Failure>) -> Result<T, Failure> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| Err(Failure::Panic(panic_message(&*payload))))
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn info() -> TestInfo {
        TestInfo {
            suite: "interfaces::describe_1".into(),
            path: Vec::new(),
            doc: Some("body".into()),
            index: 1,
            location: None,
        }
    }

    #[test]
    fn test_executor_classifies_outcomes() {
        let executor = DefaultTestExecutor;
        assert!(matches!(executor.execute(&info(), &|| Ok(())), TestResult::Passed(_)));

        let failed = executor.execute(&info(), &|| Err(Failure::message("nope")));
        assert!(matches!(failed, TestResult::Failed(_, ref msg) if msg == "nope"));
    }

    #[test]
    fn test_panics_become_failures() {
        let result = catch_failure(|| -> Result<(), Failure> { panic!("exploded") });
        assert_eq!(result, Err(Failure::Panic("exploded".into())));

        let code = 7;
        let result = catch_failure(|| -> Result<(), Failure> { panic!("code {code}") });
        assert_eq!(result, Err(Failure::Panic("code 7".into())));
    }

    #[test]
    fn test_realize_panic_renders_the_payload() {
        let err = RunError::RealizePanic {
            suite: "math::describe_2".into(),
            message: "table missing".into(),
        };
        let rendered = err.render();

        assert!(rendered.contains("speclet::run::realize_panic"), "{rendered}");
        assert!(rendered.contains("table missing"), "{rendered}");
    }

    #[test]
    fn test_realize_error_renders_the_declaration_diagnostic() {
        let err = RunError::Realize {
            suite: "math::describe_1".into(),
            source: DeclError::TooManyExpressions { count: 2 },
        };
        let rendered = err.render();

        assert!(rendered.contains("speclet::run::realize"), "{rendered}");
        assert!(rendered.contains("suite `math::describe_1` could not be realized"), "{rendered}");
        assert!(rendered.contains("`it` takes at most one expression, got 2"), "{rendered}");
    }
}
