//! Test reporters
//!
//! The runner uses a [`TestReporter`] to separate reporting from execution. Custom output formats
//! (TAP, JUnit, ...) implement the trait.
//!
//! Output errors are ignored: a closed pipe must not change test outcomes.

use std::io::Write;

use serde_json::{Value, json};

use super::test_runner::{TestInfo, TestResult, TestSummary};

/// Trait for reporting test execution results.
pub trait TestReporter {
    /// Called when collection is complete
    fn on_collection_complete(&mut self, test_count: usize);

    /// Called when a test item begins
    fn on_test_start(&mut self, _test: &TestInfo) {}

    /// Called when a test item completes
    fn on_test_complete(&mut self, test: &TestInfo, result: &TestResult);

    /// Called when all tests have completed
    fn on_run_complete(&mut self, summary: &TestSummary);
}

const GREEN: &str = "32";
const RED: &str = "31";
const YELLOW: &str = "33";
const BOLD: &str = "1";
const BOLD_RED: &str = "1;31";
const BOLD_GREEN: &str = "1;32";

/// Default console reporter (pytest-style)
pub struct ConsoleReporter<W: Write> {
    out: W,
    verbose: bool,
    color: bool,
    failures: Vec<(TestInfo, String)>,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, verbose: bool, color: bool) -> Self {
        Self {
            out,
            verbose,
            color,
            failures: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

impl<W: Write> TestReporter for ConsoleReporter<W> {
    fn on_collection_complete(&mut self, test_count: usize) {
        let header = self.paint(BOLD, "=================== test session starts ===================");
        let _ = writeln!(self.out, "{header}");
        let _ = writeln!(self.out, "collected {test_count} item(s)");
        let _ = writeln!(self.out);
    }

    fn on_test_start(&mut self, test: &TestInfo) {
        if self.verbose {
            let _ = write!(self.out, "{} ... ", test.id());
        }
    }

    fn on_test_complete(&mut self, test: &TestInfo, result: &TestResult) {
        let status = match (result, self.verbose) {
            (TestResult::Passed(d), true) => format!("{} ({}ms)", self.paint(GREEN, "PASSED"), d.as_millis()),
            (TestResult::Passed(_), false) => self.paint(GREEN, "."),
            (TestResult::Failed(d, _), true) => format!("{} ({}ms)", self.paint(RED, "FAILED"), d.as_millis()),
            (TestResult::Failed(..), false) => self.paint(RED, "F"),
            (TestResult::Pending, true) => self.paint(YELLOW, "PENDING"),
            (TestResult::Pending, false) => self.paint(YELLOW, "P"),
        };

        if self.verbose {
            let _ = writeln!(self.out, "{status}");
        } else {
            let _ = write!(self.out, "{status}");
        }

        if let TestResult::Failed(_, msg) = result {
            self.failures.push((test.clone(), msg.clone()));
        }
    }

    fn on_run_complete(&mut self, summary: &TestSummary) {
        if !self.verbose {
            let _ = writeln!(self.out);
        }

        if !self.failures.is_empty() {
            let _ = writeln!(self.out);
            let title = self.paint(BOLD_RED, "=================== FAILURES ===================");
            let _ = writeln!(self.out, "{title}");
            for (test, msg) in &self.failures {
                let _ = writeln!(self.out);
                let _ = writeln!(self.out, "___________ {} ___________", test.id());
                let _ = writeln!(self.out);
                for line in msg.lines() {
                    let _ = writeln!(self.out, "    {line}");
                }
                if let Some(location) = &test.location {
                    let _ = writeln!(self.out);
                    let _ = writeln!(self.out, "    {location}");
                }
            }
        }

        let mut parts = Vec::new();
        if summary.passed > 0 {
            parts.push(format!("{} passed", summary.passed));
        }
        if summary.failed > 0 {
            parts.push(format!("{} failed", summary.failed));
        }
        if summary.pending > 0 {
            parts.push(format!("{} pending", summary.pending));
        }
        if parts.is_empty() {
            parts.push("no tests ran".to_string());
        }

        let code = if summary.failed > 0 { BOLD_RED } else { BOLD_GREEN };
        let line = format!(
            "=================== {} in {:.2}s ===================",
            parts.join(", "),
            summary.duration.as_secs_f64()
        );
        let _ = writeln!(self.out);
        let line = self.paint(code, &line);
        let _ = writeln!(self.out, "{line}");
    }
}

/// Machine-readable reporter: one JSON object per line and event.
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: Value) {
        let _ = writeln!(self.out, "{event}");
    }
}

impl<W: Write> TestReporter for JsonReporter<W> {
    fn on_collection_complete(&mut self, test_count: usize) {
        self.emit(json!({ "event": "collected", "count": test_count }));
    }

    fn on_test_start(&mut self, test: &TestInfo) {
        self.emit(json!({ "event": "started", "test": test.id() }));
    }

    fn on_test_complete(&mut self, test: &TestInfo, result: &TestResult) {
        let mut event = json!({
            "test": test.id(),
            "suite": test.suite,
            "location": test.location,
        });
        let fields = match result {
            TestResult::Passed(d) => json!({ "event": "passed", "duration_ms": d.as_millis() as u64 }),
            TestResult::Failed(d, msg) => json!({
                "event": "failed",
                "duration_ms": d.as_millis() as u64,
                "message": msg,
            }),
            TestResult::Pending => json!({ "event": "pending" }),
        };
        if let (Some(event), Value::Object(fields)) = (event.as_object_mut(), fields) {
            event.extend(fields);
        }
        self.emit(event);
    }

    fn on_run_complete(&mut self, summary: &TestSummary) {
        self.emit(json!({
            "event": "summary",
            "total": summary.total,
            "passed": summary.passed,
            "failed": summary.failed,
            "pending": summary.pending,
            "duration_ms": summary.duration.as_millis() as u64,
        }));
    }
}
