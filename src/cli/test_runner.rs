//! Test runner implementation (pytest-style)
//!
//! ## Phases
//!
//! 1. **Collection**: selected registrations are realized into a plan. Realization errors become
//!    failed items instead of aborting the run.
//! 2. **Execution**: the plan is walked depth first. Every sequence activation evaluates its once
//!    fixtures exactly once. Every test case gets a fresh context: the once values of enclosing
//!    sequences, then enclosing per-test fixtures evaluated anew, then the case's own fixtures.
//!
//! ## I/O Boundaries
//!
//! Suite discovery and test execution are abstracted via traits in `test_interfaces.rs`, and all
//! output goes through a [`TestReporter`]. The runner itself never prints.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::ValueEnum;
use speclet_core::{Context, ContextEntry, Failure, FixtureValue, Lifecycle, Metadata, Node, Registry, Suite, Symbol, TestCase};

use super::reporters::TestReporter;
use super::test_interfaces::{
    DefaultSuiteDiscovery, DefaultTestExecutor, RunError, SuiteDiscovery, TestExecutor, catch_failure, panic_message,
};

/// Reporter selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// pytest-style console output
    #[default]
    #[value(alias = "pretty", alias = "terse")]
    Console,
    /// One JSON object per event
    Json,
}

/// Run options, usually built from the command line.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub verbose: bool,
    pub stop_on_fail: bool,
    pub filter: Option<String>,
    pub format: OutputFormat,
    pub color: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            stop_on_fail: false,
            filter: None,
            format: OutputFormat::Console,
            color: true,
        }
    }
}

/// Information about a collected test item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestInfo {
    /// Registration name of the top-level suite.
    pub suite: String,
    /// Docs of the enclosing sequences, outermost first.
    pub path: Vec<String>,
    pub doc: Option<String>,
    /// 1-based position among its siblings.
    pub index: usize,
    /// `file:line` of the declaration.
    pub location: Option<String>,
}

impl TestInfo {
    fn new(suite: &str, path: &[String], meta: &Metadata, index: usize) -> Self {
        Self {
            suite: suite.to_string(),
            path: path.to_vec(),
            doc: meta.doc().map(str::to_string),
            index,
            location: meta.location(),
        }
    }

    /// Display id: suite name, enclosing docs and the item doc joined by ` > `.
    pub fn id(&self) -> String {
        let leaf = self.doc.clone().unwrap_or_else(|| format!("#{}", self.index));
        let mut parts = Vec::with_capacity(self.path.len() + 2);
        parts.push(self.suite.as_str());
        parts.extend(self.path.iter().map(String::as_str));
        parts.push(&leaf);
        parts.join(" > ")
    }
}

/// Result of running a single test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    Passed(Duration),
    Failed(Duration, String),
    Pending,
}

/// Summary of test run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
    pub duration: Duration,
}

impl TestSummary {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

// ============================================================================
// Collection
// ============================================================================

enum Planned {
    Case { info: TestInfo, case: TestCase },
    Sequence(PlannedSequence),
    /// An empty pending sequence, reported as one pending item.
    Pending(TestInfo),
    Broken { info: TestInfo, error: RunError },
}

struct PlannedSequence {
    meta: Metadata,
    context: Vec<ContextEntry>,
    children: Vec<Planned>,
}

impl Planned {
    fn count(&self) -> usize {
        match self {
            Planned::Sequence(seq) => seq.children.iter().map(Planned::count).sum(),
            _ => 1,
        }
    }

    fn collect_infos<'a>(&'a self, out: &mut Vec<&'a TestInfo>) {
        match self {
            Planned::Case { info, .. } | Planned::Pending(info) | Planned::Broken { info, .. } => out.push(info),
            Planned::Sequence(seq) => seq.children.iter().for_each(|child| child.collect_infos(out)),
        }
    }
}

fn plan_suite(suite_name: &str, suite: &Suite, path: &[String], index: usize) -> Planned {
    let realized = catch_unwind(AssertUnwindSafe(|| suite.realize())).map_err(|payload| RunError::RealizePanic {
        suite: suite_name.to_string(),
        message: panic_message(&*payload),
    });
    let sequence = match realized {
        Ok(Ok(sequence)) => sequence,
        Ok(Err(source)) => {
            let error = RunError::Realize {
                suite: suite_name.to_string(),
                source,
            };
            return broken_suite(suite_name, path, index, error);
        }
        Err(error) => return broken_suite(suite_name, path, index, error),
    };

    let meta = sequence.metadata();
    if sequence.children().is_empty() && meta.pending() {
        return Planned::Pending(TestInfo::new(suite_name, path, meta, index));
    }

    let mut inner_path = path.to_vec();
    if let Some(doc) = meta.doc() {
        inner_path.push(doc.to_string());
    }
    let children = sequence
        .children()
        .iter()
        .enumerate()
        .map(|(i, node)| match node {
            Node::Case(case) => Planned::Case {
                info: TestInfo::new(suite_name, &inner_path, case.metadata(), i + 1),
                case: case.clone(),
            },
            Node::Suite(inner) => plan_suite(suite_name, inner, &inner_path, i + 1),
        })
        .collect();

    Planned::Sequence(PlannedSequence {
        meta: meta.clone(),
        context: sequence.context().to_vec(),
        children,
    })
}

fn broken_suite(suite_name: &str, path: &[String], index: usize, error: RunError) -> Planned {
    tracing::warn!(suite = suite_name, %error, "suite failed to realize");
    Planned::Broken {
        info: TestInfo {
            suite: suite_name.to_string(),
            path: path.to_vec(),
            doc: None,
            index,
            location: None,
        },
        error,
    }
}

fn collect(registry: &Registry, config: &RunConfig, discovery: &dyn SuiteDiscovery) -> Vec<Planned> {
    discovery
        .discover(registry, config.filter.as_deref())
        .into_iter()
        .map(|registration| plan_suite(registration.name().as_str(), registration.suite(), &[], 0))
        .collect()
}

/// Collect without running: every item a run would report, in run order.
pub fn list_tests(registry: &Registry, config: &RunConfig) -> Vec<TestInfo> {
    let plans = collect(registry, config, &DefaultSuiteDiscovery);
    let mut infos = Vec::new();
    plans.iter().for_each(|plan| plan.collect_infos(&mut infos));
    infos.into_iter().cloned().collect()
}

// ============================================================================
// Execution
// ============================================================================

/// A binding visible to the test cases of an active sequence.
enum Frame {
    /// A once value, already evaluated.
    Ready(Symbol, FixtureValue),
    /// A per-test fixture, evaluated for each case.
    Fresh(ContextEntry),
    /// A once fixture that failed; every case below it fails with this error.
    Broken(RunError),
}

fn once_context(frames: &[Frame]) -> Result<Context, RunError> {
    let mut ctx = Context::new();
    for frame in frames {
        match frame {
            Frame::Ready(name, value) => ctx.bind(name.clone(), Arc::clone(value)),
            Frame::Fresh(_) => {}
            Frame::Broken(err) => return Err(err.clone()),
        }
    }
    Ok(ctx)
}

fn activate(frames: &mut Vec<Frame>, entries: &[ContextEntry]) {
    for entry in entries {
        let frame = match entry.lifecycle() {
            Lifecycle::PerTest => Frame::Fresh(entry.clone()),
            Lifecycle::Once => match once_context(frames) {
                Ok(ctx) => match catch_failure(|| entry.fixture().evaluate(&ctx)) {
                    Ok(value) => {
                        tracing::debug!(fixture = %entry.name(), "evaluated once fixture");
                        Frame::Ready(entry.name().clone(), value)
                    }
                    Err(source) => Frame::Broken(RunError::OnceFixture {
                        name: entry.name().to_string(),
                        source,
                    }),
                },
                Err(err) => Frame::Broken(err),
            },
        };
        frames.push(frame);
    }
}

/// The context of one test case. Per-test fixtures are evaluated here, inside the executor.
fn case_context(frames: &[Frame], case: &TestCase) -> Result<Context, Failure> {
    let mut ctx = Context::new();
    for frame in frames {
        match frame {
            Frame::Ready(name, value) => ctx.bind(name.clone(), Arc::clone(value)),
            Frame::Fresh(entry) => ctx.bind_entries(std::slice::from_ref(entry))?,
            Frame::Broken(err) => return Err(Failure::message(err.to_string())),
        }
    }
    ctx.bind_entries(case.context())?;
    Ok(ctx)
}

fn broken(frames: &[Frame]) -> Option<&RunError> {
    frames.iter().find_map(|frame| match frame {
        Frame::Broken(err) => Some(err),
        _ => None,
    })
}

struct Session<'a> {
    config: &'a RunConfig,
    executor: &'a dyn TestExecutor,
    reporter: &'a mut dyn TestReporter,
    summary: TestSummary,
    stopped: bool,
}

impl Session<'_> {
    fn run(&mut self, planned: &Planned, frames: &mut Vec<Frame>, pending: bool) {
        if self.stopped {
            return;
        }
        match planned {
            Planned::Case { info, case } => self.run_case(info, case, frames, pending),
            Planned::Pending(info) => self.report(info, TestResult::Pending),
            Planned::Broken { info, .. } if pending => self.report(info, TestResult::Pending),
            Planned::Broken { info, error } => self.report(info, TestResult::Failed(Duration::ZERO, error.render())),
            Planned::Sequence(seq) => {
                let pending = pending || seq.meta.pending();
                let mark = frames.len();
                if !pending {
                    activate(frames, &seq.context);
                }
                for child in &seq.children {
                    self.run(child, frames, pending);
                }
                frames.truncate(mark);
            }
        }
    }

    fn run_case(&mut self, info: &TestInfo, case: &TestCase, frames: &[Frame], pending: bool) {
        if pending || case.metadata().pending() {
            self.report(info, TestResult::Pending);
            return;
        }
        if let Some(err) = broken(frames) {
            self.report(info, TestResult::Failed(Duration::ZERO, err.render()));
            return;
        }

        self.reporter.on_test_start(info);
        let body = || case.run(&case_context(frames, case)?);
        let result = self.executor.execute(info, &body);
        self.complete(info, result);
    }

    fn report(&mut self, info: &TestInfo, result: TestResult) {
        self.reporter.on_test_start(info);
        self.complete(info, result);
    }

    fn complete(&mut self, info: &TestInfo, result: TestResult) {
        self.summary.total += 1;
        match &result {
            TestResult::Passed(_) => self.summary.passed += 1,
            TestResult::Failed(..) => {
                self.summary.failed += 1;
                self.stopped = self.config.stop_on_fail;
            }
            TestResult::Pending => self.summary.pending += 1,
        }
        self.reporter.on_test_complete(info, &result);
    }
}

/// Run every selected registration with the default discovery and executor.
pub fn run_registry(registry: &Registry, config: &RunConfig, reporter: &mut dyn TestReporter) -> TestSummary {
    run_with(registry, config, &DefaultSuiteDiscovery, &DefaultTestExecutor, reporter)
}

/// Run with explicit discovery and executor implementations.
#[tracing::instrument(skip_all, fields(registrations = registry.len(), filter = ?config.filter))]
pub fn run_with(
    registry: &Registry,
    config: &RunConfig,
    discovery: &dyn SuiteDiscovery,
    executor: &dyn TestExecutor,
    reporter: &mut dyn TestReporter,
) -> TestSummary {
    let start_time = Instant::now();

    let plans = collect(registry, config, discovery);
    reporter.on_collection_complete(plans.iter().map(Planned::count).sum());

    let mut session = Session {
        config,
        executor,
        reporter,
        summary: TestSummary::default(),
        stopped: false,
    };
    let mut frames = Vec::new();
    for plan in &plans {
        session.run(plan, &mut frames, false);
    }

    let mut summary = session.summary;
    summary.duration = start_time.elapsed();
    session.reporter.on_run_complete(&summary);
    tracing::debug!(passed = summary.passed, failed = summary.failed, pending = summary.pending, "run complete");
    summary
}
