//! CLI module for speclet test targets
//!
//! A test target declared with `harness = false` builds a [`Registry`] and hands it to [`run`], which
//! parses the command line that `cargo test` passes through and runs the selected suites.
//!
//! ## Options
//!
//! - `[FILTER]` / `-k EXPR` - Run only suites whose name or doc contains the keyword
//! - `-v, --verbose` - One line per test
//! - `-x, --exitfirst` - Stop on first failure
//! - `--format console|json` - Reporter
//! - `--no-color` - Plain console output
//! - `--list` - List test items without running them
//!
//! Flags meant for the libtest harness (`--nocapture`, `--test-threads`, ...) are accepted and ignored.
//!
//! ## Modules
//!
//! - `test_runner` - Collection and execution
//! - `test_interfaces` - Discovery and executor traits
//! - `reporters` - Console and JSON reporters
//!
//! ## Design
//!
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod reporters;
pub mod test_interfaces;
pub mod test_runner;

use std::io::{self, Write};
use std::process;

use clap::Parser;
use speclet_core::Registry;
use thiserror::Error;

use crate::version::SPECLET_VERSION;
use reporters::{ConsoleReporter, JsonReporter, TestReporter};
use test_runner::{OutputFormat, RunConfig, list_tests, run_registry};

// ============================================================================
// Run outcome
// ============================================================================

/// Process exit status of a test target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Why [`execute`] did not succeed.
#[derive(Debug, Error)]
pub enum CliError {
    /// At least one item failed. The reporter has already shown which.
    #[error("test run failed")]
    TestsFailed,

    #[error("could not write the test list: {0}")]
    Output(#[from] io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::FAILURE
    }
}

pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Run speclet suites
#[derive(Parser, Debug)]
#[command(name = "speclet")]
#[command(version = SPECLET_VERSION)]
#[command(about = "Run speclet suites", long_about = None)]
#[command(ignore_errors = true)]
pub struct Cli {
    /// Keyword filter (what `cargo test <FILTER>` passes)
    #[arg(value_name = "FILTER")]
    pub positional_filter: Option<String>,

    /// Filter suites by keyword expression
    #[arg(short = 'k', value_name = "EXPR")]
    pub filter: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Stop on first failure
    #[arg(short = 'x', long = "exitfirst")]
    pub stop_on_fail: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    pub format: OutputFormat,

    /// Disable ANSI colours
    #[arg(long)]
    pub no_color: bool,

    /// List test items without running them
    #[arg(long)]
    pub list: bool,

    // libtest flags, accepted for `cargo test` compatibility
    #[arg(long, hide = true)]
    pub nocapture: bool,
    #[arg(long, hide = true)]
    pub show_output: bool,
    #[arg(long, hide = true, value_name = "N")]
    pub test_threads: Option<String>,
    #[arg(long, hide = true)]
    pub exact: bool,
    #[arg(short = 'q', long, hide = true)]
    pub quiet: bool,
    #[arg(long, hide = true)]
    pub ignored: bool,
    #[arg(long, hide = true)]
    pub include_ignored: bool,
}

impl Cli {
    /// The run configuration these arguments describe. `-k` wins over the positional filter.
    pub fn config(&self) -> RunConfig {
        RunConfig {
            verbose: self.verbose,
            stop_on_fail: self.stop_on_fail,
            filter: self.filter.clone().or_else(|| self.positional_filter.clone()),
            format: self.format,
            color: !self.no_color,
        }
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main entry point for a `harness = false` test target.
///
/// This is the only place where `process::exit` is called.
pub fn run(registry: &Registry) {
    init_logging();
    let cli = Cli::parse();
    let stdout = io::stdout();

    match execute(cli, registry, &mut stdout.lock()) {
        Ok(ExitCode::SUCCESS) => {}
        Ok(code) => process::exit(code.0),
        Err(CliError::TestsFailed) => process::exit(ExitCode::FAILURE.0),
        Err(e) => {
            eprintln!("{e}");
            process::exit(e.exit_code().0);
        }
    }
}

/// Initialize structured logging with an env-based filter, defaulting to `warn`.
///
/// Repeated calls are harmless.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .try_init();
}

/// Execute the parsed command line against `registry`, writing reports to `out`.
pub fn execute(cli: Cli, registry: &Registry, out: &mut dyn Write) -> CliResult<ExitCode> {
    let config = cli.config();

    if cli.list {
        let tests = list_tests(registry, &config);
        for test in &tests {
            writeln!(out, "{}: test", test.id())?;
        }
        writeln!(out, "\n{} test(s)", tests.len())?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut reporter: Box<dyn TestReporter + '_> = match config.format {
        OutputFormat::Console => Box::new(ConsoleReporter::new(&mut *out, config.verbose, config.color)),
        OutputFormat::Json => Box::new(JsonReporter::new(&mut *out)),
    };
    let summary = run_registry(registry, &config, reporter.as_mut());

    if summary.success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Err(CliError::TestsFailed)
    }
}

// ============================================================================
// Tests
// ============================================================================
