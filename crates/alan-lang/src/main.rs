//! CLI entry point for the `alan` Turing-machine runner.

use std::env;
use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::path::PathBuf;

use alan_core::{MachineConfig, NullSink, DEFAULT_TAPE_CAPACITY};
use alan_lang::{
    run_file_traced, Diagnostic, DiagnosticKind, Location, RunOptions, RunReport, TraceRenderer,
    DEFAULT_DIAGNOSTIC_CAPACITY,
};
#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use tempfile as _;
use thiserror as _;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const USAGE_TEXT: &str = "\
Usage: alan <source> <iterations> [options]

Runs a machine description for at most <iterations> steps and prints the
result tape as binary, as 8-bit text and as a binary fraction.

Options:
  -v, --verbose        Print every step with a view of the tape
  -t, --tape <cells>   Tape length in cells (default: 256)
  -h, --help           Show this help message

Environment:
  RUST_LOG             Log filter for internal diagnostics (default: error)

Examples:
  alan count.alan 100
  alan count.alan 20 --verbose
";

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    source: PathBuf,
    iterations: usize,
    verbose: bool,
    tape_cells: usize,
}

#[derive(Debug)]
enum ParseResult {
    Run(RunArgs),
    Help,
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut source: Option<PathBuf> = None;
    let mut iterations: Option<usize> = None;
    let mut verbose = false;
    let mut tape_cells = DEFAULT_TAPE_CAPACITY;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }

        if arg == "--verbose" || arg == "-v" {
            verbose = true;
            continue;
        }

        if arg == "--tape" || arg == "-t" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --tape".to_string())?;
            tape_cells = parse_count(&value, "tape length")?;
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if source.is_none() {
            source = Some(PathBuf::from(arg));
        } else if iterations.is_none() {
            iterations = Some(parse_count(&arg, "iteration count")?);
        } else {
            return Err(format!(
                "unexpected argument: {}",
                arg.to_string_lossy()
            ));
        }
    }

    let source = source.ok_or_else(|| "missing source file".to_string())?;
    let iterations = iterations.ok_or_else(|| "missing iteration count".to_string())?;
    Ok(ParseResult::Run(RunArgs {
        source,
        iterations,
        verbose,
        tape_cells,
    }))
}

fn parse_count(value: &OsStr, what: &str) -> Result<usize, String> {
    let text = value.to_string_lossy();
    text.parse::<usize>()
        .map_err(|_| format!("{what} must be a non-negative number, got '{text}'"))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &RunArgs) -> RunReport {
    let options = RunOptions {
        iterations: args.iterations,
        machine: MachineConfig {
            tape_capacity: args.tape_cells,
            tracing_enabled: args.verbose,
        },
        diagnostic_capacity: DEFAULT_DIAGNOSTIC_CAPACITY,
    };
    debug!(source = %args.source.display(), ?options, "running");

    if !args.verbose {
        return run_file_traced(&args.source, &options, &mut NullSink);
    }

    let mut renderer = TraceRenderer::new(io::stdout().lock());
    let report = run_file_traced(&args.source, &options, &mut renderer);
    if let Err(error) = renderer.finish().and_then(|mut out| out.flush()) {
        eprintln!("error: failed to write trace: {error}");
    }
    report
}

fn print_report(report: &RunReport) {
    for diagnostic in &report.diagnostics {
        eprintln!("{}", diagnostic.format_for_stderr());
    }
    if report.diagnostics.overflowed() {
        let total = report.diagnostics.error_count() + report.diagnostics.warning_count();
        eprintln!(
            "note: {} further diagnostics not shown",
            total - report.diagnostics.len()
        );
    }
    if let Some(result) = &report.result {
        println!("{result}");
    }
}

fn main() {
    init_logging();

    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Run(args)) => {
            let report = run(&args);
            print_report(&report);
            i32::from(report.has_errors())
        }
        Err(reason) => {
            let diagnostic = Diagnostic::new(
                DiagnosticKind::InvalidArgument { reason },
                Location::Argument,
            );
            eprintln!("{}", diagnostic.format_for_stderr());
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> impl Iterator<Item = OsString> {
        values
            .iter()
            .map(OsString::from)
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_positional_arguments() {
        let result = parse_args(args(&["count.alan", "12"])).expect("valid args should parse");
        let ParseResult::Run(run_args) = result else {
            panic!("expected a run command");
        };
        assert_eq!(
            run_args,
            RunArgs {
                source: PathBuf::from("count.alan"),
                iterations: 12,
                verbose: false,
                tape_cells: DEFAULT_TAPE_CAPACITY,
            }
        );
    }

    #[test]
    fn parses_flags_in_any_position() {
        let result = parse_args(args(&["-v", "count.alan", "--tape", "64", "3"]))
            .expect("flags should parse");
        let ParseResult::Run(run_args) = result else {
            panic!("expected a run command");
        };
        assert!(run_args.verbose);
        assert_eq!(run_args.tape_cells, 64);
        assert_eq!(run_args.iterations, 3);
    }

    #[test]
    fn parses_help_flag() {
        let result = parse_args(args(&["--help"])).expect("help should parse");
        assert!(matches!(result, ParseResult::Help));
    }

    #[test]
    fn missing_iteration_count_is_rejected() {
        let error = parse_args(args(&["count.alan"])).expect_err("count is required");
        assert!(error.contains("missing iteration count"));

        let error = parse_args(std::iter::empty()).expect_err("source is required");
        assert!(error.contains("missing source file"));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let error = parse_args(args(&["count.alan", "many"])).expect_err("not a number");
        assert!(error.contains("iteration count"));

        let error = parse_args(args(&["count.alan", "5", "-t"])).expect_err("missing tape value");
        assert!(error.contains("--tape"));
    }

    #[test]
    fn rejects_unknown_options_and_extra_arguments() {
        let error = parse_args(args(&["count.alan", "5", "--fast"])).expect_err("unknown option");
        assert!(error.contains("unknown option"));

        let error = parse_args(args(&["count.alan", "5", "6"])).expect_err("extra argument");
        assert!(error.contains("unexpected argument"));
    }
}
