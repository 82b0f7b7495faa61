//! End-to-end pipeline: parse, validate, lower, execute and decode.
//!
//! Execution is gated on the absence of errors. Runtime faults end the run
//! early and are reported as diagnostics; the tape is decoded either way.

use std::fs;
use std::path::Path;

use alan_core::{
    DecodedResult, FaultCode, Machine, MachineConfig, NullSink, Program, RuntimeFault, TraceSink,
};
use tracing::debug;

use crate::diagnostics::{DiagnosticKind, Diagnostics, Location, DEFAULT_DIAGNOSTIC_CAPACITY};
use crate::lower::lower;
use crate::parser::parse;

/// Settings for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Maximum number of transitions.
    pub iterations: usize,
    /// Machine configuration.
    pub machine: MachineConfig,
    /// Maximum number of retained diagnostics.
    pub diagnostic_capacity: usize,
}

impl RunOptions {
    /// Options running `iterations` steps with default settings.
    #[must_use]
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            machine: MachineConfig::default(),
            diagnostic_capacity: DEFAULT_DIAGNOSTIC_CAPACITY,
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Diagnostics from every phase.
    pub diagnostics: Diagnostics,
    /// Committed transitions; zero when the program never ran.
    pub steps: usize,
    /// Configuration the machine ended in.
    pub final_configuration: Option<String>,
    /// Decoded tape, present whenever the machine ran.
    pub result: Option<DecodedResult>,
    /// Fault that ended the run early.
    pub fault: Option<RuntimeFault>,
}

impl RunReport {
    const fn not_run(diagnostics: Diagnostics) -> Self {
        Self {
            diagnostics,
            steps: 0,
            final_configuration: None,
            result: None,
            fault: None,
        }
    }

    /// Returns true when any error was recorded.
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Parses, validates and lowers `source`.
///
/// Returns `None` when `diagnostics` holds any error after parsing,
/// including errors recorded before the call.
pub fn compile(source: &str, diagnostics: &mut Diagnostics) -> Option<Program> {
    let ir = parse(source, diagnostics);
    if diagnostics.has_errors() {
        debug!(errors = diagnostics.error_count(), "compilation blocked");
        return None;
    }
    Some(lower(&ir))
}

/// Reads a source file, reporting a file-level diagnostic on failure.
pub fn read_source(path: &Path, diagnostics: &mut Diagnostics) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(source) => Some(source),
        Err(error) => {
            diagnostics.report(
                DiagnosticKind::SourceUnreadable {
                    path: path.display().to_string(),
                    reason: error.to_string(),
                },
                Location::File,
            );
            None
        }
    }
}

/// Compiles and runs `source` without a trace.
#[must_use]
pub fn run_source(source: &str, options: &RunOptions) -> RunReport {
    run_source_traced(source, options, &mut NullSink)
}

/// Compiles and runs `source`, reporting every step to `sink` when
/// [`MachineConfig::tracing_enabled`] is set.
pub fn run_source_traced(
    source: &str,
    options: &RunOptions,
    sink: &mut dyn TraceSink,
) -> RunReport {
    let mut diagnostics = Diagnostics::with_capacity(options.diagnostic_capacity);
    check_options(options, &mut diagnostics);
    execute(source, options, diagnostics, sink)
}

/// Reads `path` and runs it, reporting every step to `sink` when
/// [`MachineConfig::tracing_enabled`] is set.
pub fn run_file_traced(path: &Path, options: &RunOptions, sink: &mut dyn TraceSink) -> RunReport {
    let mut diagnostics = Diagnostics::with_capacity(options.diagnostic_capacity);
    check_options(options, &mut diagnostics);
    match read_source(path, &mut diagnostics) {
        Some(source) => execute(&source, options, diagnostics, sink),
        None => RunReport::not_run(diagnostics),
    }
}

fn check_options(options: &RunOptions, diagnostics: &mut Diagnostics) {
    if options.iterations == 0 {
        diagnostics.report(
            DiagnosticKind::InvalidArgument {
                reason: "iteration count must be at least 1".into(),
            },
            Location::Argument,
        );
    }
    if options.machine.tape_capacity == 0 {
        diagnostics.report(
            DiagnosticKind::InvalidArgument {
                reason: "tape must have at least one cell".into(),
            },
            Location::Argument,
        );
    }
}

fn execute(
    source: &str,
    options: &RunOptions,
    mut diagnostics: Diagnostics,
    sink: &mut dyn TraceSink,
) -> RunReport {
    let Some(program) = compile(source, &mut diagnostics) else {
        return RunReport::not_run(diagnostics);
    };

    let mut machine = Machine::new(program, &options.machine);
    let outcome = machine.run(options.iterations, sink);
    let fault = outcome.fault();
    if let Some(fault) = fault {
        diagnostics.report_line(fault_diagnostic(&fault, machine.program()), fault.line);
    }

    let result = DecodedResult::from_tape(machine.tape().cells(), machine.highest());
    debug!(
        steps = outcome.steps,
        faulted = fault.is_some(),
        highest = machine.highest(),
        "run finished"
    );

    RunReport {
        diagnostics,
        steps: outcome.steps,
        final_configuration: machine.current_name().map(str::to_string),
        result: Some(result),
        fault,
    }
}

/// Converts a runtime fault into its diagnostic kind.
#[must_use]
pub fn fault_diagnostic(fault: &RuntimeFault, program: &Program) -> DiagnosticKind {
    let configuration = program
        .name_of(fault.configuration)
        .unwrap_or_default()
        .to_string();
    match fault.code {
        FaultCode::NoMatchingBranch => DiagnosticKind::NoMatchingBranchAtRuntime {
            configuration,
            symbol: fault.symbol,
            pointer: fault.pointer,
        },
        FaultCode::TapeBoundsExceeded => DiagnosticKind::TapeBoundsExceeded {
            configuration,
            pointer: fault.pointer,
        },
    }
}
