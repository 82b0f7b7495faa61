//! Front end for the Alan Turing-machine language.
//!
//! Source text flows through [`parser::parse`] into the name-based
//! [`ir::Ir`], then through [`lower::lower`] into an
//! [`alan_core::Program`] the tape machine executes.

use tracing_subscriber as _;

/// Bounded diagnostic collection.
pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticKind, Diagnostics, Location, Severity, DEFAULT_DIAGNOSTIC_CAPACITY,
};
/// Name-based intermediate representation.
pub mod ir;
/// Line and field splitting.
pub mod lexer;
/// Lowering to the runtime form.
pub mod lower;
/// Configuration name table.
pub mod names;
/// Parser and validator.
pub mod parser;
/// Compile-and-run pipeline.
pub mod pipeline;
pub use pipeline::{
    compile, read_source, run_file_traced, run_source, run_source_traced, RunOptions, RunReport,
};
/// Step trace rendering.
pub mod trace;
pub use trace::TraceRenderer;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use tempfile as _;
