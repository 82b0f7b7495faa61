//! Diagnostic collection for every toolchain phase.
//!
//! Parsing, validation, argument handling and execution all report into one
//! bounded [`Diagnostics`] collector instead of stopping at the first problem.
//!
//! # Format
//!
//! Diagnostics format for stderr as:
//! ```text
//! line 3: error: branch is missing next configuration
//! file: error: cannot read source file 'prog.alan': No such file or directory
//! ```

use std::fmt;

use thiserror::Error;

/// Default number of diagnostics retained before overflow.
pub const DEFAULT_DIAGNOSTIC_CAPACITY: usize = 8;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Blocks execution.
    Error,
    /// Reported but does not block execution.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// Where a diagnostic applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    /// 1-indexed source line.
    Line(usize),
    /// A command-line or host argument.
    Argument,
    /// The source file as a whole.
    File,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(line) => write!(f, "line {line}"),
            Self::Argument => f.write_str("argument"),
            Self::File => f.write_str("file"),
        }
    }
}

/// Classification of diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagnosticKind {
    /// A header has an empty name, or a branch appears before any header.
    #[error("missing configuration name")]
    MissingConfigName,
    /// A configuration name uses characters outside `[a-z0-9 ]`.
    #[error("configuration name '{name}' must be all lower case")]
    IllegalConfigName {
        /// The offending name.
        name: String,
    },
    /// A configuration header repeats an already defined name.
    #[error("redefinition of configuration '{name}' (first defined at line {first_definition})")]
    RedefinedConfig {
        /// The repeated name.
        name: String,
        /// Line of the first definition.
        first_definition: usize,
    },
    /// A branch names a configuration that is never defined.
    #[error("configuration '{name}' is referenced but never defined")]
    UndefinedConfigReferenced {
        /// The undefined name.
        name: String,
    },
    /// Two branches of one configuration share a match specifier.
    #[error("branch for symbol '{specifier}' is already defined at line {first_definition}")]
    DuplicateMatchSpecifier {
        /// The repeated specifier as written.
        specifier: String,
        /// Line of the first branch with this specifier.
        first_definition: usize,
    },
    /// An `else` branch is followed by further branches.
    #[error("'else' branch of '{name}' is not the last branch; later branches never fire")]
    MisplacedElse {
        /// The configuration holding the branch.
        name: String,
    },
    /// A branch has no match specifier.
    #[error("branch is missing match symbol")]
    MissingMatchSpecifier,
    /// A literal specifier is longer than one symbol.
    #[error("match symbol '{specifier}' must be one symbol or one of none, any, else")]
    IllegalMatchSpecifier {
        /// The specifier as written.
        specifier: String,
    },
    /// A branch has no operation list.
    #[error("branch is missing operation list")]
    MissingOperationList,
    /// A branch has no next configuration.
    #[error("branch is missing next configuration")]
    MissingNextConfig,
    /// An operation token starts with an unknown letter.
    #[error("unknown operation '{token}'")]
    UnknownOperation {
        /// The token as written.
        token: String,
    },
    /// An operation token has a malformed parameter.
    #[error("malformed operation '{token}': {expected}")]
    OperationArityError {
        /// The token as written.
        token: String,
        /// What the operation accepts.
        expected: &'static str,
    },
    /// A branch has fields after the next configuration.
    #[error("unexpected field '{field}' after next configuration")]
    UnexpectedField {
        /// The first surplus field.
        field: String,
    },
    /// The source defines no configuration at all.
    #[error("no configuration defined")]
    EmptyProgram,
    /// The machine found no branch for the symbol under the pointer.
    #[error("no branch of '{configuration}' matches symbol '{symbol}' at cell {pointer}")]
    NoMatchingBranchAtRuntime {
        /// Configuration the machine was in.
        configuration: String,
        /// Symbol under the pointer.
        symbol: char,
        /// Pointer position.
        pointer: usize,
    },
    /// An operation moved the pointer off the tape.
    #[error("tape bounds exceeded in '{configuration}' moving from cell {pointer}")]
    TapeBoundsExceeded {
        /// Configuration the machine was in.
        configuration: String,
        /// Pointer position at the start of the step.
        pointer: usize,
    },
    /// The source file could not be read.
    #[error("cannot read source file '{path}': {reason}")]
    SourceUnreadable {
        /// Path as given.
        path: String,
        /// Underlying I/O error.
        reason: String,
    },
    /// A run argument is out of range or malformed.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What is wrong with the argument.
        reason: String,
    },
}

impl DiagnosticKind {
    /// Severity of this kind.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::MisplacedElse { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// One reported problem with its location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {severity}: {kind}")]
pub struct Diagnostic {
    /// Severity, derived from the kind.
    pub severity: Severity,
    /// What went wrong.
    pub kind: DiagnosticKind,
    /// Where it went wrong.
    pub location: Location,
}

impl Diagnostic {
    /// Creates a diagnostic with the kind's severity.
    #[must_use]
    pub const fn new(kind: DiagnosticKind, location: Location) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            location,
        }
    }

    /// Human-readable message without location or severity.
    #[must_use]
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Formats the diagnostic for stderr output.
    #[must_use]
    pub fn format_for_stderr(&self) -> String {
        self.to_string()
    }
}

/// Bounded diagnostic collector.
///
/// Once `capacity` diagnostics are stored, further ones are dropped and the
/// overflow flag is set. Error and warning counts include dropped entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    capacity: usize,
    overflowed: bool,
    error_count: usize,
    warning_count: usize,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_DIAGNOSTIC_CAPACITY)
    }
}

impl Diagnostics {
    /// Creates a collector with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collector retaining at most `capacity` diagnostics.
    #[must_use]
    pub const fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
            overflowed: false,
            error_count: 0,
            warning_count: 0,
        }
    }

    /// Records a diagnostic, dropping it when the collector is full.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }
        if self.entries.len() < self.capacity {
            self.entries.push(diagnostic);
        } else {
            self.overflowed = true;
        }
    }

    /// Records `kind` at `location`.
    pub fn report(&mut self, kind: DiagnosticKind, location: Location) {
        self.push(Diagnostic::new(kind, location));
    }

    /// Records `kind` on a source line.
    pub fn report_line(&mut self, kind: DiagnosticKind, line: usize) {
        self.report(kind, Location::Line(line));
    }

    /// Returns true when any error was recorded, retained or not.
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Number of errors recorded, including dropped ones.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.error_count
    }

    /// Number of warnings recorded, including dropped ones.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Returns true when at least one diagnostic was dropped.
    #[must_use]
    pub const fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Maximum number of retained diagnostics.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retained diagnostics in report order.
    #[must_use]
    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Iterates retained diagnostics in report order.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    /// Number of retained diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && !self.overflowed
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
