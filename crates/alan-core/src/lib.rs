//! Core tape machine for the Alan Turing-machine language.

/// Resolved, index-addressed program form.
pub mod program;
pub use program::{Branch, ConfigId, Configuration, Matcher, Operation, PrintPayload, Program};

/// Fixed-capacity tape storage.
pub mod tape;
pub use tape::{offset_pointer, Tape, BLANK, DEFAULT_TAPE_CAPACITY};

/// Runtime fault taxonomy.
pub mod fault;
pub use fault::{FaultCode, RuntimeFault};

/// Public host-facing configuration, outcome and trace contracts.
pub mod api;
pub use api::{
    MachineConfig, NullSink, RunOutcome, RunState, StepOutcome, TraceEvent, TraceSink,
};

/// Transition execution pipeline.
pub mod machine;
pub use machine::{execute_branch, Machine, PendingStep, SEQUENCE_STRIDE};

/// Result extraction and the raw, text and numeric interpretations.
pub mod decode;
pub use decode::{
    binary_digits, decode_fraction, decode_text, extract_result, skip_filler, DecodedResult,
    BITS_PER_CHAR, LEADING_FILLER,
};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
