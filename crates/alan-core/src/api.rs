//! Host-facing configuration, outcome and trace contracts for the machine.

use crate::program::{Branch, ConfigId};
use crate::tape::DEFAULT_TAPE_CAPACITY;
use crate::RuntimeFault;

/// Top-level immutable configuration for a machine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MachineConfig {
    /// Number of tape cells.
    pub tape_capacity: usize,
    /// Enables trace callback dispatch from [`crate::Machine::run`].
    pub tracing_enabled: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            tape_capacity: DEFAULT_TAPE_CAPACITY,
            tracing_enabled: false,
        }
    }
}

/// Execution state of a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to take the next transition.
    #[default]
    Running,
    /// A fault is latched and no further progress is possible.
    Faulted(RuntimeFault),
}

impl RunState {
    /// Returns the latched fault, if any.
    #[must_use]
    pub const fn latched_fault(self) -> Option<RuntimeFault> {
        match self {
            Self::Faulted(fault) => Some(fault),
            Self::Running => None,
        }
    }
}

/// Output status from one transition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum StepOutcome {
    /// A branch fired and its effects were committed.
    Transitioned {
        /// Configuration the branch belongs to.
        from: ConfigId,
        /// Index of the fired branch within `from`.
        branch: usize,
        /// Configuration entered after the step.
        to: ConfigId,
    },
    /// The step faulted; nothing was committed.
    Fault(RuntimeFault),
}

impl StepOutcome {
    /// Returns the fault carried by this outcome, if any.
    #[must_use]
    pub const fn fault(self) -> Option<RuntimeFault> {
        match self {
            Self::Fault(fault) => Some(fault),
            Self::Transitioned { .. } => None,
        }
    }
}

/// Aggregated outcome from running a bounded number of steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RunOutcome {
    /// Number of committed transitions during this run call.
    pub steps: usize,
    /// Last step-level status observed, `None` for an empty budget.
    pub final_step: Option<StepOutcome>,
}

impl RunOutcome {
    /// Returns the fault that ended the run early, if any.
    #[must_use]
    pub fn fault(&self) -> Option<RuntimeFault> {
        self.final_step.and_then(StepOutcome::fault)
    }
}

/// Trace events emitted at step boundaries when enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TraceEvent<'a> {
    /// A branch fired; reported after its effects were committed.
    BranchFired {
        /// Committed step number, starting at 1.
        step: usize,
        /// Configuration the branch belongs to.
        configuration: ConfigId,
        /// Name of `configuration`.
        name: &'a str,
        /// Name of the configuration entered after the step.
        next_name: &'a str,
        /// Index of the fired branch.
        branch_index: usize,
        /// The fired branch.
        branch: &'a Branch,
        /// Tape contents after the step.
        tape: &'a [char],
        /// Pointer after the step.
        pointer: usize,
        /// Highest pointer index touched so far.
        highest: usize,
    },
    /// A fault was raised.
    FaultRaised {
        /// The raised fault.
        fault: RuntimeFault,
    },
}

/// Sink trait for step trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: &TraceEvent<'_>);
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn on_event(&mut self, _event: &TraceEvent<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::{MachineConfig, RunOutcome, RunState, StepOutcome};
    use crate::program::ConfigId;
    use crate::tape::DEFAULT_TAPE_CAPACITY;
    use crate::{FaultCode, RuntimeFault};

    fn fault() -> RuntimeFault {
        RuntimeFault {
            code: FaultCode::NoMatchingBranch,
            configuration: ConfigId(0),
            line: 1,
            pointer: 0,
            symbol: ' ',
        }
    }

    #[test]
    fn default_machine_config_matches_contract() {
        let config = MachineConfig::default();
        assert_eq!(config.tape_capacity, DEFAULT_TAPE_CAPACITY);
        assert!(!config.tracing_enabled);
    }

    #[test]
    fn latched_fault_accessor_reports_only_faulted_variant() {
        assert_eq!(RunState::default(), RunState::Running);
        assert_eq!(RunState::Running.latched_fault(), None);
        assert_eq!(RunState::Faulted(fault()).latched_fault(), Some(fault()));
    }

    #[test]
    fn run_outcome_fault_reads_final_step() {
        let clean = RunOutcome {
            steps: 3,
            final_step: Some(StepOutcome::Transitioned {
                from: ConfigId(0),
                branch: 0,
                to: ConfigId(1),
            }),
        };
        assert!(clean.fault().is_none());

        let empty = RunOutcome {
            steps: 0,
            final_step: None,
        };
        assert!(empty.fault().is_none());

        let faulted = RunOutcome {
            steps: 1,
            final_step: Some(StepOutcome::Fault(fault())),
        };
        assert_eq!(faulted.fault(), Some(fault()));
    }
}
