//! Transition execution for the tape machine.
//!
//! One step follows a fixed sequence:
//! 1. Read the symbol under the pointer
//! 2. Select the first branch of the current configuration accepting it
//! 3. Stage the branch's tape writes and pointer moves until a no-op
//! 4. Commit tape writes, pointer, highest index and next configuration
//!
//! Faults are precise: a faulting step commits nothing.

use tracing::{trace, warn};

use crate::api::{
    MachineConfig, NullSink, RunOutcome, RunState, StepOutcome, TraceEvent, TraceSink,
};
use crate::program::{Branch, ConfigId, Operation, PrintPayload, Program};
use crate::tape::{offset_pointer, Tape, BLANK};
use crate::{FaultCode, RuntimeFault};

/// Cells advanced after each symbol of a printed sequence.
pub const SEQUENCE_STRIDE: isize = 2;

/// Side effects of one branch, accumulated before commit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PendingStep {
    /// Tape writes in execution order.
    pub writes: Vec<(usize, char)>,
    /// Pointer after all operations.
    pub pointer: usize,
    /// Highest pointer index touched, including this step.
    pub highest: usize,
}

impl PendingStep {
    const fn new(pointer: usize, highest: usize) -> Self {
        Self {
            writes: Vec::new(),
            pointer,
            highest,
        }
    }

    fn write(&mut self, symbol: char, capacity: usize) -> Result<(), FaultCode> {
        if self.pointer >= capacity {
            return Err(FaultCode::TapeBoundsExceeded);
        }
        self.writes.push((self.pointer, symbol));
        Ok(())
    }

    fn move_by(&mut self, delta: isize, capacity: usize) -> Result<(), FaultCode> {
        self.pointer = offset_pointer(self.pointer, delta, capacity)?;
        self.highest = self.highest.max(self.pointer);
        Ok(())
    }
}

/// Stages the operations of `branch` starting at `pointer`.
///
/// # Errors
///
/// Returns [`FaultCode::TapeBoundsExceeded`] when an operation moves the
/// pointer off the tape or writes while the pointer is not on it.
pub fn execute_branch(
    branch: &Branch,
    pointer: usize,
    highest: usize,
    capacity: usize,
) -> Result<PendingStep, FaultCode> {
    let mut pending = PendingStep::new(pointer, highest);

    for operation in &branch.operations {
        match operation {
            Operation::NoOp => break,
            Operation::Print(PrintPayload::Symbol(symbol)) => pending.write(*symbol, capacity)?,
            Operation::Print(PrintPayload::Sequence(symbols)) => {
                for &symbol in symbols.iter() {
                    pending.write(symbol, capacity)?;
                    pending.move_by(SEQUENCE_STRIDE, capacity)?;
                }
            }
            Operation::Erase => pending.write(BLANK, capacity)?,
            Operation::MoveRight(count) => {
                pending.move_by(isize::from(*count), capacity)?;
            }
            Operation::MoveLeft(count) => {
                pending.move_by(-isize::from(*count), capacity)?;
            }
        }
    }

    Ok(pending)
}

/// A resolved program bound to its own tape and cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    program: Program,
    config: MachineConfig,
    tape: Tape,
    pointer: usize,
    current: ConfigId,
    highest: usize,
    steps: usize,
    run_state: RunState,
}

impl Machine {
    /// Creates a machine at the program's start configuration with a blank
    /// tape and the pointer on cell 0.
    #[must_use]
    pub fn new(program: Program, config: &MachineConfig) -> Self {
        let current = program.start;
        Self {
            program,
            config: *config,
            tape: Tape::new(config.tape_capacity),
            pointer: 0,
            current,
            highest: 0,
            steps: 0,
            run_state: RunState::Running,
        }
    }

    /// The program being executed.
    #[must_use]
    pub const fn program(&self) -> &Program {
        &self.program
    }

    /// Current tape contents.
    #[must_use]
    pub const fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Current pointer position.
    #[must_use]
    pub const fn pointer(&self) -> usize {
        self.pointer
    }

    /// Current configuration.
    #[must_use]
    pub const fn current(&self) -> ConfigId {
        self.current
    }

    /// Name of the current configuration.
    #[must_use]
    pub fn current_name(&self) -> Option<&str> {
        self.program.name_of(self.current)
    }

    /// Highest pointer index touched so far.
    #[must_use]
    pub const fn highest(&self) -> usize {
        self.highest
    }

    /// Number of committed transitions.
    #[must_use]
    pub const fn steps(&self) -> usize {
        self.steps
    }

    /// Current run state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Performs one transition without tracing.
    pub fn step(&mut self) -> StepOutcome {
        self.step_with(&mut NullSink)
    }

    /// Runs up to `iterations` transitions, stopping early on a fault.
    ///
    /// Tracing is dispatched only when [`MachineConfig::tracing_enabled`] is
    /// set; use [`Machine::run_traced`] to trace unconditionally.
    pub fn run(&mut self, iterations: usize, sink: &mut dyn TraceSink) -> RunOutcome {
        if self.config.tracing_enabled {
            self.run_with(iterations, sink)
        } else {
            self.run_with(iterations, &mut NullSink)
        }
    }

    /// Runs up to `iterations` transitions, reporting every event to `sink`.
    pub fn run_traced(&mut self, iterations: usize, sink: &mut dyn TraceSink) -> RunOutcome {
        self.run_with(iterations, sink)
    }

    fn run_with(&mut self, iterations: usize, sink: &mut dyn TraceSink) -> RunOutcome {
        let mut steps = 0;
        let mut final_step = None;

        for _ in 0..iterations {
            let outcome = self.step_with(sink);
            final_step = Some(outcome);
            match outcome {
                StepOutcome::Transitioned { .. } => steps += 1,
                StepOutcome::Fault(_) => break,
            }
        }

        RunOutcome { steps, final_step }
    }

    fn step_with(&mut self, sink: &mut dyn TraceSink) -> StepOutcome {
        if let RunState::Faulted(fault) = self.run_state {
            return StepOutcome::Fault(fault);
        }

        let symbol = self.tape.get(self.pointer).unwrap_or(BLANK);
        let from = self.current;

        let Some(configuration) = self.program.configuration(from) else {
            return self.raise(FaultCode::NoMatchingBranch, 0, symbol, sink);
        };
        let Some((branch_index, branch)) = configuration.select(symbol) else {
            let line = configuration.line;
            return self.raise(FaultCode::NoMatchingBranch, line, symbol, sink);
        };

        let line = branch.line;
        let next = branch.next;
        let pending = match execute_branch(
            branch,
            self.pointer,
            self.highest,
            self.tape.capacity(),
        ) {
            Ok(pending) => pending,
            Err(code) => return self.raise(code, line, symbol, sink),
        };

        if let Err(code) = self.commit(&pending, next) {
            return self.raise(code, line, symbol, sink);
        }
        trace!(
            step = self.steps,
            from = %from,
            branch = branch_index,
            to = %next,
            pointer = self.pointer,
            "branch fired"
        );

        let fired = self
            .program
            .configuration(from)
            .and_then(|config| Some((config, config.branches.get(branch_index)?)));
        if let Some((config, branch)) = fired {
            sink.on_event(&TraceEvent::BranchFired {
                step: self.steps,
                configuration: from,
                name: &config.name,
                next_name: self.program.name_of(next).unwrap_or_default(),
                branch_index,
                branch,
                tape: self.tape.cells(),
                pointer: self.pointer,
                highest: self.highest,
            });
        }

        StepOutcome::Transitioned {
            from,
            branch: branch_index,
            to: next,
        }
    }

    fn commit(&mut self, pending: &PendingStep, next: ConfigId) -> Result<(), FaultCode> {
        for &(index, symbol) in &pending.writes {
            self.tape.write(index, symbol)?;
        }
        self.pointer = pending.pointer;
        self.highest = pending.highest;
        self.current = next;
        self.steps += 1;
        Ok(())
    }

    fn raise(
        &mut self,
        code: FaultCode,
        line: usize,
        symbol: char,
        sink: &mut dyn TraceSink,
    ) -> StepOutcome {
        let fault = RuntimeFault {
            code,
            configuration: self.current,
            line,
            pointer: self.pointer,
            symbol,
        };
        warn!(%fault, "machine faulted");
        self.run_state = RunState::Faulted(fault);
        sink.on_event(&TraceEvent::FaultRaised { fault });
        StepOutcome::Fault(fault)
    }
}
