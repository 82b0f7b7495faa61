//! Tape machine dispatch, bounds and decoding coverage.

#![allow(clippy::pedantic, clippy::nursery)]

use alan_core::{
    decode_fraction, decode_text, Branch, ConfigId, Configuration, DecodedResult, FaultCode,
    Machine, MachineConfig, Matcher, Operation, PrintPayload, Program, RunState, StepOutcome,
    BLANK,
};
use proptest::prelude::*;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

fn branch(matcher: Matcher, operations: Vec<Operation>, next: usize, line: usize) -> Branch {
    Branch {
        matcher,
        operations,
        next: ConfigId(next),
        line,
    }
}

fn print(symbol: char) -> Operation {
    Operation::Print(PrintPayload::Symbol(symbol))
}

/// `begin` skips binary digits, writes 0 0 1 on the first blank, then parks in `done`.
fn counting_program() -> Program {
    Program {
        configurations: vec![
            Configuration {
                name: "begin".into(),
                branches: vec![
                    branch(Matcher::Symbol('0'), vec![Operation::MoveRight(1)], 0, 1),
                    branch(Matcher::Symbol('1'), vec![Operation::MoveRight(1)], 0, 2),
                    branch(
                        Matcher::BLANK,
                        vec![
                            print('0'),
                            Operation::MoveRight(1),
                            print('0'),
                            Operation::MoveRight(1),
                            print('1'),
                            Operation::NoOp,
                        ],
                        1,
                        3,
                    ),
                ],
                line: 1,
            },
            Configuration {
                name: "done".into(),
                branches: vec![branch(Matcher::Else, vec![Operation::NoOp], 1, 4)],
                line: 4,
            },
        ],
        start: ConfigId(0),
    }
}

#[test]
fn counting_program_parks_in_done() {
    let mut machine = Machine::new(counting_program(), &MachineConfig::default());
    let mut visited = Vec::new();

    for _ in 0..6 {
        match machine.step() {
            StepOutcome::Transitioned { to, .. } => visited.push(to),
            StepOutcome::Fault(fault) => panic!("unexpected fault: {fault}"),
        }
    }

    assert_eq!(machine.current_name(), Some("done"));
    assert_eq!(visited, vec![ConfigId(1); 6]);
    assert_eq!(&machine.tape().cells()[..3], &['0', '0', '1']);
    assert_eq!(machine.pointer(), 2);
    assert_eq!(machine.highest(), 2);
}

#[rstest]
#[case('0', 0)]
#[case('1', 1)]
#[case('x', 2)]
#[case(BLANK, 2)]
fn dispatch_prefers_declaration_order(#[case] symbol: char, #[case] expected: usize) {
    let config = Configuration {
        name: "dispatch".into(),
        branches: vec![
            branch(Matcher::Symbol('0'), vec![], 0, 1),
            branch(Matcher::AnyBinary, vec![], 0, 2),
            branch(Matcher::Else, vec![], 0, 3),
            branch(Matcher::Symbol('1'), vec![], 0, 4),
        ],
        line: 1,
    };

    let (index, _) = config.select(symbol).expect("else catches everything");
    assert_eq!(index, expected);
}

#[rstest]
#[case(vec![Operation::MoveRight(4)], 4)]
#[case(vec![Operation::MoveRight(3), Operation::MoveRight(1)], 4)]
#[case(vec![Operation::Print(PrintPayload::Sequence(vec!['1', '1', '0'].into_boxed_slice()))], 4)]
fn moving_past_capacity_faults(#[case] operations: Vec<Operation>, #[case] capacity: usize) {
    let mut ops = vec![print('1')];
    ops.extend(operations);
    let program = Program {
        configurations: vec![Configuration {
            name: "edge".into(),
            branches: vec![branch(Matcher::Else, ops, 0, 7)],
            line: 7,
        }],
        start: ConfigId(0),
    };
    let config = MachineConfig {
        tape_capacity: capacity,
        ..MachineConfig::default()
    };
    let mut machine = Machine::new(program, &config);

    let fault = machine.step().fault().expect("bounds fault");
    assert_eq!(fault.code, FaultCode::TapeBoundsExceeded);
    assert_eq!(fault.line, 7);
    assert!(matches!(machine.run_state(), RunState::Faulted(_)));
    assert!(machine.tape().cells().iter().all(|&cell| cell == BLANK));
}

#[test]
fn bounds_fault_preserves_cells_written_by_earlier_steps() {
    let program = Program {
        configurations: vec![Configuration {
            name: "stripe".into(),
            branches: vec![branch(
                Matcher::BLANK,
                vec![print('1'), Operation::MoveRight(2)],
                0,
                1,
            )],
            line: 1,
        }],
        start: ConfigId(0),
    };
    let config = MachineConfig {
        tape_capacity: 6,
        ..MachineConfig::default()
    };
    let mut machine = Machine::new(program, &config);

    let outcome = machine.run(10, &mut alan_core::NullSink);
    assert_eq!(outcome.steps, 2);
    assert_eq!(
        outcome.fault().map(|fault| fault.code),
        Some(FaultCode::TapeBoundsExceeded)
    );
    assert_eq!(machine.tape().cells(), &['1', BLANK, '1', BLANK, BLANK, BLANK]);
    assert_eq!(machine.pointer(), 4);

    let result = DecodedResult::from_tape(machine.tape().cells(), machine.highest());
    assert_eq!(result.raw, "11 ");
}

proptest! {
    #[test]
    fn property_fraction_stays_in_unit_interval(bits in prop::collection::vec(any::<bool>(), 0..48)) {
        let buffer: String = bits.iter().map(|&bit| if bit { '1' } else { '0' }).collect();
        let value = decode_fraction(&buffer);
        prop_assert!((0.0..1.0).contains(&value));
    }

    #[test]
    fn property_text_has_one_char_per_started_byte(bits in prop::collection::vec(any::<bool>(), 0..64)) {
        let buffer: String = bits.iter().map(|&bit| if bit { '1' } else { '0' }).collect();
        let text = decode_text(&buffer);
        prop_assert_eq!(text.chars().count(), bits.len().div_ceil(8));
    }

    #[test]
    fn property_pointer_never_leaves_tape(steps in 0usize..64, capacity in 1usize..32, right in any::<bool>()) {
        let operation = if right { Operation::MoveRight(1) } else { Operation::MoveLeft(1) };
        let program = Program {
            configurations: vec![Configuration {
                name: "walk".into(),
                branches: vec![branch(Matcher::Else, vec![operation], 0, 1)],
                line: 1,
            }],
            start: ConfigId(0),
        };
        let config = MachineConfig { tape_capacity: capacity, ..MachineConfig::default() };
        let mut machine = Machine::new(program, &config);

        let outcome = machine.run(steps, &mut alan_core::NullSink);
        prop_assert!(machine.pointer() < capacity);
        prop_assert!(machine.highest() < capacity);
        prop_assert!(outcome.steps <= steps);
    }
}
