//! Deterministic run fingerprint for cross-host comparison.
//!
//! Runs Turing's first machine, which prints `0 1 0 1 ...` on alternate
//! cells, twice and hashes the final tape, pointer and step count.

use alan_core::{
    Branch, ConfigId, Configuration, DecodedResult, Machine, MachineConfig, Matcher, NullSink,
    Operation, PrintPayload, Program,
};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

const STEPS: usize = 100;

fn state(name: &str, operations: Vec<Operation>, next: usize, line: usize) -> Configuration {
    Configuration {
        name: name.to_string(),
        branches: vec![Branch {
            matcher: Matcher::BLANK,
            operations,
            next: ConfigId(next),
            line,
        }],
        line,
    }
}

fn first_machine() -> Program {
    let print = |symbol| Operation::Print(PrintPayload::Symbol(symbol));
    Program {
        configurations: vec![
            state("b", vec![print('0'), Operation::MoveRight(1)], 1, 1),
            state("c", vec![Operation::MoveRight(1)], 2, 2),
            state("e", vec![print('1'), Operation::MoveRight(1)], 3, 3),
            state("f", vec![Operation::MoveRight(1)], 0, 4),
        ],
        start: ConfigId(0),
    }
}

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

fn fingerprint() -> (String, DecodedResult) {
    let mut machine = Machine::new(first_machine(), &MachineConfig::default());
    let outcome = machine.run(STEPS, &mut NullSink);

    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    hash_bytes(&mut hash, &outcome.steps.to_le_bytes());
    hash_bytes(&mut hash, &machine.pointer().to_le_bytes());
    for cell in machine.tape().cells() {
        hash_bytes(&mut hash, &u32::from(*cell).to_le_bytes());
    }

    let result = DecodedResult::from_tape(machine.tape().cells(), machine.highest());
    (format!("{hash:016x}"), result)
}

fn main() {
    let (first, result) = fingerprint();
    let (second, _) = fingerprint();
    assert_eq!(first, second, "fingerprint differs between runs");

    println!("fingerprint={first}");
    println!("{result}");
}
