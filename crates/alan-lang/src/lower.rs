//! Lowering from the name-based IR to the resolved runtime form.

use alan_core::{
    Branch, ConfigId, Configuration, Matcher, Operation, PrintPayload, Program, BLANK,
};
use tracing::debug;

use crate::ir::{Ir, IrBranch, IrConfiguration, IrOperation, IrSpecifier};

/// Count used by `R` and `L` without a parameter.
pub const DEFAULT_MOVE_COUNT: u8 = 1;

/// Lowers `ir` into a [`Program`].
///
/// Total for any IR: an undefined slot lowers to a configuration without
/// branches, which faults as soon as the machine enters it.
#[must_use]
pub fn lower(ir: &Ir) -> Program {
    let program = Program {
        configurations: ir.configurations.iter().map(lower_configuration).collect(),
        start: ConfigId(ir.start.unwrap_or_default()),
    };

    debug!(
        configurations = program.configurations.len(),
        start = %program.start,
        "lowered program"
    );
    program
}

fn lower_configuration(config: &IrConfiguration) -> Configuration {
    Configuration {
        name: config.name.clone(),
        branches: config.branches.iter().map(lower_branch).collect(),
        line: config.line,
    }
}

fn lower_branch(branch: &IrBranch) -> Branch {
    Branch {
        matcher: lower_specifier(branch.specifier),
        operations: branch.operations.iter().map(lower_operation).collect(),
        next: ConfigId(branch.next),
        line: branch.line,
    }
}

/// Maps a source specifier to its runtime matcher.
#[must_use]
pub const fn lower_specifier(specifier: IrSpecifier) -> Matcher {
    match specifier {
        IrSpecifier::Literal(symbol) => Matcher::Symbol(symbol),
        IrSpecifier::None => Matcher::Symbol(BLANK),
        IrSpecifier::Any => Matcher::AnyBinary,
        IrSpecifier::Else => Matcher::Else,
    }
}

/// Maps a source operation to its runtime form.
#[must_use]
pub fn lower_operation(operation: &IrOperation) -> Operation {
    match operation {
        IrOperation::NoOp => Operation::NoOp,
        IrOperation::Print(symbols) => match symbols.as_slice() {
            [symbol] => Operation::Print(PrintPayload::Symbol(*symbol)),
            sequence => Operation::Print(PrintPayload::Sequence(sequence.into())),
        },
        IrOperation::Erase => Operation::Erase,
        IrOperation::Right(count) => Operation::MoveRight(count.unwrap_or(DEFAULT_MOVE_COUNT)),
        IrOperation::Left(count) => Operation::MoveLeft(count.unwrap_or(DEFAULT_MOVE_COUNT)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::parser::parse;

    #[test]
    fn keywords_become_matchers() {
        assert_eq!(lower_specifier(IrSpecifier::None), Matcher::BLANK);
        assert_eq!(lower_specifier(IrSpecifier::Any), Matcher::AnyBinary);
        assert_eq!(lower_specifier(IrSpecifier::Else), Matcher::Else);
        assert_eq!(
            lower_specifier(IrSpecifier::Literal('x')),
            Matcher::Symbol('x')
        );
    }

    #[test]
    fn counts_default_to_one_and_prints_split_by_length() {
        assert_eq!(lower_operation(&IrOperation::Right(None)), Operation::MoveRight(1));
        assert_eq!(lower_operation(&IrOperation::Left(Some(4))), Operation::MoveLeft(4));
        assert_eq!(
            lower_operation(&IrOperation::Print(vec!['1'])),
            Operation::Print(PrintPayload::Symbol('1'))
        );
        assert_eq!(
            lower_operation(&IrOperation::Print(vec!['1', '0'])),
            Operation::Print(PrintPayload::Sequence(vec!['1', '0'].into_boxed_slice()))
        );
    }

    #[test]
    fn names_resolve_to_slot_indices() {
        let mut diagnostics = Diagnostics::new();
        let ir = parse("b: none|P1,R|c\nc: else|N|b\n", &mut diagnostics);
        let program = lower(&ir);

        assert_eq!(program.start, ConfigId(0));
        assert_eq!(program.configurations.len(), 2);
        assert_eq!(program.configurations[0].branches[0].next, ConfigId(1));
        assert_eq!(program.configurations[1].branches[0].next, ConfigId(0));
        assert_eq!(program.find("c"), Some(ConfigId(1)));
    }

    #[test]
    fn undefined_slots_lower_to_empty_configurations() {
        let mut diagnostics = Diagnostics::new();
        let ir = parse("a: else|N|ghost\n", &mut diagnostics);
        assert!(diagnostics.has_errors());

        let program = lower(&ir);
        let ghost = program.find("ghost").and_then(|id| program.configuration(id));
        assert!(ghost.is_some_and(|config| config.branches.is_empty()));
    }
}
