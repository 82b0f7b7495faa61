//! Parser and validator for machine descriptions.
//!
//! Every problem is reported into the caller's [`Diagnostics`] and parsing
//! continues with the next line, so one pass reports as much as possible.
//! Cross-line checks (undefined targets, misplaced `else`) run once all
//! lines are consumed.

use tracing::debug;

use crate::diagnostics::{DiagnosticKind, Diagnostics, Location};
use crate::ir::{Ir, IrBranch, IrOperation, IrSpecifier};
use crate::lexer::{split_config_name, split_fields, split_lines, split_operations, SourceLine};

const COUNT_EXPECTATION: &str = "expected an optional count from 1 to 9";
const NO_PARAMETER: &str = "takes no parameter";
const PRINT_PAYLOAD: &str = "expected at least one symbol to print";

/// Returns true for names made only of lowercase ASCII letters, digits and spaces.
#[must_use]
pub fn is_legal_config_name(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' ')
}

/// Where the branches of the current line go.
#[derive(Debug)]
enum Target {
    /// No header seen yet.
    Unset,
    /// The header had no name; its branches are ignored.
    Skipping,
    /// Branches append to this slot.
    Slot(usize),
    /// A redefinition; branches are checked against each other and dropped.
    Scratch(Vec<IrBranch>),
}

struct Parser<'d> {
    ir: Ir,
    target: Target,
    /// `(next slot, line)` of branches dropped with a redefinition.
    dropped_targets: Vec<(usize, usize)>,
    diagnostics: &'d mut Diagnostics,
}

/// Parses and validates `source`.
///
/// The returned IR is only fit for lowering when no error was added to
/// `diagnostics`.
pub fn parse(source: &str, diagnostics: &mut Diagnostics) -> Ir {
    let mut parser = Parser {
        ir: Ir::default(),
        target: Target::Unset,
        dropped_targets: Vec::new(),
        diagnostics,
    };

    for line in split_lines(source) {
        parser.line(line);
    }

    parser.finish()
}

impl Parser<'_> {
    fn line(&mut self, line: SourceLine<'_>) {
        match split_config_name(line.text) {
            Some((name, rest)) => self.header(name, rest, line.line),
            None => match self.target {
                Target::Unset => self
                    .diagnostics
                    .report_line(DiagnosticKind::MissingConfigName, line.line),
                Target::Skipping => {}
                Target::Slot(_) | Target::Scratch(_) => self.branch(line.text, line.line),
            },
        }
    }

    fn header(&mut self, name: &str, rest: &str, line: usize) {
        if name.is_empty() {
            self.diagnostics
                .report_line(DiagnosticKind::MissingConfigName, line);
            self.target = Target::Skipping;
            return;
        }

        if !is_legal_config_name(name) {
            self.diagnostics.report_line(
                DiagnosticKind::IllegalConfigName {
                    name: name.to_string(),
                },
                line,
            );
        }

        let slot = self.ir.slot_for(name, line);
        let config = &mut self.ir.configurations[slot];
        if config.defined {
            let first_definition = config.line;
            self.diagnostics.report_line(
                DiagnosticKind::RedefinedConfig {
                    name: name.to_string(),
                    first_definition,
                },
                line,
            );
            self.target = Target::Scratch(Vec::new());
        } else {
            config.defined = true;
            config.line = line;
            self.ir.start.get_or_insert(slot);
            self.target = Target::Slot(slot);
        }

        self.branch(rest.trim(), line);
    }

    fn branch(&mut self, text: &str, line: usize) {
        let Some(branch) = self.parse_branch(text, line) else {
            return;
        };

        let siblings = match &mut self.target {
            Target::Slot(slot) => &mut self.ir.configurations[*slot].branches,
            Target::Scratch(branches) => {
                self.dropped_targets.push((branch.next, branch.line));
                branches
            }
            Target::Unset | Target::Skipping => return,
        };

        if let Some(first) = siblings
            .iter()
            .find(|sibling| sibling.specifier == branch.specifier)
        {
            self.diagnostics.report_line(
                DiagnosticKind::DuplicateMatchSpecifier {
                    specifier: branch.specifier.to_string(),
                    first_definition: first.line,
                },
                line,
            );
        }
        siblings.push(branch);
    }

    fn parse_branch(&mut self, text: &str, line: usize) -> Option<IrBranch> {
        if text.is_empty() {
            self.diagnostics
                .report_line(DiagnosticKind::MissingOperationList, line);
            return None;
        }

        let fields: Vec<&str> = split_fields(text).collect();
        let errors_before = self.diagnostics.error_count();

        let specifier = self.specifier(fields.first().copied().unwrap_or_default(), line);
        let operations = self.operations(fields.get(1).copied().unwrap_or_default(), line);

        let next_name = fields.get(2).copied().unwrap_or_default();
        if next_name.is_empty() {
            self.diagnostics
                .report_line(DiagnosticKind::MissingNextConfig, line);
        }
        if let Some(field) = fields.get(3) {
            self.diagnostics.report_line(
                DiagnosticKind::UnexpectedField {
                    field: (*field).to_string(),
                },
                line,
            );
        }

        if self.diagnostics.error_count() != errors_before {
            return None;
        }

        Some(IrBranch {
            specifier: specifier?,
            operations,
            next: self.ir.slot_for(next_name, line),
            line,
        })
    }

    fn specifier(&mut self, field: &str, line: usize) -> Option<IrSpecifier> {
        let kind = match field {
            "" => DiagnosticKind::MissingMatchSpecifier,
            "none" => return Some(IrSpecifier::None),
            "any" => return Some(IrSpecifier::Any),
            "else" => return Some(IrSpecifier::Else),
            literal => {
                let mut chars = literal.chars();
                match (chars.next(), chars.next()) {
                    (Some(symbol), None) => return Some(IrSpecifier::Literal(symbol)),
                    _ => DiagnosticKind::IllegalMatchSpecifier {
                        specifier: literal.to_string(),
                    },
                }
            }
        };
        self.diagnostics.report_line(kind, line);
        None
    }

    fn operations(&mut self, field: &str, line: usize) -> Vec<IrOperation> {
        if field.is_empty() {
            self.diagnostics
                .report_line(DiagnosticKind::MissingOperationList, line);
            return Vec::new();
        }

        split_operations(field)
            .filter_map(|token| match parse_operation(token) {
                Ok(operation) => Some(operation),
                Err(kind) => {
                    self.diagnostics.report_line(kind, line);
                    None
                }
            })
            .collect()
    }

    fn finish(self) -> Ir {
        let Self {
            ir,
            dropped_targets,
            diagnostics,
            ..
        } = self;

        let mut references: Vec<(usize, usize)> = ir
            .defined()
            .flat_map(|(_, config)| config.branches.iter().map(|b| (b.next, b.line)))
            .chain(dropped_targets)
            .collect();
        references.sort_by_key(|&(_, line)| line);
        for (next, line) in references {
            if let Some(target) = ir.configuration(next).filter(|target| !target.defined) {
                diagnostics.report_line(
                    DiagnosticKind::UndefinedConfigReferenced {
                        name: target.name.clone(),
                    },
                    line,
                );
            }
        }

        for (_, config) in ir.defined() {
            let last = config.branches.len().saturating_sub(1);
            for (index, branch) in config.branches.iter().enumerate() {
                if branch.specifier == IrSpecifier::Else && index < last {
                    diagnostics.report_line(
                        DiagnosticKind::MisplacedElse {
                            name: config.name.clone(),
                        },
                        branch.line,
                    );
                }
            }
        }

        if ir.start.is_none() {
            diagnostics.report(DiagnosticKind::EmptyProgram, Location::File);
        }

        debug!(
            configurations = ir.configurations.len(),
            defined = ir.defined().count(),
            errors = diagnostics.error_count(),
            "parsed source"
        );
        ir
    }
}

/// Parses one operation token.
///
/// # Errors
///
/// Returns [`DiagnosticKind::UnknownOperation`] for an unknown leading
/// letter and [`DiagnosticKind::OperationArityError`] for a malformed
/// parameter.
pub fn parse_operation(token: &str) -> Result<IrOperation, DiagnosticKind> {
    let mut chars = token.chars();
    let Some(letter) = chars.next() else {
        return Err(DiagnosticKind::UnknownOperation {
            token: token.to_string(),
        });
    };
    let parameter = chars.as_str();

    let arity = |expected| DiagnosticKind::OperationArityError {
        token: token.to_string(),
        expected,
    };

    match letter {
        'N' if parameter.is_empty() => Ok(IrOperation::NoOp),
        'E' if parameter.is_empty() => Ok(IrOperation::Erase),
        'N' | 'E' => Err(arity(NO_PARAMETER)),
        'P' if parameter.is_empty() => Err(arity(PRINT_PAYLOAD)),
        'P' => Ok(IrOperation::Print(parameter.chars().collect())),
        'R' => parse_count(parameter)
            .map(IrOperation::Right)
            .ok_or_else(|| arity(COUNT_EXPECTATION)),
        'L' => parse_count(parameter)
            .map(IrOperation::Left)
            .ok_or_else(|| arity(COUNT_EXPECTATION)),
        _ => Err(DiagnosticKind::UnknownOperation {
            token: token.to_string(),
        }),
    }
}

/// `Some(None)` for an absent count, `Some(Some(n))` for a digit `1..=9`.
fn parse_count(parameter: &str) -> Option<Option<u8>> {
    let mut chars = parameter.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Some(None),
        (Some(digit @ '1'..='9'), None) => digit
            .to_digit(10)
            .and_then(|count| u8::try_from(count).ok())
            .map(Some),
        _ => None,
    }
}
