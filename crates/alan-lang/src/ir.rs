//! Name-based intermediate representation produced by the parser.
//!
//! Configurations live in an arena indexed by [`NameTable`] slot. A slot
//! exists as soon as its name is seen, either in a header or as a branch
//! target, so forward references need no second pass. Only slots whose
//! header was seen are `defined`.

use std::fmt;

use crate::names::NameTable;

/// Match specifier as written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrSpecifier {
    /// A single literal symbol.
    Literal(char),
    /// `none`: a blank cell.
    None,
    /// `any`: a binary digit.
    Any,
    /// `else`: every symbol.
    Else,
}

impl fmt::Display for IrSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(symbol) => write!(f, "{symbol}"),
            Self::None => f.write_str("none"),
            Self::Any => f.write_str("any"),
            Self::Else => f.write_str("else"),
        }
    }
}

/// Operation as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IrOperation {
    /// `N`
    NoOp,
    /// `P<symbols>`
    Print(Vec<char>),
    /// `E`
    Erase,
    /// `R` or `R<count>`
    Right(Option<u8>),
    /// `L` or `L<count>`
    Left(Option<u8>),
}

/// A validated branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IrBranch {
    /// Match specifier.
    pub specifier: IrSpecifier,
    /// Operations in source order.
    pub operations: Vec<IrOperation>,
    /// Slot of the next configuration.
    pub next: usize,
    /// 1-indexed source line.
    pub line: usize,
}

/// A configuration slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IrConfiguration {
    /// Configuration name.
    pub name: String,
    /// Branches in declaration order.
    pub branches: Vec<IrBranch>,
    /// True once a header for this name was seen.
    pub defined: bool,
    /// Line of the header, or of the first reference while undefined.
    pub line: usize,
}

impl IrConfiguration {
    fn placeholder(name: &str, line: usize) -> Self {
        Self {
            name: name.to_string(),
            branches: Vec::new(),
            defined: false,
            line,
        }
    }
}

/// Parsed machine description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ir {
    /// Name to slot mapping.
    pub names: NameTable,
    /// Configuration arena indexed by slot.
    pub configurations: Vec<IrConfiguration>,
    /// Slot of the first defined configuration.
    pub start: Option<usize>,
}

impl Ir {
    /// Returns the slot for `name`, creating a placeholder on first sight.
    pub fn slot_for(&mut self, name: &str, line: usize) -> usize {
        let slot = self.names.find_or_insert(name);
        if slot == self.configurations.len() {
            self.configurations
                .push(IrConfiguration::placeholder(name, line));
        }
        slot
    }

    /// Returns the configuration in `slot`.
    #[must_use]
    pub fn configuration(&self, slot: usize) -> Option<&IrConfiguration> {
        self.configurations.get(slot)
    }

    /// Iterates the configurations whose header was seen.
    pub fn defined(&self) -> impl Iterator<Item = (usize, &IrConfiguration)> {
        self.configurations
            .iter()
            .enumerate()
            .filter(|(_, config)| config.defined)
    }
}
