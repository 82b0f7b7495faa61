//! Resolved runtime form of a machine description.
//!
//! Every configuration reference is an index into [`Program::configurations`]
//! and every keyword match specifier has been replaced by a [`Matcher`]. The
//! program is immutable once built; the machine only reads it.

use std::fmt;

use crate::tape::BLANK;

/// Stable index of a configuration inside a [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ConfigId(pub usize);

impl ConfigId {
    /// Returns the raw slot index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ConfigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Criterion a branch uses to claim the symbol under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Matcher {
    /// Matches exactly one tape symbol. `none` lowers to the blank sentinel.
    Symbol(char),
    /// Matches `'0'` or `'1'`.
    AnyBinary,
    /// Matches every symbol.
    Else,
}

impl Matcher {
    /// Matcher for a blank cell.
    pub const BLANK: Self = Self::Symbol(BLANK);

    /// Returns true when this matcher accepts `symbol`.
    #[must_use]
    pub const fn matches(self, symbol: char) -> bool {
        match self {
            Self::Symbol(expected) => expected == symbol,
            Self::AnyBinary => matches!(symbol, '0' | '1'),
            Self::Else => true,
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol(BLANK) => f.write_str("none"),
            Self::Symbol(symbol) => write!(f, "{symbol}"),
            Self::AnyBinary => f.write_str("any"),
            Self::Else => f.write_str("else"),
        }
    }
}

/// Payload of a print operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum PrintPayload {
    /// Overwrites the cell under the pointer.
    Symbol(char),
    /// Writes each symbol and advances the pointer by two after each write.
    Sequence(Box<[char]>),
}

/// One tape- or pointer-mutating action performed when a branch fires.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Operation {
    /// Stops the remaining operations of the branch for this step.
    NoOp,
    /// Prints a symbol or a symbol sequence.
    Print(PrintPayload),
    /// Overwrites the cell under the pointer with the blank sentinel.
    Erase,
    /// Moves the pointer right by a count of at least one.
    MoveRight(u8),
    /// Moves the pointer left by a count of at least one.
    MoveLeft(u8),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOp => f.write_str("N"),
            Self::Print(PrintPayload::Symbol(symbol)) => write!(f, "P{symbol}"),
            Self::Print(PrintPayload::Sequence(symbols)) => {
                f.write_str("P")?;
                symbols.iter().try_for_each(|symbol| write!(f, "{symbol}"))
            }
            Self::Erase => f.write_str("E"),
            Self::MoveRight(1) => f.write_str("R"),
            Self::MoveRight(count) => write!(f, "R{count}"),
            Self::MoveLeft(1) => f.write_str("L"),
            Self::MoveLeft(count) => write!(f, "L{count}"),
        }
    }
}

/// A guarded transition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Branch {
    /// Symbol criterion.
    pub matcher: Matcher,
    /// Operations in execution order.
    pub operations: Vec<Operation>,
    /// Configuration entered after the branch fires.
    pub next: ConfigId,
    /// 1-indexed source line the branch was declared on.
    pub line: usize,
}

/// A named machine state with branches in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Configuration {
    /// Configuration name as written in the source.
    pub name: String,
    /// Branches in declaration order; the first match wins.
    pub branches: Vec<Branch>,
    /// 1-indexed source line the configuration was defined on.
    pub line: usize,
}

impl Configuration {
    /// Returns the index and branch of the first branch accepting `symbol`.
    #[must_use]
    pub fn select(&self, symbol: char) -> Option<(usize, &Branch)> {
        self.branches
            .iter()
            .enumerate()
            .find(|(_, branch)| branch.matcher.matches(symbol))
    }
}

/// A fully resolved machine description.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Program {
    /// Configuration table addressed by [`ConfigId`].
    pub configurations: Vec<Configuration>,
    /// Configuration the machine starts in.
    pub start: ConfigId,
}

impl Program {
    /// Returns the configuration stored at `id`.
    #[must_use]
    pub fn configuration(&self, id: ConfigId) -> Option<&Configuration> {
        self.configurations.get(id.0)
    }

    /// Returns the name of the configuration stored at `id`.
    #[must_use]
    pub fn name_of(&self, id: ConfigId) -> Option<&str> {
        self.configuration(id).map(|config| config.name.as_str())
    }

    /// Looks up a configuration index by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<ConfigId> {
        self.configurations
            .iter()
            .position(|config| config.name == name)
            .map(ConfigId)
    }
}
