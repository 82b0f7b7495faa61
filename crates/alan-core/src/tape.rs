//! Fixed-capacity tape storage.

use crate::FaultCode;

/// Blank cell sentinel.
pub const BLANK: char = ' ';

/// Default number of tape cells.
pub const DEFAULT_TAPE_CAPACITY: usize = 256;

/// Fixed-capacity array of single symbols, initialised blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Tape {
    cells: Box<[char]>,
}

impl Default for Tape {
    fn default() -> Self {
        Self::new(DEFAULT_TAPE_CAPACITY)
    }
}

impl Tape {
    /// Creates a blank tape with `capacity` cells.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: vec![BLANK; capacity].into_boxed_slice(),
        }
    }

    /// Number of cells.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Reads the cell at `index`, or `None` outside the tape.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<char> {
        self.cells.get(index).copied()
    }

    /// Overwrites the cell at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::TapeBoundsExceeded`] when `index` is outside the
    /// tape. The tape is left unchanged in that case.
    pub fn write(&mut self, index: usize, symbol: char) -> Result<(), FaultCode> {
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(FaultCode::TapeBoundsExceeded)?;
        *cell = symbol;
        Ok(())
    }

    /// Returns all cells.
    #[must_use]
    pub fn cells(&self) -> &[char] {
        &self.cells
    }
}

/// Validates that `pointer` moved by `delta` cells stays on a tape of
/// `capacity` cells.
///
/// # Errors
///
/// Returns [`FaultCode::TapeBoundsExceeded`] on underflow or when the
/// destination is at or beyond `capacity`.
pub fn offset_pointer(pointer: usize, delta: isize, capacity: usize) -> Result<usize, FaultCode> {
    pointer
        .checked_add_signed(delta)
        .filter(|&moved| moved < capacity)
        .ok_or(FaultCode::TapeBoundsExceeded)
}
