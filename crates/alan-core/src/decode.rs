//! Result extraction and interpretation.
//!
//! The output convention reserves the even cells of the tape for results and
//! leaves the odd cells as scratch space. The extracted buffer is rendered
//! as the raw symbols, as 8-bit characters, and as a binary fraction.

use std::fmt;

/// Symbols skipped at the start of the result before decoding.
pub const LEADING_FILLER: [char; 2] = ['@', 'ə'];

/// Bits grouped into one character of the text view.
pub const BITS_PER_CHAR: usize = 8;

/// The three renderings of a result buffer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DecodedResult {
    /// The literal result buffer.
    pub raw: String,
    /// Binary digits grouped into 8-bit characters.
    pub text: String,
    /// Binary digits read as the fraction `0.b1 b2 b3 ...`.
    pub numeric: f64,
}

impl DecodedResult {
    /// Decodes a result buffer.
    #[must_use]
    pub fn from_raw(raw: String) -> Self {
        let text = decode_text(&raw);
        let numeric = decode_fraction(&raw);
        Self { raw, text, numeric }
    }

    /// Extracts and decodes the result convention of `tape`.
    #[must_use]
    pub fn from_tape(tape: &[char], highest: usize) -> Self {
        Self::from_raw(extract_result(tape, highest))
    }
}

impl fmt::Display for DecodedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Binary:\t{}", self.raw)?;
        writeln!(f, "String:\t{}", self.text)?;
        write!(f, "Float:\t{}", self.numeric)
    }
}

/// Copies the even cells below `2 * floor(highest / 2) + 2` into a buffer.
#[must_use]
pub fn extract_result(tape: &[char], highest: usize) -> String {
    let end = (2 * (highest / 2) + 2).min(tape.len());
    tape[..end].iter().step_by(2).collect()
}

/// Strips leading filler symbols.
#[must_use]
pub fn skip_filler(buffer: &str) -> &str {
    buffer.trim_start_matches(&LEADING_FILLER[..])
}

/// Binary digits of `buffer` after the filler, as bits.
pub fn binary_digits(buffer: &str) -> impl Iterator<Item = u8> + '_ {
    skip_filler(buffer).chars().filter_map(|symbol| match symbol {
        '0' => Some(0),
        '1' => Some(1),
        _ => None,
    })
}

/// Groups binary digits into 8-bit characters, most significant bit first.
///
/// A trailing partial group keeps its bits in the high positions.
#[must_use]
pub fn decode_text(buffer: &str) -> String {
    let bits: Vec<u8> = binary_digits(buffer).collect();
    bits.chunks(BITS_PER_CHAR)
        .map(|chunk| {
            let byte = chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (position, &bit)| acc | (bit << (7 - position)));
            char::from(byte)
        })
        .collect()
}

/// Reads binary digits as the fraction `sum(b_i * 2^-i)`.
#[must_use]
pub fn decode_fraction(buffer: &str) -> f64 {
    let mut weight = 1.0;
    binary_digits(buffer).fold(0.0, |sum, bit| {
        weight /= 2.0;
        sum + f64::from(bit) * weight
    })
}
