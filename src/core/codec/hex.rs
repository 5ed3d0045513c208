//! Hex input for Hex-mode submissions

use super::CodecError;

/// Parse a Hex-mode buffer into bytes
///
/// The buffer is uppercased first. Only hex digits are accepted and the digit
/// count must be even; separators are not allowed.
pub fn parse_hex_input(input: &str) -> Result<Vec<u8>, CodecError> {
    let upper = input.to_uppercase();
    ::hex::decode(&upper).map_err(|e| match e {
        ::hex::FromHexError::InvalidHexCharacter { c, index } => {
            CodecError::InvalidCharacter(index, c)
        }
        _ => match upper.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
            Some((index, c)) => CodecError::InvalidCharacter(index, c),
            None => CodecError::OddLength(upper.chars().count()),
        },
    })
}

/// Remove the trailing hex pair, keeping the buffer byte-aligned
///
/// An unaligned buffer (odd length) only loses its dangling digit.
pub fn backspace_hex(buffer: &mut String) {
    let len = buffer.chars().count();
    let remove = if len % 2 == 0 { 2 } else { 1 };
    for _ in 0..remove.min(len) {
        buffer.pop();
    }
}
