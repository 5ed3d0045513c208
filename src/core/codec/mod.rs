//! Data codecs for the session
//!
//! - Hex input parsing for Hex-mode submissions
//! - Text encoding with an explicit policy for unencodable characters
//! - Line terminators appended to Text-mode submissions
//! - xxd-style hexdump formatting

mod hex;
mod text;

pub use self::hex::{backspace_hex, parse_hex_input};
pub use text::{Encoded, EncodingPolicy, LineEnding, TextEncoding};

/// Codec errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Hex input with an odd number of digits
    #[error("Invalid Hex-string: odd number of digits ({0})")]
    OddLength(usize),

    /// Invalid character in hex input
    #[error("Invalid Hex-string: invalid character at position {0}: {1:?}")]
    InvalidCharacter(usize, char),

    /// Character the selected encoding cannot represent (strict policy)
    #[error("Cannot encode {ch:?} as {encoding}")]
    Unencodable {
        /// Offending character
        ch: char,
        /// Selected encoding
        encoding: TextEncoding,
    },
}

/// Format bytes as a hexdump (like xxd)
pub fn hexdump(data: &[u8], bytes_per_line: usize) -> String {
    let mut output = String::new();

    for (offset, chunk) in data.chunks(bytes_per_line).enumerate() {
        output.push_str(&format!("{:08x}  ", offset * bytes_per_line));

        for (i, byte) in chunk.iter().enumerate() {
            output.push_str(&format!("{:02x} ", byte));
            if i == bytes_per_line / 2 - 1 {
                output.push(' ');
            }
        }

        // Padding for incomplete lines
        if chunk.len() < bytes_per_line {
            let missing = bytes_per_line - chunk.len();
            for i in 0..missing {
                output.push_str("   ");
                if chunk.len() + i == bytes_per_line / 2 - 1 {
                    output.push(' ');
                }
            }
        }

        output.push(' ');

        output.push('|');
        for byte in chunk {
            if byte.is_ascii_graphic() || *byte == b' ' {
                output.push(*byte as char);
            } else {
                output.push('.');
            }
        }
        for _ in chunk.len()..bytes_per_line {
            output.push(' ');
        }
        output.push('|');
        output.push('\n');
    }

    output
}
