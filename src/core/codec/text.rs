//! Text encoding and line terminators for Text-mode submissions

use super::CodecError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text encoding type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// UTF-8 encoding
    #[default]
    Utf8,
    /// ASCII (7-bit)
    Ascii,
    /// Latin-1 (ISO-8859-1)
    Latin1,
}

impl TextEncoding {
    /// Next encoding in toggle order
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Utf8 => Self::Ascii,
            Self::Ascii => Self::Latin1,
            Self::Latin1 => Self::Utf8,
        }
    }

    fn encode_char(self, ch: char) -> Option<u8> {
        let code = ch as u32;
        match self {
            Self::Utf8 => None,
            Self::Ascii if code < 0x80 => Some(code as u8),
            Self::Latin1 if code < 0x100 => Some(code as u8),
            _ => None,
        }
    }

    /// Encode `text`, handling unrepresentable characters per `policy`
    pub fn encode(self, text: &str, policy: EncodingPolicy) -> Result<Encoded, CodecError> {
        if self == Self::Utf8 {
            return Ok(Encoded {
                bytes: text.as_bytes().to_vec(),
                affected: 0,
            });
        }

        let mut bytes = Vec::with_capacity(text.len());
        let mut affected = 0;
        for ch in text.chars() {
            match self.encode_char(ch) {
                Some(b) => bytes.push(b),
                None => match policy {
                    EncodingPolicy::Strict => {
                        return Err(CodecError::Unencodable { ch, encoding: self })
                    }
                    EncodingPolicy::Substitute => {
                        bytes.push(b'?');
                        affected += 1;
                    }
                    EncodingPolicy::Ignore => affected += 1,
                },
            }
        }
        Ok(Encoded { bytes, affected })
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => write!(f, "UTF-8"),
            Self::Ascii => write!(f, "ASCII"),
            Self::Latin1 => write!(f, "Latin-1"),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(Self::Latin1),
            other => Err(format!("unknown encoding {other:?} (utf-8, ascii, latin-1)")),
        }
    }
}

/// What to do with characters the selected encoding cannot represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingPolicy {
    /// Refuse to send the submission
    Strict,
    /// Replace each with `?`
    Substitute,
    /// Drop them
    #[default]
    Ignore,
}

impl fmt::Display for EncodingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Substitute => write!(f, "substitute"),
            Self::Ignore => write!(f, "ignore"),
        }
    }
}

impl FromStr for EncodingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "substitute" | "replace" => Ok(Self::Substitute),
            "ignore" => Ok(Self::Ignore),
            other => Err(format!(
                "unknown encoding policy {other:?} (strict, substitute, ignore)"
            )),
        }
    }
}

/// Result of encoding a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    /// Bytes to transmit
    pub bytes: Vec<u8>,
    /// Characters dropped or substituted
    pub affected: usize,
}

/// Line ending style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// LF only (Unix)
    Lf,
    /// CR+LF (Windows)
    #[default]
    Crlf,
    /// CR only (old Mac)
    Cr,
    /// No line ending
    None,
}

impl LineEnding {
    /// The terminator text
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
            Self::Cr => "\r",
            Self::None => "",
        }
    }

    /// Next line ending in toggle order
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Lf => Self::Crlf,
            Self::Crlf => Self::Cr,
            Self::Cr => Self::None,
            Self::None => Self::Lf,
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lf => write!(f, "LF"),
            Self::Crlf => write!(f, "CRLF"),
            Self::Cr => write!(f, "CR"),
            Self::None => write!(f, "none"),
        }
    }
}

impl FromStr for LineEnding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lf" => Ok(Self::Lf),
            "crlf" => Ok(Self::Crlf),
            "cr" => Ok(Self::Cr),
            "none" => Ok(Self::None),
            other => Err(format!("unknown line ending {other:?} (lf, crlf, cr, none)")),
        }
    }
}
