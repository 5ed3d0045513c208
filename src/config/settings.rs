//! Application settings

use crate::core::codec::{EncodingPolicy, LineEnding, TextEncoding};
use crate::core::transfer::DEFAULT_SEGMENTS;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings file errors
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    /// The file exists but could not be read
    #[error("Cannot read {path}: {source}")]
    Read {
        /// Settings file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The file is not valid TOML for [`AppConfig`]
    #[error("Invalid settings in {path}: {source}")]
    Parse {
        /// Settings file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Initial session toggles
    pub session: SessionSettings,
    /// File upload settings
    pub upload: UploadSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Load config from `path`, or from the default location when `None`
    ///
    /// A missing default file yields the defaults; an explicitly given file
    /// must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match super::config_file() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content).map_err(|source| ConfigLoadError::Parse {
                path: path.clone(),
                source,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound && !required => Ok(Self::default()),
            Err(source) => Err(ConfigLoadError::Read { path, source }),
        }
    }

    /// Parse settings from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Initial state of the session toggles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Line terminator appended to Text submissions
    pub line_ending: LineEnding,
    /// Text encoding
    pub encoding: TextEncoding,
    /// Handling of characters the encoding cannot represent
    pub encoding_policy: EncodingPolicy,
}

/// File upload settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Number of progress segments
    pub segments: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            segments: DEFAULT_SEGMENTS,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// Log directory, the platform data directory when unset
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
