//! Transport layer for the serial session
//!
//! Provides:
//! - Serial port configuration and parameter parsing
//! - A serial transport that tees every byte to optional dump files
//! - The [`TransportTrait`] seam the session controller is written against

mod dump;
mod serial;

pub use dump::DumpSinks;
pub use serial::{
    parse_param, ConfigError, DataBits, FlowControlFlags, RawPort, SerialConfig, SerialParity,
    SerialTransport, StopBits,
};

use bytes::Bytes;
use thiserror::Error;

/// Transport error types
#[derive(Error, Debug)]
pub enum TransportError {
    /// Serial parameters failed to parse or validate
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The device could not be opened
    #[error("Cannot open {port}: {source}")]
    Open {
        /// Device path
        port: String,
        /// Backend error
        #[source]
        source: serialport::Error,
    },

    /// A parsed setting the serial backend cannot express
    #[error("Unsupported setting: {0}")]
    Unsupported(String),

    /// A dump file could not be opened
    #[error("Cannot open dump file {path}: {source}")]
    Dump {
        /// Dump file path
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error on the port or a dump sink
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// The OS error code behind this error, if there is one
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::Io(e) | Self::Dump { source: e, .. } => e.raw_os_error(),
            _ => None,
        }
    }
}

/// Byte transport driven by the session loop
///
/// `read` never blocks longer than the configured timeout and `write` blocks
/// until the bytes are handed to the device.
pub trait TransportTrait {
    /// Drain whatever is currently available (possibly nothing)
    fn read(&mut self) -> Result<Bytes, TransportError>;

    /// Send all bytes and flush
    fn write(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Human readable connection description
    fn connection_info(&self) -> String;
}

impl<T: TransportTrait + ?Sized> TransportTrait for Box<T> {
    fn read(&mut self) -> Result<Bytes, TransportError> {
        (**self).read()
    }

    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        (**self).write(data)
    }

    fn connection_info(&self) -> String {
        (**self).connection_info()
    }
}
