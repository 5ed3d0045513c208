//! # serialmon Core Library
//!
//! Session engine of an interactive serial-port terminal:
//! - Serial ports (RS-232, USB-Serial adapters) with binary dump files
//! - Text, Hex and File input modes
//! - UTF-8 key assembly from raw keyboard bytes
//! - Chunked file upload with a progress bar
//!
//! ## Example
//!
//! ```rust,no_run
//! use serialmon_core::{
//!     DumpSinks, FsPaths, SerialConfig, SerialTransport, SessionController, SessionOptions,
//! };
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = SerialConfig::new("/dev/ttyUSB0", 115200).param("8,N,1")?;
//!     let transport = SerialTransport::open(config, DumpSinks::none())?;
//!     let controller =
//!         SessionController::new(SessionOptions::default(), Some(transport), FsPaths::new());
//!     assert!(controller.is_running());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;

// Re-exports for convenience
pub use crate::cli::{exit_code, Args, ExitCodes};
pub use crate::config::{AppConfig, ConfigLoadError};
pub use crate::core::codec::{CodecError, EncodingPolicy, LineEnding, TextEncoding};
pub use crate::core::display::{Channel, Display, Prompt, ScrollDirection};
pub use crate::core::input::{KeyMap, KeyboardSource, RawKey};
pub use crate::core::paths::{FsPaths, PathService};
pub use crate::core::session::{
    InputMode, Session, SessionController, SessionError, SessionOptions, Tick,
};
pub use crate::core::transfer::FileUploader;
pub use crate::core::transport::{
    DumpSinks, SerialConfig, SerialTransport, TransportError, TransportTrait,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
