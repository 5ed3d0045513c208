//! Core module containing the session engine of serialmon
//!
//! This module provides:
//! - Serial transport with dump tee
//! - Text, hex and line-ending codecs
//! - Keyboard decoding with UTF-8 assembly and key bindings
//! - Session state machine and event loop tick
//! - Submission history
//! - Chunked file upload with progress
//! - Display and path collaborator interfaces

pub mod codec;
pub mod display;
pub mod history;
pub mod input;
pub mod paths;
pub mod session;
pub mod transfer;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;
