//! CLI Module
//!
//! Provides command-line interface functionality including:
//! - Argument parsing and validation
//! - Exit codes for fatal errors

pub mod args;
pub mod exit_codes;

pub use args::{Args, MAX_PADSIZE};
pub use exit_codes::{exit_code, ExitCodes};
