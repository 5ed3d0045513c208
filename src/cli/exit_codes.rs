//! CLI Exit Codes
//!
//! A fatal error exits with the operating system error code found in its
//! cause chain, or with [`ExitCodes::GENERIC`] when there is none.

use std::error::Error;
use std::io;

/// Exit code constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodes;

impl ExitCodes {
    /// Success
    pub const SUCCESS: i32 = 0;

    /// Fatal error without an operating system error code
    pub const GENERIC: i32 = 100;
}

// POSIX errno values for serial backend errors that only carry a kind
const ENOENT: i32 = 2;
const EACCES: i32 = 13;
const ENODEV: i32 = 19;

/// Exit code for a fatal error
pub fn exit_code(err: &(dyn Error + 'static)) -> i32 {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(code) = os_code(e) {
            return code;
        }
        current = e.source();
    }
    ExitCodes::GENERIC
}

fn os_code(err: &(dyn Error + 'static)) -> Option<i32> {
    if let Some(e) = err.downcast_ref::<io::Error>() {
        return e.raw_os_error();
    }
    let e = err.downcast_ref::<serialport::Error>()?;
    match e.kind() {
        serialport::ErrorKind::NoDevice => Some(ENODEV),
        serialport::ErrorKind::Io(io::ErrorKind::NotFound) => Some(ENOENT),
        serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied) => Some(EACCES),
        _ => None,
    }
}
