//! Output interface the session engine renders through
//!
//! The engine never draws anything itself; it hands text and bytes to a
//! [`Display`] tagged with a [`Channel`] and lets the implementation decide
//! how to lay them out.

use crate::core::codec::{LineEnding, TextEncoding};
use crate::core::session::InputMode;

/// Output channel of a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Bytes received from the device
    Received,
    /// Bytes sent to the device
    Sent,
    /// Informational messages
    Info,
    /// Errors
    Error,
}

/// Scroll request for the scrollback pad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    /// One page towards older output
    PageUp,
    /// One page towards newer output
    PageDown,
    /// Oldest retained output
    Home,
    /// Newest output, following new data
    End,
}

/// What the input line should currently show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt<'a> {
    /// Current input mode
    pub mode: InputMode,
    /// Accumulated input
    pub buffer: &'a str,
    /// Selected line terminator
    pub line_ending: LineEnding,
    /// Selected text encoding
    pub encoding: TextEncoding,
}

/// Rendering collaborator consumed by the session controller
pub trait Display {
    /// Show a message
    fn message(&mut self, text: &str, channel: Channel);

    /// Show raw bytes as text
    fn show(&mut self, data: &[u8], channel: Channel);

    /// Show bytes as a hexdump
    fn hexdump(&mut self, data: &[u8], channel: Channel);

    /// Scroll the output
    fn scroll(&mut self, direction: ScrollDirection);

    /// Redraw the input line and status
    fn prompt(&mut self, prompt: &Prompt<'_>);

    /// Drop all visible output
    fn clear(&mut self);

    /// Re-layout after a terminal resize
    fn reset(&mut self);

    /// Show an informational message
    fn info(&mut self, text: &str) {
        self.message(text, Channel::Info);
    }

    /// Show an error message
    fn error(&mut self, text: &str) {
        self.message(text, Channel::Error);
    }
}
