//! Keyboard input decoding
//!
//! A [`KeyboardSource`] is polled once per tick and yields raw keys: single
//! input bytes (which may be fragments of a UTF-8 sequence) or named keys.
//! [`InputDecoder`] turns them into logical [`KeyEvent`]s for the session
//! controller.

mod keymap;

pub use keymap::{Action, KeyMap, Toggle};

use crate::core::display::ScrollDirection;
use crate::core::session::InputMode;
use std::fmt;
use std::io;

/// Lead bytes of multi-byte UTF-8 sequences
const UTF8_LEAD: std::ops::RangeInclusive<u8> = 0xC0..=0xF7;

/// Continuation bytes of multi-byte UTF-8 sequences
const UTF8_CONTINUATION: std::ops::RangeInclusive<u8> = 0x80..=0xBF;

/// A raw key as delivered by the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawKey {
    /// One byte of typed input, including control bytes
    Byte(u8),
    /// Enter / Return
    Enter,
    /// Tab
    Tab,
    /// Backspace
    Backspace,
    /// Escape
    Escape,
    /// Arrow up
    Up,
    /// Arrow down
    Down,
    /// Arrow left
    Left,
    /// Arrow right
    Right,
    /// Page up
    PageUp,
    /// Page down
    PageDown,
    /// Home
    Home,
    /// End
    End,
    /// Insert
    Insert,
    /// Delete
    Delete,
    /// Function key F1..F63
    F(u8),
    /// The terminal was resized
    Resize,
    /// Any other key, by numeric code
    Other(u32),
}

impl RawKey {
    /// Numeric key code, using curses numbering for named keys
    pub fn code(self) -> u32 {
        match self {
            Self::Byte(b) => u32::from(b),
            Self::Enter => 10,
            Self::Tab => 9,
            Self::Escape => 27,
            Self::Down => 258,
            Self::Up => 259,
            Self::Left => 260,
            Self::Right => 261,
            Self::Home => 262,
            Self::Backspace => 263,
            Self::F(n) => 264 + u32::from(n),
            Self::Delete => 330,
            Self::Insert => 331,
            Self::PageDown => 338,
            Self::PageUp => 339,
            Self::End => 360,
            Self::Resize => 410,
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for RawKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(b @ 0x01..=0x1a) => write!(f, "Ctrl+{}", char::from(b + 0x40)),
            Self::Byte(b) if b.is_ascii_graphic() => write!(f, "{}", char::from(*b)),
            Self::Byte(b) => write!(f, "0x{b:02x}"),
            Self::Escape => write!(f, "Esc"),
            Self::PageUp => write!(f, "PgUp"),
            Self::PageDown => write!(f, "PgDn"),
            Self::F(n) => write!(f, "F{n}"),
            Self::Other(code) => write!(f, "key {code}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Non-blocking key source
pub trait KeyboardSource {
    /// Next raw key, or `None` when no key is pending this tick
    fn poll(&mut self) -> io::Result<Option<RawKey>>;
}

/// A decoded keyboard event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    /// No key this tick
    Idle,
    /// Printable ASCII or an assembled multi-byte codepoint
    Char(char),
    /// Multi-byte sequence that is not valid UTF-8
    DecodeError(Vec<u8>),
    /// Enter
    Submit,
    /// Path completion request (File mode)
    Complete,
    /// Delete the last character (or hex pair)
    Backspace,
    /// Move to an older history entry
    HistoryBack,
    /// Move to a newer history entry
    HistoryForward,
    /// Scroll the output
    Scroll(ScrollDirection),
    /// Bound action
    Action(Action),
    /// Bound toggle
    Toggle(Toggle),
    /// Terminal resized
    Resize,
    /// Key without a meaning, reported for diagnostics
    Unmapped(RawKey),
}

/// Turns raw keys into [`KeyEvent`]s
#[derive(Debug, Default)]
pub struct InputDecoder {
    /// Key that ended a multi-byte assembly, decoded on the next call
    pushback: Option<RawKey>,
}

impl InputDecoder {
    /// Create a decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Poll `source` once and decode the result
    pub fn next_event<K: KeyboardSource + ?Sized>(
        &mut self,
        source: &mut K,
        mode: InputMode,
        keymap: &KeyMap,
    ) -> io::Result<KeyEvent> {
        let key = match self.pushback.take() {
            Some(key) => key,
            None => match source.poll()? {
                Some(key) => key,
                None => return Ok(KeyEvent::Idle),
            },
        };

        let event = match key {
            RawKey::Byte(b @ 32..=126) => KeyEvent::Char(char::from(b)),
            RawKey::Byte(b) if UTF8_LEAD.contains(&b) && mode != InputMode::Hex => {
                self.assemble(b, source)?
            }
            RawKey::Enter | RawKey::Byte(b'\n' | b'\r') => KeyEvent::Submit,
            RawKey::Tab | RawKey::Byte(b'\t') if mode == InputMode::File => KeyEvent::Complete,
            RawKey::Backspace | RawKey::Byte(0x08 | 0x7f) => KeyEvent::Backspace,
            RawKey::Up => KeyEvent::HistoryBack,
            RawKey::Down => KeyEvent::HistoryForward,
            RawKey::PageUp => KeyEvent::Scroll(ScrollDirection::PageUp),
            RawKey::PageDown => KeyEvent::Scroll(ScrollDirection::PageDown),
            RawKey::Home => KeyEvent::Scroll(ScrollDirection::Home),
            RawKey::End => KeyEvent::Scroll(ScrollDirection::End),
            key => {
                if let Some(action) = keymap.action(key) {
                    KeyEvent::Action(action)
                } else if let Some(toggle) = keymap.toggle(key) {
                    KeyEvent::Toggle(toggle)
                } else if key == RawKey::Resize {
                    KeyEvent::Resize
                } else {
                    KeyEvent::Unmapped(key)
                }
            }
        };
        Ok(event)
    }

    /// Collect continuation bytes after `lead` and decode them as one codepoint
    fn assemble<K: KeyboardSource + ?Sized>(
        &mut self,
        lead: u8,
        source: &mut K,
    ) -> io::Result<KeyEvent> {
        let mut bytes = vec![lead];
        loop {
            match source.poll()? {
                Some(RawKey::Byte(b)) if UTF8_CONTINUATION.contains(&b) => bytes.push(b),
                Some(other) => {
                    self.pushback = Some(other);
                    break;
                }
                None => break,
            }
        }

        let decoded = std::str::from_utf8(&bytes).ok().and_then(|s| {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        });
        Ok(match decoded {
            Some(c) => KeyEvent::Char(c),
            None => {
                tracing::debug!(?bytes, "invalid multi-byte key sequence");
                KeyEvent::DecodeError(bytes)
            }
        })
    }
}
