//! Keyboard source reading crossterm events

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serialmon_core::{KeyboardSource, RawKey};
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

/// curses KEY_BTAB
const BACK_TAB: u32 = 353;

/// [`KeyboardSource`] over the terminal's event queue
///
/// Characters are handed out as their UTF-8 bytes, one key per byte, so the
/// session decoder sees the same byte stream a raw terminal would deliver.
pub struct CrosstermKeys {
    pending: VecDeque<RawKey>,
    idle_wait: Duration,
}

impl CrosstermKeys {
    /// Create a source that waits up to `idle_wait` for an event per poll
    pub fn new(idle_wait: Duration) -> Self {
        Self {
            pending: VecDeque::new(),
            idle_wait,
        }
    }
}

impl KeyboardSource for CrosstermKeys {
    fn poll(&mut self) -> io::Result<Option<RawKey>> {
        if let Some(key) = self.pending.pop_front() {
            return Ok(Some(key));
        }
        if !event::poll(self.idle_wait)? {
            return Ok(None);
        }
        self.pending.extend(translate(&event::read()?));
        Ok(self.pending.pop_front())
    }
}

/// Raw keys for one terminal event
pub fn translate(event: &Event) -> Vec<RawKey> {
    match event {
        Event::Resize(..) => vec![RawKey::Resize],
        Event::Key(key) if key.kind != KeyEventKind::Release => translate_key(key),
        _ => Vec::new(),
    }
}

fn translate_key(key: &KeyEvent) -> Vec<RawKey> {
    let raw = match key.code {
        KeyCode::Char(c)
            if key.modifiers.contains(KeyModifiers::CONTROL) && c.is_ascii_alphabetic() =>
        {
            RawKey::Byte(c.to_ascii_lowercase() as u8 - b'a' + 1)
        }
        KeyCode::Char(c) => {
            let mut buf = [0u8; 4];
            return c.encode_utf8(&mut buf).bytes().map(RawKey::Byte).collect();
        }
        KeyCode::Enter => RawKey::Enter,
        KeyCode::Tab => RawKey::Tab,
        KeyCode::BackTab => RawKey::Other(BACK_TAB),
        KeyCode::Backspace => RawKey::Backspace,
        KeyCode::Esc => RawKey::Escape,
        KeyCode::Up => RawKey::Up,
        KeyCode::Down => RawKey::Down,
        KeyCode::Left => RawKey::Left,
        KeyCode::Right => RawKey::Right,
        KeyCode::PageUp => RawKey::PageUp,
        KeyCode::PageDown => RawKey::PageDown,
        KeyCode::Home => RawKey::Home,
        KeyCode::End => RawKey::End,
        KeyCode::Insert => RawKey::Insert,
        KeyCode::Delete => RawKey::Delete,
        KeyCode::F(n) => RawKey::F(n),
        _ => return Vec::new(),
    };
    vec![raw]
}
