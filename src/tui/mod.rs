//! Terminal front end
//!
//! Keyboard input and screen output on top of crossterm. The session engine
//! only sees the [`KeyboardSource`](serialmon_core::KeyboardSource) and
//! [`Display`](serialmon_core::Display) implementations defined here.

mod keyboard;
mod pad;
mod screen;

pub use keyboard::CrosstermKeys;
pub use screen::TerminalDisplay;

use crossterm::{
    cursor::{MoveTo, Show},
    execute,
    style::ResetColor,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io;

/// Raw mode and alternate screen, restored on drop
pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    /// Switch the terminal to raw mode on the alternate screen
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = Self { active: true };
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            Clear(ClearType::All),
            MoveTo(0, 0)
        )?;
        Ok(guard)
    }

    /// Give the terminal back; later calls do nothing
    pub fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let mut stdout = io::stdout();
        let _ = execute!(stdout, ResetColor, Show, LeaveAlternateScreen);
        terminal::disable_raw_mode()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}
