//! Scrollback pad
//!
//! A ring buffer of output lines, independent of the terminal size. The
//! screen lays the pad out for the current width on every redraw, so a
//! resize only changes the layout, never the content.

use serialmon_core::Channel;
use std::collections::VecDeque;
use unicode_width::UnicodeWidthChar;

const TAB_WIDTH: usize = 8;

/// One character of output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub channel: Channel,
}

/// Output lines, oldest first, capped at `capacity`
#[derive(Debug)]
pub struct Pad {
    lines: VecDeque<Vec<Cell>>,
    capacity: usize,
    column: usize,
}

impl Pad {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::from([Vec::new()]),
            capacity: capacity.max(1),
            column: 0,
        }
    }

    /// Append text; `\r` returns to the start of the line and overwrites
    pub fn write(&mut self, text: &str, channel: Channel) {
        for ch in text.chars() {
            match ch {
                '\n' => self.newline(),
                '\r' => self.column = 0,
                '\t' => {
                    for _ in 0..TAB_WIDTH - self.column % TAB_WIDTH {
                        self.put(' ', channel);
                    }
                }
                c if c.is_control() => {
                    self.put('^', channel);
                    self.put(caret(c), channel);
                }
                c => self.put(c, channel),
            }
        }
    }

    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &[Cell]> {
        self.lines.iter().map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.lines.push_back(Vec::new());
        self.column = 0;
    }

    fn put(&mut self, ch: char, channel: Channel) {
        let Some(line) = self.lines.back_mut() else {
            return;
        };
        let cell = Cell { ch, channel };
        match line.get_mut(self.column) {
            Some(slot) => *slot = cell,
            None => line.push(cell),
        }
        self.column += 1;
    }

    fn newline(&mut self) {
        self.lines.push_back(Vec::new());
        self.column = 0;
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }
}

/// Printable stand-in for a control character, as in `^C`
fn caret(c: char) -> char {
    char::from_u32(c as u32 ^ 0x40)
        .filter(char::is_ascii_graphic)
        .unwrap_or('?')
}

/// Split a line into rows no wider than `width` columns
pub fn wrap(line: &[Cell], width: usize) -> Vec<&[Cell]> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut start = 0;
    let mut used = 0;
    for (i, cell) in line.iter().enumerate() {
        let w = cell.ch.width().unwrap_or(0);
        if used + w > width && i > start {
            rows.push(&line[start..i]);
            start = i;
            used = 0;
        }
        used += w;
    }
    rows.push(&line[start..]);
    rows
}
