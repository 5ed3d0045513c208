//! Screen layout: scrollback output, status line and input line

use super::pad::{wrap, Cell, Pad};
use crossterm::{
    cursor::{MoveTo, Show},
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use serialmon_core::core::codec::hexdump;
use serialmon_core::{Channel, Display, Prompt, ScrollDirection};
use std::io::{self, Write};
use unicode_width::UnicodeWidthChar;

const HEXDUMP_WIDTH: usize = 16;

fn color(channel: Channel) -> Color {
    match channel {
        Channel::Received => Color::Reset,
        Channel::Sent => Color::Cyan,
        Channel::Info => Color::Yellow,
        Channel::Error => Color::Red,
    }
}

/// [`Display`] drawing to a crossterm terminal
///
/// The bottom two rows hold the status line and the input line; everything
/// above shows the scrollback pad, `offset` rows up from its end.
pub struct TerminalDisplay<W: Write> {
    out: W,
    pad: Pad,
    cols: u16,
    rows: u16,
    offset: usize,
    status: String,
    input: String,
    partial_rx: Vec<u8>,
}

impl<W: Write> TerminalDisplay<W> {
    /// Create a display keeping `padsize` lines of scrollback
    pub fn new(out: W, padsize: usize, (cols, rows): (u16, u16)) -> Self {
        Self {
            out,
            pad: Pad::new(padsize),
            cols,
            rows,
            offset: 0,
            status: String::new(),
            input: String::new(),
            partial_rx: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn pad(&self) -> &Pad {
        &self.pad
    }

    fn output_height(&self) -> usize {
        usize::from(self.rows.saturating_sub(2)).max(1)
    }

    fn refresh(&mut self, full: bool) {
        let result = if full {
            self.render()
        } else {
            self.render_prompt()
        };
        if let Err(e) = result {
            tracing::warn!("screen update failed: {e}");
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let width = usize::from(self.cols).max(1);
        let height = self.output_height();
        let wanted = self.offset.saturating_add(height);

        // bottom-up, only as far back as the view needs
        let mut rows: Vec<&[Cell]> = Vec::new();
        for line in self.pad.lines().rev() {
            rows.extend(wrap(line, width).into_iter().rev());
            if rows.len() >= wanted {
                break;
            }
        }
        if rows.len() < wanted {
            self.offset = rows.len().saturating_sub(height);
        }

        let start = self.offset.min(rows.len());
        let end = (start + height).min(rows.len());
        let visible = &rows[start..end];
        for y in 0..height {
            queue!(self.out, MoveTo(0, y as u16), Clear(ClearType::CurrentLine))?;
            let Some(row) = visible.len().checked_sub(y + 1).map(|i| visible[i]) else {
                continue;
            };
            let mut rest = row;
            while let Some(first) = rest.first() {
                let run = rest
                    .iter()
                    .take_while(|c| c.channel == first.channel)
                    .count();
                let text: String = rest[..run].iter().map(|c| c.ch).collect();
                queue!(self.out, SetForegroundColor(color(first.channel)), Print(text))?;
                rest = &rest[run..];
            }
            queue!(self.out, ResetColor)?;
        }

        self.render_prompt()
    }

    fn render_prompt(&mut self) -> io::Result<()> {
        let width = usize::from(self.cols);
        let mut status = self.status.clone();
        if self.offset > 0 {
            status.push_str(&format!(" | scrolled back {} rows", self.offset));
        }

        queue!(
            self.out,
            MoveTo(0, self.rows.saturating_sub(2)),
            SetAttribute(Attribute::Reverse),
            Print(fit(&status, width)),
            SetAttribute(Attribute::Reset),
            MoveTo(0, self.rows.saturating_sub(1)),
            Clear(ClearType::CurrentLine),
            Print(tail(&self.input, width.saturating_sub(1))),
            Show
        )?;
        self.out.flush()
    }
}

impl<W: Write> Display for TerminalDisplay<W> {
    fn message(&mut self, text: &str, channel: Channel) {
        self.pad.write(text, channel);
        self.refresh(true);
    }

    fn show(&mut self, data: &[u8], channel: Channel) {
        let text = if channel == Channel::Received {
            decode_stream(&mut self.partial_rx, data)
        } else {
            String::from_utf8_lossy(data).into_owned()
        };
        self.message(&text, channel);
    }

    fn hexdump(&mut self, data: &[u8], channel: Channel) {
        self.message(&hexdump(data, HEXDUMP_WIDTH), channel);
    }

    fn scroll(&mut self, direction: ScrollDirection) {
        let page = self.output_height();
        self.offset = match direction {
            ScrollDirection::PageUp => self.offset.saturating_add(page),
            ScrollDirection::PageDown => self.offset.saturating_sub(page),
            ScrollDirection::Home => usize::MAX,
            ScrollDirection::End => 0,
        };
        self.refresh(true);
    }

    fn prompt(&mut self, prompt: &Prompt<'_>) {
        self.status = format!(
            " serialmon | {} | EOL {} | {} | F1 help",
            prompt.mode, prompt.line_ending, prompt.encoding
        );
        self.input = format!("{}> {}", prompt.mode, prompt.buffer);
        self.refresh(false);
    }

    fn clear(&mut self) {
        self.pad.clear();
        self.offset = 0;
        self.refresh(true);
    }

    fn reset(&mut self) {
        if let Ok((cols, rows)) = terminal::size() {
            self.cols = cols;
            self.rows = rows;
        }
        tracing::debug!(cols = self.cols, rows = self.rows, "terminal resized");
        if let Err(e) = queue!(self.out, Clear(ClearType::All)) {
            tracing::warn!("screen update failed: {e}");
        }
        self.refresh(true);
    }
}

/// Decode received bytes, holding back a multi-byte sequence split across reads
fn decode_stream(partial: &mut Vec<u8>, data: &[u8]) -> String {
    partial.extend_from_slice(data);
    let mut text = String::new();
    let mut rest: &[u8] = partial;
    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                text.push_str(valid);
                rest = &[];
                break;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                text.push_str(&String::from_utf8_lossy(valid));
                match e.error_len() {
                    Some(n) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        rest = &after[n..];
                    }
                    None => {
                        rest = after;
                        break;
                    }
                }
            }
        }
    }
    let tail = rest.to_vec();
    *partial = tail;
    text
}

/// `text` cut or padded to exactly `width` columns
fn fit(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.extend(std::iter::repeat(' ').take(width - used));
    out
}

/// The end of `text` that fits in `width` columns
fn tail(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut start = text.len();
    for (i, ch) in text.char_indices().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = i;
    }
    text[start..].to_string()
}
