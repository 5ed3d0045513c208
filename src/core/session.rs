//! Session state machine and event loop tick
//!
//! The controller owns the session state, the optional transport and the
//! collaborators it needs to act on decoded keys. One call to
//! [`SessionController::tick`] polls the keyboard once and, only when no key
//! is pending, drains the transport.

use crate::core::codec::{
    backspace_hex, parse_hex_input, EncodingPolicy, LineEnding, TextEncoding,
};
use crate::core::display::{Channel, Display, Prompt};
use crate::core::history::History;
use crate::core::input::{Action, InputDecoder, KeyEvent, KeyMap, KeyboardSource, Toggle};
use crate::core::paths::PathService;
use crate::core::transfer::{FileUploader, UploadError, DEFAULT_PREVIEW_LIMIT, DEFAULT_SEGMENTS};
use crate::core::transport::{TransportError, TransportTrait};
use std::fmt;
use std::io;
use std::path::MAIN_SEPARATOR;
use thiserror::Error;

/// Input interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Text, encoded and terminated on submit
    #[default]
    Text,
    /// Hex digits, sent as the bytes they spell
    Hex,
    /// A file path, whose content is uploaded
    File,
}

impl InputMode {
    /// Next mode in toggle order
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Text => Self::Hex,
            Self::Hex => Self::File,
            Self::File => Self::Text,
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "Text"),
            Self::Hex => write!(f, "Hex"),
            Self::File => write!(f, "File"),
        }
    }
}

/// Fatal session errors
#[derive(Error, Debug)]
pub enum SessionError {
    /// Reading the keyboard failed
    #[error("Keyboard error: {0}")]
    Keyboard(#[from] io::Error),

    /// The transport failed
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Processed one keyboard event
    Key,
    /// No key was pending; the transport was drained (byte count)
    Drained(usize),
    /// No key was pending and there is no transport
    Idle,
}

/// Initial session settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Initial line terminator
    pub line_ending: LineEnding,
    /// Initial text encoding
    pub encoding: TextEncoding,
    /// Handling of unencodable characters
    pub encoding_policy: EncodingPolicy,
    /// Progress segments per upload
    pub upload_segments: usize,
    /// Largest upload shown as a hexdump
    pub preview_limit: usize,
    /// Whether the port was opened exclusively
    pub exclusive: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            line_ending: LineEnding::default(),
            encoding: TextEncoding::default(),
            encoding_policy: EncodingPolicy::default(),
            upload_segments: DEFAULT_SEGMENTS,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
            exclusive: true,
        }
    }
}

/// Mutable session state
#[derive(Debug, Clone)]
pub struct Session {
    running: bool,
    mode: InputMode,
    buffer: String,
    history: History,
    line_ending: LineEnding,
    encoding: TextEncoding,
    encoding_policy: EncodingPolicy,
    exclusive: bool,
}

impl Session {
    /// Fresh session in Text mode
    pub fn new(options: &SessionOptions) -> Self {
        Self {
            running: true,
            mode: InputMode::Text,
            buffer: String::new(),
            history: History::new(),
            line_ending: options.line_ending,
            encoding: options.encoding,
            encoding_policy: options.encoding_policy,
            exclusive: options.exclusive,
        }
    }

    /// Whether the loop should keep going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current input mode
    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Accumulated input
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Text submission history
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Selected line terminator
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Selected text encoding
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Whether the port is held exclusively
    pub fn exclusive(&self) -> bool {
        self.exclusive
    }

    /// Input line view for the display
    pub fn prompt(&self) -> Prompt<'_> {
        Prompt {
            mode: self.mode,
            buffer: &self.buffer,
            line_ending: self.line_ending,
            encoding: self.encoding,
        }
    }
}

/// Dispatches keyboard events and serial input for one session
pub struct SessionController<T: TransportTrait, P: PathService> {
    session: Session,
    decoder: InputDecoder,
    keymap: KeyMap,
    transport: Option<T>,
    uploader: FileUploader,
    paths: P,
}

impl<T: TransportTrait, P: PathService> SessionController<T, P> {
    /// Create a controller; `transport` is `None` when running without a port
    pub fn new(options: SessionOptions, transport: Option<T>, paths: P) -> Self {
        Self {
            session: Session::new(&options),
            decoder: InputDecoder::new(),
            keymap: KeyMap::default(),
            transport,
            uploader: FileUploader::new(options.upload_segments, options.preview_limit),
            paths,
        }
    }

    /// Replace the key bindings
    #[must_use]
    pub fn with_keymap(mut self, keymap: KeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    /// Session state
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Attached transport
    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    /// Whether the loop should keep going
    pub fn is_running(&self) -> bool {
        self.session.running
    }

    /// Stop the loop after the current tick
    pub fn stop(&mut self) {
        self.session.running = false;
    }

    /// Show the connection banner and the initial prompt
    pub fn start<D: Display + ?Sized>(&mut self, display: &mut D) {
        match &self.transport {
            Some(t) => display.info(&format!("Connected to {}\n\n", t.connection_info())),
            None => display.info("No port attached, input is not sent anywhere\n\n"),
        }
        display.prompt(&self.session.prompt());
    }

    /// Tick until the session ends or `interrupted` reports true
    pub fn run<K, D>(
        &mut self,
        keyboard: &mut K,
        display: &mut D,
        mut interrupted: impl FnMut() -> bool,
    ) -> Result<(), SessionError>
    where
        K: KeyboardSource + ?Sized,
        D: Display + ?Sized,
    {
        while self.session.running && !interrupted() {
            self.tick(keyboard, display)?;
        }
        Ok(())
    }

    /// One loop iteration: a keyboard event, or a serial drain when idle
    pub fn tick<K, D>(&mut self, keyboard: &mut K, display: &mut D) -> Result<Tick, SessionError>
    where
        K: KeyboardSource + ?Sized,
        D: Display + ?Sized,
    {
        let event = self
            .decoder
            .next_event(keyboard, self.session.mode, &self.keymap)?;

        if event == KeyEvent::Idle {
            let Some(transport) = self.transport.as_mut() else {
                return Ok(Tick::Idle);
            };
            let rx = transport.read()?;
            if !rx.is_empty() {
                display.show(&rx, Channel::Received);
            }
            return Ok(Tick::Drained(rx.len()));
        }

        tracing::debug!(?event, mode = %self.session.mode, "key event");
        self.handle(event, display)?;
        display.prompt(&self.session.prompt());
        Ok(Tick::Key)
    }

    fn handle<D: Display + ?Sized>(
        &mut self,
        event: KeyEvent,
        display: &mut D,
    ) -> Result<(), SessionError> {
        let session = &mut self.session;
        match event {
            KeyEvent::Idle => {}
            KeyEvent::Char(c) => session.buffer.push(c),
            KeyEvent::DecodeError(bytes) => {
                display.error(&format!("Invalid Input: {:02X?}\n", bytes));
            }
            KeyEvent::Submit => self.submit(display)?,
            KeyEvent::Complete => self.complete(display),
            KeyEvent::Backspace => {
                if session.mode == InputMode::Hex {
                    backspace_hex(&mut session.buffer);
                } else {
                    session.buffer.pop();
                }
            }
            KeyEvent::HistoryBack => {
                if let Some(entry) = session.history.back(&session.buffer) {
                    session.buffer = entry.to_string();
                }
            }
            KeyEvent::HistoryForward => {
                if let Some(entry) = session.history.forward() {
                    session.buffer = entry.to_string();
                }
            }
            KeyEvent::Scroll(direction) => display.scroll(direction),
            KeyEvent::Action(action) => self.perform(action, display),
            KeyEvent::Toggle(toggle) => self.cycle(toggle),
            KeyEvent::Resize => display.reset(),
            KeyEvent::Unmapped(key) => {
                display.info(&format!("Unmapped key {}\n", key.code()));
            }
        }
        Ok(())
    }

    fn perform<D: Display + ?Sized>(&mut self, action: Action, display: &mut D) {
        match action {
            Action::Quit => self.session.running = false,
            Action::Cancel => self.session.buffer.clear(),
            Action::ClearScreen => display.clear(),
            Action::Help => {
                let mut help = String::from("\nKey bindings:\n");
                for line in self.keymap.describe() {
                    help.push_str(&line);
                    help.push('\n');
                }
                help.push_str("   Enter  submit input\n");
                help.push_str("     Tab  complete path (File mode)\n");
                help.push_str(" Up/Down  history\n");
                help.push_str("PgUp/PgDn/Home/End  scroll\n\n");
                display.info(&help);
            }
        }
    }

    fn cycle(&mut self, toggle: Toggle) {
        let session = &mut self.session;
        match toggle {
            Toggle::InputMode => session.mode = session.mode.next(),
            Toggle::LineEnding => session.line_ending = session.line_ending.next(),
            Toggle::Encoding => session.encoding = session.encoding.next(),
        }
        tracing::debug!(
            mode = %session.mode,
            line_ending = %session.line_ending,
            encoding = %session.encoding,
            "toggled {toggle}"
        );
    }

    fn submit<D: Display + ?Sized>(&mut self, display: &mut D) -> Result<(), SessionError> {
        match self.session.mode {
            InputMode::Text => self.submit_text(display),
            InputMode::Hex => self.submit_hex(display),
            InputMode::File => self.submit_file(display),
        }
    }

    fn submit_text<D: Display + ?Sized>(&mut self, display: &mut D) -> Result<(), SessionError> {
        let session = &mut self.session;
        let line = format!("{}{}", session.buffer, session.line_ending.as_str());
        let encoded = match session.encoding.encode(&line, session.encoding_policy) {
            Ok(encoded) => encoded,
            Err(e) => {
                display.error(&format!("{e}\n"));
                return Ok(());
            }
        };

        display.show(line.as_bytes(), Channel::Sent);
        if encoded.affected > 0 {
            let verb = match session.encoding_policy {
                EncodingPolicy::Substitute => "replaced",
                _ => "dropped",
            };
            display.error(&format!(
                "{} character(s) not representable in {} were {}\n",
                encoded.affected, session.encoding, verb
            ));
        }

        let entry = std::mem::take(&mut session.buffer);
        session.history.push(entry);
        if let Some(transport) = self.transport.as_mut() {
            transport.write(&encoded.bytes)?;
        }
        Ok(())
    }

    fn submit_hex<D: Display + ?Sized>(&mut self, display: &mut D) -> Result<(), SessionError> {
        match parse_hex_input(&self.session.buffer) {
            Ok(bytes) => {
                display.show(&bytes, Channel::Sent);
                self.session.buffer.clear();
                if let Some(transport) = self.transport.as_mut() {
                    transport.write(&bytes)?;
                }
            }
            Err(e) => display.error(&format!("{e}\n")),
        }
        Ok(())
    }

    fn submit_file<D: Display + ?Sized>(&mut self, display: &mut D) -> Result<(), SessionError> {
        let resolution = self.paths.resolve(&self.session.buffer);
        let channel = if resolution.success {
            Channel::Info
        } else {
            Channel::Error
        };
        display.message(&format!("{}\n", resolution.message), channel);
        self.session.buffer.clear();

        let Some(source) = resolution.source else {
            return Ok(());
        };
        let transport = self
            .transport
            .as_mut()
            .map(|t| t as &mut dyn TransportTrait);
        match self.uploader.upload(source, transport, display) {
            Ok(_) => Ok(()),
            Err(UploadError::Read(e)) => {
                display.error(&format!("Cannot read file: {e}\n"));
                Ok(())
            }
            Err(UploadError::Transport(e)) => Err(e.into()),
        }
    }

    fn complete<D: Display + ?Sized>(&mut self, display: &mut D) {
        let buffer = &mut self.session.buffer;
        let mut matches = self.paths.complete(buffer);
        if matches.len() == 1 {
            let only = matches.remove(0);
            *buffer = only.path;
            if only.is_dir {
                buffer.push(MAIN_SEPARATOR);
            }
            return;
        }

        let mut listing = format!("\n\n----- {buffer}* -----\n\n");
        for candidate in &matches {
            listing.push_str(&candidate.to_string());
            listing.push('\n');
        }
        display.info(&listing);
    }
}
