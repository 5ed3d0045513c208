//! Fakes shared by the unit tests

use crate::core::display::{Channel, Display, Prompt, ScrollDirection};
use crate::core::input::{KeyboardSource, RawKey};
use crate::core::transport::{TransportError, TransportTrait};
use bytes::Bytes;
use std::collections::VecDeque;
use std::io;

/// One recorded display call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shown {
    Message(String, Channel),
    Bytes(Vec<u8>, Channel),
    Hexdump(Vec<u8>, Channel),
    Scroll(ScrollDirection),
    Clear,
    Reset,
}

/// Display that records every call
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub calls: Vec<Shown>,
    pub prompt: String,
}

impl RecordingDisplay {
    pub fn messages(&self, channel: Channel) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Shown::Message(text, c) if *c == channel => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.messages(Channel::Error)
    }
}

impl Display for RecordingDisplay {
    fn message(&mut self, text: &str, channel: Channel) {
        self.calls.push(Shown::Message(text.to_string(), channel));
    }

    fn show(&mut self, data: &[u8], channel: Channel) {
        self.calls.push(Shown::Bytes(data.to_vec(), channel));
    }

    fn hexdump(&mut self, data: &[u8], channel: Channel) {
        self.calls.push(Shown::Hexdump(data.to_vec(), channel));
    }

    fn scroll(&mut self, direction: ScrollDirection) {
        self.calls.push(Shown::Scroll(direction));
    }

    fn prompt(&mut self, prompt: &Prompt<'_>) {
        self.prompt = prompt.buffer.to_string();
    }

    fn clear(&mut self) {
        self.calls.push(Shown::Clear);
    }

    fn reset(&mut self) {
        self.calls.push(Shown::Reset);
    }
}

/// Transport that records writes and replays scripted reads
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub writes: Vec<Vec<u8>>,
    pub inbound: VecDeque<Vec<u8>>,
    pub reads: usize,
    pub fail_writes: bool,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<u8> {
        self.writes.concat()
    }
}

impl TransportTrait for RecordingTransport {
    fn read(&mut self) -> Result<Bytes, TransportError> {
        self.reads += 1;
        Ok(self.inbound.pop_front().map(Bytes::from).unwrap_or_default())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "port gone").into());
        }
        self.writes.push(data.to_vec());
        Ok(())
    }

    fn connection_info(&self) -> String {
        "fake".to_string()
    }
}

/// Keyboard replaying a fixed key sequence, then reporting no keys
#[derive(Debug, Default)]
pub struct ScriptedKeys(pub VecDeque<RawKey>);

impl ScriptedKeys {
    pub fn text(text: &str) -> Self {
        Self(text.bytes().map(RawKey::Byte).collect())
    }

    pub fn push_text(&mut self, text: &str) {
        self.0.extend(text.bytes().map(RawKey::Byte));
    }

    pub fn push(&mut self, key: RawKey) {
        self.0.push_back(key);
    }
}

impl KeyboardSource for ScriptedKeys {
    fn poll(&mut self) -> io::Result<Option<RawKey>> {
        Ok(self.0.pop_front())
    }
}
