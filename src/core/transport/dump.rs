//! Raw traffic dump files
//!
//! Bytes are written exactly as sent or received, without framing or
//! timestamps. Files are opened once in append mode and flushed after every
//! write.

use super::TransportError;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

type Sink = Box<dyn Write + Send>;

/// The `sent`, `received` and `all` dump sinks, each optional
#[derive(Default)]
pub struct DumpSinks {
    sent: Option<Sink>,
    received: Option<Sink>,
    all: Option<Sink>,
}

impl DumpSinks {
    /// No dumps at all
    pub fn none() -> Self {
        Self::default()
    }

    /// Open the configured dump files for appending
    pub fn open(
        sent: Option<&Path>,
        received: Option<&Path>,
        all: Option<&Path>,
    ) -> Result<Self, TransportError> {
        Ok(Self {
            sent: sent.map(open_append).transpose()?,
            received: received.map(open_append).transpose()?,
            all: all.map(open_append).transpose()?,
        })
    }

    /// Build from arbitrary writers
    pub fn from_writers(sent: Option<Sink>, received: Option<Sink>, all: Option<Sink>) -> Self {
        Self { sent, received, all }
    }

    /// Whether any sink is configured
    pub fn is_active(&self) -> bool {
        self.sent.is_some() || self.received.is_some() || self.all.is_some()
    }

    /// Tee outbound bytes to `sent` and `all`
    pub fn record_sent(&mut self, data: &[u8]) -> Result<(), TransportError> {
        append(&mut self.sent, data)?;
        append(&mut self.all, data)
    }

    /// Tee inbound bytes to `received` and `all`
    pub fn record_received(&mut self, data: &[u8]) -> Result<(), TransportError> {
        append(&mut self.received, data)?;
        append(&mut self.all, data)
    }
}

fn open_append(path: &Path) -> Result<Sink, TransportError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| TransportError::Dump {
            path: path.display().to_string(),
            source,
        })?;
    tracing::info!(path = %path.display(), "dump file opened");
    Ok(Box::new(BufWriter::new(file)))
}

fn append(sink: &mut Option<Sink>, data: &[u8]) -> Result<(), TransportError> {
    if let Some(sink) = sink.as_mut() {
        sink.write_all(data)?;
        sink.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_dumps_append_to_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let snd = dir.path().join("snd.bin");
        fs::write(&snd, b"old").unwrap();

        let mut sinks = DumpSinks::open(Some(snd.as_path()), None, None).unwrap();
        sinks.record_sent(b"new").unwrap();
        sinks.record_received(b"ignored").unwrap();

        assert_eq!(fs::read(&snd).unwrap(), b"oldnew");
    }

    #[test]
    fn test_all_interleaves_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let snd = dir.path().join("snd.bin");
        let rec = dir.path().join("rec.bin");
        let all = dir.path().join("all.bin");

        let mut sinks =
            DumpSinks::open(Some(snd.as_path()), Some(rec.as_path()), Some(all.as_path()))
                .unwrap();
        sinks.record_sent(b"AT\r").unwrap();
        sinks.record_received(b"OK\r\n").unwrap();
        sinks.record_sent(b"\x00\xff").unwrap();

        assert_eq!(fs::read(&snd).unwrap(), b"AT\r\x00\xff");
        assert_eq!(fs::read(&rec).unwrap(), b"OK\r\n");
        assert_eq!(fs::read(&all).unwrap(), b"AT\rOK\r\n\x00\xff");
    }

    #[test]
    fn test_unopenable_dump_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir").join("dump.bin");
        let err = DumpSinks::open(None, None, Some(missing.as_path())).err().unwrap();
        assert!(matches!(err, TransportError::Dump { .. }));
        assert!(!DumpSinks::none().is_active());
    }
}
