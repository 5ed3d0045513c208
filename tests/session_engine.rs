//! End-to-end tests of the session engine over a fake serial port

use serialmon_core::core::transport::RawPort;
use serialmon_core::{
    Channel, Display, DumpSinks, FsPaths, KeyboardSource, Prompt, RawKey, ScrollDirection,
    SerialConfig, SerialTransport, SessionController, SessionOptions, Tick,
};
use std::collections::VecDeque;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

/// Port delivering one scripted chunk per read and recording writes
#[derive(Default)]
struct FakePort {
    inbound: VecDeque<Vec<u8>>,
    writes: Vec<Vec<u8>>,
    reads: usize,
}

impl Read for FakePort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        match self.inbound.pop_front() {
            Some(chunk) => {
                buf[..chunk.len()].copy_from_slice(&chunk);
                Ok(chunk.len())
            }
            None => Err(io::ErrorKind::TimedOut.into()),
        }
    }
}

impl Write for FakePort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl RawPort for FakePort {
    fn bytes_to_read(&self) -> io::Result<u32> {
        Ok(0)
    }
}

#[derive(Default)]
struct Screen {
    output: Vec<(String, Channel)>,
}

impl Screen {
    fn text(&self, channel: Channel) -> String {
        self.output
            .iter()
            .filter(|(_, c)| *c == channel)
            .map(|(t, _)| t.as_str())
            .collect()
    }
}

impl Display for Screen {
    fn message(&mut self, text: &str, channel: Channel) {
        self.output.push((text.to_string(), channel));
    }

    fn show(&mut self, data: &[u8], channel: Channel) {
        self.message(&String::from_utf8_lossy(data), channel);
    }

    fn hexdump(&mut self, data: &[u8], channel: Channel) {
        self.message(&format!("<hexdump {} bytes>", data.len()), channel);
    }

    fn scroll(&mut self, _: ScrollDirection) {}

    fn prompt(&mut self, _: &Prompt<'_>) {}

    fn clear(&mut self) {
        self.output.clear();
    }

    fn reset(&mut self) {}
}

struct Keys(VecDeque<RawKey>);

impl Keys {
    fn new() -> Self {
        Self(VecDeque::new())
    }

    fn text(mut self, text: &str) -> Self {
        self.0.extend(text.bytes().map(RawKey::Byte));
        self
    }

    fn key(mut self, key: RawKey) -> Self {
        self.0.push_back(key);
        self
    }
}

impl KeyboardSource for Keys {
    fn poll(&mut self) -> io::Result<Option<RawKey>> {
        Ok(self.0.pop_front())
    }
}

type Controller = SessionController<SerialTransport<FakePort>, FsPaths>;

fn controller(port: FakePort, dumps: DumpSinks) -> Controller {
    let transport = SerialTransport::with_port(SerialConfig::default(), port, dumps);
    SessionController::new(SessionOptions::default(), Some(transport), FsPaths::new())
}

fn run_until_idle(c: &mut Controller, keys: &mut Keys, screen: &mut Screen) {
    while c.tick(keys, screen).unwrap() == Tick::Key {}
}

fn port(c: &Controller) -> &FakePort {
    c.transport().unwrap().get_ref()
}

fn dumps(dir: &Path) -> DumpSinks {
    DumpSinks::open(
        Some(dir.join("sent.bin").as_path()),
        Some(dir.join("rec.bin").as_path()),
        Some(dir.join("all.bin").as_path()),
    )
    .unwrap()
}

#[test]
fn text_and_hex_reach_port_and_dumps() {
    let dir = tempfile::tempdir().unwrap();
    let mut fake = FakePort::default();
    fake.inbound.push_back(b"OK\r\n".to_vec());
    let mut c = controller(fake, dumps(dir.path()));
    let mut screen = Screen::default();

    c.start(&mut screen);
    assert!(screen.text(Channel::Info).starts_with("Connected to /dev/ttyUSB0 (9600 baud, 8,N,1)"));

    let mut keys = Keys::new()
        .text("AT")
        .key(RawKey::Enter)
        .key(RawKey::F(2))
        .text("FF00")
        .key(RawKey::Enter);
    run_until_idle(&mut c, &mut keys, &mut screen);

    assert_eq!(port(&c).writes.concat(), b"AT\r\n\xff\x00");
    assert_eq!(screen.text(Channel::Received), "OK\r\n");
    assert_eq!(fs::read(dir.path().join("sent.bin")).unwrap(), b"AT\r\n\xff\x00");
    assert_eq!(fs::read(dir.path().join("rec.bin")).unwrap(), b"OK\r\n");
    assert_eq!(
        fs::read(dir.path().join("all.bin")).unwrap(),
        b"AT\r\n\xff\x00OK\r\n"
    );
    assert_eq!(c.transport().unwrap().totals(), (6, 4));
}

#[test]
fn invalid_hex_sends_nothing() {
    let mut c = controller(FakePort::default(), DumpSinks::none());
    let mut screen = Screen::default();
    let mut keys = Keys::new()
        .key(RawKey::F(2))
        .text("ABC")
        .key(RawKey::Enter)
        .text("G0")
        .key(RawKey::Enter);
    run_until_idle(&mut c, &mut keys, &mut screen);

    assert!(port(&c).writes.is_empty());
    assert_eq!(c.session().buffer(), "ABCG0");
    assert_eq!(screen.text(Channel::Error).lines().count(), 2);
}

#[test]
fn file_upload_sends_whole_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("image.bin");
    let content: Vec<u8> = (0..1000u32).map(|i| (i * 7 % 256) as u8).collect();
    fs::write(&path, &content).unwrap();

    let mut c = controller(FakePort::default(), DumpSinks::none());
    let mut screen = Screen::default();
    let mut keys = Keys::new()
        .key(RawKey::F(2))
        .key(RawKey::F(2))
        .text(&path.display().to_string())
        .key(RawKey::Enter);
    run_until_idle(&mut c, &mut keys, &mut screen);

    let writes = &port(&c).writes;
    assert_eq!(writes.concat(), content);
    assert!(writes.len() <= 40);
    assert!(screen.text(Channel::Info).contains("Transmission done."));
    assert!(screen.text(Channel::Sent).contains("<hexdump 1000 bytes>"));
}

#[test]
fn key_stream_defers_serial_reads() {
    let dir = tempfile::tempdir().unwrap();
    let mut fake = FakePort::default();
    fake.inbound.push_back(b"boot\n".to_vec());
    let mut c = controller(fake, dumps(dir.path()));
    let mut screen = Screen::default();
    let mut keys = Keys::new().text(&"k".repeat(300));

    for _ in 0..300 {
        assert_eq!(c.tick(&mut keys, &mut screen).unwrap(), Tick::Key);
    }
    assert_eq!(port(&c).reads, 0);
    assert!(fs::read(dir.path().join("rec.bin")).unwrap().is_empty());

    assert_eq!(c.tick(&mut keys, &mut screen).unwrap(), Tick::Drained(5));
    assert_eq!(fs::read(dir.path().join("rec.bin")).unwrap(), b"boot\n");
}

#[test]
fn quit_key_stops_session() {
    let mut c = controller(FakePort::default(), DumpSinks::none());
    let mut screen = Screen::default();
    let mut keys = Keys::new().text("half typed").key(RawKey::F(10));
    run_until_idle(&mut c, &mut keys, &mut screen);
    assert!(!c.is_running());
    assert!(port(&c).writes.is_empty());
}
