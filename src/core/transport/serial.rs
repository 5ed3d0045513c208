//! Serial port transport implementation

use super::{DumpSinks, TransportError, TransportTrait};
use bytes::Bytes;
use serialport::{FlowControl, Parity, SerialPort};
use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Size of the buffer used for the first, timeout-bounded read of a drain
const READ_CHUNK: usize = 4096;

/// Serial parameter errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `--param` is not `bytesize,parity,stopbits`
    #[error("expected B,P,S (e.g. 8,N,1), got {0:?}")]
    ParamFormat(String),

    /// Byte size outside 5-8
    #[error("invalid byte size {0:?}, possible values: 5-8")]
    ByteSize(String),

    /// Unknown parity letter
    #[error("invalid parity {0:?}, possible values: N, E, O, M, S")]
    Parity(String),

    /// Unknown stop bit count
    #[error("invalid stop bits {0:?}, possible values: 1, 1.5, 2")]
    StopBits(String),

    /// Negative or non-finite timeout
    #[error("invalid timeout {0}")]
    Timeout(f64),
}

/// Number of data bits per character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    /// 5 bits
    Five,
    /// 6 bits
    Six,
    /// 7 bits
    Seven,
    /// 8 bits
    Eight,
}

impl DataBits {
    /// Bit count as a number
    pub fn bits(self) -> u8 {
        match self {
            Self::Five => 5,
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
        }
    }
}

impl FromStr for DataBits {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "5" => Ok(Self::Five),
            "6" => Ok(Self::Six),
            "7" => Ok(Self::Seven),
            "8" => Ok(Self::Eight),
            other => Err(ConfigError::ByteSize(other.to_string())),
        }
    }
}

impl From<DataBits> for serialport::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Five => serialport::DataBits::Five,
            DataBits::Six => serialport::DataBits::Six,
            DataBits::Seven => serialport::DataBits::Seven,
            DataBits::Eight => serialport::DataBits::Eight,
        }
    }
}

/// Serial port parity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SerialParity {
    /// No parity
    #[default]
    None,
    /// Even parity
    Even,
    /// Odd parity
    Odd,
    /// Parity bit always 1
    Mark,
    /// Parity bit always 0
    Space,
}

impl SerialParity {
    /// Single letter code as used in `8,N,1`
    pub fn code(self) -> char {
        match self {
            Self::None => 'N',
            Self::Even => 'E',
            Self::Odd => 'O',
            Self::Mark => 'M',
            Self::Space => 'S',
        }
    }

    fn to_backend(self) -> Result<Parity, TransportError> {
        match self {
            Self::None => Ok(Parity::None),
            Self::Even => Ok(Parity::Even),
            Self::Odd => Ok(Parity::Odd),
            Self::Mark | Self::Space => Err(TransportError::Unsupported(format!(
                "parity {} is not supported by the serial backend",
                self.code()
            ))),
        }
    }
}

impl FromStr for SerialParity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "N" => Ok(Self::None),
            "E" => Ok(Self::Even),
            "O" => Ok(Self::Odd),
            "M" => Ok(Self::Mark),
            "S" => Ok(Self::Space),
            _ => Err(ConfigError::Parity(s.trim().to_string())),
        }
    }
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    /// 1 stop bit
    One,
    /// 1.5 stop bits
    OnePointFive,
    /// 2 stop bits
    Two,
}

impl StopBits {
    /// Stop bit count as a number
    pub fn as_f32(self) -> f32 {
        match self {
            Self::One => 1.0,
            Self::OnePointFive => 1.5,
            Self::Two => 2.0,
        }
    }

    fn to_backend(self) -> Result<serialport::StopBits, TransportError> {
        match self {
            Self::One => Ok(serialport::StopBits::One),
            Self::Two => Ok(serialport::StopBits::Two),
            Self::OnePointFive => Err(TransportError::Unsupported(
                "1.5 stop bits are not supported by the serial backend".to_string(),
            )),
        }
    }
}

impl FromStr for StopBits {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f32 = s
            .trim()
            .parse()
            .map_err(|_| ConfigError::StopBits(s.trim().to_string()))?;
        if value == 1.0 {
            Ok(Self::One)
        } else if value == 1.5 {
            Ok(Self::OnePointFive)
        } else if value == 2.0 {
            Ok(Self::Two)
        } else {
            Err(ConfigError::StopBits(s.trim().to_string()))
        }
    }
}

impl fmt::Display for StopBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One => write!(f, "1"),
            Self::OnePointFive => write!(f, "1.5"),
            Self::Two => write!(f, "2"),
        }
    }
}

/// Flow control flags, passed through to the port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlowControlFlags {
    /// Software flow control (XON/XOFF)
    pub xonxoff: bool,
    /// Hardware flow control (RTS/CTS)
    pub rtscts: bool,
    /// Hardware flow control (DSR/DTR)
    pub dsrdtr: bool,
}

impl FlowControlFlags {
    fn to_backend(self) -> FlowControl {
        if self.dsrdtr {
            tracing::warn!("DSR/DTR flow control is not supported by the serial backend, ignoring");
        }
        if self.rtscts {
            if self.xonxoff {
                tracing::warn!("both RTS/CTS and XON/XOFF requested, using RTS/CTS");
            }
            FlowControl::Hardware
        } else if self.xonxoff {
            FlowControl::Software
        } else {
            FlowControl::None
        }
    }
}

/// Serial port configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SerialConfig {
    /// Port name (e.g., /dev/ttyUSB0, COM3)
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Data bits
    pub data_bits: DataBits,
    /// Parity
    pub parity: SerialParity,
    /// Stop bits
    pub stop_bits: StopBits,
    /// Read timeout; also the idle granularity of the session loop
    pub timeout: Duration,
    /// Flow control
    pub flow_control: FlowControlFlags,
    /// Request exclusive access (POSIX only)
    pub exclusive: bool,
}

impl SerialConfig {
    /// Create a new serial configuration with 8,N,1 and a 50 ms timeout
    pub fn new(port: &str, baud_rate: u32) -> Self {
        Self {
            port: port.to_string(),
            baud_rate,
            data_bits: DataBits::Eight,
            parity: SerialParity::None,
            stop_bits: StopBits::One,
            timeout: Duration::from_millis(50),
            flow_control: FlowControlFlags::default(),
            exclusive: true,
        }
    }

    /// Apply a `bytesize,parity,stopbits` string such as `8,N,1`
    pub fn param(mut self, param: &str) -> Result<Self, ConfigError> {
        let (data_bits, parity, stop_bits) = parse_param(param)?;
        self.data_bits = data_bits;
        self.parity = parity;
        self.stop_bits = stop_bits;
        Ok(self)
    }

    /// Set the read timeout in seconds
    pub fn timeout_secs(mut self, secs: f64) -> Result<Self, ConfigError> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(ConfigError::Timeout(secs));
        }
        self.timeout = Duration::from_secs_f64(secs);
        Ok(self)
    }

    /// Set flow control
    #[must_use]
    pub fn flow_control(mut self, flow: FlowControlFlags) -> Self {
        self.flow_control = flow;
        self
    }

    /// Set exclusive access
    #[must_use]
    pub fn exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    /// The `8,N,1` style summary
    pub fn param_string(&self) -> String {
        format!(
            "{},{},{}",
            self.data_bits.bits(),
            self.parity.code(),
            self.stop_bits
        )
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::new("/dev/ttyUSB0", 9600)
    }
}

/// Parse `bytesize,parity,stopbits`
pub fn parse_param(param: &str) -> Result<(DataBits, SerialParity, StopBits), ConfigError> {
    let parts: Vec<&str> = param.split(',').collect();
    let [bytesize, parity, stopbits] = parts.as_slice() else {
        return Err(ConfigError::ParamFormat(param.to_string()));
    };
    Ok((bytesize.parse()?, parity.parse()?, stopbits.parse()?))
}

/// The byte-level port operations the transport needs
pub trait RawPort: Read + Write {
    /// Number of bytes that can be read without blocking
    fn bytes_to_read(&self) -> io::Result<u32>;
}

impl RawPort for Box<dyn SerialPort> {
    fn bytes_to_read(&self) -> io::Result<u32> {
        SerialPort::bytes_to_read(&**self).map_err(io::Error::from)
    }
}

/// Serial port transport with dump tee
pub struct SerialTransport<P: RawPort = Box<dyn SerialPort>> {
    config: SerialConfig,
    port: P,
    dumps: DumpSinks,
    bytes_sent: u64,
    bytes_received: u64,
}

impl SerialTransport {
    /// Open the device described by `config`
    pub fn open(config: SerialConfig, dumps: DumpSinks) -> Result<Self, TransportError> {
        let builder = serialport::new(&config.port, config.baud_rate)
            .data_bits(config.data_bits.into())
            .parity(config.parity.to_backend()?)
            .stop_bits(config.stop_bits.to_backend()?)
            .flow_control(config.flow_control.to_backend())
            .timeout(config.timeout);

        let open_error = |source| TransportError::Open {
            port: config.port.clone(),
            source,
        };

        #[cfg(unix)]
        let port: Box<dyn SerialPort> = {
            let mut port = builder.open_native().map_err(open_error)?;
            port.set_exclusive(config.exclusive).map_err(open_error)?;
            Box::new(port)
        };

        #[cfg(not(unix))]
        let port: Box<dyn SerialPort> = {
            if !config.exclusive {
                tracing::warn!("non-exclusive access is only available on POSIX systems");
            }
            builder.open().map_err(open_error)?
        };

        tracing::info!(
            port = %config.port,
            baud = config.baud_rate,
            param = %config.param_string(),
            "serial port opened"
        );

        Ok(Self::with_port(config, port, dumps))
    }
}

impl<P: RawPort> SerialTransport<P> {
    /// Wrap an already opened port
    pub fn with_port(config: SerialConfig, port: P, dumps: DumpSinks) -> Self {
        Self {
            config,
            port,
            dumps,
            bytes_sent: 0,
            bytes_received: 0,
        }
    }

    /// The underlying port
    pub fn get_ref(&self) -> &P {
        &self.port
    }

    /// The configuration this transport was opened with
    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    /// Total bytes written and read so far
    pub fn totals(&self) -> (u64, u64) {
        (self.bytes_sent, self.bytes_received)
    }

    /// One read where a timeout counts as "nothing there"
    fn read_some(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }
}

impl<P: RawPort> TransportTrait for SerialTransport<P> {
    fn read(&mut self) -> Result<Bytes, TransportError> {
        let mut buf = [0u8; READ_CHUNK];
        let n = self.read_some(&mut buf)?;
        let mut rx = buf[..n].to_vec();

        loop {
            let waiting = self.port.bytes_to_read()? as usize;
            if waiting == 0 {
                break;
            }
            let mut chunk = vec![0u8; waiting];
            let n = self.read_some(&mut chunk)?;
            if n == 0 {
                break;
            }
            rx.extend_from_slice(&chunk[..n]);
        }

        if !rx.is_empty() {
            self.bytes_received += rx.len() as u64;
            self.dumps.record_received(&rx)?;
            tracing::trace!(len = rx.len(), "received");
        }
        Ok(Bytes::from(rx))
    }

    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.port.write_all(data)?;
        self.port.flush()?;
        self.bytes_sent += data.len() as u64;
        self.dumps.record_sent(data)?;
        tracing::trace!(len = data.len(), "sent");
        Ok(())
    }

    fn connection_info(&self) -> String {
        format!(
            "{} ({} baud, {})",
            self.config.port,
            self.config.baud_rate,
            self.config.param_string()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::fs;

    /// Port that hands out inbound data in bursts
    #[derive(Default)]
    struct BurstPort {
        bursts: VecDeque<Vec<u8>>,
        tx: Vec<u8>,
        flushes: usize,
        reads: usize,
    }

    impl Read for BurstPort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            let Some(mut burst) = self.bursts.pop_front() else {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "timed out"));
            };
            let n = burst.len().min(buf.len());
            buf[..n].copy_from_slice(&burst[..n]);
            if n < burst.len() {
                self.bursts.push_front(burst.split_off(n));
            }
            Ok(n)
        }
    }

    impl Write for BurstPort {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.tx.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    impl RawPort for BurstPort {
        fn bytes_to_read(&self) -> io::Result<u32> {
            Ok(self.bursts.front().map_or(0, |b| b.len() as u32))
        }
    }

    fn transport(bursts: &[&[u8]], dumps: DumpSinks) -> SerialTransport<BurstPort> {
        let port = BurstPort {
            bursts: bursts.iter().map(|b| b.to_vec()).collect(),
            ..Default::default()
        };
        SerialTransport::with_port(SerialConfig::default(), port, dumps)
    }

    #[test]
    fn test_parse_default_param() {
        let config = SerialConfig::new("/dev/ttyUSB0", 9600).param("8,N,1").unwrap();
        assert_eq!(config.port, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.data_bits.bits(), 8);
        assert_eq!(config.parity.code(), 'N');
        assert_eq!(config.stop_bits.as_f32(), 1.0);
    }

    #[test]
    fn test_parse_param_variants() {
        assert_eq!(
            parse_param("7,e,1.5").unwrap(),
            (DataBits::Seven, SerialParity::Even, StopBits::OnePointFive)
        );
        assert_eq!(
            parse_param("5, S ,2").unwrap(),
            (DataBits::Five, SerialParity::Space, StopBits::Two)
        );
        assert_eq!(parse_param("8,N,1.0").unwrap().2, StopBits::One);
    }

    #[test]
    fn test_parse_param_errors() {
        assert_eq!(parse_param("8,N"), Err(ConfigError::ParamFormat("8,N".into())));
        assert_eq!(parse_param("9,N,1"), Err(ConfigError::ByteSize("9".into())));
        assert_eq!(parse_param("8,X,1"), Err(ConfigError::Parity("X".into())));
        assert_eq!(parse_param("8,N,3"), Err(ConfigError::StopBits("3".into())));
        assert_eq!(parse_param("8,N,one"), Err(ConfigError::StopBits("one".into())));
    }

    #[test]
    fn test_timeout_validation() {
        let config = SerialConfig::default().timeout_secs(0.05).unwrap();
        assert_eq!(config.timeout, Duration::from_millis(50));
        assert!(SerialConfig::default().timeout_secs(-1.0).is_err());
        assert!(SerialConfig::default().timeout_secs(f64::NAN).is_err());
    }

    #[test]
    fn test_unsupported_backend_settings() {
        assert!(matches!(
            SerialParity::Mark.to_backend(),
            Err(TransportError::Unsupported(_))
        ));
        assert!(matches!(
            StopBits::OnePointFive.to_backend(),
            Err(TransportError::Unsupported(_))
        ));
        let flow = FlowControlFlags {
            xonxoff: true,
            ..Default::default()
        };
        assert_eq!(flow.to_backend(), FlowControl::Software);
    }

    #[test]
    fn test_read_drains_all_bursts() {
        let mut t = transport(&[b"AB", b"CDE", b"F"], DumpSinks::none());
        assert_eq!(&t.read().unwrap()[..], b"ABCDEF");
        assert_eq!(t.read().unwrap().len(), 0);
        assert_eq!(t.totals(), (0, 6));
    }

    #[test]
    fn test_read_with_nothing_pending_is_empty() {
        let mut t = transport(&[], DumpSinks::none());
        assert!(t.read().unwrap().is_empty());
        assert_eq!(t.get_ref().reads, 1);
    }

    #[test]
    fn test_write_flushes_and_tees() {
        let dir = tempfile::tempdir().unwrap();
        let snd = dir.path().join("snd");
        let rec = dir.path().join("rec");
        let all = dir.path().join("all");
        let dumps = DumpSinks::open(Some(&snd), Some(&rec), Some(&all)).unwrap();
        let mut t = transport(&[b"pong"], dumps);

        t.write(b"ping").unwrap();
        t.read().unwrap();
        t.write(b"!").unwrap();

        assert_eq!(t.get_ref().tx, b"ping!");
        assert_eq!(t.get_ref().flushes, 2);
        assert_eq!(fs::read(&snd).unwrap(), b"ping!");
        assert_eq!(fs::read(&rec).unwrap(), b"pong");
        assert_eq!(fs::read(&all).unwrap(), b"pingpong!");
    }

    #[test]
    fn test_connection_info() {
        let t = transport(&[], DumpSinks::none());
        assert_eq!(t.connection_info(), "/dev/ttyUSB0 (9600 baud, 8,N,1)");
    }
}
