//! Command-line arguments

use crate::config::AppConfig;
use crate::core::codec::{EncodingPolicy, LineEnding, TextEncoding};
use crate::core::session::SessionOptions;
use crate::core::transport::{ConfigError, FlowControlFlags, SerialConfig};
use clap::Parser;
use std::path::PathBuf;

/// Largest accepted scrollback depth
pub const MAX_PADSIZE: usize = 32767;

/// Port name that runs the session without a device
pub const NO_PORT: &str = "none";

/// Interactive serial port terminal
#[derive(Parser, Debug, Clone)]
#[command(name = "serialmon", version, about, long_about = None)]
pub struct Args {
    /// Serial port device, or `none` to run without a port
    #[arg(default_value = "/dev/ttyUSB0")]
    pub port: String,

    /// Baud rate
    #[arg(short = 'r', long, default_value_t = 9600)]
    pub baudrate: u32,

    /// Port parameters as bytesize,parity,stopbits
    #[arg(short = 'p', long, default_value = "8,N,1")]
    pub param: String,

    /// Read timeout in seconds
    #[arg(short = 't', long, default_value_t = 0.05)]
    pub timeout: f64,

    /// Software flow control (XON/XOFF)
    #[arg(short = 'x', long)]
    pub xonxoff: bool,

    /// Hardware flow control (RTS/CTS)
    #[arg(short = 'c', long)]
    pub rtscts: bool,

    /// Hardware flow control (DSR/DTR)
    #[arg(short = 'd', long)]
    pub dsrdtr: bool,

    /// Do not lock the port for exclusive access
    #[arg(short = 'n', long)]
    pub nonexclusive: bool,

    /// Append all traffic to FILE
    #[arg(long, value_name = "FILE")]
    pub dumpall: Option<PathBuf>,

    /// Append received bytes to FILE
    #[arg(long, value_name = "FILE")]
    pub dumprec: Option<PathBuf>,

    /// Append sent bytes to FILE
    #[arg(long, value_name = "FILE")]
    pub dumpsnd: Option<PathBuf>,

    /// Scrollback depth in lines
    #[arg(short = 's', long, default_value_t = 2000)]
    pub padsize: usize,

    /// Largest uploaded file shown as a hexdump, in bytes
    #[arg(short = 'm', long, default_value_t = 4096)]
    pub maxfilehex: usize,

    /// Initial line ending (lf, crlf, cr, none)
    #[arg(long, value_name = "ENDING")]
    pub line_ending: Option<LineEnding>,

    /// Initial text encoding (utf8, ascii, latin1)
    #[arg(long)]
    pub encoding: Option<TextEncoding>,

    /// Unencodable characters: strict, substitute or ignore
    #[arg(long, value_name = "POLICY")]
    pub encoding_policy: Option<EncodingPolicy>,

    /// Settings file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Scrollback depth, capped at [`MAX_PADSIZE`]
    pub fn padsize(&self) -> usize {
        self.padsize.min(MAX_PADSIZE)
    }

    /// Hexdump preview limit, capped at 16 lines per scrollback line
    pub fn maxfilehex(&self) -> usize {
        self.maxfilehex.min(16 * self.padsize())
    }

    /// Whether a device should be opened
    pub fn has_port(&self) -> bool {
        self.port != NO_PORT
    }

    /// Serial configuration described by the arguments
    ///
    /// Parameters are validated even when running without a port.
    pub fn serial_config(&self) -> Result<SerialConfig, ConfigError> {
        Ok(SerialConfig::new(&self.port, self.baudrate)
            .param(&self.param)?
            .timeout_secs(self.timeout)?
            .flow_control(FlowControlFlags {
                xonxoff: self.xonxoff,
                rtscts: self.rtscts,
                dsrdtr: self.dsrdtr,
            })
            .exclusive(!self.nonexclusive))
    }

    /// Session options from the settings file, overridden by flags
    pub fn session_options(&self, config: &AppConfig) -> SessionOptions {
        SessionOptions {
            line_ending: self.line_ending.unwrap_or(config.session.line_ending),
            encoding: self.encoding.unwrap_or(config.session.encoding),
            encoding_policy: self
                .encoding_policy
                .unwrap_or(config.session.encoding_policy),
            upload_segments: config.upload.segments,
            preview_limit: self.maxfilehex(),
            exclusive: !self.nonexclusive,
        }
    }
}
