//! Server configuration
//!
//! Built with a builder; `from_args` applies the command line contract
//! (zero or one argument, the TCP port).

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;
use crate::room::MAX_CAPACITY;
use crate::transcript::DEFAULT_TRANSCRIPT_PATH;

/// Default listening port
pub const DEFAULT_PORT: u16 = 8989;

/// Default bind address (all interfaces)
pub const DEFAULT_ADDR: &str = "0.0.0.0";

/// Default pause between "room full" notices
pub const DEFAULT_FULL_ROOM_INTERVAL: Duration = Duration::from_secs(3);

/// Default per-connection outbound queue size
pub const DEFAULT_OUTBOUND_BUFFER: usize = 64;

/// Longest line read from a peer in one go; longer input is split
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    pub port: u16,
    pub max_participants: usize,
    pub transcript_path: PathBuf,
    pub full_room_interval: Duration,
    pub outbound_buffer: usize,
    pub max_line_bytes: usize,
}

/// Accumulates optional values and produces a config
#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    addr: String,
    port: u16,
    max_participants: usize,
    transcript_path: PathBuf,
    full_room_interval: Duration,
    outbound_buffer: usize,
    max_line_bytes: usize,
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder {
            addr: DEFAULT_ADDR.to_string(),
            port: DEFAULT_PORT,
            max_participants: MAX_CAPACITY,
            transcript_path: PathBuf::from(DEFAULT_TRANSCRIPT_PATH),
            full_room_interval: DEFAULT_FULL_ROOM_INTERVAL,
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }

    /// Build a config from command line arguments (program name excluded)
    ///
    /// More than one argument yields `AppError::Usage`.
    pub fn from_args<I>(args: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();
        let builder = Self::builder();

        match args.as_slice() {
            [] => Ok(builder.build()),
            [port] => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| AppError::InvalidPort(port.clone()))?;
                Ok(builder.port(port).build())
            }
            _ => Err(AppError::Usage),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ServerConfigBuilder {
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn max_participants(mut self, max: usize) -> Self {
        self.max_participants = max;
        self
    }

    pub fn transcript_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.transcript_path = path.into();
        self
    }

    pub fn full_room_interval(mut self, interval: Duration) -> Self {
        self.full_room_interval = interval;
        self
    }

    /// Zero is bumped to one, an mpsc channel needs room for a message
    pub fn outbound_buffer(mut self, size: usize) -> Self {
        self.outbound_buffer = size.max(1);
        self
    }

    /// Zero is bumped to one so a read always makes progress
    pub fn max_line_bytes(mut self, limit: usize) -> Self {
        self.max_line_bytes = limit.max(1);
        self
    }

    pub fn build(self) -> ServerConfig {
        ServerConfig {
            addr: self.addr,
            port: self.port,
            max_participants: self.max_participants,
            transcript_path: self.transcript_path,
            full_room_interval: self.full_room_interval,
            outbound_buffer: self.outbound_buffer,
            max_line_bytes: self.max_line_bytes,
        }
    }
}
