use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use log::warn;

/// Bytes requested by every blocking read.
pub const DEFAULT_READ_BUF_SIZE: usize = 100;

/// How long the close-while-reading scenario waits before closing under the
/// pending read. Only needs to exceed the time it takes the read to block.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

pub const DEFAULT_PAYLOAD: &[u8] = b"hello";

/// Overrides the settle delay, in milliseconds.
pub const SETTLE_DELAY_ENV: &str = "HANGUP_SETTLE_DELAY_MS";

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub bind_addr: SocketAddr,
    pub read_buf_size: usize,
    pub payload: Vec<u8>,
    pub settle_delay: Duration,
}

impl HarnessConfig {
    pub fn new() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
            read_buf_size: DEFAULT_READ_BUF_SIZE,
            payload: DEFAULT_PAYLOAD.to_vec(),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Defaults, with the settle delay taken from [`SETTLE_DELAY_ENV`] when
    /// it holds a valid number.
    pub fn from_env() -> Self {
        let config = Self::new();
        match std::env::var(SETTLE_DELAY_ENV) {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => config.with_settle_delay(Duration::from_millis(ms)),
                Err(e) => {
                    warn!("Ignoring {}={:?}: {}", SETTLE_DELAY_ENV, raw, e);
                    config
                }
            },
            Err(_) => config,
        }
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    pub fn with_read_buf_size(mut self, size: usize) -> Self {
        self.read_buf_size = size;
        self
    }

    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new()
    }
}
