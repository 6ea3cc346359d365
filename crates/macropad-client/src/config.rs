//! Client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use macropad_frame::{DEFAULT_MAX_BUFFER, FrameCodec, FrameMode, MAGIC_WORD};
use macropad_transport::UsbTarget;

use crate::error::{ClientError, ClientResult};

/// Bytes requested per bulk read
pub const DEFAULT_READ_CHUNK: usize = 2048;
/// Overall per-request deadline
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
/// Pause after an empty read
pub const DEFAULT_EMPTY_READ_BACKOFF_MS: u64 = 50;
/// Pause after a raw-mode chunk that did not complete a document
pub const DEFAULT_DECODE_BACKOFF_MS: u64 = 20;
/// Quiet period that ends a stale-byte drain
pub const DEFAULT_DRAIN_WINDOW_MS: u64 = 20;
/// Entries kept in the debug log
pub const DEFAULT_DEBUG_LOG_CAPACITY: usize = 50;

/// Settings for one device session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Device and endpoints to open
    pub target: UsbTarget,
    /// Framing used on the wire
    pub frame_mode: FrameMode,
    /// Magic word for framed mode
    pub magic_word: u32,
    /// Largest payload or raw buffer accepted
    pub max_buffer_bytes: usize,
    /// Bytes requested per bulk read
    pub read_chunk_size: usize,
    /// Per-request deadline in milliseconds
    pub request_timeout_ms: u64,
    /// Pause after an empty read in milliseconds
    pub empty_read_backoff_ms: u64,
    /// Pause after an incomplete raw-mode chunk in milliseconds
    pub decode_backoff_ms: u64,
    /// Quiet period that ends a stale-byte drain in milliseconds
    pub drain_window_ms: u64,
    /// Report a correlation mismatch, not a timeout, when only replies to
    /// earlier commands arrive before the deadline
    pub verify_correlation: bool,
    /// Entries kept in the debug log
    pub debug_log_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            target: UsbTarget::default(),
            frame_mode: FrameMode::default(),
            magic_word: MAGIC_WORD,
            max_buffer_bytes: DEFAULT_MAX_BUFFER,
            read_chunk_size: DEFAULT_READ_CHUNK,
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            empty_read_backoff_ms: DEFAULT_EMPTY_READ_BACKOFF_MS,
            decode_backoff_ms: DEFAULT_DECODE_BACKOFF_MS,
            drain_window_ms: DEFAULT_DRAIN_WINDOW_MS,
            verify_correlation: false,
            debug_log_capacity: DEFAULT_DEBUG_LOG_CAPACITY,
        }
    }
}

impl ClientConfig {
    /// Start building a configuration from defaults
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Reject values that would make the engine unusable
    pub fn validate(&self) -> ClientResult<()> {
        if self.read_chunk_size == 0 {
            return Err(ClientError::InvalidConfig(
                "read_chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(ClientError::InvalidConfig(
                "request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_buffer_bytes == 0 {
            return Err(ClientError::InvalidConfig(
                "max_buffer_bytes must be greater than zero".to_string(),
            ));
        }
        for (name, endpoint) in [
            ("endpoint_out", self.target.endpoint_out),
            ("endpoint_in", self.target.endpoint_in),
        ] {
            if !(1..=15).contains(&endpoint) {
                return Err(ClientError::InvalidConfig(format!(
                    "{name} must be between 1 and 15, got {endpoint}"
                )));
            }
        }
        if self.debug_log_capacity == 0 {
            return Err(ClientError::InvalidConfig(
                "debug_log_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Codec for the configured framing
    pub fn codec(&self) -> FrameCodec {
        FrameCodec::new(self.frame_mode)
            .with_magic(self.magic_word)
            .with_max_size(self.max_buffer_bytes)
    }

    /// Per-request deadline
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Pause after an empty read
    pub fn empty_read_backoff(&self) -> Duration {
        Duration::from_millis(self.empty_read_backoff_ms)
    }

    /// Pause after an incomplete raw-mode chunk
    pub fn decode_backoff(&self) -> Duration {
        Duration::from_millis(self.decode_backoff_ms)
    }

    /// Quiet period that ends a stale-byte drain
    pub fn drain_window(&self) -> Duration {
        Duration::from_millis(self.drain_window_ms)
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a builder with default settings
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Set the USB target
    pub fn target(mut self, target: UsbTarget) -> Self {
        self.config.target = target;
        self
    }

    /// Set the framing mode
    pub fn frame_mode(mut self, mode: FrameMode) -> Self {
        self.config.frame_mode = mode;
        self
    }

    /// Set the per-request deadline
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the bulk read size
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.config.read_chunk_size = size;
        self
    }

    /// Enable or disable correlation id checking
    pub fn verify_correlation(mut self, verify: bool) -> Self {
        self.config.verify_correlation = verify;
        self
    }

    /// Set the debug log capacity
    pub fn debug_log_capacity(mut self, capacity: usize) -> Self {
        self.config.debug_log_capacity = capacity;
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> ClientResult<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
