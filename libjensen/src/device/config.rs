// libjensen/src/device/config.rs

//! Client configuration.

use std::time::Duration;

use crate::constants::{
    DEFAULT_COMMAND_RESYNC_LIMIT, DEFAULT_READ_CHUNK, DEFAULT_RESET_ATTEMPTS,
    DEFAULT_TRANSFER_RESYNC_ATTEMPTS, DEFAULT_WRITE_CHUNK, JENSEN_MIN_FRAME_LEN,
};
use crate::dispatcher::DispatcherConfig;
use crate::transfer::StreamOptions;
use crate::utils::{
    DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_HEALTH_INTERVAL_MS, DEFAULT_PROBE_TIMEOUT_MS,
    DEFAULT_TRANSFER_TIMEOUT_MS, ms,
};
use crate::{Error, Result};

/// Client tuning knobs. Every field has a working default.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClientConfig {
    /// Round trip limit for ordinary commands.
    pub command_timeout_ms: u64,
    /// Limit for the GetDeviceInfo probe on connect, recovery and health checks.
    pub probe_timeout_ms: u64,
    /// Longest gap between two packets of a streamed transfer.
    pub transfer_timeout_ms: u64,
    /// Background health probe period; `None` disables the monitor.
    pub health_check_interval_ms: Option<u64>,
    /// Endpoint-reset rounds before a connection is declared lost.
    pub reset_attempts: u32,
    /// Resync rounds a transfer may use before it is corrupted.
    pub resync_attempts: u32,
    /// Framing errors tolerated while waiting for a single reply.
    pub command_resync_limit: u32,
    /// Bytes requested per bulk IN read.
    pub read_chunk: usize,
    /// Largest bulk OUT write.
    pub write_chunk: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            transfer_timeout_ms: DEFAULT_TRANSFER_TIMEOUT_MS,
            health_check_interval_ms: Some(DEFAULT_HEALTH_INTERVAL_MS),
            reset_attempts: DEFAULT_RESET_ATTEMPTS,
            resync_attempts: DEFAULT_TRANSFER_RESYNC_ATTEMPTS,
            command_resync_limit: DEFAULT_COMMAND_RESYNC_LIMIT,
            read_chunk: DEFAULT_READ_CHUNK,
            write_chunk: DEFAULT_WRITE_CHUNK,
        }
    }
}

impl ClientConfig {
    /// Reject settings the client cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.command_timeout_ms == 0 || self.probe_timeout_ms == 0 || self.transfer_timeout_ms == 0 {
            return Err(Error::InvalidArgument("timeouts must be non-zero".into()));
        }
        if self.health_check_interval_ms == Some(0) {
            return Err(Error::InvalidArgument(
                "health check interval must be non-zero; use None to disable".into(),
            ));
        }
        if self.reset_attempts == 0 {
            return Err(Error::InvalidArgument("reset_attempts must be at least 1".into()));
        }
        if self.read_chunk < JENSEN_MIN_FRAME_LEN || self.write_chunk == 0 {
            return Err(Error::InvalidArgument(format!(
                "read_chunk must be >= {} and write_chunk > 0",
                JENSEN_MIN_FRAME_LEN
            )));
        }
        Ok(())
    }

    /// Health probe period as a `Duration`.
    pub fn health_check_interval(&self) -> Option<Duration> {
        self.health_check_interval_ms.map(ms)
    }

    /// Limits handed to the dispatcher.
    pub fn dispatcher(&self) -> DispatcherConfig {
        DispatcherConfig {
            read_chunk: self.read_chunk,
            write_chunk: self.write_chunk,
            max_resync: self.command_resync_limit,
        }
    }

    /// Limits handed to streamed transfers.
    pub fn stream_options(&self) -> StreamOptions {
        StreamOptions {
            packet_timeout_ms: self.transfer_timeout_ms,
            resync_attempts: self.resync_attempts,
        }
    }
}
