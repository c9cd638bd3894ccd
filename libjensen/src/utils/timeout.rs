// libjensen/src/utils/timeout.rs

//! Timeout defaults and deadline tracking.
//!
//! Every blocking call in the crate takes its timeout in milliseconds; the
//! defaults used by `ClientConfig` live here.

use std::time::{Duration, Instant};

/// Single command round trip.
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 5_000;

/// GetDeviceInfo probe issued by `connect()` and by recovery.
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

/// Gap allowed between two data packets of a streamed transfer.
pub const DEFAULT_TRANSFER_TIMEOUT_MS: u64 = 10_000;

/// Period of the background health probe.
pub const DEFAULT_HEALTH_INTERVAL_MS: u64 = 10_000;

/// Convert milliseconds to Duration.
pub fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// A point in time a blocking loop must give up at, remembering the
/// timeout it was created from for error reporting.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    timeout_ms: u64,
}

impl Deadline {
    /// Deadline `timeout_ms` from now.
    pub fn after_ms(timeout_ms: u64) -> Self {
        Self {
            at: Instant::now() + ms(timeout_ms),
            timeout_ms,
        }
    }

    /// The original timeout, for error reporting.
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Time left, or `None` once the deadline has passed.
    pub fn remaining(&self) -> Option<Duration> {
        let now = Instant::now();
        if now >= self.at { None } else { Some(self.at - now) }
    }
}
