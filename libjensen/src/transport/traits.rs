// libjensen/src/transport/traits.rs

//! The transport and connector traits.

use crate::Result;
use crate::constants::{JENSEN_IN_ENDPOINT, JENSEN_OUT_ENDPOINT};
use crate::types::DeviceModel;

/// Transport trait abstracts USB I/O away from protocol/device logic.
///
/// Implementations report failures as typed errors and never retry on their
/// own; a read that sees no data before `timeout_ms` returns `Error::Timeout`.
pub trait Transport: Send {
    /// Write raw bytes to the bulk OUT endpoint.
    fn write_bulk(&mut self, data: &[u8], timeout_ms: u64) -> Result<()>;

    /// Read up to `max_len` bytes from the bulk IN endpoint.
    fn read_bulk(&mut self, max_len: usize, timeout_ms: u64) -> Result<Vec<u8>>;

    /// Clear a halt/stall on `endpoint` without dropping the claim.
    fn clear_halt(&mut self, endpoint: u8) -> Result<()>;

    /// Release the interface. Closing twice is a no-op.
    fn close(&mut self) -> Result<()>;

    fn in_endpoint(&self) -> u8 {
        JENSEN_IN_ENDPOINT
    }

    fn out_endpoint(&self) -> u8 {
        JENSEN_OUT_ENDPOINT
    }

    /// Hardware model detected when the device was opened.
    fn model(&self) -> DeviceModel;
}

/// Discovers and opens devices. The lifecycle layer calls `open` on every
/// `connect()`, so a connector must be reusable.
pub trait Connector: Send + Sync {
    fn open(&self) -> Result<Box<dyn Transport>>;
}
