// libjensen/src/transport/mock.rs

//! In-memory transport and connector for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::protocol::{FrameBuffer, Packet, Scan};
use crate::transport::traits::{Connector, Transport};
use crate::types::DeviceModel;
use crate::{Error, Result};

/// Produces the raw IN-endpoint chunks a device would send for a request.
pub type Responder = Box<dyn FnMut(&Packet) -> Vec<Vec<u8>> + Send>;

// An empty read waits this long before reporting a timeout.
const IDLE_READ: Duration = Duration::from_millis(5);

#[derive(Default)]
struct MockState {
    reads: VecDeque<Vec<u8>>,
    responder: Option<Responder>,
    outbound: FrameBuffer,
    writes: Vec<Vec<u8>>,
    requests: Vec<Packet>,
    cleared: Vec<u8>,
    read_failures: VecDeque<Error>,
    write_failures: VecDeque<Error>,
    clear_failures: usize,
    removed: bool,
    closed: bool,
    close_calls: usize,
    model: DeviceModel,
}

/// Mock transport for tests.
///
/// Clones share state, so a test keeps one handle for scripting and
/// assertions while the client owns another. Written bytes are parsed into
/// request packets; a responder, if installed, turns each request into the
/// chunks later returned by `read_bulk`.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.lock();
        f.debug_struct("MockTransport")
            .field("queued_reads", &s.reads.len())
            .field("requests", &s.requests.len())
            .field("closed", &s.closed)
            .finish()
    }
}

impl MockTransport {
    /// Mock reporting an unknown model with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock reporting `model`.
    pub fn with_model(model: DeviceModel) -> Self {
        let m = Self::new();
        m.lock().model = model;
        m
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the state from the others.
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Queue raw bytes for a later `read_bulk`.
    pub fn push_read(&self, bytes: Vec<u8>) {
        self.lock().reads.push_back(bytes);
    }

    /// Queue an encoded packet for a later `read_bulk`.
    pub fn push_packet(&self, packet: &Packet) {
        if let Ok(bytes) = packet.encode() {
            self.push_read(bytes);
        }
    }

    /// Answer every decoded request with the chunks `f` returns.
    pub fn set_responder<F>(&self, f: F)
    where
        F: FnMut(&Packet) -> Vec<Vec<u8>> + Send + 'static,
    {
        self.lock().responder = Some(Box::new(f));
    }

    /// Stop answering; reads then time out unless bytes are queued.
    pub fn clear_responder(&self) {
        self.lock().responder = None;
    }

    /// Fail one upcoming `read_bulk` with `err`.
    pub fn fail_next_read(&self, err: Error) {
        self.lock().read_failures.push_back(err);
    }

    /// Fail one upcoming `write_bulk` with `err`.
    pub fn fail_next_write(&self, err: Error) {
        self.lock().write_failures.push_back(err);
    }

    /// Make the next `n` clear-halt calls fail with a pipe error.
    pub fn fail_clear_halt(&self, n: usize) {
        self.lock().clear_failures = n;
    }

    /// Simulate the cable being pulled: every operation fails with
    /// `DeviceRemoved` until cleared.
    pub fn set_removed(&self, removed: bool) {
        self.lock().removed = removed;
    }

    /// Every buffer passed to `write_bulk`, in order.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.lock().writes.clone()
    }

    /// Total bytes written.
    pub fn bytes_written(&self) -> usize {
        self.lock().writes.iter().map(Vec::len).sum()
    }

    /// Request packets decoded from everything written so far.
    pub fn requests(&self) -> Vec<Packet> {
        self.lock().requests.clone()
    }

    /// Command ids of [`MockTransport::requests`].
    pub fn request_commands(&self) -> Vec<u16> {
        self.lock().requests.iter().map(|p| p.command).collect()
    }

    /// Endpoints passed to successful `clear_halt` calls.
    pub fn cleared_endpoints(&self) -> Vec<u8> {
        self.lock().cleared.clone()
    }

    /// Read chunks not yet consumed.
    pub fn queued_reads(&self) -> usize {
        self.lock().reads.len()
    }

    /// True after `close` until the connector opens it again.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// How often `close` was called, repeats included.
    pub fn close_calls(&self) -> usize {
        self.lock().close_calls
    }

    fn reopen(&self) {
        let mut s = self.lock();
        s.closed = false;
        s.outbound.clear();
    }
}

impl Transport for MockTransport {
    fn write_bulk(&mut self, data: &[u8], _timeout_ms: u64) -> Result<()> {
        let mut guard = self.lock();
        let s = &mut *guard;
        if s.removed {
            return Err(Error::DeviceRemoved);
        }
        if let Some(e) = s.write_failures.pop_front() {
            return Err(e);
        }
        s.writes.push(data.to_vec());
        s.outbound.extend(data);

        loop {
            match s.outbound.scan() {
                Scan::Frame(packet) => {
                    if let Some(responder) = s.responder.as_mut() {
                        s.reads.extend(responder(&packet));
                    }
                    s.requests.push(packet);
                }
                Scan::Incomplete => break,
                Scan::Corrupt { .. } => continue,
            }
        }
        Ok(())
    }

    fn read_bulk(&mut self, max_len: usize, timeout_ms: u64) -> Result<Vec<u8>> {
        {
            let mut s = self.lock();
            if s.removed {
                return Err(Error::DeviceRemoved);
            }
            if let Some(e) = s.read_failures.pop_front() {
                return Err(e);
            }
            if let Some(mut chunk) = s.reads.pop_front() {
                if chunk.len() > max_len {
                    let rest = chunk.split_off(max_len);
                    s.reads.push_front(rest);
                }
                return Ok(chunk);
            }
        }
        std::thread::sleep(IDLE_READ.min(Duration::from_millis(timeout_ms)));
        Err(Error::Timeout)
    }

    fn clear_halt(&mut self, endpoint: u8) -> Result<()> {
        let mut s = self.lock();
        if s.removed {
            return Err(Error::DeviceRemoved);
        }
        s.cleared.push(endpoint);
        if s.clear_failures > 0 {
            s.clear_failures -= 1;
            return Err(Error::PipeError { endpoint });
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let mut s = self.lock();
        s.close_calls += 1;
        s.closed = true;
        Ok(())
    }

    fn model(&self) -> DeviceModel {
        self.lock().model
    }
}

/// Connector handing out clones of one shared `MockTransport`.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    transport: MockTransport,
    open_failures: Arc<Mutex<VecDeque<Error>>>,
    opens: Arc<Mutex<usize>>,
}

impl MockConnector {
    /// Connector opening `transport` every time.
    pub fn new(transport: MockTransport) -> Self {
        Self {
            transport,
            ..Self::default()
        }
    }

    /// Handle sharing state with every opened transport.
    pub fn transport(&self) -> &MockTransport {
        &self.transport
    }

    /// Fail one upcoming `open` with `err`.
    pub fn fail_next_open(&self, err: Error) {
        self.open_failures
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push_back(err);
    }

    /// Successful opens so far.
    pub fn open_count(&self) -> usize {
        *self.opens.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Connector for MockConnector {
    fn open(&self) -> Result<Box<dyn Transport>> {
        let failure = self
            .open_failures
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop_front();
        if let Some(e) = failure {
            return Err(e);
        }
        *self.opens.lock().unwrap_or_else(|p| p.into_inner()) += 1;
        self.transport.reopen();
        Ok(Box::new(self.transport.clone()))
    }
}
