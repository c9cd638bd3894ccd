// libjensen/src/device/health.rs

//! Periodic liveness check while connected.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::debug;

use crate::{Error, Result};

/// Background thread running a probe every `interval` until stopped or the
/// probe asks to stop by returning `false`.
#[derive(Debug)]
pub struct HealthMonitor {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl HealthMonitor {
    /// Run `probe` every `interval` on a named thread until stopped or until
    /// the probe returns false.
    pub fn spawn<F>(interval: Duration, mut probe: F) -> Result<Self>
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("jensen-health".into())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            if !probe() {
                                break;
                            }
                        }
                        // Stop requested or the owner is gone.
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("health monitor exiting");
            })
            .map_err(|e| Error::TaskFailed(format!("spawn health monitor: {e}")))?;
        Ok(Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Signal the thread and wait for it, unless called from the monitor
    /// thread itself.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
