// libjensen/src/device/events.rs

//! Observable client events.
//!
//! Subscribers get their own channel; every event reaches every live
//! subscriber exactly once, in emission order.

use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};

use chrono::{DateTime, Local};
use derive_more::Display;
use log::{error, info, warn};

use crate::types::ConnectionState;

/// Severity of an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActivityLevel {
    /// Routine.
    #[display(fmt = "info")]
    Info,
    /// Recovered problems and destructive operations.
    #[display(fmt = "warn")]
    Warn,
    /// Failures the caller will see.
    #[display(fmt = "error")]
    Error,
}

/// A human readable line in the connection's activity log.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActivityEntry {
    /// Local time of the event.
    pub at: DateTime<Local>,
    /// Severity.
    pub level: ActivityLevel,
    /// Text, also written to the log.
    pub message: String,
}

/// Event published by a client to its subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Emitted for every lifecycle transition, in order.
    StateChanged {
        /// State before the transition.
        from: ConnectionState,
        /// State after the transition.
        to: ConnectionState,
    },
    /// Activity log line.
    Activity(ActivityEntry),
    /// Transfer progress, after every chunk of a download or upload.
    Progress {
        /// Bytes moved so far.
        bytes_transferred: u64,
        /// Expected total.
        total_bytes: u64,
    },
}

/// Fan-out of client events to mpsc subscribers.
#[derive(Debug, Default)]
pub struct EventHub {
    subscribers: Mutex<Vec<Sender<ClientEvent>>>,
}

impl EventHub {
    /// Hub with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// New receiver for every later event.
    pub fn subscribe(&self) -> Receiver<ClientEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(tx);
        rx
    }

    /// Deliver to every subscriber, dropping those whose receiver is gone.
    pub fn emit(&self, event: ClientEvent) {
        let mut subs = self.subscribers.lock().unwrap_or_else(|p| p.into_inner());
        subs.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Log `message` and publish it as an activity entry.
    pub fn activity(&self, level: ActivityLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            ActivityLevel::Info => info!("{}", message),
            ActivityLevel::Warn => warn!("{}", message),
            ActivityLevel::Error => error!("{}", message),
        }
        self.emit(ClientEvent::Activity(ActivityEntry {
            at: Local::now(),
            level,
            message,
        }));
    }

    /// Publish a progress event.
    pub fn progress(&self, bytes_transferred: u64, total_bytes: u64) {
        self.emit(ClientEvent::Progress {
            bytes_transferred,
            total_bytes,
        });
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}
