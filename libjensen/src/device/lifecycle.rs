// libjensen/src/device/lifecycle.rs

//! Connection state machine. The only writer of `ConnectionState`.

use std::sync::{Arc, Mutex, MutexGuard};

use log::info;

use crate::device::events::{ClientEvent, EventHub};
use crate::types::ConnectionState;
use crate::{Error, Result};

/// Current connection state plus the event hub that hears about changes.
#[derive(Debug)]
pub struct Lifecycle {
    state: Mutex<ConnectionState>,
    events: Arc<EventHub>,
}

impl Lifecycle {
    /// Starts `Disconnected`.
    pub fn new(events: Arc<EventHub>) -> Self {
        Self {
            state: Mutex::new(ConnectionState::Disconnected),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConnectionState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        *self.lock()
    }

    // Callers hold the state lock, so StateChanged events come out in the
    // exact order the transitions happened.
    fn apply(&self, state: &mut ConnectionState, to: ConnectionState) -> Result<()> {
        let from = *state;
        if !from.can_transition_to(to) {
            return Err(Error::IllegalTransition { from, to });
        }
        *state = to;
        info!("connection {} -> {}", from, to);
        self.events.emit(ClientEvent::StateChanged { from, to });
        Ok(())
    }

    /// Move to `to`, or fail with `InvalidStateTransition` if the edge is not
    /// allowed. Emits `StateChanged` on success.
    pub fn transition(&self, to: ConnectionState) -> Result<()> {
        let mut state = self.lock();
        self.apply(&mut state, to)
    }

    /// Enter `Connecting`, refusing while a connection exists or is being
    /// set up.
    pub fn begin_connect(&self) -> Result<()> {
        let mut state = self.lock();
        match *state {
            ConnectionState::Disconnected | ConnectionState::Error => {
                self.apply(&mut state, ConnectionState::Connecting)
            }
            other => Err(Error::AlreadyConnected(other)),
        }
    }

    /// Enter `Reconnecting` if currently `Connected`. Returns false when
    /// another caller is already recovering or the link is gone.
    pub fn begin_recovery(&self) -> bool {
        let mut state = self.lock();
        *state == ConnectionState::Connected
            && self.apply(&mut state, ConnectionState::Reconnecting).is_ok()
    }

    /// Move to `Disconnected` from wherever that edge exists. Returns the
    /// previous state.
    pub fn force_disconnected(&self) -> ConnectionState {
        let mut state = self.lock();
        let from = *state;
        if from != ConnectionState::Disconnected {
            let _ = self.apply(&mut state, ConnectionState::Disconnected);
        }
        from
    }

    /// `NotConnected` unless the state is `Connected`.
    pub fn require_connected(&self) -> Result<()> {
        match self.state() {
            ConnectionState::Connected => Ok(()),
            other => Err(Error::NotConnected(other)),
        }
    }
}
