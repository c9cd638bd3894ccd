// libjensen/src/device/builder.rs

//! Builder for [`Jensen`].

use crate::device::config::ClientConfig;
use crate::device::handle::Jensen;
use crate::transport::Connector;
use crate::{Error, Result};

/// Helper to construct a [`Jensen`] client with optional configuration.
#[derive(Default)]
pub struct JensenBuilder {
    connector: Option<Box<dyn Connector>>,
    config: ClientConfig,
}

impl JensenBuilder {
    /// Builder with default configuration and no connector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide the connector used on every `connect()` (e.g. MockConnector)
    pub fn connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Some(Box::new(connector));
        self
    }

    /// Connect to the first HiDock found on the USB bus.
    #[cfg(feature = "usb")]
    pub fn usb(self) -> Self {
        self.connector(crate::transport::UsbConnector::new())
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// See [`ClientConfig::command_timeout_ms`].
    pub fn command_timeout_ms(mut self, ms: u64) -> Self {
        self.config.command_timeout_ms = ms;
        self
    }

    /// See [`ClientConfig::probe_timeout_ms`].
    pub fn probe_timeout_ms(mut self, ms: u64) -> Self {
        self.config.probe_timeout_ms = ms;
        self
    }

    /// See [`ClientConfig::transfer_timeout_ms`].
    pub fn transfer_timeout_ms(mut self, ms: u64) -> Self {
        self.config.transfer_timeout_ms = ms;
        self
    }

    /// `None` turns the background health monitor off.
    pub fn health_check_interval_ms(mut self, ms: Option<u64>) -> Self {
        self.config.health_check_interval_ms = ms;
        self
    }

    /// See [`ClientConfig::reset_attempts`].
    pub fn reset_attempts(mut self, n: u32) -> Self {
        self.config.reset_attempts = n;
        self
    }

    /// See [`ClientConfig::resync_attempts`].
    pub fn resync_attempts(mut self, n: u32) -> Self {
        self.config.resync_attempts = n;
        self
    }

    /// Consume the builder. Requires a connector; otherwise returns
    /// DeviceNotFound.
    pub fn build(self) -> Result<Jensen> {
        match self.connector {
            Some(c) => Jensen::new(c, self.config),
            None => Err(Error::DeviceNotFound),
        }
    }
}
