// libjensen/src/transport/usb/descriptor.rs

//! Endpoint discovery from the active configuration descriptor.

use rusb::{Device, Direction, TransferType, UsbContext};

use crate::constants::{JENSEN_IN_ENDPOINT, JENSEN_INTERFACE, JENSEN_OUT_ENDPOINT};

/// Bulk endpoints and the interface that carries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    /// Interface number to claim.
    pub interface: u8,
    /// Bulk IN endpoint address.
    pub bulk_in: u8,
    /// Bulk OUT endpoint address.
    pub bulk_out: u8,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            interface: JENSEN_INTERFACE,
            bulk_in: JENSEN_IN_ENDPOINT,
            bulk_out: JENSEN_OUT_ENDPOINT,
        }
    }
}

/// Inspect the active configuration for the first interface exposing both
/// a bulk IN and a bulk OUT endpoint. Falls back to the fixed Jensen
/// addresses when the descriptors cannot be read.
pub fn find_endpoints<T: UsbContext>(device: &Device<T>) -> Endpoints {
    let Ok(config) = device.active_config_descriptor() else {
        return Endpoints::default();
    };

    for interface in config.interfaces() {
        for desc in interface.descriptors() {
            let mut bulk_in = None;
            let mut bulk_out = None;
            for ep in desc.endpoint_descriptors() {
                if ep.transfer_type() != TransferType::Bulk {
                    continue;
                }
                match ep.direction() {
                    Direction::In if bulk_in.is_none() => bulk_in = Some(ep.address()),
                    Direction::Out if bulk_out.is_none() => bulk_out = Some(ep.address()),
                    _ => {}
                }
            }
            if let (Some(bulk_in), Some(bulk_out)) = (bulk_in, bulk_out) {
                return Endpoints {
                    interface: desc.interface_number(),
                    bulk_in,
                    bulk_out,
                };
            }
        }
    }

    Endpoints::default()
}
