// libjensen/src/transport/usb/mod.rs

//! rusb-backed transport and device discovery.

#![cfg(feature = "usb")]

use std::time::Duration;

use log::{debug, info, warn};
use rusb::{Context, Device, DeviceHandle, UsbContext};

use crate::constants::HIDOCK_VENDOR_IDS;
use crate::transport::traits::{Connector, Transport};
use crate::types::DeviceModel;
use crate::{Error, Result};

mod descriptor;
pub use descriptor::{Endpoints, find_endpoints};

/// Identifies one attached HiDock device on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbDeviceDescriptor {
    /// USB vendor id.
    pub vendor_id: u16,
    /// USB product id; decides the model.
    pub product_id: u16,
    /// Bus number.
    pub bus: u8,
    /// Address on the bus.
    pub address: u8,
    /// Model derived from the product id.
    pub model: DeviceModel,
}

impl UsbDeviceDescriptor {
    fn matches<T: UsbContext>(&self, device: &Device<T>) -> bool {
        device.bus_number() == self.bus && device.address() == self.address
    }
}

// Stall and unplug errors carry the endpoint they happened on.
fn map_endpoint_error(e: rusb::Error, endpoint: u8) -> Error {
    match e {
        rusb::Error::Pipe => Error::PipeError { endpoint },
        other => other.into(),
    }
}

fn describe<T: UsbContext>(device: &Device<T>) -> Option<UsbDeviceDescriptor> {
    let dd = device.device_descriptor().ok()?;
    if !HIDOCK_VENDOR_IDS.contains(&dd.vendor_id()) {
        return None;
    }
    let model = DeviceModel::from_product_id(dd.product_id())?;
    Some(UsbDeviceDescriptor {
        vendor_id: dd.vendor_id(),
        product_id: dd.product_id(),
        bus: device.bus_number(),
        address: device.address(),
        model,
    })
}

/// List every attached HiDock device.
pub fn discover() -> Result<Vec<UsbDeviceDescriptor>> {
    let ctx = Context::new()?;
    Ok(ctx.devices()?.iter().filter_map(|d| describe(&d)).collect())
}

/// rusb-backed Jensen transport holding a claimed interface.
pub struct UsbTransport {
    handle: Option<DeviceHandle<Context>>,
    endpoints: Endpoints,
    model: DeviceModel,
}

impl UsbTransport {
    /// Open the first attached HiDock device.
    pub fn open() -> Result<Self> {
        Self::open_matching(None)
    }

    /// Open the device `desc` refers to. Fails with `DeviceNotFound` when it
    /// is no longer attached at that bus address.
    pub fn open_descriptor(desc: &UsbDeviceDescriptor) -> Result<Self> {
        Self::open_matching(Some(desc))
    }

    fn open_matching(wanted: Option<&UsbDeviceDescriptor>) -> Result<Self> {
        let ctx = Context::new()?;
        for device in ctx.devices()?.iter() {
            let Some(found) = describe(&device) else {
                continue;
            };
            if let Some(w) = wanted {
                if !w.matches(&device) {
                    continue;
                }
            }

            let mut handle = device.open()?;
            let endpoints = find_endpoints(&device);
            let iface = endpoints.interface;

            // On Linux a kernel driver may own the interface; detach it so the
            // claim below can succeed. A failed detach surfaces as a claim error.
            if let Ok(true) = handle.kernel_driver_active(iface) {
                let _ = handle.detach_kernel_driver(iface);
            }
            handle.claim_interface(iface).map_err(|e| match e {
                rusb::Error::Busy | rusb::Error::Access => Error::DeviceBusy,
                other => other.into(),
            })?;

            info!(
                "opened {} ({:04x}:{:04x}) on bus {} address {}",
                found.model, found.vendor_id, found.product_id, found.bus, found.address
            );
            return Ok(UsbTransport {
                handle: Some(handle),
                endpoints,
                model: found.model,
            });
        }

        Err(Error::DeviceNotFound)
    }

    fn handle(&self) -> Result<&DeviceHandle<Context>> {
        self.handle.as_ref().ok_or(Error::DeviceRemoved)
    }
}

impl Transport for UsbTransport {
    fn write_bulk(&mut self, data: &[u8], timeout_ms: u64) -> Result<()> {
        let ep = self.endpoints.bulk_out;
        let timeout = Duration::from_millis(timeout_ms);
        let handle = self.handle()?;
        let mut written = 0;
        while written < data.len() {
            let n = handle
                .write_bulk(ep, &data[written..], timeout)
                .map_err(|e| map_endpoint_error(e, ep))?;
            if n == 0 {
                return Err(Error::Timeout);
            }
            written += n;
        }
        Ok(())
    }

    fn read_bulk(&mut self, max_len: usize, timeout_ms: u64) -> Result<Vec<u8>> {
        let ep = self.endpoints.bulk_in;
        let mut buf = vec![0u8; max_len];
        let n = self
            .handle()?
            .read_bulk(ep, &mut buf, Duration::from_millis(timeout_ms))
            .map_err(|e| map_endpoint_error(e, ep))?;
        buf.truncate(n);
        Ok(buf)
    }

    fn clear_halt(&mut self, endpoint: u8) -> Result<()> {
        debug!("clear halt on endpoint {:#04x}", endpoint);
        self.handle()?
            .clear_halt(endpoint)
            .map_err(|e| map_endpoint_error(e, endpoint))
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut handle) = self.handle.take() {
            if let Err(e) = handle.release_interface(self.endpoints.interface) {
                // The handle is dropped either way; an unplugged device
                // cannot be released.
                warn!("release interface failed: {}", e);
            }
        }
        Ok(())
    }

    fn in_endpoint(&self) -> u8 {
        self.endpoints.bulk_in
    }

    fn out_endpoint(&self) -> u8 {
        self.endpoints.bulk_out
    }

    fn model(&self) -> DeviceModel {
        self.model
    }
}

impl Drop for UsbTransport {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Connector that opens either the first attached HiDock or one specific
/// device picked from `discover()`.
#[derive(Debug, Clone, Default)]
pub struct UsbConnector {
    target: Option<UsbDeviceDescriptor>,
}

impl UsbConnector {
    /// Open the first HiDock found.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the device `desc` was discovered at.
    pub fn for_device(desc: UsbDeviceDescriptor) -> Self {
        Self { target: Some(desc) }
    }
}

impl Connector for UsbConnector {
    fn open(&self) -> Result<Box<dyn Transport>> {
        let t = match self.target.as_ref() {
            Some(desc) => UsbTransport::open_descriptor(desc)?,
            None => UsbTransport::open()?,
        };
        Ok(Box::new(t))
    }
}
