#![cfg(feature = "usb")]

//! Helpers shared by the tests that need a real recorder.
//!
//! They connect to the first HiDock on the bus and return `Ok(None)` when
//! none is attached, so the tests pass quietly on machines without one.

use libjensen::device::Jensen;
use libjensen::transport::usb;
use libjensen::{Error, Result};

pub fn connect_first_device() -> Result<Option<Jensen>> {
    let devices = usb::discover()?;
    let Some(first) = devices.into_iter().next() else {
        return Ok(None);
    };
    let client = Jensen::builder()
        .connector(usb::UsbConnector::for_device(first))
        .health_check_interval_ms(None)
        .build()?;
    match client.connect() {
        Ok(_) => Ok(Some(client)),
        Err(Error::DeviceNotFound) => Ok(None),
        Err(e) => Err(e),
    }
}
