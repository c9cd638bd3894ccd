// libjensen/src/transport/mod.rs

//! USB bulk transport seam.
//!
//! [`Transport`] is one open link; [`Connector`] opens a new one, which the
//! client needs again after every disconnect.

pub mod mock;
pub mod traits;
#[cfg(feature = "usb")]
pub mod usb;

pub use mock::{MockConnector, MockTransport};
pub use traits::{Connector, Transport};
#[cfg(feature = "usb")]
pub use usb::{UsbConnector, UsbDeviceDescriptor, UsbTransport};
