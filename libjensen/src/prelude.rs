// libjensen/src/prelude.rs

//! The types most callers need, in one import.

pub use crate::device::{ActivityEntry, ActivityLevel, ClientConfig, ClientEvent, Jensen, JensenBuilder};
pub use crate::protocol::{Packet, Request, Response};
pub use crate::transfer::{CancellationToken, DownloadOutcome};
pub use crate::transport::{Connector, MockConnector, MockTransport, Transport};
pub use crate::{
    CommandId, ConnectionState, DeviceInfo, DeviceModel, DeviceSettings, Disposition, Error,
    ErrorKind, FileEntry, FirmwareUpgradeStatus, MeetingSchedule, Result, SettingsPatch,
    StorageInfo,
};

#[cfg(feature = "async")]
pub use crate::asynchronous::AsyncJensen;
#[cfg(feature = "usb")]
pub use crate::transport::UsbConnector;

// Re-export small utilities for convenience
pub use crate::utils::{bytes_to_hex, ms};
