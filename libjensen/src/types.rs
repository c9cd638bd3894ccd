// libjensen/src/types.rs

//! Domain types shared by the protocol layer and the client API.

use std::convert::TryFrom;

use chrono::NaiveDateTime;
use derive_more::Display;

use crate::Error;

/// Command ids confirmed against working devices.
///
/// Ids 10, 14 and 15 exist on the wire but their semantics are unknown and
/// sending them has been seen to wedge the device, so they have no variant
/// here and `TryFrom<u16>` rejects them.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum CommandId {
    /// Firmware version and serial number.
    #[display(fmt = "GetDeviceInfo")]
    GetDeviceInfo = 1,
    /// Device clock as BCD.
    #[display(fmt = "GetDeviceTime")]
    GetDeviceTime = 2,
    /// Set the device clock.
    #[display(fmt = "SetDeviceTime")]
    SetDeviceTime = 3,
    /// Stream of file list entries.
    #[display(fmt = "GetFileList")]
    GetFileList = 4,
    /// Stream a whole recording.
    #[display(fmt = "TransferFile")]
    TransferFile = 5,
    /// Number of recordings.
    #[display(fmt = "GetFileCount")]
    GetFileCount = 6,
    /// Delete one recording by name.
    #[display(fmt = "DeleteFile")]
    DeleteFile = 7,
    /// Announce a firmware image before uploading it.
    #[display(fmt = "RequestFirmwareUpgrade")]
    RequestFirmwareUpgrade = 8,
    /// The firmware image itself.
    #[display(fmt = "FirmwareUpload")]
    FirmwareUpload = 9,
    /// Behaviour toggles.
    #[display(fmt = "GetSettings")]
    GetSettings = 11,
    /// Change behaviour toggles.
    #[display(fmt = "SetSettings")]
    SetSettings = 12,
    /// Stream the first bytes of a recording.
    #[display(fmt = "GetFileBlock")]
    GetFileBlock = 13,
    /// Storage capacity and usage.
    #[display(fmt = "GetCardInfo")]
    GetCardInfo = 16,
    /// Erase the storage card.
    #[display(fmt = "FormatCard")]
    FormatCard = 17,
    /// Name of the recording in progress.
    #[display(fmt = "GetRecordingFile")]
    GetRecordingFile = 18,
    /// Reset all settings.
    #[display(fmt = "RestoreFactorySettings")]
    RestoreFactorySettings = 19,
    /// Upcoming meetings for one-touch join.
    #[display(fmt = "SendMeetingScheduleInfo")]
    SendMeetingScheduleInfo = 20,
}

impl CommandId {
    /// Wire value of the id.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Commands that erase user data or settings. Never retried.
    pub fn is_destructive(self) -> bool {
        matches!(self, Self::FormatCard | Self::RestoreFactorySettings)
    }
}

impl TryFrom<u16> for CommandId {
    type Error = Error;

    fn try_from(id: u16) -> Result<Self, Self::Error> {
        Ok(match id {
            1 => Self::GetDeviceInfo,
            2 => Self::GetDeviceTime,
            3 => Self::SetDeviceTime,
            4 => Self::GetFileList,
            5 => Self::TransferFile,
            6 => Self::GetFileCount,
            7 => Self::DeleteFile,
            8 => Self::RequestFirmwareUpgrade,
            9 => Self::FirmwareUpload,
            11 => Self::GetSettings,
            12 => Self::SetSettings,
            13 => Self::GetFileBlock,
            16 => Self::GetCardInfo,
            17 => Self::FormatCard,
            18 => Self::GetRecordingFile,
            19 => Self::RestoreFactorySettings,
            20 => Self::SendMeetingScheduleInfo,
            other => return Err(Error::UnsupportedCommand(other)),
        })
    }
}

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectionState {
    /// No transport is open.
    #[display(fmt = "disconnected")]
    Disconnected,
    /// Opening the transport and probing the device.
    #[display(fmt = "connecting")]
    Connecting,
    /// Probe answered; commands may be sent.
    #[display(fmt = "connected")]
    Connected,
    /// Resetting the link after a protocol failure.
    #[display(fmt = "reconnecting")]
    Reconnecting,
    /// The last connect attempt failed.
    #[display(fmt = "error")]
    Error,
}

impl ConnectionState {
    /// The only edges the lifecycle may take.
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (Disconnected, Connecting)
                | (Connecting, Connected)
                | (Connecting, Error)
                | (Connected, Reconnecting)
                | (Connected, Disconnected)
                | (Reconnecting, Connected)
                | (Reconnecting, Disconnected)
                | (Error, Connecting)
                | (Error, Disconnected)
        )
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        ConnectionState::Disconnected
    }
}

/// DeviceModel, detected from the USB product id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceModel {
    /// HiDock H1 dock.
    #[display(fmt = "hidock-h1")]
    H1,
    /// HiDock H1E dock.
    #[display(fmt = "hidock-h1e")]
    H1E,
    /// HiDock P1 portable recorder.
    #[display(fmt = "hidock-p1")]
    P1,
    /// A Jensen device with an unrecognized product id.
    #[display(fmt = "unknown")]
    Unknown,
}

impl DeviceModel {
    /// Map a USB product id to a model, or `None` for foreign devices.
    pub fn from_product_id(pid: u16) -> Option<Self> {
        match pid {
            0xaf0c | 0xb00c => Some(Self::H1),
            0xaf0d | 0xb00d => Some(Self::H1E),
            0xaf0e | 0xb00e => Some(Self::P1),
            _ => None,
        }
    }
}

impl Default for DeviceModel {
    fn default() -> Self {
        DeviceModel::Unknown
    }
}

/// Snapshot returned by GetDeviceInfo.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceInfo {
    /// Dotted firmware version, e.g. "6.2.5"
    pub version_code: String,
    /// Firmware build number, e.g. 393733
    pub version_number: u32,
    /// Serial number with trailing padding removed.
    pub serial_number: String,
}

/// Audio container written by the recorder, identified by the file list's
/// format byte. Used to estimate durations from byte counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingFormat {
    /// Format byte 1: early firmware recordings.
    Legacy,
    /// Format byte 2: 48 kHz mono WAV.
    Wav48k,
    /// Format byte 3: 48 kHz stereo WAV.
    Wav48kStereo,
    /// Format byte 5.
    Compressed,
    /// Any other format byte.
    Other(u8),
}

impl RecordingFormat {
    /// Classify the file list's format byte.
    pub fn from_version(v: u8) -> Self {
        match v {
            1 => Self::Legacy,
            2 => Self::Wav48k,
            3 => Self::Wav48kStereo,
            5 => Self::Compressed,
            other => Self::Other(other),
        }
    }

    fn bytes_per_second(self) -> f64 {
        match self {
            Self::Legacy | Self::Other(_) => 16_000.0,
            Self::Wav48k => 96_000.0,
            Self::Wav48kStereo => 192_000.0,
            Self::Compressed => 12_000.0,
        }
    }

    fn header_len(self) -> u64 {
        match self {
            Self::Wav48k | Self::Wav48kStereo => 44,
            _ => 0,
        }
    }

    /// Estimated playback length of a file of `size_bytes`.
    pub fn duration_seconds(self, size_bytes: u64) -> f64 {
        size_bytes.saturating_sub(self.header_len()) as f64 / self.bytes_per_second()
    }
}

/// One recording on the device, as reported by the file list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileEntry {
    /// Name as stored on the device.
    pub filename: String,
    /// File length in bytes; the amount `download_file` expects.
    pub size_bytes: u64,
    /// Estimated from size and format.
    pub duration_seconds: f64,
    /// Parsed from the filename when it follows the recorder's scheme.
    pub date_created: Option<NaiveDateTime>,
    /// Serial number of the device the entry was listed from.
    pub device_id: String,
    /// Raw format byte; see [`RecordingFormat`].
    pub format_version: u8,
    /// Hex of the 16-byte signature the device stores with each file
    pub signature: String,
}

/// Parse the creation timestamp encoded in recorder filenames, e.g.
/// `20250512-143015-Rec44.hda` or `2025May12-143015-Rec44.hda`.
pub fn parse_filename_timestamp(name: &str) -> Option<NaiveDateTime> {
    let mut parts = name.splitn(3, '-');
    let date = parts.next()?;
    let time = parts.next()?;
    let time: String = time.chars().take(6).collect();
    let stamp = format!("{date}-{time}");
    NaiveDateTime::parse_from_str(&stamp, "%Y%m%d-%H%M%S")
        .or_else(|_| NaiveDateTime::parse_from_str(&stamp, "%Y%b%d-%H%M%S"))
        .ok()
}

/// Storage card usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StorageInfo {
    /// Card capacity.
    pub total_bytes: u64,
    /// Bytes in use.
    pub used_bytes: u64,
    /// `total_bytes - used_bytes`.
    pub free_bytes: u64,
    /// Raw status word reported with the card info.
    pub status: u32,
}

impl StorageInfo {
    /// Build from capacity and usage; free space is derived.
    pub fn new(total_bytes: u64, used_bytes: u64, status: u32) -> Self {
        Self {
            total_bytes,
            used_bytes,
            free_bytes: total_bytes.saturating_sub(used_bytes),
            status,
        }
    }
}

/// Device behaviour toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceSettings {
    /// Start recording when a call begins.
    pub auto_record: bool,
    /// Play the recording back after it ends.
    pub auto_play: bool,
    /// Audible notifications.
    pub notification: bool,
    /// Tone on Bluetooth connect.
    pub bluetooth_tone: bool,
}

/// Partial settings update. `None` leaves the device value untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SettingsPatch {
    /// See [`DeviceSettings::auto_record`].
    pub auto_record: Option<bool>,
    /// See [`DeviceSettings::auto_play`].
    pub auto_play: Option<bool>,
    /// See [`DeviceSettings::notification`].
    pub notification: Option<bool>,
    /// See [`DeviceSettings::bluetooth_tone`].
    pub bluetooth_tone: Option<bool>,
}

impl SettingsPatch {
    /// A patch that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the auto-record toggle.
    pub fn auto_record(mut self, on: bool) -> Self {
        self.auto_record = Some(on);
        self
    }

    /// Set the auto-play toggle.
    pub fn auto_play(mut self, on: bool) -> Self {
        self.auto_play = Some(on);
        self
    }

    /// Set the notification toggle.
    pub fn notification(mut self, on: bool) -> Self {
        self.notification = Some(on);
        self
    }

    /// Set the Bluetooth tone toggle.
    pub fn bluetooth_tone(mut self, on: bool) -> Self {
        self.bluetooth_tone = Some(on);
        self
    }

    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.auto_record.is_none()
            && self.auto_play.is_none()
            && self.notification.is_none()
            && self.bluetooth_tone.is_none()
    }

    /// Apply on top of known settings, as the device will.
    pub fn apply_to(&self, base: DeviceSettings) -> DeviceSettings {
        DeviceSettings {
            auto_record: self.auto_record.unwrap_or(base.auto_record),
            auto_play: self.auto_play.unwrap_or(base.auto_play),
            notification: self.notification.unwrap_or(base.notification),
            bluetooth_tone: self.bluetooth_tone.unwrap_or(base.bluetooth_tone),
        }
    }
}

/// Device answer to RequestFirmwareUpgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FirmwareUpgradeStatus {
    /// The device is ready for the image.
    #[display(fmt = "accepted")]
    Accepted,
    /// Target version rejected.
    #[display(fmt = "wrong version")]
    WrongVersion,
    /// The device is recording or otherwise busy.
    #[display(fmt = "busy")]
    Busy,
    /// No room to stage the image.
    #[display(fmt = "card full")]
    CardFull,
    /// Storage failure.
    #[display(fmt = "card error")]
    CardError,
    /// Unrecognized status byte.
    #[display(fmt = "unknown ({})", _0)]
    Unknown(u8),
}

impl FirmwareUpgradeStatus {
    /// Decode the status byte of the reply.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Accepted,
            1 => Self::WrongVersion,
            2 => Self::Busy,
            3 => Self::CardFull,
            4 => Self::CardError,
            other => Self::Unknown(other),
        }
    }
}

/// A calendar entry pushed to the device so it can offer a one-touch join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingSchedule {
    /// Meeting start, device local time.
    pub start: NaiveDateTime,
    /// Meeting end, device local time.
    pub end: NaiveDateTime,
    /// Platform id understood by the device firmware (Zoom, Teams, ...)
    pub platform: u8,
    /// Key codes the device replays to join; at most 18 bytes
    pub shortcut: Vec<u8>,
}
