// libjensen/src/protocol/commands/mod.rs

//! Request bodies, one module per command family.

/// SetDeviceTime.
pub mod device;
pub mod files;
/// RequestFirmwareUpgrade.
pub mod firmware;
pub mod schedule;
/// SetSettings and the slot values it uses.
pub mod settings;

pub use device::encode_set_device_time;
pub use files::{encode_file_block, encode_filename};
pub use firmware::encode_request_firmware_upgrade;
pub use schedule::encode_meeting_schedule;
pub use settings::encode_set_settings;

use chrono::NaiveDateTime;

use crate::Result;
use crate::constants::DESTRUCTIVE_CONFIRMATION;
use crate::types::{CommandId, MeetingSchedule, SettingsPatch};

/// High-level request enum. New commands should be added here and their
/// body encoder placed in `protocol::commands::<family>.rs`.
///
/// FirmwareUpload has no variant: its body is the raw image, written by
/// `transfer::upload` straight from the caller's buffer.
#[derive(Debug, Clone)]
pub enum Request {
    /// Command 1
    GetDeviceInfo,
    /// Command 2
    GetDeviceTime,
    /// Command 3
    SetDeviceTime {
        time: NaiveDateTime,
    },
    /// Command 4; the reply is streamed.
    GetFileList,
    /// Command 5; the reply is streamed.
    TransferFile {
        filename: String,
    },
    /// Command 6
    GetFileCount,
    /// Command 7
    DeleteFile {
        filename: String,
    },
    /// Command 8
    RequestFirmwareUpgrade {
        target_version: u32,
        file_length: u32,
    },
    /// Command 11
    GetSettings,
    /// Command 12
    SetSettings {
        patch: SettingsPatch,
    },
    /// Command 13; the reply is streamed.
    GetFileBlock {
        filename: String,
        length: u32,
    },
    /// Command 16
    GetCardInfo,
    /// Command 17, sent with the confirmation body.
    FormatCard,
    /// Command 18
    GetRecordingFile,
    /// Command 19, sent with the confirmation body.
    RestoreFactorySettings,
    /// Command 20
    SendMeetingScheduleInfo {
        schedules: Vec<MeetingSchedule>,
    },
}

impl Request {
    /// Id sent in the frame header.
    pub fn command_id(&self) -> CommandId {
        match self {
            Self::GetDeviceInfo => CommandId::GetDeviceInfo,
            Self::GetDeviceTime => CommandId::GetDeviceTime,
            Self::SetDeviceTime { .. } => CommandId::SetDeviceTime,
            Self::GetFileList => CommandId::GetFileList,
            Self::TransferFile { .. } => CommandId::TransferFile,
            Self::GetFileCount => CommandId::GetFileCount,
            Self::DeleteFile { .. } => CommandId::DeleteFile,
            Self::RequestFirmwareUpgrade { .. } => CommandId::RequestFirmwareUpgrade,
            Self::GetSettings => CommandId::GetSettings,
            Self::SetSettings { .. } => CommandId::SetSettings,
            Self::GetFileBlock { .. } => CommandId::GetFileBlock,
            Self::GetCardInfo => CommandId::GetCardInfo,
            Self::FormatCard => CommandId::FormatCard,
            Self::GetRecordingFile => CommandId::GetRecordingFile,
            Self::RestoreFactorySettings => CommandId::RestoreFactorySettings,
            Self::SendMeetingScheduleInfo { .. } => CommandId::SendMeetingScheduleInfo,
        }
    }

    /// Encode the request body (everything between the frame header and
    /// the checksum).
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(match self {
            Self::GetDeviceInfo
            | Self::GetDeviceTime
            | Self::GetFileList
            | Self::GetFileCount
            | Self::GetSettings
            | Self::GetCardInfo
            | Self::GetRecordingFile => Vec::new(),
            Self::SetDeviceTime { time } => encode_set_device_time(*time)?,
            Self::TransferFile { filename } | Self::DeleteFile { filename } => {
                encode_filename(filename)?
            }
            Self::RequestFirmwareUpgrade {
                target_version,
                file_length,
            } => encode_request_firmware_upgrade(*target_version, *file_length),
            Self::SetSettings { patch } => encode_set_settings(patch),
            Self::GetFileBlock { filename, length } => encode_file_block(filename, *length)?,
            Self::FormatCard | Self::RestoreFactorySettings => DESTRUCTIVE_CONFIRMATION.to_vec(),
            Self::SendMeetingScheduleInfo { schedules } => encode_meeting_schedule(schedules)?,
        })
    }
}
