// libjensen/src/protocol/responses/mod.rs

//! Response decoders, one module per command family.

pub mod device;
pub mod files;
/// GetSettings.
pub mod settings;
pub mod status;
/// GetCardInfo.
pub mod storage;

pub use device::{decode_device_info, decode_device_time, decode_recording_file};
pub use files::{FileListParser, decode_file_count};
pub use settings::decode_settings;
pub use status::{DeleteOutcome, decode_delete, decode_firmware_status};
pub use storage::decode_card_info;

use chrono::NaiveDateTime;

use crate::Result;
use crate::protocol::parser;
use crate::types::{CommandId, DeviceInfo, DeviceSettings, FirmwareUpgradeStatus, StorageInfo};

/// High-level Response enum. Per-command decoders live in
/// `protocol::responses::<family>.rs` and are dispatched here.
///
/// Streamed commands (file list, file transfer, file block) yield one
/// `Chunk` per packet; assembling them is the transfer engine's job.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// GetDeviceInfo
    DeviceInfo(DeviceInfo),
    /// GetDeviceTime; `None` when the clock was never set.
    DeviceTime(Option<NaiveDateTime>),
    /// GetFileCount
    FileCount(u32),
    /// DeleteFile
    Delete(DeleteOutcome),
    /// RequestFirmwareUpgrade
    FirmwareStatus(FirmwareUpgradeStatus),
    /// GetSettings
    Settings(DeviceSettings),
    /// GetCardInfo
    CardInfo(StorageInfo),
    /// GetRecordingFile; `None` when idle.
    RecordingFile(Option<String>),
    /// A plain result byte that was zero.
    Ack,
    /// One packet of a streamed reply.
    Chunk(Vec<u8>),
}

impl Response {
    /// Decode a response body for the command that produced it.
    pub fn decode(command: CommandId, data: &[u8]) -> Result<Self> {
        Ok(match command {
            CommandId::GetDeviceInfo => Self::DeviceInfo(decode_device_info(data)?),
            CommandId::GetDeviceTime => Self::DeviceTime(decode_device_time(data)?),
            CommandId::GetFileCount => Self::FileCount(decode_file_count(data)?),
            CommandId::DeleteFile => Self::Delete(decode_delete(data)?),
            CommandId::RequestFirmwareUpgrade => {
                Self::FirmwareStatus(decode_firmware_status(data)?)
            }
            CommandId::GetSettings => Self::Settings(decode_settings(data)?),
            CommandId::GetCardInfo => Self::CardInfo(decode_card_info(data)?),
            CommandId::GetRecordingFile => Self::RecordingFile(decode_recording_file(data)),
            CommandId::SetDeviceTime
            | CommandId::FirmwareUpload
            | CommandId::SetSettings
            | CommandId::FormatCard
            | CommandId::RestoreFactorySettings
            | CommandId::SendMeetingScheduleInfo => {
                parser::expect_success(command.as_u16(), data)?;
                Self::Ack
            }
            CommandId::GetFileList | CommandId::TransferFile | CommandId::GetFileBlock => {
                Self::Chunk(data.to_vec())
            }
        })
    }
}
