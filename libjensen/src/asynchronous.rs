// libjensen/src/asynchronous.rs

//! Tokio front end. Every call runs the blocking client on the blocking
//! thread pool, so the ordering and recovery rules are exactly those of
//! [`Jensen`].

use chrono::NaiveDateTime;

use crate::device::{ClientEvent, Jensen};
use crate::protocol::Response;
use crate::transfer::{CancellationToken, DownloadOutcome};
use crate::types::{
    ConnectionState, DeviceInfo, DeviceSettings, FileEntry, FirmwareUpgradeStatus,
    MeetingSchedule, SettingsPatch, StorageInfo,
};
use crate::{Error, Result};

/// Async handle over a [`Jensen`] client. Cheap to clone; clones share
/// the connection.
#[derive(Debug, Clone)]
pub struct AsyncJensen {
    inner: Jensen,
}

impl From<Jensen> for AsyncJensen {
    fn from(inner: Jensen) -> Self {
        Self { inner }
    }
}

impl AsyncJensen {
    /// Wrap an existing client.
    pub fn new(inner: Jensen) -> Self {
        Self { inner }
    }

    /// The blocking client underneath.
    pub fn blocking(&self) -> &Jensen {
        &self.inner
    }

    /// Current connection state. Does not block.
    pub fn state(&self) -> ConnectionState {
        self.inner.state()
    }

    /// See [`Jensen::subscribe`].
    pub fn subscribe(&self) -> std::sync::mpsc::Receiver<ClientEvent> {
        self.inner.subscribe()
    }

    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(Jensen) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let client = self.inner.clone();
        tokio::task::spawn_blocking(move || f(client))
            .await
            .map_err(|e| Error::TaskFailed(e.to_string()))?
    }

    /// See [`Jensen::connect`].
    pub async fn connect(&self) -> Result<DeviceInfo> {
        self.run(|c| c.connect()).await
    }

    /// Disconnect. Only fails if the blocking task cannot run.
    pub async fn disconnect(&self) -> Result<()> {
        self.run(|c| {
            c.disconnect();
            Ok(())
        })
        .await
    }

    /// See [`Jensen::check_health`].
    pub async fn check_health(&self) -> Result<()> {
        self.run(|c| c.check_health()).await
    }

    /// Fresh GetDeviceInfo round trip.
    pub async fn get_device_info(&self) -> Result<DeviceInfo> {
        self.run(|c| c.get_device_info()).await
    }

    /// Device clock, `None` if it was never set.
    pub async fn get_device_time(&self) -> Result<Option<NaiveDateTime>> {
        self.run(|c| c.get_device_time()).await
    }

    /// Set the device clock.
    pub async fn set_device_time(&self, time: NaiveDateTime) -> Result<()> {
        self.run(move |c| c.set_device_time(time)).await
    }

    /// Set the device clock to host local time.
    pub async fn sync_device_time(&self) -> Result<NaiveDateTime> {
        self.run(|c| c.sync_device_time()).await
    }

    /// Current behaviour toggles.
    pub async fn get_settings(&self) -> Result<DeviceSettings> {
        self.run(|c| c.get_settings()).await
    }

    /// Apply a settings patch.
    pub async fn set_settings(&self, patch: SettingsPatch) -> Result<()> {
        self.run(move |c| c.set_settings(patch)).await
    }

    /// Storage card usage.
    pub async fn get_card_info(&self) -> Result<StorageInfo> {
        self.run(|c| c.get_card_info()).await
    }

    /// Erase the storage card.
    pub async fn format_card(&self) -> Result<()> {
        self.run(|c| c.format_card()).await
    }

    /// Reset every device setting.
    pub async fn restore_factory_settings(&self) -> Result<()> {
        self.run(|c| c.restore_factory_settings()).await
    }

    /// See [`Jensen::delete_file`].
    pub async fn delete_file(&self, filename: impl Into<String>) -> Result<()> {
        let filename = filename.into();
        self.run(move |c| c.delete_file(&filename)).await
    }

    /// Number of recordings on the device.
    pub async fn get_file_count(&self) -> Result<u32> {
        self.run(|c| c.get_file_count()).await
    }

    /// Name of the recording in progress, if any.
    pub async fn get_recording_file(&self) -> Result<Option<String>> {
        self.run(|c| c.get_recording_file()).await
    }

    /// See [`Jensen::list_files`].
    pub async fn list_files(&self) -> Result<Vec<FileEntry>> {
        self.run(|c| c.list_files()).await
    }

    /// Download into memory. On cancellation the bytes received so far are
    /// returned with the `Cancelled` outcome.
    pub async fn download_file(
        &self,
        filename: impl Into<String>,
        expected_size: u64,
        cancel: CancellationToken,
    ) -> Result<(DownloadOutcome, Vec<u8>)> {
        let filename = filename.into();
        self.run(move |c| {
            let mut data = Vec::with_capacity(expected_size as usize);
            let outcome =
                c.download_file(&filename, expected_size, &cancel, |chunk| data.extend_from_slice(chunk))?;
            Ok((outcome, data))
        })
        .await
    }

    /// First `length` bytes of a recording.
    pub async fn read_file_block(&self, filename: impl Into<String>, length: u32) -> Result<Vec<u8>> {
        let filename = filename.into();
        self.run(move |c| c.read_file_block(&filename, length)).await
    }

    /// See [`Jensen::request_firmware_upgrade`].
    pub async fn request_firmware_upgrade(
        &self,
        current_version: u32,
        target_version: u32,
        file_length: u32,
    ) -> Result<FirmwareUpgradeStatus> {
        self.run(move |c| c.request_firmware_upgrade(current_version, target_version, file_length))
            .await
    }

    /// Upload a firmware image. Progress is still published as events.
    pub async fn upload_firmware(&self, image: Vec<u8>) -> Result<()> {
        self.run(move |c| c.upload_firmware(&image, |_, _| {})).await
    }

    /// Push upcoming meetings to the device.
    pub async fn send_meeting_schedule(&self, schedules: Vec<MeetingSchedule>) -> Result<()> {
        self.run(move |c| c.send_meeting_schedule(&schedules)).await
    }

    /// See [`Jensen::execute_raw`].
    pub async fn execute_raw(&self, command: u16, body: Vec<u8>) -> Result<Response> {
        self.run(move |c| c.execute_raw(command, &body)).await
    }
}
