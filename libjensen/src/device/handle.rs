// libjensen/src/device/handle.rs

//! The device client: connection lifecycle, typed commands and transfers.

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use chrono::{Local, NaiveDateTime};
use log::{debug, info, warn};

use crate::device::config::ClientConfig;
use crate::device::events::{ActivityLevel, ClientEvent, EventHub};
use crate::device::health::HealthMonitor;
use crate::device::lifecycle::Lifecycle;
use crate::dispatcher::Dispatcher;
use crate::protocol::commands::Request;
use crate::protocol::responses::{self, DeleteOutcome, Response};
use crate::protocol::{Packet, parser};
use crate::transfer::{self, CancellationToken, DownloadOutcome};
use crate::transport::Connector;
use crate::types::{
    CommandId, ConnectionState, DeviceInfo, DeviceModel, DeviceSettings, FileEntry,
    FirmwareUpgradeStatus, MeetingSchedule, SettingsPatch, StorageInfo,
};
use crate::{Error, Result};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|p| p.into_inner())
}

pub(crate) struct Inner {
    config: ClientConfig,
    connector: Box<dyn Connector>,
    dispatcher: Dispatcher,
    events: Arc<EventHub>,
    lifecycle: Lifecycle,
    device_info: Mutex<Option<DeviceInfo>>,
    model: Mutex<DeviceModel>,
    session: Mutex<CancellationToken>,
    health: Mutex<Option<HealthMonitor>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        lock(&self.session).cancel();
        let monitor = lock(&self.health).take();
        if let Some(mut m) = monitor {
            m.stop();
        }
        self.dispatcher.detach();
    }
}

/// Client for one HiDock device.
///
/// Cheap to clone; clones share the connection. All methods block the
/// calling thread, and concurrent callers are served one at a time in
/// arrival order.
#[derive(Clone)]
pub struct Jensen {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Jensen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Jensen")
            .field("state", &self.state())
            .field("model", &self.model())
            .finish()
    }
}

impl Jensen {
    /// Client over `connector`. Nothing is opened until [`Jensen::connect`].
    pub fn new(connector: Box<dyn Connector>, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let events = Arc::new(EventHub::new());
        Ok(Self {
            inner: Arc::new(Inner {
                dispatcher: Dispatcher::new(config.dispatcher()),
                lifecycle: Lifecycle::new(Arc::clone(&events)),
                events,
                config,
                connector,
                device_info: Mutex::new(None),
                model: Mutex::new(DeviceModel::Unknown),
                session: Mutex::new(CancellationToken::new()),
                health: Mutex::new(None),
            }),
        })
    }

    /// Start a builder with default configuration.
    pub fn builder() -> crate::device::builder::JensenBuilder {
        crate::device::builder::JensenBuilder::new()
    }

    /// Configuration the client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.inner.lifecycle.state()
    }

    /// True only in the `Connected` state.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Model of the attached device, `Unknown` before the first probe.
    pub fn model(&self) -> DeviceModel {
        *lock(&self.inner.model)
    }

    /// Device info from the last successful probe.
    pub fn cached_device_info(&self) -> Option<DeviceInfo> {
        lock(&self.inner.device_info).clone()
    }

    /// Receive state changes, activity and progress events.
    pub fn subscribe(&self) -> std::sync::mpsc::Receiver<ClientEvent> {
        self.inner.events.subscribe()
    }

    /// Open the device and probe it with GetDeviceInfo.
    pub fn connect(&self) -> Result<DeviceInfo> {
        let inner = &*self.inner;
        inner.lifecycle.begin_connect()?;
        inner.events.activity(ActivityLevel::Info, "connecting");

        let transport = match inner.connector.open() {
            Ok(t) => t,
            Err(e) => return Err(self.fail_connect(e)),
        };
        let model = transport.model();
        inner.dispatcher.attach(transport);

        let info = match self.probe() {
            Ok(info) => info,
            Err(Error::ResponseTimeout { .. }) => {
                inner.dispatcher.detach();
                return Err(self.fail_connect(Error::ProbeTimeout));
            }
            Err(e) => {
                inner.dispatcher.detach();
                return Err(self.fail_connect(e));
            }
        };

        *lock(&inner.model) = model;
        *lock(&inner.device_info) = Some(info.clone());
        *lock(&inner.session) = CancellationToken::new();
        inner.lifecycle.transition(ConnectionState::Connected)?;
        inner.events.activity(
            ActivityLevel::Info,
            format!(
                "connected to {} serial {} firmware {}",
                model, info.serial_number, info.version_code
            ),
        );
        self.start_health_monitor();
        Ok(info)
    }

    fn fail_connect(&self, cause: Error) -> Error {
        self.inner
            .events
            .activity(ActivityLevel::Error, format!("connect failed: {}", cause));
        if let Err(e) = self.inner.lifecycle.transition(ConnectionState::Error) {
            warn!("{}", e);
        }
        cause
    }

    fn start_health_monitor(&self) {
        let Some(interval) = self.inner.config.health_check_interval() else {
            return;
        };
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let spawned = HealthMonitor::spawn(interval, move || {
            let Some(inner) = weak.upgrade() else {
                return false;
            };
            let client = Jensen { inner };
            match client.state() {
                ConnectionState::Connected => {
                    if let Err(e) = client.check_health() {
                        debug!("health check: {}", e);
                    }
                    client.state() != ConnectionState::Disconnected
                }
                ConnectionState::Reconnecting => true,
                _ => false,
            }
        });
        match spawned {
            Ok(m) => *lock(&self.inner.health) = Some(m),
            Err(e) => warn!("health monitor disabled: {}", e),
        }
    }

    fn stop_health_monitor(&self) {
        let monitor = lock(&self.inner.health).take();
        if let Some(mut m) = monitor {
            m.stop();
        }
    }

    /// Tear the connection down. Cancels running transfers at their next
    /// chunk boundary, waits for the wire to be released and closes the
    /// transport. Never fails; calling it while disconnected does nothing.
    pub fn disconnect(&self) {
        let inner = &*self.inner;
        lock(&inner.session).cancel();
        self.stop_health_monitor();
        inner.dispatcher.detach();
        let from = inner.lifecycle.force_disconnected();
        if from != ConnectionState::Disconnected {
            inner.events.activity(ActivityLevel::Info, "disconnected");
        }
    }

    fn probe(&self) -> Result<DeviceInfo> {
        let p = self.inner.dispatcher.request(
            CommandId::GetDeviceInfo,
            &[],
            self.inner.config.probe_timeout_ms,
        )?;
        responses::decode_device_info(&p.body)
    }

    fn remember_info(&self, info: &DeviceInfo) {
        let mut cached = lock(&self.inner.device_info);
        if let Some(old) = cached.as_ref() {
            if old.serial_number != info.serial_number {
                self.inner.events.activity(
                    ActivityLevel::Warn,
                    format!(
                        "device serial changed from {} to {}",
                        old.serial_number, info.serial_number
                    ),
                );
            } else if old.version_number != info.version_number {
                info!(
                    "firmware changed from {} to {}",
                    old.version_code, info.version_code
                );
            }
        }
        *cached = Some(info.clone());
    }

    /// Endpoint-reset fast path. Returns the error to surface: the cause
    /// wrapped as `ConnectionRecovered` or `ConnectionLost`.
    fn recover(&self, cause: Error) -> Error {
        let inner = &*self.inner;
        if !inner.lifecycle.begin_recovery() {
            return cause;
        }
        inner
            .events
            .activity(ActivityLevel::Warn, format!("resetting link after: {}", cause));

        for attempt in 1..=inner.config.reset_attempts {
            let result = inner.dispatcher.begin().and_then(|mut ex| {
                ex.reset_link()?;
                let p = ex.request(CommandId::GetDeviceInfo, &[], inner.config.probe_timeout_ms)?;
                responses::decode_device_info(&p.body)
            });
            match result {
                Ok(info) => {
                    self.remember_info(&info);
                    if let Err(e) = inner.lifecycle.transition(ConnectionState::Connected) {
                        warn!("{}", e);
                    }
                    inner.events.activity(
                        ActivityLevel::Info,
                        format!("link reset succeeded on attempt {}", attempt),
                    );
                    return Error::ConnectionRecovered(Box::new(cause));
                }
                Err(e) => warn!(
                    "link reset attempt {}/{} failed: {}",
                    attempt, inner.config.reset_attempts, e
                ),
            }
        }

        lock(&inner.session).cancel();
        self.stop_health_monitor();
        inner.dispatcher.detach();
        if let Err(e) = inner.lifecycle.transition(ConnectionState::Disconnected) {
            warn!("{}", e);
        }
        inner.events.activity(
            ActivityLevel::Error,
            format!("connection lost, reconnect required: {}", cause),
        );
        Error::ConnectionLost(Box::new(cause))
    }

    /// Run `op` against the dispatcher, sending desync and pipe failures
    /// through recovery.
    fn run<T>(&self, op: impl FnOnce(&Dispatcher) -> Result<T>) -> Result<T> {
        self.inner.lifecycle.require_connected()?;
        match op(&self.inner.dispatcher) {
            Ok(v) => Ok(v),
            Err(e) if e.requires_recovery() => Err(self.recover(e)),
            Err(e) => Err(e),
        }
    }

    fn command(&self, req: Request) -> Result<Packet> {
        let command = req.command_id();
        let body = req.encode()?;
        self.announce(command);
        let timeout = self.inner.config.command_timeout_ms;
        self.run(|d| d.request(command, &body, timeout))
    }

    fn announce(&self, command: CommandId) {
        if command.is_destructive() {
            self.inner
                .events
                .activity(ActivityLevel::Warn, format!("sending destructive command {}", command));
        }
    }

    fn ack(&self, req: Request) -> Result<()> {
        let command = req.command_id();
        let p = self.command(req)?;
        parser::expect_success(command.as_u16(), &p.body)
    }

    /// One health probe. Any failure, timeouts included, goes through
    /// recovery.
    pub fn check_health(&self) -> Result<()> {
        self.inner.lifecycle.require_connected()?;
        match self.probe() {
            Ok(info) => {
                self.remember_info(&info);
                Ok(())
            }
            Err(e) => Err(self.recover(e)),
        }
    }

    /// Query version and serial number, refreshing the cached copy.
    pub fn get_device_info(&self) -> Result<DeviceInfo> {
        let p = self.command(Request::GetDeviceInfo)?;
        let info = responses::decode_device_info(&p.body)?;
        self.remember_info(&info);
        Ok(info)
    }

    /// Device clock, or `None` if it was never set.
    pub fn get_device_time(&self) -> Result<Option<NaiveDateTime>> {
        let p = self.command(Request::GetDeviceTime)?;
        responses::decode_device_time(&p.body)
    }

    /// Set the device clock.
    pub fn set_device_time(&self, time: NaiveDateTime) -> Result<()> {
        self.ack(Request::SetDeviceTime { time })
    }

    /// Set the device clock to the host's local time.
    pub fn sync_device_time(&self) -> Result<NaiveDateTime> {
        let now = Local::now().naive_local();
        self.set_device_time(now)?;
        Ok(now)
    }

    /// Read the device's behaviour settings.
    pub fn get_settings(&self) -> Result<DeviceSettings> {
        let p = self.command(Request::GetSettings)?;
        responses::decode_settings(&p.body)
    }

    /// Change the fields present in `patch`. An empty patch is not sent.
    pub fn set_settings(&self, patch: SettingsPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        self.ack(Request::SetSettings { patch })
    }

    /// Capacity and usage of the storage card.
    pub fn get_card_info(&self) -> Result<StorageInfo> {
        let p = self.command(Request::GetCardInfo)?;
        responses::decode_card_info(&p.body)
    }

    /// Erase the storage card. Destructive; failures are returned as-is and
    /// never retried.
    pub fn format_card(&self) -> Result<()> {
        self.ack(Request::FormatCard)
    }

    /// Reset every device setting. Destructive; never retried.
    pub fn restore_factory_settings(&self) -> Result<()> {
        self.ack(Request::RestoreFactorySettings)
    }

    /// Delete one recording. A missing file is `FileNotFound`.
    pub fn delete_file(&self, filename: &str) -> Result<()> {
        let p = self.command(Request::DeleteFile {
            filename: filename.to_string(),
        })?;
        match responses::decode_delete(&p.body)? {
            DeleteOutcome::Deleted => Ok(()),
            DeleteOutcome::NotFound => Err(Error::FileNotFound(filename.to_string())),
            DeleteOutcome::Failed(code) => Err(Error::CommandRejected {
                command: CommandId::DeleteFile.as_u16(),
                code,
            }),
        }
    }

    /// Number of recordings on the card.
    pub fn get_file_count(&self) -> Result<u32> {
        let p = self.command(Request::GetFileCount)?;
        responses::decode_file_count(&p.body)
    }

    /// Name of the file being recorded right now, if any.
    pub fn get_recording_file(&self) -> Result<Option<String>> {
        let p = self.command(Request::GetRecordingFile)?;
        Ok(responses::decode_recording_file(&p.body))
    }

    /// Replace the calendar entries held by the device.
    pub fn send_meeting_schedule(&self, schedules: &[MeetingSchedule]) -> Result<()> {
        self.ack(Request::SendMeetingScheduleInfo {
            schedules: schedules.to_vec(),
        })
    }

    /// Complete file list; entries carry the connected device's serial.
    pub fn list_files(&self) -> Result<Vec<FileEntry>> {
        let device_id = self
            .cached_device_info()
            .map(|i| i.serial_number)
            .unwrap_or_default();
        let timeout = self.inner.config.transfer_timeout_ms;
        let resync = self.inner.config.resync_attempts;
        self.run(|d| transfer::list_files(d, &device_id, timeout, resync))
    }

    /// Stream `filename` to `on_chunk`. Returns `Cancelled` when `cancel`
    /// (or `disconnect()`) fires between chunks.
    pub fn download_file(
        &self,
        filename: &str,
        expected_size: u64,
        cancel: &CancellationToken,
        mut on_chunk: impl FnMut(&[u8]),
    ) -> Result<DownloadOutcome> {
        let token = cancel.linked_with(&lock(&self.inner.session));
        let events = Arc::clone(&self.inner.events);
        let options = self.inner.config.stream_options();
        let mut received = 0u64;
        let mut forward = |chunk: &[u8]| {
            received += chunk.len() as u64;
            on_chunk(chunk);
            events.progress(received, expected_size);
        };
        self.run(|d| transfer::download_file(d, filename, expected_size, options, &token, &mut forward))
    }

    /// Download into any writer. A write error stops the transfer and is
    /// returned as `Error::Io`.
    pub fn download_file_to<W: Write>(
        &self,
        filename: &str,
        expected_size: u64,
        cancel: &CancellationToken,
        writer: &mut W,
    ) -> Result<DownloadOutcome> {
        let stop = cancel.child();
        let mut failure: Option<std::io::Error> = None;
        let outcome = self.download_file(filename, expected_size, &stop, |chunk| {
            if failure.is_none() {
                if let Err(e) = writer.write_all(chunk) {
                    failure = Some(e);
                    stop.cancel();
                }
            }
        })?;
        if let Some(e) = failure {
            return Err(Error::Io(e));
        }
        writer.flush()?;
        Ok(outcome)
    }

    /// First `length` bytes of `filename` (GetFileBlock).
    pub fn read_file_block(&self, filename: &str, length: u32) -> Result<Vec<u8>> {
        let token = lock(&self.inner.session).child();
        let options = self.inner.config.stream_options();
        let mut data = Vec::with_capacity(length as usize);
        let outcome = self.run(|d| {
            transfer::read_file_block(d, filename, length, options, &token, &mut |c| {
                data.extend_from_slice(c)
            })
        })?;
        match outcome {
            DownloadOutcome::Completed { .. } => Ok(data),
            DownloadOutcome::Cancelled { .. } => Err(Error::NotConnected(self.state())),
        }
    }

    /// Ask the device to accept a firmware image of `file_length` bytes for
    /// `target_version`. `current_version` is checked against the
    /// connected device and logged; the device only receives the target.
    pub fn request_firmware_upgrade(
        &self,
        current_version: u32,
        target_version: u32,
        file_length: u32,
    ) -> Result<FirmwareUpgradeStatus> {
        if file_length == 0 {
            return Err(Error::InvalidArgument("firmware length is zero".into()));
        }
        if let Some(info) = self.cached_device_info() {
            if info.version_number != current_version {
                warn!(
                    "firmware request says current version {} but device reports {}",
                    current_version, info.version_number
                );
            }
        }
        info!(
            "requesting firmware upgrade {} -> {} ({} bytes)",
            current_version, target_version, file_length
        );
        let p = self.command(Request::RequestFirmwareUpgrade {
            target_version,
            file_length,
        })?;
        responses::decode_firmware_status(&p.body)
    }

    /// Upload a firmware image staged with `request_firmware_upgrade`.
    /// Progress goes to `on_progress` and to subscribers.
    pub fn upload_firmware(&self, image: &[u8], mut on_progress: impl FnMut(u64, u64)) -> Result<()> {
        let events = Arc::clone(&self.inner.events);
        let timeout = self.inner.config.transfer_timeout_ms;
        let mut forward = |done: u64, total: u64| {
            on_progress(done, total);
            events.progress(done, total);
        };
        self.run(|d| transfer::upload_firmware(d, image, timeout, &mut forward))?;
        self.inner
            .events
            .activity(ActivityLevel::Info, "firmware upload accepted");
        if let Err(e) = self.get_device_info() {
            warn!("device info refresh after firmware upload failed: {}", e);
        }
        Ok(())
    }

    /// Send a documented command by numeric id and decode its reply.
    /// Unknown ids (including 10, 14 and 15) fail before anything is
    /// written; streamed commands have dedicated methods.
    pub fn execute_raw(&self, command: u16, body: &[u8]) -> Result<Response> {
        let command = CommandId::try_from(command)?;
        if matches!(
            command,
            CommandId::GetFileList | CommandId::TransferFile | CommandId::GetFileBlock
        ) {
            return Err(Error::InvalidArgument(format!(
                "{} streams its reply; use the dedicated method",
                command
            )));
        }
        self.announce(command);
        let timeout = self.inner.config.command_timeout_ms;
        let p = self.run(|d| d.request(command, body, timeout))?;
        Response::decode(command, &p.body)
    }

    #[doc(hidden)]
    pub fn force_sequence(&self, last: u32) {
        self.inner.dispatcher.force_sequence(last);
    }
}
