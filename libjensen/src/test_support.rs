// libjensen/src/test_support.rs

//! Test support helpers intended for use by unit and integration tests.
//!
//! The centrepiece is [`SimulatedDevice`], a responder for
//! `MockTransport` that answers every documented command the way a HiDock
//! does, so tests across the crate and the tests/ directory drive the real
//! client against one shared model of the device.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use crate::device::{ClientConfig, Jensen};
use crate::protocol::Packet;
use crate::protocol::commands::settings::SETTING_KEEP;
use crate::protocol::responses::files::{encode_file_entry, encode_file_list_header};
use crate::transport::{MockConnector, MockTransport};
use crate::types::CommandId;
use crate::Result;

/// GetDeviceInfo body for firmware 6.2.5 and the given serial.
#[doc(hidden)]
pub fn device_info_body(serial: &str) -> Vec<u8> {
    let mut body = vec![0x00, 0x06, 0x02, 0x05];
    let mut s = serial.as_bytes().to_vec();
    s.resize(16, 0);
    body.extend_from_slice(&s);
    body
}

/// Encode `body` as the reply to `req` (same command and sequence).
#[doc(hidden)]
pub fn reply(req: &Packet, body: Vec<u8>) -> Vec<u8> {
    Packet::new(req.command, req.sequence, body)
        .encode()
        .unwrap_or_default()
}

/// Deterministic file content of `len` bytes.
#[doc(hidden)]
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

/// Short timeouts and no background health monitor.
#[doc(hidden)]
pub fn test_config() -> ClientConfig {
    ClientConfig {
        command_timeout_ms: 300,
        probe_timeout_ms: 300,
        transfer_timeout_ms: 300,
        health_check_interval_ms: None,
        ..ClientConfig::default()
    }
}

/// A recording held by [`SimulatedDevice`].
#[derive(Debug, Clone)]
pub struct SimulatedFile {
    /// Filename reported in the list.
    pub name: String,
    /// Content streamed by TransferFile and GetFileBlock.
    pub data: Vec<u8>,
    /// Format byte reported in the list.
    pub format_version: u8,
}

/// In-memory HiDock.
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    /// Serial number returned by GetDeviceInfo.
    pub serial: String,
    /// Recordings, in list order.
    pub files: Vec<SimulatedFile>,
    /// Largest data body per streamed packet.
    pub chunk_size: usize,
    /// Send the optional header in front of the file list.
    pub list_header: bool,
    /// Raw setting words (1 on, 2 off).
    pub settings: [u32; 4],
    /// Device clock as stored on the device.
    pub clock_bcd: [u8; 7],
    /// Recording in progress.
    pub recording: Option<String>,
    /// Card usage in MiB.
    pub card_used_mib: u32,
    /// Card capacity in MiB.
    pub card_capacity_mib: u32,
    /// Last accepted `(target_version, file_length)`.
    pub staged_firmware: Option<(u32, u32)>,
    /// Image bytes received by FirmwareUpload.
    pub uploaded_firmware: Vec<u8>,
    /// Number of SendMeetingScheduleInfo requests seen.
    pub schedules_received: usize,
    /// Set once FormatCard succeeds.
    pub formatted: bool,
}

impl SimulatedDevice {
    /// Empty device with default settings and clock.
    pub fn new(serial: &str) -> Self {
        Self {
            serial: serial.to_string(),
            files: Vec::new(),
            chunk_size: 4096,
            list_header: true,
            settings: [1, 2, 1, 2],
            clock_bcd: [0x20, 0x25, 0x05, 0x12, 0x14, 0x30, 0x15],
            recording: None,
            card_used_mib: 256,
            card_capacity_mib: 31_232,
            staged_firmware: None,
            uploaded_firmware: Vec::new(),
            schedules_received: 0,
            formatted: false,
        }
    }

    /// Add a 48 kHz WAV recording.
    pub fn with_file(mut self, name: &str, data: Vec<u8>) -> Self {
        self.files.push(SimulatedFile {
            name: name.to_string(),
            data,
            format_version: 2,
        });
        self
    }

    /// Largest data body per streamed packet; at least 1.
    pub fn with_chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = n.max(1);
        self
    }

    fn stream(&self, req: &Packet, data: &[u8]) -> Vec<Vec<u8>> {
        data.chunks(self.chunk_size)
            .map(|c| reply(req, c.to_vec()))
            .collect()
    }

    fn file(&self, name: &[u8]) -> Option<&SimulatedFile> {
        self.files.iter().find(|f| f.name.as_bytes() == name)
    }

    /// Frames the device writes back for one request.
    pub fn respond(&mut self, req: &Packet) -> Vec<Vec<u8>> {
        let Ok(command) = CommandId::try_from(req.command) else {
            return Vec::new();
        };
        let ok = || vec![reply(req, vec![0])];
        match command {
            CommandId::GetDeviceInfo => vec![reply(req, device_info_body(&self.serial))],
            CommandId::GetDeviceTime => vec![reply(req, self.clock_bcd.to_vec())],
            CommandId::SetDeviceTime => {
                if let Ok(bcd) = <[u8; 7]>::try_from(req.body.as_slice()) {
                    self.clock_bcd = bcd;
                }
                ok()
            }
            CommandId::GetFileCount => {
                vec![reply(req, (self.files.len() as u32).to_be_bytes().to_vec())]
            }
            CommandId::GetFileList => {
                let mut list = if self.list_header {
                    encode_file_list_header(self.files.len() as u32)
                } else {
                    Vec::new()
                };
                for (i, f) in self.files.iter().enumerate() {
                    list.extend(encode_file_entry(
                        f.format_version,
                        &f.name,
                        f.data.len() as u32,
                        [i as u8; 16],
                    ));
                }
                self.stream(req, &list)
            }
            CommandId::TransferFile => match self.file(&req.body) {
                Some(f) => self.stream(req, &f.data),
                None => vec![reply(req, Vec::new())],
            },
            CommandId::GetFileBlock => {
                if req.body.len() < 4 {
                    return vec![reply(req, Vec::new())];
                }
                let len = u32::from_be_bytes([req.body[0], req.body[1], req.body[2], req.body[3]]);
                match self.file(&req.body[4..]) {
                    Some(f) => {
                        let n = (len as usize).min(f.data.len());
                        self.stream(req, &f.data[..n])
                    }
                    None => vec![reply(req, Vec::new())],
                }
            }
            CommandId::DeleteFile => {
                let before = self.files.len();
                self.files.retain(|f| f.name.as_bytes() != req.body.as_slice());
                let code = if self.files.len() < before { 0 } else { 1 };
                vec![reply(req, vec![code])]
            }
            CommandId::RequestFirmwareUpgrade => {
                if req.body.len() == 8 {
                    let version = u32::from_be_bytes([req.body[0], req.body[1], req.body[2], req.body[3]]);
                    let length = u32::from_be_bytes([req.body[4], req.body[5], req.body[6], req.body[7]]);
                    self.staged_firmware = Some((version, length));
                }
                ok()
            }
            CommandId::FirmwareUpload => {
                self.uploaded_firmware = req.body.clone();
                ok()
            }
            CommandId::GetSettings => {
                let body = self.settings.iter().flat_map(|s| s.to_be_bytes()).collect();
                vec![reply(req, body)]
            }
            CommandId::SetSettings => {
                for (i, slot) in req.body.chunks(4).take(4).enumerate() {
                    if let Ok(b) = <[u8; 4]>::try_from(slot) {
                        let v = u32::from_be_bytes(b);
                        if v != SETTING_KEEP {
                            self.settings[i] = v;
                        }
                    }
                }
                ok()
            }
            CommandId::GetCardInfo => {
                let mut body = self.card_used_mib.to_be_bytes().to_vec();
                body.extend_from_slice(&self.card_capacity_mib.to_be_bytes());
                body.extend_from_slice(&0u32.to_be_bytes());
                vec![reply(req, body)]
            }
            CommandId::FormatCard => {
                self.formatted = true;
                self.files.clear();
                self.card_used_mib = 0;
                ok()
            }
            CommandId::GetRecordingFile => {
                let name = self.recording.clone().unwrap_or_default();
                vec![reply(req, name.into_bytes())]
            }
            CommandId::RestoreFactorySettings => {
                self.settings = [2, 2, 2, 2];
                ok()
            }
            CommandId::SendMeetingScheduleInfo => {
                self.schedules_received += 1;
                ok()
            }
        }
    }
}

/// Install `sim` as the responder of a fresh mock and return the connector,
/// the transport handle and the shared device state.
#[doc(hidden)]
pub fn simulated_device(
    sim: SimulatedDevice,
) -> (MockConnector, MockTransport, Arc<Mutex<SimulatedDevice>>) {
    let shared = Arc::new(Mutex::new(sim));
    let transport = MockTransport::new();
    let device = Arc::clone(&shared);
    transport.set_responder(move |req| {
        device
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .respond(req)
    });
    (MockConnector::new(transport.clone()), transport, shared)
}

/// Mock connector backed by an empty simulated device.
#[doc(hidden)]
pub fn scripted_device(serial: &str) -> (MockConnector, MockTransport) {
    let (connector, transport, _) = simulated_device(SimulatedDevice::new(serial));
    (connector, transport)
}

/// A connected client over `sim`, using [`test_config`].
#[doc(hidden)]
pub fn connected_client(
    sim: SimulatedDevice,
) -> Result<(Jensen, MockTransport, Arc<Mutex<SimulatedDevice>>)> {
    let (connector, transport, shared) = simulated_device(sim);
    let client = Jensen::new(Box::new(connector), test_config())?;
    client.connect()?;
    Ok((client, transport, shared))
}
