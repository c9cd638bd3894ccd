#[path = "../common/mod.rs"]
mod common;

use chrono::NaiveDate;
use common::fixtures::{REC_A, REC_C, recorder_with_files};
use common::helpers::{SimulatedDevice, connected_client, pattern};
use libjensen::device::{ActivityLevel, ClientEvent};
use libjensen::protocol::Response;
use libjensen::types::{FirmwareUpgradeStatus, MeetingSchedule, SettingsPatch};
use libjensen::{DeviceModel, Error};

#[test]
fn reference_device_info() {
    let (client, _mock, _sim) = connected_client(SimulatedDevice::new("ABC123")).unwrap();
    let info = client.get_device_info().unwrap();
    assert_eq!(info.version_code, "6.2.5");
    assert_eq!(info.version_number, 393733);
    assert_eq!(info.serial_number, "ABC123");
    assert_eq!(client.cached_device_info(), Some(info));
    assert_eq!(client.model(), DeviceModel::Unknown);
}

#[test]
fn clock_round_trip() {
    let (client, _mock, _sim) = connected_client(SimulatedDevice::new("ABC123")).unwrap();
    let initial = client.get_device_time().unwrap().unwrap();
    assert_eq!(initial.to_string(), "2025-05-12 14:30:15");

    let t = NaiveDate::from_ymd_opt(2026, 1, 2)
        .unwrap()
        .and_hms_opt(3, 4, 5)
        .unwrap();
    client.set_device_time(t).unwrap();
    assert_eq!(client.get_device_time().unwrap(), Some(t));
}

#[test]
fn settings_patch_changes_only_named_fields() {
    let (client, _mock, _sim) = connected_client(SimulatedDevice::new("ABC123")).unwrap();
    let before = client.get_settings().unwrap();
    assert!(before.auto_record);
    assert!(!before.auto_play);

    let patch = SettingsPatch::new().auto_play(true);
    client.set_settings(patch).unwrap();
    let after = client.get_settings().unwrap();
    assert_eq!(after, patch.apply_to(before));

    client.restore_factory_settings().unwrap();
    let reset = client.get_settings().unwrap();
    assert!(!reset.auto_record && !reset.auto_play && !reset.notification && !reset.bluetooth_tone);
}

#[test]
fn storage_and_files() {
    let (client, mock, sim) = connected_client(recorder_with_files()).unwrap();

    let card = client.get_card_info().unwrap();
    assert_eq!(card.used_bytes, 256 * 1024 * 1024);
    assert_eq!(card.total_bytes, 31_232 * 1024 * 1024);

    assert_eq!(client.get_file_count().unwrap(), 3);
    let files = client.list_files().unwrap();
    assert_eq!(files.len(), 3);
    assert_eq!(files[0].filename, REC_A);
    assert!(files.iter().all(|f| f.device_id == "ABC123"));

    client.delete_file(REC_C).unwrap();
    assert!(matches!(
        client.delete_file(REC_C),
        Err(Error::FileNotFound(name)) if name == REC_C
    ));
    assert_eq!(client.get_file_count().unwrap(), 2);

    client.format_card().unwrap();
    assert!(sim.lock().unwrap().formatted);
    let requests_before = mock.requests().len();
    assert!(client.list_files().unwrap().is_empty());
    // Only GetFileCount went out.
    assert_eq!(mock.request_commands()[requests_before..], [6]);
}

#[test]
fn recording_file() {
    let (client, _mock, sim) = connected_client(SimulatedDevice::new("ABC123")).unwrap();
    assert_eq!(client.get_recording_file().unwrap(), None);
    sim.lock().unwrap().recording = Some(REC_A.to_string());
    assert_eq!(client.get_recording_file().unwrap(), Some(REC_A.to_string()));
}

#[test]
fn firmware_request_and_upload() {
    let (client, _mock, sim) = connected_client(SimulatedDevice::new("ABC123")).unwrap();
    let image = pattern(40_000);

    let status = client
        .request_firmware_upgrade(393733, 393734, image.len() as u32)
        .unwrap();
    assert_eq!(status, FirmwareUpgradeStatus::Accepted);
    assert_eq!(sim.lock().unwrap().staged_firmware, Some((393734, 40_000)));

    let mut last = (0, 0);
    client.upload_firmware(&image, |done, total| last = (done, total)).unwrap();
    assert_eq!(last, (40_000, 40_000));
    assert_eq!(sim.lock().unwrap().uploaded_firmware, image);

    assert!(matches!(
        client.request_firmware_upgrade(393733, 393734, 0),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(client.upload_firmware(&[], |_, _| {}), Err(Error::InvalidArgument(_))));
}

#[test]
fn meeting_schedule() {
    let (client, _mock, sim) = connected_client(SimulatedDevice::new("ABC123")).unwrap();
    let start = NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    let schedule = MeetingSchedule {
        start,
        end: start + chrono::Duration::hours(1),
        platform: 1,
        shortcut: vec![0x11, 0x22],
    };
    client.send_meeting_schedule(&[schedule]).unwrap();
    assert_eq!(sim.lock().unwrap().schedules_received, 1);
}

#[test]
fn raw_commands() {
    let (client, mock, _sim) = connected_client(recorder_with_files()).unwrap();
    match client.execute_raw(6, &[]).unwrap() {
        Response::FileCount(n) => assert_eq!(n, 3),
        other => panic!("unexpected {:?}", other),
    }

    let writes = mock.writes().len();
    assert!(matches!(client.execute_raw(10, &[]), Err(Error::UnsupportedCommand(10))));
    assert!(matches!(client.execute_raw(5, b"x.hda"), Err(Error::InvalidArgument(_))));
    assert_eq!(mock.writes().len(), writes);
}

#[test]
fn destructive_commands_are_announced() {
    let (client, _mock, sim) = connected_client(recorder_with_files()).unwrap();
    let events = client.subscribe();

    client.format_card().unwrap();
    client.execute_raw(19, &[1, 2, 3, 4]).unwrap();
    client.get_file_count().unwrap();
    assert!(sim.lock().unwrap().formatted);

    let warnings: Vec<String> = events
        .try_iter()
        .filter_map(|e| match e {
            ClientEvent::Activity(a) if a.level == ActivityLevel::Warn => Some(a.message),
            _ => None,
        })
        .collect();
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].contains("FormatCard"));
    assert!(warnings[1].contains("RestoreFactorySettings"));
}
