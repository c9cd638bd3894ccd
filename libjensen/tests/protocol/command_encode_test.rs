use chrono::NaiveDate;
use libjensen::protocol::Request;
use libjensen::protocol::codec::encode_request_frame;
use libjensen::types::{CommandId, MeetingSchedule, SettingsPatch};
use libjensen::Error;

#[test]
fn set_device_time_is_bcd() {
    let time = NaiveDate::from_ymd_opt(2025, 5, 12)
        .unwrap()
        .and_hms_opt(14, 30, 15)
        .unwrap();
    let body = Request::SetDeviceTime { time }.encode().unwrap();
    assert_eq!(hex::encode(body), "20250512143015");
}

#[test]
fn set_settings_keeps_untouched_slots() {
    let patch = SettingsPatch::new().auto_record(true).bluetooth_tone(false);
    let body = Request::SetSettings { patch }.encode().unwrap();
    assert_eq!(hex::encode(body), "00000001000000000000000000000002");
}

#[test]
fn file_block_prefixes_length() {
    let req = Request::GetFileBlock {
        filename: "a.hda".into(),
        length: 1024,
    };
    assert_eq!(req.command_id(), CommandId::GetFileBlock);
    assert_eq!(req.encode().unwrap(), b"\x00\x00\x04\x00a.hda".to_vec());
}

#[test]
fn firmware_request_frame() {
    let frame = encode_request_frame(
        &Request::RequestFirmwareUpgrade {
            target_version: 393733,
            file_length: 65536,
        },
        3,
    )
    .unwrap();
    assert_eq!(&frame[..12], hex::decode("123400080000000300000008").unwrap().as_slice());
    assert_eq!(&frame[12..20], &[0x00, 0x06, 0x02, 0x05, 0x00, 0x01, 0x00, 0x00]);
}

#[test]
fn destructive_commands_need_no_arguments() {
    for req in [Request::FormatCard, Request::RestoreFactorySettings] {
        assert!(req.command_id().is_destructive());
        assert_eq!(req.encode().unwrap(), vec![1, 2, 3, 4]);
    }
}

#[test]
fn non_ascii_filename_rejected_before_io() {
    let req = Request::DeleteFile {
        filename: "会議.hda".into(),
    };
    assert!(matches!(req.encode(), Err(Error::InvalidArgument(_))));
}

#[test]
fn schedule_ending_before_start_rejected() {
    let start = NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    let req = Request::SendMeetingScheduleInfo {
        schedules: vec![MeetingSchedule {
            start,
            end: start - chrono::Duration::minutes(5),
            platform: 1,
            shortcut: vec![],
        }],
    };
    assert!(matches!(req.encode(), Err(Error::InvalidArgument(_))));
}

#[test]
fn undocumented_ids_have_no_command() {
    for id in [0u16, 10, 14, 15, 21] {
        assert!(matches!(
            CommandId::try_from(id),
            Err(Error::UnsupportedCommand(x)) if x == id
        ));
    }
    assert_eq!(CommandId::try_from(20).unwrap(), CommandId::SendMeetingScheduleInfo);
}
