#[path = "../common/mod.rs"]
mod common;

use libjensen::protocol::Response;
use libjensen::protocol::responses::files::{encode_file_entry, encode_file_list_header};
use libjensen::protocol::responses::{DeleteOutcome, FileListParser};
use libjensen::types::{CommandId, FirmwareUpgradeStatus};
use libjensen::Error;

#[test]
fn file_list_across_packets() {
    let mut stream = encode_file_list_header(2);
    stream.extend(encode_file_entry(2, common::fixtures::REC_A, 96_044, [0x11; 16]));
    stream.extend(encode_file_entry(1, common::fixtures::REC_C, 1_000, [0x22; 16]));

    let mut parser = FileListParser::new("ABC123");
    for packet in stream.chunks(17) {
        parser.feed(packet).unwrap();
    }
    assert_eq!(parser.announced_total(), Some(2));
    let entries = parser.into_entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].filename, common::fixtures::REC_A);
    assert_eq!(entries[0].duration_seconds, 1.0);
    assert_eq!(
        entries[0].date_created.map(|t| t.to_string()),
        Some("2025-05-12 14:30:15".to_string())
    );
    assert_eq!(entries[1].device_id, "ABC123");
}

#[test]
fn card_info_and_settings() {
    let card = Response::decode(
        CommandId::GetCardInfo,
        &hex::decode("00000100000079ff00000000").unwrap(),
    )
    .unwrap();
    match card {
        Response::CardInfo(s) => {
            assert_eq!(s.used_bytes, 256 * 1024 * 1024);
            assert_eq!(s.total_bytes, 0x79ff * 1024 * 1024);
        }
        other => panic!("unexpected {:?}", other),
    }

    let settings = Response::decode(
        CommandId::GetSettings,
        &hex::decode("00000001000000020000000100000000").unwrap(),
    )
    .unwrap();
    match settings {
        Response::Settings(s) => {
            assert!(s.auto_record);
            assert!(!s.auto_play);
            assert!(s.notification);
            assert!(!s.bluetooth_tone);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn result_byte_commands() {
    assert_eq!(Response::decode(CommandId::FormatCard, &[0]).unwrap(), Response::Ack);
    assert!(matches!(
        Response::decode(CommandId::SetSettings, &[3]),
        Err(Error::CommandRejected { command: 12, code: 3 })
    ));
    assert_eq!(
        Response::decode(CommandId::DeleteFile, &[1]).unwrap(),
        Response::Delete(DeleteOutcome::NotFound)
    );
    assert_eq!(
        Response::decode(CommandId::RequestFirmwareUpgrade, &[2]).unwrap(),
        Response::FirmwareStatus(FirmwareUpgradeStatus::Busy)
    );
}

#[test]
fn unset_clock_reads_as_none() {
    assert_eq!(
        Response::decode(CommandId::GetDeviceTime, &[0; 7]).unwrap(),
        Response::DeviceTime(None)
    );
}
