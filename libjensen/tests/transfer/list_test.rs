#[path = "../common/mod.rs"]
mod common;

use common::fixtures::{REC_A, REC_B, REC_C, recorder_with_files};
use common::helpers::{SimulatedDevice, connected_client};

#[test]
fn list_with_header_in_small_packets() {
    let (client, _mock, _sim) = connected_client(recorder_with_files().with_chunk_size(7)).unwrap();
    let files = client.list_files().unwrap();
    let names: Vec<_> = files.iter().map(|f| f.filename.as_str()).collect();
    assert_eq!(names, vec![REC_A, REC_B, REC_C]);
    assert_eq!(files[1].size_bytes, 48_022);
    assert_eq!(files[1].signature, "01".repeat(16));
    assert!(files[1].date_created.is_some());
    assert_eq!(files[2].date_created, None);
}

#[test]
fn list_without_header_uses_file_count() {
    let mut sim = recorder_with_files();
    sim.list_header = false;
    let (client, mock, _sim) = connected_client(sim).unwrap();
    assert_eq!(client.list_files().unwrap().len(), 3);
    assert_eq!(mock.request_commands(), vec![1, 6, 4]);
}

#[test]
fn empty_device_skips_list_request() {
    let (client, mock, _sim) = connected_client(SimulatedDevice::new("ABC123")).unwrap();
    assert!(client.list_files().unwrap().is_empty());
    assert_eq!(mock.request_commands(), vec![1, 6]);
}
