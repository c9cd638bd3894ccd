#[path = "../common/mod.rs"]
mod common;

use libjensen::protocol::Packet;
use libjensen::transport::{Connector, MockConnector, MockTransport, Transport};
use libjensen::types::DeviceModel;
use libjensen::Error;

#[test]
fn reads_are_cut_to_requested_length() {
    let mut m = MockTransport::new();
    m.push_read(vec![1, 2, 3, 4, 5]);
    assert_eq!(m.read_bulk(2, 100).unwrap(), vec![1, 2]);
    assert_eq!(m.read_bulk(10, 100).unwrap(), vec![3, 4, 5]);
    assert!(matches!(m.read_bulk(10, 1), Err(Error::Timeout)));
}

#[test]
fn responder_sees_frames_split_across_writes() {
    let mut m = MockTransport::new();
    m.set_responder(|req| vec![common::fixtures::frame(req.command, req.sequence, vec![0])]);

    let frame = common::fixtures::device_info_request_frame();
    m.write_bulk(&frame[..6], 100).unwrap();
    assert!(m.requests().is_empty());
    m.write_bulk(&frame[6..], 100).unwrap();

    assert_eq!(m.request_commands(), vec![1]);
    assert_eq!(m.queued_reads(), 1);
    let reply = m.read_bulk(512, 100).unwrap();
    assert_eq!(Packet::decode(&reply).unwrap().sequence, 1);
}

#[test]
fn connector_reopens_shared_mock() {
    let m = MockTransport::with_model(DeviceModel::H1E);
    let connector = MockConnector::new(m.clone());

    let mut t = connector.open().unwrap();
    assert_eq!(t.model(), DeviceModel::H1E);
    t.close().unwrap();
    assert!(m.is_closed());

    let _again = connector.open().unwrap();
    assert!(!m.is_closed());
    assert_eq!(connector.open_count(), 2);
}

#[test]
fn default_endpoints() {
    let t = MockTransport::new();
    assert_eq!(t.in_endpoint(), 0x82);
    assert_eq!(t.out_endpoint(), 0x01);
}
