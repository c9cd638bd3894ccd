#[path = "../common/mod.rs"]
mod common;

use std::sync::mpsc::Receiver;
use std::thread;
use std::time::Duration;

use common::helpers::{SimulatedDevice, simulated_device, test_config};
use libjensen::device::{ClientConfig, ClientEvent, Jensen};
use libjensen::types::ConnectionState::{self, Connected, Connecting, Disconnected};
use libjensen::Error;

fn transitions(rx: &Receiver<ClientEvent>) -> Vec<(ConnectionState, ConnectionState)> {
    rx.try_iter()
        .filter_map(|e| match e {
            ClientEvent::StateChanged { from, to } => Some((from, to)),
            _ => None,
        })
        .collect()
}

#[test]
fn connect_then_disconnect_emits_legal_edges() {
    let (connector, _mock, _sim) = simulated_device(SimulatedDevice::new("ABC123"));
    let client = Jensen::new(Box::new(connector), test_config()).unwrap();
    let rx = client.subscribe();

    let info = client.connect().unwrap();
    assert_eq!(info.serial_number, "ABC123");
    client.disconnect();

    let seen = transitions(&rx);
    assert_eq!(
        seen,
        vec![(Disconnected, Connecting), (Connecting, Connected), (Connected, Disconnected)]
    );
    assert!(seen.iter().all(|(f, t)| f.can_transition_to(*t)));
}

#[test]
fn silent_device_fails_probe() {
    let (connector, mock, _sim) = simulated_device(SimulatedDevice::new("ABC123"));
    mock.clear_responder();
    let client = Jensen::new(Box::new(connector), test_config()).unwrap();
    let rx = client.subscribe();

    assert!(matches!(client.connect(), Err(Error::ProbeTimeout)));
    assert_eq!(client.state(), ConnectionState::Error);
    assert_eq!(mock.request_commands(), vec![1]);

    client.disconnect();
    assert_eq!(
        transitions(&rx),
        vec![(Disconnected, Connecting), (Connecting, ConnectionState::Error), (ConnectionState::Error, Disconnected)]
    );
}

#[test]
fn operations_before_connect_do_no_io() {
    let (connector, mock, _sim) = simulated_device(SimulatedDevice::new("ABC123"));
    let client = Jensen::new(Box::new(connector), test_config()).unwrap();
    assert!(matches!(
        client.get_file_count(),
        Err(Error::NotConnected(Disconnected))
    ));
    assert!(matches!(client.list_files(), Err(Error::NotConnected(_))));
    assert!(mock.writes().is_empty());
}

#[test]
fn health_monitor_probes_until_disconnect() {
    let (connector, mock, _sim) = simulated_device(SimulatedDevice::new("ABC123"));
    let config = ClientConfig {
        health_check_interval_ms: Some(20),
        ..test_config()
    };
    let client = Jensen::new(Box::new(connector), config).unwrap();
    client.connect().unwrap();

    thread::sleep(Duration::from_millis(150));
    let probes = mock.request_commands().iter().filter(|&&c| c == 1).count();
    assert!(probes >= 3, "only {} probes", probes);
    assert_eq!(client.state(), Connected);

    client.disconnect();
    let after = mock.requests().len();
    thread::sleep(Duration::from_millis(80));
    assert_eq!(mock.requests().len(), after);
}

#[test]
fn clones_share_one_connection() {
    let (connector, _mock, _sim) = simulated_device(SimulatedDevice::new("ABC123"));
    let a = Jensen::new(Box::new(connector), test_config()).unwrap();
    let b = a.clone();
    a.connect().unwrap();
    assert_eq!(b.state(), Connected);
    assert!(matches!(b.connect(), Err(Error::AlreadyConnected(Connected))));
    b.disconnect();
    assert_eq!(a.state(), Disconnected);
}
