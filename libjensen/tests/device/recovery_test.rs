#[path = "../common/mod.rs"]
mod common;

use std::sync::{Arc, Mutex};

use common::fixtures::{corrupt_frame, frame};
use common::helpers::{SimulatedDevice, connected_client};
use libjensen::device::{ActivityLevel, ClientEvent};
use libjensen::transport::MockTransport;
use libjensen::types::{CommandId, ConnectionState};
use libjensen::{Disposition, Error};

/// Reply to the next GetCardInfo with a burst of damaged frames, then
/// behave normally.
fn poison_next_card_info(mock: &MockTransport, sim: Arc<Mutex<SimulatedDevice>>) {
    let mut armed = true;
    mock.set_responder(move |req| {
        if armed && req.command == CommandId::GetCardInfo.as_u16() {
            armed = false;
            return (0..12)
                .map(|_| corrupt_frame(req.command, req.sequence, vec![0; 12]))
                .collect();
        }
        sim.lock().unwrap().respond(req)
    });
}

fn transitions(events: &[ClientEvent]) -> Vec<(ConnectionState, ConnectionState)> {
    events
        .iter()
        .filter_map(|e| match e {
            ClientEvent::StateChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

#[test]
fn desync_is_recovered_with_endpoint_reset() {
    common::init_logging();
    let (client, mock, sim) = connected_client(SimulatedDevice::new("ABC123")).unwrap();
    let rx = client.subscribe();
    poison_next_card_info(&mock, sim);

    let err = client.get_card_info().unwrap_err();
    assert_eq!(err.disposition(), Disposition::Transient);
    match err {
        Error::ConnectionRecovered(cause) => {
            assert!(matches!(*cause, Error::ProtocolDesync(_)))
        }
        other => panic!("expected recovery, got {:?}", other),
    }
    assert_eq!(client.state(), ConnectionState::Connected);
    assert_eq!(mock.cleared_endpoints(), vec![0x82, 0x01]);

    let events: Vec<_> = rx.try_iter().collect();
    assert_eq!(
        transitions(&events),
        vec![
            (ConnectionState::Connected, ConnectionState::Reconnecting),
            (ConnectionState::Reconnecting, ConnectionState::Connected)
        ]
    );

    // Retrying is safe.
    assert_eq!(client.get_card_info().unwrap().used_bytes, 256 * 1024 * 1024);
}

#[test]
fn failed_reset_loses_connection() {
    let (client, mock, _sim) = connected_client(SimulatedDevice::new("ABC123")).unwrap();
    let rx = client.subscribe();
    mock.set_responder(|req| {
        (0..12)
            .map(|_| corrupt_frame(req.command, req.sequence, vec![0; 4]))
            .collect()
    });

    let err = client.get_settings().unwrap_err();
    assert!(matches!(err, Error::ConnectionLost(_)));
    assert_eq!(err.disposition(), Disposition::ReconnectRequired);
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert!(mock.is_closed());

    let events: Vec<_> = rx.try_iter().collect();
    assert_eq!(
        transitions(&events),
        vec![
            (ConnectionState::Connected, ConnectionState::Reconnecting),
            (ConnectionState::Reconnecting, ConnectionState::Disconnected)
        ]
    );
    assert!(events.iter().any(|e| matches!(
        e,
        ClientEvent::Activity(a) if a.level == ActivityLevel::Error
    )));
    assert!(matches!(client.get_settings(), Err(Error::NotConnected(_))));
}

#[test]
fn command_timeout_keeps_connection() {
    let (client, mock, sim) = connected_client(SimulatedDevice::new("ABC123")).unwrap();
    let held = Arc::new(Mutex::new(Vec::new()));
    let late = Arc::clone(&held);
    mock.set_responder(move |req| {
        let reply = sim.lock().unwrap().respond(req);
        if req.command == CommandId::GetSettings.as_u16() {
            late.lock().unwrap().extend(reply);
            return Vec::new();
        }
        reply
    });

    assert!(matches!(
        client.get_settings(),
        Err(Error::ResponseTimeout { command: 11, .. })
    ));
    assert_eq!(client.state(), ConnectionState::Connected);
    assert!(mock.cleared_endpoints().is_empty());

    // The reply shows up after the caller gave up; the next command must not
    // mistake it for its own.
    for f in held.lock().unwrap().drain(..) {
        mock.push_read(f);
    }
    assert_eq!(client.get_file_count().unwrap(), 0);
}

#[test]
fn stray_sequence_triggers_recovery() {
    let (client, mock, sim) = connected_client(SimulatedDevice::new("ABC123")).unwrap();
    let mut armed = true;
    mock.set_responder(move |req| {
        if armed && req.command == CommandId::GetFileCount.as_u16() {
            armed = false;
            return vec![frame(req.command, req.sequence.wrapping_add(5), vec![0, 0, 0, 1])];
        }
        sim.lock().unwrap().respond(req)
    });

    match client.get_file_count() {
        Err(Error::ConnectionRecovered(cause)) => {
            assert!(matches!(*cause, Error::SequenceMismatch { .. }))
        }
        other => panic!("expected recovery, got {:?}", other),
    }
    assert_eq!(client.get_file_count().unwrap(), 0);
}

#[test]
fn health_check_reports_serial_drift() {
    let (client, _mock, sim) = connected_client(SimulatedDevice::new("ABC123")).unwrap();
    let rx = client.subscribe();
    client.check_health().unwrap();
    assert!(rx.try_iter().next().is_none());

    sim.lock().unwrap().serial = "XYZ789".to_string();
    client.check_health().unwrap();
    assert!(rx.try_iter().any(|e| matches!(
        e,
        ClientEvent::Activity(a) if a.level == ActivityLevel::Warn && a.message.contains("XYZ789")
    )));
}

#[test]
fn silent_device_fails_health_check() {
    let (client, mock, _sim) = connected_client(SimulatedDevice::new("ABC123")).unwrap();
    mock.clear_responder();
    assert!(matches!(client.check_health(), Err(Error::ConnectionLost(_))));
    assert_eq!(client.state(), ConnectionState::Disconnected);
}
