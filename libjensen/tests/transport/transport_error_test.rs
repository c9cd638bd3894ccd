#[path = "../common/mod.rs"]
mod common;

use common::helpers::{SimulatedDevice, simulated_device, test_config};
use libjensen::device::Jensen;
use libjensen::transport::Transport;
use libjensen::types::ConnectionState;
use libjensen::{Disposition, Error};

#[test]
fn busy_interface_leaves_client_in_error_then_retry_works() {
    common::init_logging();
    let (connector, mock, _sim) = simulated_device(SimulatedDevice::new("ABC123"));
    connector.fail_next_open(Error::DeviceBusy);
    let client = Jensen::new(Box::new(connector), test_config()).unwrap();

    assert!(matches!(client.connect(), Err(Error::DeviceBusy)));
    assert_eq!(client.state(), ConnectionState::Error);
    assert!(mock.writes().is_empty());

    client.connect().unwrap();
    assert_eq!(client.state(), ConnectionState::Connected);
}

#[test]
fn write_failure_surfaces_without_reset() {
    let (connector, mock, _sim) = simulated_device(SimulatedDevice::new("ABC123"));
    let client = Jensen::new(Box::new(connector), test_config()).unwrap();
    client.connect().unwrap();

    mock.fail_next_write(Error::Timeout);
    let err = client.get_card_info().unwrap_err();
    assert!(matches!(err, Error::Timeout));
    assert_eq!(err.disposition(), Disposition::OperationFailed);
    assert_eq!(client.state(), ConnectionState::Connected);
    assert!(mock.cleared_endpoints().is_empty());

    client.get_card_info().unwrap();
}

#[test]
fn unplugged_device_is_lost() {
    let (connector, mock, _sim) = simulated_device(SimulatedDevice::new("ABC123"));
    let client = Jensen::new(Box::new(connector), test_config()).unwrap();
    client.connect().unwrap();

    mock.set_removed(true);
    let err = client.get_file_count().unwrap_err();
    assert!(matches!(err, Error::ConnectionLost(_)));
    assert_eq!(err.disposition(), Disposition::ReconnectRequired);
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert!(mock.is_closed());
}

#[test]
fn mock_reports_removal() {
    let mut m = libjensen::transport::MockTransport::new();
    m.set_removed(true);
    assert!(matches!(m.read_bulk(64, 10), Err(Error::DeviceRemoved)));
    assert!(matches!(m.write_bulk(&[0], 10), Err(Error::DeviceRemoved)));
}
