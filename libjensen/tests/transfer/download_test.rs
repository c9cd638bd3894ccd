#[path = "../common/mod.rs"]
mod common;

use common::fixtures::{REC_A, REC_B, recorder_with_files};
use common::helpers::{SimulatedDevice, connected_client, pattern};
use libjensen::device::ClientEvent;
use libjensen::transfer::{CancellationToken, DownloadOutcome};
use libjensen::types::ConnectionState;
use libjensen::Error;
use proptest::prelude::*;

#[test]
fn download_to_writer_with_progress() {
    common::init_logging();
    let (client, _mock, _sim) = connected_client(recorder_with_files()).unwrap();
    let rx = client.subscribe();

    let mut out = Vec::new();
    let outcome = client
        .download_file_to(REC_A, 96_044, &CancellationToken::new(), &mut out)
        .unwrap();
    assert_eq!(outcome, DownloadOutcome::Completed { bytes_received: 96_044 });
    assert_eq!(out, pattern(96_044));

    let progress: Vec<(u64, u64)> = rx
        .try_iter()
        .filter_map(|e| match e {
            ClientEvent::Progress {
                bytes_transferred,
                total_bytes,
            } => Some((bytes_transferred, total_bytes)),
            _ => None,
        })
        .collect();
    assert_eq!(progress.len(), 24);
    assert!(progress.windows(2).all(|w| w[0].0 < w[1].0));
    assert_eq!(progress.last(), Some(&(96_044, 96_044)));
}

#[test]
fn file_block_returns_prefix() {
    let (client, _mock, _sim) = connected_client(recorder_with_files()).unwrap();
    let head = client.read_file_block(REC_B, 4096).unwrap();
    assert_eq!(head, pattern(48_022)[..4096].to_vec());
}

#[test]
fn empty_file_needs_no_request() {
    let (client, mock, _sim) = connected_client(recorder_with_files()).unwrap();
    let before = mock.requests().len();
    let outcome = client
        .download_file(REC_A, 0, &CancellationToken::new(), |_| panic!("no data expected"))
        .unwrap();
    assert_eq!(outcome, DownloadOutcome::Completed { bytes_received: 0 });
    assert_eq!(mock.requests().len(), before);
}

#[test]
fn pre_cancelled_token_sends_nothing() {
    let (client, mock, _sim) = connected_client(recorder_with_files()).unwrap();
    let before = mock.requests().len();
    let token = CancellationToken::new();
    token.cancel();
    let outcome = client.download_file(REC_A, 96_044, &token, |_| {}).unwrap();
    assert_eq!(outcome, DownloadOutcome::Cancelled { bytes_received: 0 });
    assert_eq!(mock.requests().len(), before);
}

#[test]
fn more_data_than_announced_is_corruption() {
    let (client, _mock, _sim) = connected_client(recorder_with_files()).unwrap();
    let err = client
        .download_file(REC_B, 1000, &CancellationToken::new(), |_| {})
        .unwrap_err();
    assert!(matches!(err, Error::TransferCorrupted(_)));
    assert_eq!(client.state(), ConnectionState::Connected);
    // Leftover chunks of the failed transfer are skipped.
    assert_eq!(client.get_file_count().unwrap(), 3);
}

#[test]
fn writer_failure_stops_transfer() {
    struct Full;
    impl std::io::Write for Full {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let (client, _mock, _sim) = connected_client(recorder_with_files()).unwrap();
    let err = client
        .download_file_to(REC_A, 96_044, &CancellationToken::new(), &mut Full)
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert_eq!(client.get_file_count().unwrap(), 3);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    // However the device slices the stream, the bytes arrive whole and in order.
    #[test]
    fn any_chunking_completes(size in 1usize..20_000, chunk in 1usize..6_000) {
        let data = pattern(size);
        let sim = SimulatedDevice::new("ABC123")
            .with_file("a.hda", data.clone())
            .with_chunk_size(chunk);
        let (client, _mock, _sim) = connected_client(sim).unwrap();

        let mut got = Vec::new();
        let outcome = client
            .download_file("a.hda", size as u64, &CancellationToken::new(), |c| got.extend_from_slice(c))
            .unwrap();
        prop_assert_eq!(outcome, DownloadOutcome::Completed { bytes_received: size as u64 });
        prop_assert_eq!(got, data);
        client.disconnect();
    }
}
