#[path = "../common/mod.rs"]
mod common;

use std::thread;

use common::fixtures::{REC_A, recorder_with_files};
use common::helpers::{SimulatedDevice, connected_client, pattern};
use libjensen::transfer::{CancellationToken, DownloadOutcome};
use libjensen::types::ConnectionState;

#[test]
fn concurrent_callers_get_their_own_replies() {
    let (client, mock, _sim) = connected_client(recorder_with_files()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let c = client.clone();
            thread::spawn(move || {
                for _ in 0..15 {
                    if i % 2 == 0 {
                        assert_eq!(c.get_file_count().unwrap(), 3);
                    } else {
                        assert_eq!(c.get_card_info().unwrap().used_bytes, 256 * 1024 * 1024);
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let seqs: Vec<u32> = mock.requests().iter().map(|p| p.sequence).collect();
    assert_eq!(seqs.len(), 61);
    assert!(seqs.windows(2).all(|w| w[1] == w[0] + 1));
}

#[test]
fn sequence_wraps_past_max_to_one() {
    let (client, mock, _sim) = connected_client(SimulatedDevice::new("ABC123")).unwrap();
    client.force_sequence(u32::MAX - 1);
    client.get_file_count().unwrap();
    client.get_file_count().unwrap();
    let seqs: Vec<u32> = mock.requests().iter().skip(1).map(|p| p.sequence).collect();
    assert_eq!(seqs, vec![u32::MAX, 1]);
}

#[test]
fn cancelled_download_frees_the_wire() {
    let sim = SimulatedDevice::new("ABC123")
        .with_file(REC_A, pattern(10 * 1000))
        .with_chunk_size(1000);
    let (client, _mock, _sim) = connected_client(sim).unwrap();

    let token = CancellationToken::new();
    let mut chunks = 0;
    let outcome = client
        .download_file(REC_A, 10_000, &token, |_| {
            chunks += 1;
            if chunks == 2 {
                token.cancel();
            }
        })
        .unwrap();
    assert_eq!(outcome, DownloadOutcome::Cancelled { bytes_received: 2000 });

    // The remaining eight chunks are still queued; they must be skipped.
    assert_eq!(client.get_file_count().unwrap(), 1);
    assert_eq!(client.state(), ConnectionState::Connected);
}

#[test]
fn disconnect_cancels_running_download() {
    let sim = SimulatedDevice::new("ABC123")
        .with_file(REC_A, pattern(10 * 1000))
        .with_chunk_size(1000);
    let (client, _mock, _sim) = connected_client(sim).unwrap();

    let closer = client.clone();
    let mut stopper = None;
    let outcome = client
        .download_file(REC_A, 10_000, &CancellationToken::new(), |_| {
            if stopper.is_none() {
                let c = closer.clone();
                stopper = Some(thread::spawn(move || c.disconnect()));
                thread::sleep(std::time::Duration::from_millis(50));
            }
        })
        .unwrap();
    stopper.unwrap().join().unwrap();

    assert!(!outcome.is_completed());
    assert!(outcome.bytes_received() < 10_000);
    assert_eq!(client.state(), ConnectionState::Disconnected);
}
