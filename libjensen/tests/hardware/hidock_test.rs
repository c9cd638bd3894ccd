#![cfg(feature = "usb")]

#[path = "common.rs"]
mod common;

use libjensen::Result;
use libjensen::transfer::CancellationToken;
use serial_test::serial;

// These tests need a HiDock connected over USB. They are marked `#[ignore]`
// so CI does not attempt to run them. Run manually with:
//
// cargo test -p libjensen --test hardware --features usb -- --ignored
//

#[test]
#[ignore]
#[serial]
fn probe_device() -> Result<()> {
    let Some(client) = common::connect_first_device()? else {
        return Ok(());
    };
    let info = client.get_device_info()?;
    assert!(!info.serial_number.is_empty());
    let card = client.get_card_info()?;
    assert!(card.used_bytes <= card.total_bytes);
    client.disconnect();
    Ok(())
}

#[test]
#[ignore]
#[serial]
fn list_and_read_first_file_header() -> Result<()> {
    let Some(client) = common::connect_first_device()? else {
        return Ok(());
    };
    let files = client.list_files()?;
    assert_eq!(files.len() as u32, client.get_file_count()?);
    if let Some(first) = files.first() {
        let want = first.size_bytes.min(1024) as u32;
        let head = client.read_file_block(&first.filename, want)?;
        assert_eq!(head.len() as u32, want);

        let token = CancellationToken::new();
        let mut seen = 0u64;
        let outcome = client.download_file(&first.filename, first.size_bytes, &token, |c| {
            seen += c.len() as u64;
            token.cancel();
        })?;
        assert_eq!(outcome.bytes_received(), seen);
    }
    client.disconnect();
    Ok(())
}
