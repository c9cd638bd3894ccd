// libjensen/src/transfer/upload.rs

//! Firmware image upload.

use log::info;

use crate::dispatcher::Dispatcher;
use crate::protocol::parser::expect_success;
use crate::types::CommandId;
use crate::{Error, Result};

/// Send a firmware image (FirmwareUpload, command 9) in bulk-sized pieces,
/// reporting `(bytes_sent, total)` after each piece, then wait for the
/// device's verdict.
pub fn upload_firmware(
    dispatcher: &Dispatcher,
    image: &[u8],
    timeout_ms: u64,
    on_progress: &mut dyn FnMut(u64, u64),
) -> Result<()> {
    if image.is_empty() {
        return Err(Error::InvalidArgument("firmware image is empty".into()));
    }

    let mut ex = dispatcher.begin()?;
    let sequence =
        ex.send_request_with_progress(CommandId::FirmwareUpload, image, timeout_ms, on_progress)?;
    let reply = ex.next_packet(sequence, CommandId::FirmwareUpload, timeout_ms)?;
    ex.finish();
    expect_success(CommandId::FirmwareUpload.as_u16(), &reply.body)?;
    info!("firmware image of {} bytes accepted", image.len());
    Ok(())
}
