// libjensen/src/transfer/mod.rs

//! File streaming engine: listing, downloads and firmware upload. Each
//! operation holds the dispatcher's exchange for its whole duration.

pub mod cancel;
pub mod download;
pub mod list;
pub mod session;
pub mod upload;

pub use cancel::CancellationToken;
pub use download::{DownloadOutcome, StreamOptions, download_file, read_file_block};
pub use list::list_files;
pub use session::TransferSession;
pub use upload::upload_firmware;
