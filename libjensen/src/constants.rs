// libjensen/src/constants.rs
//! Common protocol constants used across the crate

/// Jensen frame magic: 0x12 0x34
pub const JENSEN_MAGIC: [u8; 2] = [0x12, 0x34];

/// magic(2) + command(2) + sequence(4) + body length(4)
pub const JENSEN_HEADER_LEN: usize = 12;

/// Trailing checksum length in bytes
pub const JENSEN_CHECKSUM_LEN: usize = 1;

/// Smallest possible frame: header + checksum, empty body
pub const JENSEN_MIN_FRAME_LEN: usize = JENSEN_HEADER_LEN + JENSEN_CHECKSUM_LEN;

/// Largest body the decoder accepts before treating the header as noise
pub const JENSEN_MAX_BODY_LEN: usize = 16 * 1024 * 1024;

/// USB vendor ids used by HiDock devices
pub const HIDOCK_VENDOR_IDS: [u16; 2] = [0x10d6, 0x3887];

/// Bulk endpoints and interface used by the Jensen firmware
pub const JENSEN_OUT_ENDPOINT: u8 = 0x01;
/// Device-to-host.
pub const JENSEN_IN_ENDPOINT: u8 = 0x82;
/// Interface claimed on open.
pub const JENSEN_INTERFACE: u8 = 0;

/// Bytes requested per bulk IN read
pub const DEFAULT_READ_CHUNK: usize = 51_200;

/// Bytes per bulk OUT write when streaming firmware
pub const DEFAULT_WRITE_CHUNK: usize = 16 * 1024;

/// Confirmation body required by destructive commands (format, factory reset)
pub const DESTRUCTIVE_CONFIRMATION: [u8; 4] = [1, 2, 3, 4];

/// Maximum serial number length in the GetDeviceInfo response
pub const SERIAL_MAX_LEN: usize = 16;

/// File list header marker followed by a u32 entry count
pub const FILE_LIST_HEADER: [u8; 2] = [0xFF, 0xFF];

/// Maximum meeting schedule records accepted per request
pub const MAX_SCHEDULE_RECORDS: usize = 20;

/// Framing errors tolerated while waiting for one command reply before the
/// link is declared out of sync
pub const DEFAULT_COMMAND_RESYNC_LIMIT: u32 = 8;

/// Resync rounds a streamed transfer may spend before it is abandoned
pub const DEFAULT_TRANSFER_RESYNC_ATTEMPTS: u32 = 3;

/// Endpoint-reset rounds tried before a connection is given up
pub const DEFAULT_RESET_ATTEMPTS: u32 = 2;
