// libjensen/src/error.rs

//! Error types shared by every layer of the client.

use thiserror::Error;

use crate::types::ConnectionState;

/// Framing failures reported by the packet codec.
///
/// These are expected on a USB bulk pipe (partial reads, a read boundary
/// landing inside a previous response) and are normally recovered by the
/// dispatcher's resync loop rather than surfaced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The buffer does not start with `0x12 0x34`.
    #[error("invalid magic bytes: {actual:02x?}")]
    InvalidMagic { actual: [u8; 2] },

    /// Fewer bytes than the header declares.
    #[error("truncated frame: expected {expected} bytes, got {actual}")]
    TruncatedBody { expected: usize, actual: usize },

    /// Bytes of the frame do not sum to zero.
    #[error("checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// Declared body length above the accepted maximum.
    #[error("declared body length {declared} exceeds limit {limit}")]
    Oversized { declared: usize, limit: usize },

    /// Extra bytes after a frame passed to the strict decoder.
    #[error("{extra} trailing bytes after frame")]
    TrailingBytes { extra: usize },

    /// An incomplete frame at the front was dropped because a complete
    /// frame starts `offset` bytes later.
    #[error("incomplete frame superseded by a valid frame {offset} bytes later")]
    Superseded { offset: usize },
}

/// Coarse category of an [`Error`], following the layer that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// USB access and I/O.
    Transport,
    /// Frame codec.
    Framing,
    /// Request/response matching.
    Protocol,
    /// Command results, timeouts and argument checks.
    Application,
    /// Connection state.
    Lifecycle,
}

/// What the caller should do about a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The link was reset automatically; retrying the operation is safe.
    Transient,
    /// The connection is gone; `connect()` must be called again.
    ReconnectRequired,
    /// Only this operation failed; the connection is still trusted.
    OperationFailed,
}

/// Common error type
#[derive(Error, Debug)]
pub enum Error {
    // Transport
    /// No recorder is attached, or no connector was configured.
    #[error("device not found")]
    DeviceNotFound,

    /// The interface is claimed by another process or driver.
    #[error("device busy: interface is claimed elsewhere")]
    DeviceBusy,

    /// An endpoint stalled.
    #[error("usb pipe error on endpoint {endpoint:#04x}")]
    PipeError { endpoint: u8 },

    /// The recorder was unplugged.
    #[error("device removed")]
    DeviceRemoved,

    /// A single bulk read produced nothing before its slice expired.
    #[error("transport read timed out")]
    Timeout,

    /// Any other libusb failure.
    #[cfg(feature = "usb")]
    #[error("usb error: {0}")]
    Usb(rusb::Error),

    // Framing
    /// A frame failed to decode.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    // Protocol
    /// A reply carried another request's sequence id.
    #[error("sequence mismatch: expected {expected}, got {actual}")]
    SequenceMismatch { expected: u32, actual: u32 },

    /// Resynchronization gave up.
    #[error("protocol desync: {0}")]
    ProtocolDesync(String),

    /// A reply answered a different command than the one sent.
    #[error("unexpected command id: expected {expected}, got {actual}")]
    UnexpectedCommandId { expected: u16, actual: u16 },

    // Application
    /// No reply within the command timeout. The connection stays up.
    #[error("no response to command {command} within {timeout_ms} ms")]
    ResponseTimeout { command: u16, timeout_ms: u64 },

    /// The GetDeviceInfo probe sent during `connect` went unanswered.
    #[error("device did not answer the connection probe")]
    ProbeTimeout,

    /// A streamed transfer could not be completed consistently.
    #[error("transfer corrupted: {0}")]
    TransferCorrupted(String),

    /// Unknown or deliberately unsupported command id; nothing was sent.
    #[error("unsupported command id {0}")]
    UnsupportedCommand(u16),

    /// The device answered with a nonzero result code.
    #[error("command {command} rejected by device: result code {code}")]
    CommandRejected { command: u16, code: u8 },

    /// The named recording does not exist on the device.
    #[error("file not found on device: {0}")]
    FileNotFound(String),

    /// A body or argument has the wrong length.
    #[error("invalid response length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// A caller-supplied value was rejected before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A helper thread or blocking task could not run.
    #[error("background task failed: {0}")]
    TaskFailed(String),

    /// Writing downloaded data to the caller's sink failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    // Lifecycle
    /// The operation needs a connected client.
    #[error("not connected (state: {0})")]
    NotConnected(ConnectionState),

    /// `connect` while already connected or connecting.
    #[error("already {0}")]
    AlreadyConnected(ConnectionState),

    /// Internal state machine violation.
    #[error("illegal state transition {from} -> {to}")]
    IllegalTransition {
        from: ConnectionState,
        to: ConnectionState,
    },

    /// The link was reset after the wrapped failure; retrying is safe.
    #[error("connection reset after failure, retry is safe: {0}")]
    ConnectionRecovered(Box<Error>),

    /// Recovery failed. The client is disconnected.
    #[error("connection lost, reconnect required: {0}")]
    ConnectionLost(Box<Error>),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Which layer raised the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DeviceNotFound
            | Error::DeviceBusy
            | Error::PipeError { .. }
            | Error::DeviceRemoved
            | Error::Timeout => ErrorKind::Transport,
            #[cfg(feature = "usb")]
            Error::Usb(_) => ErrorKind::Transport,
            Error::Frame(_) => ErrorKind::Framing,
            Error::SequenceMismatch { .. }
            | Error::ProtocolDesync(_)
            | Error::UnexpectedCommandId { .. } => ErrorKind::Protocol,
            Error::ResponseTimeout { .. }
            | Error::ProbeTimeout
            | Error::TransferCorrupted(_)
            | Error::UnsupportedCommand(_)
            | Error::CommandRejected { .. }
            | Error::FileNotFound(_)
            | Error::InvalidLength { .. }
            | Error::InvalidArgument(_)
            | Error::TaskFailed(_)
            | Error::Io(_) => ErrorKind::Application,
            Error::NotConnected(_)
            | Error::AlreadyConnected(_)
            | Error::IllegalTransition { .. }
            | Error::ConnectionRecovered(_)
            | Error::ConnectionLost(_) => ErrorKind::Lifecycle,
        }
    }

    /// True when client and device can no longer be assumed to agree on
    /// frame boundaries or sequence ids, so the link must be reset before
    /// it is trusted again.
    pub fn requires_recovery(&self) -> bool {
        matches!(
            self,
            Error::SequenceMismatch { .. }
                | Error::ProtocolDesync(_)
                | Error::UnexpectedCommandId { .. }
                | Error::PipeError { .. }
                | Error::DeviceRemoved
        )
    }

    /// How the caller should react. See [`Disposition`].
    pub fn disposition(&self) -> Disposition {
        match self {
            Error::ConnectionRecovered(_) => Disposition::Transient,
            Error::ConnectionLost(_) | Error::NotConnected(_) | Error::DeviceRemoved => {
                Disposition::ReconnectRequired
            }
            _ => Disposition::OperationFailed,
        }
    }
}

// rusb errors are mapped onto the typed transport variants so that the
// lifecycle layer can tell a stall from an unplugged cable.
#[cfg(feature = "usb")]
impl From<rusb::Error> for Error {
    fn from(e: rusb::Error) -> Self {
        match e {
            rusb::Error::Timeout => Error::Timeout,
            rusb::Error::Pipe => Error::PipeError { endpoint: 0 },
            rusb::Error::NoDevice => Error::DeviceRemoved,
            rusb::Error::Busy | rusb::Error::Access => Error::DeviceBusy,
            rusb::Error::NotFound => Error::DeviceNotFound,
            other => Error::Usb(other),
        }
    }
}
