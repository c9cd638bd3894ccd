// libjensen/src/protocol/mod.rs

//! Jensen wire protocol: framing, request bodies and response decoding.
//!
//! Nothing here performs I/O. The dispatcher feeds bulk reads into
//! [`FrameBuffer`] and encodes [`Request`]s with [`Packet`].

pub mod checksum;
pub mod codec;
pub mod commands;
pub mod frame;
pub mod parser;
pub mod responses;
pub mod stream;

pub use checksum::frame_checksum;
pub use commands::Request;
pub use frame::Packet;
pub use responses::Response;
pub use stream::{FrameBuffer, Scan};
