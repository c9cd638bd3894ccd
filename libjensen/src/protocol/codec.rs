// libjensen/src/protocol/codec.rs

//! Whole-frame helpers joining the frame codec with the request and
//! response enums.

use crate::Result;
use crate::types::CommandId;

use super::Packet;
use super::commands::Request;
use super::responses::Response;

/// Encode a Request into a full wire frame carrying `sequence`.
pub fn encode_request_frame(req: &Request, sequence: u32) -> Result<Vec<u8>> {
    let body = req.encode()?;
    Packet::new(req.command_id().as_u16(), sequence, body).encode()
}

/// Decode a full wire frame and parse the contained response for the
/// expected command.
pub fn decode_response_frame(expected: CommandId, frame: &[u8]) -> Result<Response> {
    let packet = Packet::decode(frame)?;
    decode_response_packet(expected, &packet)
}

/// Parse an already decoded packet, checking it answers `expected`.
pub fn decode_response_packet(expected: CommandId, packet: &Packet) -> Result<Response> {
    if packet.command != expected.as_u16() {
        return Err(crate::Error::UnexpectedCommandId {
            expected: expected.as_u16(),
            actual: packet.command,
        });
    }
    Response::decode(expected, &packet.body)
}
