use libjensen::protocol::{Packet, frame_checksum};
use proptest::prelude::*;

#[test]
fn checksum_of_reference_header() {
    let header = [0x12, 0x34, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00];
    assert_eq!(frame_checksum(&header), 0xb8);
}

proptest! {
    // Every encoded frame sums to zero modulo 256.
    #[test]
    fn encoded_frames_sum_to_zero(
        command in 1u16..=20,
        sequence in any::<u32>(),
        body in prop::collection::vec(any::<u8>(), 0..512),
    ) {
        let frame = Packet::new(command, sequence, body).encode().unwrap();
        let sum = frame.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        prop_assert_eq!(sum, 0);
    }

    // Flipping any single byte of a valid frame is detected.
    #[test]
    fn single_byte_damage_is_detected(
        body in prop::collection::vec(any::<u8>(), 1..64),
        idx in any::<prop::sample::Index>(),
        delta in 1u8..=255,
    ) {
        let mut frame = Packet::new(5, 9, body).encode().unwrap();
        let i = idx.index(frame.len());
        frame[i] = frame[i].wrapping_add(delta);
        prop_assert!(Packet::decode(&frame).is_err());
    }
}
