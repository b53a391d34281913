#![no_main]

use libfuzzer_sys::fuzz_target;
use tftp_wire::Packet;

fuzz_target!(|data: &[u8]| {
    // Any datagram either decodes or yields an error, never a panic
    if let Ok(packet) = Packet::decode(data) {
        let reencoded = packet.to_bytes();
        assert!(reencoded.len() <= tftp_wire::DATAGRAM_SIZE);
    }
});
