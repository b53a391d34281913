#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use tftp_wire::{DataPacket, DataReceiver, DataSender};

fuzz_target!(|data: &[u8]| {
    let mut sender = DataSender::new(Cursor::new(data.to_vec()));
    let mut receiver = DataReceiver::new(Vec::new());

    while let Ok(Some(datagram)) = sender.next_datagram() {
        let Ok(packet) = DataPacket::decode_bytes(datagram) else {
            panic!("sender produced an undecodable datagram");
        };
        let Ok(ack) = receiver.receive(&packet) else {
            panic!("receiver rejected an in-order block");
        };
        sender.acknowledge(&ack);
    }

    assert_eq!(receiver.into_inner(), data);
});
