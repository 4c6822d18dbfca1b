#![no_main]

use augmenta_wire::OscPacket;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(packet) = OscPacket::decode(data) {
        // Anything that decodes must encode and decode to the same packet
        if let Ok(bytes) = packet.encode() {
            let again = OscPacket::decode(&bytes).expect("re-decode of encoded packet");
            assert_eq!(again.message_count(), packet.message_count());
        }
    }
});
