#![no_main]

use augmenta_state::{ProtocolVersion, TrackingSession};
use augmenta_wire::OscPacket;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(packet) = OscPacket::decode(data) else {
        return;
    };
    let messages = packet.into_messages();

    for version in ProtocolVersion::ALL {
        let session = TrackingSession::new(version);
        session.ingest_all(&messages);

        let stats = session.stats();
        assert_eq!(
            stats.messages_ingested + stats.messages_dropped,
            messages.len() as u64
        );
    }
});
