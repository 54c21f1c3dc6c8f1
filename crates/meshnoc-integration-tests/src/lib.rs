//! Shared helpers for the meshnoc integration tests.

use meshnoc_router::{Header, MessageType, Packet};
use meshnoc_topology::Coord;
use tracing_subscriber::EnvFilter;

/// Install a test subscriber once. Set `RUST_LOG=meshnoc_router=trace` to
/// watch every word move.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// Payload bits reserved for the word index inside a tagged packet.
const INDEX_BITS: u32 = 8;

/// A unicast packet whose payload words carry `id` and their own index, so
/// a delivered copy shows whether it arrived whole.
pub fn tagged_unicast(from: Coord, to: Coord, id: u64, length: usize, message_type: MessageType) -> Packet {
    tagged(Header::unicast(from, to, message_type), id, length)
}

/// Broadcast counterpart of [`tagged_unicast`].
pub fn tagged_broadcast(from: Coord, to: Coord, id: u64, length: usize) -> Packet {
    tagged(Header::broadcast(from, to, MessageType::Instructions), id, length)
}

fn tagged(header: Header, id: u64, length: usize) -> Packet {
    let payload = (0..length as u64).map(|i| (id << INDEX_BITS) | i).collect();
    match Packet::new(header, payload) {
        Ok(packet) => packet,
        Err(err) => panic!("bad test packet: {err}"),
    }
}

/// The id of a tagged packet, or `None` if its payload mixes ids or is out
/// of order.
pub fn packet_id(packet: &Packet) -> Option<u64> {
    let mut id = None;
    for (i, &word) in packet.payload.iter().enumerate() {
        if word & ((1 << INDEX_BITS) - 1) != i as u64 {
            return None;
        }
        let this = word >> INDEX_BITS;
        if *id.get_or_insert(this) != this {
            return None;
        }
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_packet_identifies_itself() {
        let p = tagged_unicast(Coord::ORIGIN, Coord::new(1, 1), 42, 3, MessageType::Send);
        assert_eq!(packet_id(&p), Some(42));

        let mut mixed = p.clone();
        mixed.payload[1] = (7 << INDEX_BITS) | 1;
        assert_eq!(packet_id(&mixed), None);

        let mut reordered = p;
        reordered.payload.swap(0, 2);
        assert_eq!(packet_id(&reordered), None);
    }
}
