//! Rotating-priority arbitration and loopback rejection at a single node.

use meshnoc_integration_tests::init_tracing;
use meshnoc_router::{
    Header, MessageType, Node, NodeInputs, Rotation, Router, RouterConfig, RouterInputs, Word,
};
use meshnoc_topology::{Coord, Direction, DirectionSet, PORTS_PER_NODE};

fn encode(router: &Router, header: Header) -> Word {
    Word::header(router.layout().encode(&header).unwrap())
}

/// Every neighbor streams packets of `length` payload words to the local
/// port, back to back. Returns the source granted the local egress at each
/// step.
fn saturate_local_port(length: u8, steps: u64) -> Vec<Option<Direction>> {
    let my = Coord::new(2, 2);
    let mut router = Router::new(my, 0, &RouterConfig::single_channel()).unwrap();
    let header = encode(&router, Header::unicast(Coord::new(2, 0), my, MessageType::Send).with_length(length));

    let mut sent = [0u8; PORTS_PER_NODE];
    let mut rotation = Rotation::new();
    let mut grants = Vec::new();
    for _ in 0..steps {
        let mut inputs = RouterInputs::default().all_ready();
        for source in Direction::NEIGHBORS {
            if router.input_ready(source) {
                let word = if sent[source.index()] == 0 {
                    header
                } else {
                    Word::payload(source.index() as u64)
                };
                inputs.incoming[source.index()] = Some(word);
            }
        }
        let out = router.tick(rotation, &inputs);
        rotation = rotation.advance();
        for source in out.accepted.iter() {
            sent[source.index()] = (sent[source.index()] + 1) % (length + 1);
        }
        assert!(out.diagnostics.is_clean());
        grants.push(router.scheduler().grant(Direction::Here));
    }
    grants
}

/// One-payload packets: each source is granted at least once in every
/// window of 5 × (packet words).
#[test]
fn every_source_granted_within_window() {
    init_tracing();
    let packet_words = 2u64;
    let grants = saturate_local_port(1, 200);

    let mut last_grant: [Option<u64>; PORTS_PER_NODE] = [None; PORTS_PER_NODE];
    for (step, granted) in (0u64..).zip(&grants) {
        if let Some(granted) = granted {
            last_grant[granted.index()] = Some(step);
        }
        if step >= 20 {
            for source in Direction::NEIGHBORS {
                let last = last_grant[source.index()].unwrap_or_else(|| panic!("{source} never granted"));
                assert!(
                    step - last <= 5 * packet_words,
                    "{source} waited {} steps at step {step}",
                    step - last
                );
            }
        }
    }
}

/// Packets of exactly five words release the egress every fifth step, when
/// the rotation is back where it was at the last decision. The same source
/// then wins every time and the other three never get through.
#[test]
fn five_word_packets_starve_all_but_one_source() {
    init_tracing();
    let grants = saturate_local_port(4, 400);

    let mut counts = [0usize; PORTS_PER_NODE];
    for granted in grants.iter().flatten() {
        counts[granted.index()] += 1;
    }
    let served: Vec<_> = Direction::NEIGHBORS
        .into_iter()
        .filter(|source| counts[source.index()] > 0)
        .collect();
    assert_eq!(served.len(), 1, "grants per source: {counts:?}");
    assert!(counts[served[0].index()] > 300);
}

/// Two broadcasts competing for overlapping ports still take turns.
#[test]
fn overlapping_broadcasts_both_progress() {
    let my = Coord::new(1, 1);
    let mut router = Router::new(my, 0, &RouterConfig::single_channel()).unwrap();
    // Both flood East and South from here.
    let from_west = encode(&router, Header::broadcast(Coord::new(0, 1), Coord::new(3, 3), MessageType::Instructions));
    let from_north = encode(&router, Header::broadcast(Coord::new(1, 0), Coord::new(3, 3), MessageType::Instructions));

    let mut delivered = [0usize; PORTS_PER_NODE];
    let mut rotation = Rotation::new();
    for _ in 0..40 {
        let mut inputs = RouterInputs::default().all_ready();
        for (port, word) in [(Direction::West, from_west), (Direction::North, from_north)] {
            if router.input_ready(port) {
                inputs.incoming[port.index()] = Some(word);
            }
        }
        let out = router.tick(rotation, &inputs);
        rotation = rotation.advance();
        if let Some(word) = out.outgoing(Direction::Here) {
            // The local copy leaves unmodified.
            let from = if word == from_west {
                Direction::West
            } else {
                Direction::North
            };
            delivered[from.index()] += 1;
        }
    }
    assert!(delivered[Direction::West.index()] >= 5);
    assert!(delivered[Direction::North.index()] >= 5);
}

/// A unicast whose route points back out of its arrival port is flagged
/// and never re-emitted on that port.
#[test]
fn loopback_unicast_is_rejected_at_node() {
    init_tracing();
    let config = RouterConfig::default();
    let my = Coord::new(2, 2);
    let mut node = Node::new(my, &config).unwrap();
    // Arrives from the East but targets a node further East.
    let header = Header::unicast(Coord::new(5, 2), Coord::new(4, 2), MessageType::Send).with_length(2);
    let words = [
        Word::header(node.layout().encode(&header).unwrap()),
        Word::payload(1),
        Word::payload(2),
    ];

    let mut flagged = DirectionSet::empty();
    let mut queue = words.to_vec();
    for _ in 0..12 {
        let mut inputs = NodeInputs::new(node.n_channels());
        inputs.local_ready = true;
        for channel in &mut inputs.channels {
            channel.downstream_ready = [true; PORTS_PER_NODE];
        }
        if node.input_ready(0, Direction::East) {
            inputs.channels[0].incoming[Direction::East.index()] = queue.first().copied();
        }
        let out = node.tick(&inputs);
        if out.channels[0].accepted.contains(Direction::East) {
            queue.remove(0);
        }
        assert!(out.channels.iter().all(|c| c.outgoing.iter().all(Option::is_none)));
        assert_eq!(out.local_out, None);
        flagged = DirectionSet::from_bits(flagged.bits() | out.diagnostics.routing_errors.bits());
    }
    assert_eq!(flagged, DirectionSet::single(Direction::East));
    assert!(queue.is_empty());
    assert!(node.is_idle());
}
