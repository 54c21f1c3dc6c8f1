//! Packets arrive whole and in order under contention and backpressure.

use std::collections::BTreeMap;

use meshnoc_integration_tests::{init_tracing, packet_id, tagged_broadcast, tagged_unicast};
use meshnoc_router::{MessageType, Packet, RouterConfig};
use meshnoc_sim::{Mesh, MeshConfig};
use meshnoc_topology::{Coord, SendType};
use proptest::prelude::*;

const WIDTH: u16 = 4;
const HEIGHT: u16 = 3;

#[derive(Debug, Clone)]
struct Send {
    from: Coord,
    to: Coord,
    length: usize,
    request: bool,
    broadcast: bool,
}

impl Send {
    fn packet(&self, id: u64) -> Packet {
        if self.broadcast {
            return tagged_broadcast(self.from, self.to, id, self.length);
        }
        let message_type = if self.request {
            MessageType::LoadWordReq
        } else {
            MessageType::LoadWordResp
        };
        tagged_unicast(self.from, self.to, id, self.length, message_type)
    }

    /// Every node the packet is delivered to.
    fn destinations(&self) -> Vec<Coord> {
        if !self.broadcast {
            return vec![self.to];
        }
        let (a, b) = (self.from, self.to);
        (a.y.min(b.y)..=a.y.max(b.y))
            .flat_map(|y| (a.x.min(b.x)..=a.x.max(b.x)).map(move |x| Coord::new(x, y)))
            .collect()
    }
}

fn coord() -> impl Strategy<Value = Coord> {
    (0..WIDTH, 0..HEIGHT).prop_map(|(x, y)| Coord::new(x, y))
}

fn send() -> impl Strategy<Value = Send> {
    (coord(), coord(), 1usize..=15, any::<bool>()).prop_map(|(from, to, length, request)| Send {
        from,
        to,
        length,
        request,
        broadcast: false,
    })
}

/// Unicasts between random pairs mixed with broadcasts that all leave from
/// `broadcaster`.
fn mixed_traffic() -> impl Strategy<Value = Vec<Send>> {
    (
        coord(),
        prop::collection::vec((send(), prop::bool::weighted(0.25)), 1..40),
    )
        .prop_map(|(broadcaster, sends)| {
            sends
                .into_iter()
                .map(|(mut s, broadcast)| {
                    if broadcast {
                        s.from = broadcaster;
                        s.broadcast = true;
                    }
                    s
                })
                .collect()
        })
}

fn run_traffic(config: RouterConfig, sends: &[Send], stalls: &[(Coord, u64)]) -> Mesh {
    let mut m = Mesh::new(MeshConfig::new(WIDTH, HEIGHT).with_router(config)).unwrap();
    for (id, s) in sends.iter().enumerate() {
        m.send(s.from, &s.packet(id as u64)).unwrap();
    }
    for &(sink, _) in stalls {
        m.stall_sink(sink, true).unwrap();
    }
    let longest = stalls.iter().map(|&(_, until)| until).max().unwrap_or(0);
    for step in 0..longest {
        for &(sink, until) in stalls {
            if step == until {
                m.stall_sink(sink, false).unwrap();
            }
        }
        m.step();
    }
    for &(sink, _) in stalls {
        m.stall_sink(sink, false).unwrap();
    }
    m.run_until_idle(20_000).unwrap();
    m
}

fn check_deliveries(m: &Mesh, sends: &[Send]) {
    let mut expected: BTreeMap<Coord, Vec<Packet>> = BTreeMap::new();
    for (id, s) in sends.iter().enumerate() {
        for coord in s.destinations() {
            expected.entry(coord).or_default().push(s.packet(id as u64));
        }
    }

    for coord in m.shape().coords() {
        let got = m.delivered(coord).unwrap();
        let want = expected.remove(&coord).unwrap_or_default();
        assert_eq!(got.len(), want.len(), "delivery count at {coord}");
        for packet in got {
            let id = packet_id(packet).expect("interleaved or reordered payload");
            let sent = want.iter().find(|p| packet_id(p) == Some(id)).unwrap();
            assert_eq!(packet.payload, sent.payload);
            assert_eq!(packet.header.source, sent.header.source);
            assert_eq!(packet.header.message_type, sent.header.message_type);
            // Vertical hops rewrite a broadcast's target X.
            if sent.header.send_type == SendType::Unicast {
                assert_eq!(packet, sent);
            }
        }
        // Packets of one kind from one source keep their order.
        for source in m.shape().coords() {
            for kind in [MessageType::LoadWordReq, MessageType::LoadWordResp, MessageType::Instructions] {
                let ids = |packets: &[Packet]| -> Vec<u64> {
                    packets
                        .iter()
                        .filter(|p| p.header.source == source && p.header.message_type == kind)
                        .filter_map(packet_id)
                        .collect()
                };
                assert_eq!(ids(got), ids(&want), "order from {source} to {coord}");
            }
        }
    }
    assert!(m.summary().is_clean(), "{:?}", m.summary());
}

#[test]
fn all_to_one_hotspot() {
    init_tracing();
    let sink = Coord::new(1, 1);
    let sends: Vec<_> = (0..3)
        .flat_map(|_| {
            (0..WIDTH).flat_map(move |x| {
                (0..HEIGHT).map(move |y| Send {
                    from: Coord::new(x, y),
                    to: sink,
                    length: 5,
                    request: (x + y) % 2 == 0,
                    broadcast: false,
                })
            })
        })
        .collect();
    let m = run_traffic(RouterConfig::default(), &sends, &[(sink, 40)]);
    check_deliveries(&m, &sends);
}

#[test]
fn broadcasts_mixed_with_unicast() {
    init_tracing();
    let mut m = Mesh::new(MeshConfig::new(WIDTH, HEIGHT)).unwrap();
    let corner = Coord::new(WIDTH - 1, HEIGHT - 1);
    for id in 0..4 {
        m.send(Coord::ORIGIN, &tagged_broadcast(Coord::ORIGIN, corner, id, 4)).unwrap();
        m.send(corner, &tagged_unicast(corner, Coord::ORIGIN, 100 + id, 6, MessageType::Send))
            .unwrap();
        m.send(Coord::new(2, 0), &tagged_unicast(Coord::new(2, 0), Coord::new(2, 2), 200 + id, 3, MessageType::Send))
            .unwrap();
    }
    m.run_until_idle(5_000).unwrap();

    for coord in m.shape().coords() {
        let got = m.delivered(coord).unwrap();
        let broadcast_ids: Vec<_> = got
            .iter()
            .filter(|p| p.header.source == Coord::ORIGIN && p.header.message_type == MessageType::Instructions)
            .map(|p| packet_id(p).unwrap())
            .collect();
        assert_eq!(broadcast_ids, vec![0, 1, 2, 3], "broadcasts at {coord}");
        assert!(got.iter().all(|p| packet_id(p).is_some()));
    }
    assert_eq!(m.delivered(Coord::ORIGIN).unwrap().len(), 8);
    assert_eq!(m.delivered(Coord::new(2, 2)).unwrap().len(), 8);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn random_traffic_arrives_whole(
        sends in prop::collection::vec(send(), 1..40),
        stalls in prop::collection::vec((coord(), 0u64..60), 0..4),
        minimal in any::<bool>(),
    ) {
        let config = if minimal {
            RouterConfig::minimal_buffering()
        } else {
            RouterConfig::default()
        };
        let m = run_traffic(config, &sends, &stalls);
        check_deliveries(&m, &sends);
    }

    #[test]
    fn single_broadcaster_with_unicast_arrives_whole(
        sends in mixed_traffic(),
        stalls in prop::collection::vec((coord(), 0u64..60), 0..4),
    ) {
        let m = run_traffic(RouterConfig::default(), &sends, &stalls);
        check_deliveries(&m, &sends);
    }
}
