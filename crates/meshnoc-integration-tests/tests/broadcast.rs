//! Broadcast coverage across a whole mesh.

use meshnoc_integration_tests::{init_tracing, packet_id, tagged_broadcast};
use meshnoc_router::RouterConfig;
use meshnoc_sim::{Mesh, MeshConfig, SimError};
use meshnoc_topology::{Coord, Direction};
use proptest::prelude::*;

fn mesh(width: u16, height: u16, rewrite: bool) -> Mesh {
    let router = RouterConfig {
        rewrite_vertical_target_x: rewrite,
        ..Default::default()
    };
    Mesh::new(MeshConfig::new(width, height).with_router(router)).unwrap()
}

fn in_rectangle(c: Coord, a: Coord, b: Coord) -> bool {
    (a.x.min(b.x)..=a.x.max(b.x)).contains(&c.x) && (a.y.min(b.y)..=a.y.max(b.y)).contains(&c.y)
}

#[test]
fn rewrite_floods_rectangle_exactly_once() {
    init_tracing();
    let mut m = mesh(5, 5, true);
    let from = Coord::new(1, 1);
    let to = Coord::new(3, 3);
    m.send(from, &tagged_broadcast(from, to, 1, 2)).unwrap();
    m.run_until_idle(200).unwrap();

    for coord in m.shape().coords() {
        let expected = usize::from(in_rectangle(coord, from, to));
        assert_eq!(m.delivered(coord).unwrap().len(), expected, "deliveries at {coord}");
    }
    assert!(m.summary().is_clean());
}

#[test]
fn without_rewrite_interior_nodes_get_duplicates() {
    init_tracing();
    let mut m = mesh(5, 5, false);
    let from = Coord::new(1, 1);
    let to = Coord::new(3, 3);
    m.send(from, &tagged_broadcast(from, to, 1, 2)).unwrap();
    m.run_until_idle(500).unwrap();

    let counts: Vec<_> = m
        .shape()
        .coords()
        .map(|c| (c, m.delivered(c).unwrap().len()))
        .collect();
    // Every node of the rectangle is still reached and nothing outside it.
    for &(c, n) in &counts {
        assert_eq!(n > 0, in_rectangle(c, from, to), "{c} got {n}");
    }
    // The far corner is reached along every monotone path.
    assert!(counts.iter().any(|&(_, n)| n > 1));
    assert_eq!(m.delivered(to).unwrap().len(), 6);
}

#[test]
fn broadcast_towards_north_west() {
    let mut m = mesh(4, 4, true);
    let from = Coord::new(3, 3);
    let to = Coord::new(0, 1);
    m.send(from, &tagged_broadcast(from, to, 9, 1)).unwrap();
    m.run_until_idle(200).unwrap();
    for coord in m.shape().coords() {
        let got = m.delivered(coord).unwrap();
        assert_eq!(got.len(), usize::from(in_rectangle(coord, from, to)), "{coord}");
        assert!(got.iter().all(|p| packet_id(p) == Some(9)));
    }
}

/// Broadcasts from two sources whose rectangles cross in opposite
/// directions wedge the network: each holds a vertical link into a node
/// whose local port is locked by the other.
#[test]
fn crossing_broadcasts_from_two_sources_deadlock() {
    init_tracing();
    let mut m = mesh(4, 4, true);
    let a = Coord::new(2, 3);
    let b = Coord::new(0, 2);
    m.send(a, &tagged_broadcast(a, b, 1, 4)).unwrap();
    m.send(b, &tagged_broadcast(b, a, 2, 4)).unwrap();

    assert!(matches!(m.run_until_idle(2_000), Err(SimError::Stalled { steps: 2_000 })));

    let lock_source = |coord: Coord, port: Direction| {
        m.node(coord)
            .unwrap()
            .router(0)
            .unwrap()
            .egress_lock(port)
            .map(|lock| lock.source)
    };
    // b's flood heading South and a's flood heading North
    assert_eq!(lock_source(Coord::new(1, 2), Direction::South), Some(Direction::West));
    assert_eq!(lock_source(Coord::new(1, 3), Direction::North), Some(Direction::East));
    // each source's own tile is half way through the other broadcast
    assert_eq!(lock_source(b, Direction::Here), Some(Direction::South));
    assert_eq!(lock_source(a, Direction::Here), Some(Direction::North));
    assert!(m.summary().is_clean());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn any_rectangle_covered_once(
        fx in 0u16..5, fy in 0u16..4,
        tx in 0u16..5, ty in 0u16..4,
        length in 0usize..4,
    ) {
        let mut m = mesh(5, 4, true);
        let from = Coord::new(fx, fy);
        let to = Coord::new(tx, ty);
        m.send(from, &tagged_broadcast(from, to, 3, length)).unwrap();
        m.run_until_idle(300).unwrap();
        for coord in m.shape().coords() {
            prop_assert_eq!(
                m.delivered(coord).unwrap().len(),
                usize::from(in_rectangle(coord, from, to))
            );
        }
    }
}
