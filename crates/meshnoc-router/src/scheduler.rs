//! Per-node scheduler: rotating priority plus the request/grant table.
//!
//! Every step the table is rebuilt from scratch:
//!
//! 1. each ingress handler posts the set of egress ports its head word needs
//! 2. each egress port grants at most one requester (its locked source, or
//!    the highest priority requester under the current [`Rotation`]) and
//!    reports whether its output stage has room
//! 3. a source commits only if every port it asked for granted it and is
//!    ready; otherwise the whole word stalls
//!
//! The rotation is shared by every egress port of a node, so a broadcast
//! source that is top priority at one of its destinations is top priority at
//! all of them in the same step.

use meshnoc_topology::{Direction, DirectionSet, PORTS_PER_NODE};

use crate::EgressHandler;

/// Round-robin priority pointer over the five ports.
///
/// Advances by one position every step, regardless of traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rotation(u8);

impl Rotation {
    pub const fn new() -> Self {
        Self(0)
    }

    /// Index of the port currently holding top priority.
    pub const fn position(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn advance(self) -> Self {
        Self((self.0 + 1) % PORTS_PER_NODE as u8)
    }

    /// Priority rank of a port: 0 is highest.
    pub const fn rank(self, dir: Direction) -> usize {
        (dir.index() + PORTS_PER_NODE - self.position()) % PORTS_PER_NODE
    }

    /// Ports from highest to lowest priority.
    pub fn priority_order(self) -> [Direction; PORTS_PER_NODE] {
        let mut order = Direction::ALL;
        order.rotate_left(self.position());
        order
    }

    /// Highest priority member of `set`.
    pub fn first_of(self, set: DirectionSet) -> Option<Direction> {
        self.priority_order().into_iter().find(|d| set.contains(*d))
    }
}

/// Request/grant table recomputed every step.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    /// Per egress port: sources requesting it
    requests: [DirectionSet; PORTS_PER_NODE],
    /// Per egress port: the granted source
    grants: [Option<Direction>; PORTS_PER_NODE],
    /// Egress ports whose output stage had room at the start of the step
    ready: DirectionSet,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous step's table.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Post a source's destination set.
    pub fn request(&mut self, source: Direction, targets: DirectionSet) {
        for port in targets.iter() {
            self.requests[port.index()].insert(source);
        }
    }

    /// Let every egress port pick a winner among its requesters.
    pub fn arbitrate(&mut self, egress: &[EgressHandler; PORTS_PER_NODE], rotation: Rotation) {
        for port in Direction::ALL {
            let handler = &egress[port.index()];
            self.grants[port.index()] = handler.select(self.requests[port.index()], rotation);
            if handler.can_accept() {
                self.ready.insert(port);
            }
        }
    }

    pub fn requests(&self, port: Direction) -> DirectionSet {
        self.requests[port.index()]
    }

    pub fn grant(&self, port: Direction) -> Option<Direction> {
        self.grants[port.index()]
    }

    pub fn is_ready(&self, port: Direction) -> bool {
        self.ready.contains(port)
    }

    /// AND-reduction over a source's destinations: granted and ready at all.
    pub fn can_commit(&self, source: Direction, targets: DirectionSet) -> bool {
        targets
            .iter()
            .all(|port| self.grant(port) == Some(source) && self.is_ready(port))
    }
}
