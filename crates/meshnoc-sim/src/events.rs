//! Network events recorded while a mesh runs.

use std::collections::BTreeMap;

use meshnoc_router::MessageType;
use meshnoc_topology::{Coord, Direction, SendType};
use serde::{Deserialize, Serialize};

/// Something that happened during one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NetworkEvent {
    /// A tile's header word entered its node
    PacketInjected {
        node: Coord,
        target: Coord,
        send_type: SendType,
        length: u8,
        step: u64,
    },

    /// A complete packet reached a tile
    PacketDelivered {
        node: Coord,
        source: Coord,
        message_type: MessageType,
        send_type: SendType,
        length: u8,
        step: u64,
    },

    /// A unicast route pointed back out of its arrival port
    RoutingError {
        node: Coord,
        channel: usize,
        port: Direction,
        step: u64,
    },

    /// Packet framing broke at a router port, or at the local port when
    /// `port` is `None`
    FramingError {
        node: Coord,
        channel: Option<usize>,
        port: Option<Direction>,
        step: u64,
    },

    /// A tile received a header whose message type it cannot decode
    UndecodableHeader {
        node: Coord,
        message_code: u8,
        step: u64,
    },
}

impl NetworkEvent {
    /// Get the step number for this event.
    pub fn step(&self) -> u64 {
        match self {
            NetworkEvent::PacketInjected { step, .. } => *step,
            NetworkEvent::PacketDelivered { step, .. } => *step,
            NetworkEvent::RoutingError { step, .. } => *step,
            NetworkEvent::FramingError { step, .. } => *step,
            NetworkEvent::UndecodableHeader { step, .. } => *step,
        }
    }

    /// The node the event happened at.
    pub fn node(&self) -> Coord {
        match self {
            NetworkEvent::PacketInjected { node, .. }
            | NetworkEvent::PacketDelivered { node, .. }
            | NetworkEvent::RoutingError { node, .. }
            | NetworkEvent::FramingError { node, .. }
            | NetworkEvent::UndecodableHeader { node, .. } => *node,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            NetworkEvent::RoutingError { .. }
                | NetworkEvent::FramingError { .. }
                | NetworkEvent::UndecodableHeader { .. }
        )
    }
}

/// Per-node counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTraffic {
    pub injected: usize,
    pub delivered: usize,
    pub errors: usize,
}

/// Totals rebuilt from an event log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrafficSummary {
    /// Step of the last event counted
    pub last_step: u64,
    pub injected: usize,
    pub delivered: usize,
    pub routing_errors: usize,
    pub framing_errors: usize,
    pub decode_errors: usize,
    pub per_node: BTreeMap<Coord, NodeTraffic>,
}

impl TrafficSummary {
    /// Summarize events up to (but not including) the given event index.
    pub fn from_events(events: &[NetworkEvent], up_to_event: usize) -> Self {
        let mut summary = Self::default();
        for event in events.iter().take(up_to_event) {
            summary.last_step = summary.last_step.max(event.step());
            let node = summary.per_node.entry(event.node()).or_default();
            match event {
                NetworkEvent::PacketInjected { .. } => {
                    node.injected += 1;
                    summary.injected += 1;
                }
                NetworkEvent::PacketDelivered { .. } => {
                    node.delivered += 1;
                    summary.delivered += 1;
                }
                NetworkEvent::RoutingError { .. } => {
                    node.errors += 1;
                    summary.routing_errors += 1;
                }
                NetworkEvent::FramingError { .. } => {
                    node.errors += 1;
                    summary.framing_errors += 1;
                }
                NetworkEvent::UndecodableHeader { .. } => {
                    node.errors += 1;
                    summary.decode_errors += 1;
                }
            }
        }
        summary
    }

    pub fn is_clean(&self) -> bool {
        self.routing_errors == 0 && self.framing_errors == 0 && self.decode_errors == 0
    }
}
