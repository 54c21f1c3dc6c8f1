//! Routing functions.
//!
//! Both functions are pure and combinational: they read the node's own
//! position and the header's target and return the set of output ports.

use crate::{Coord, Direction, DirectionSet};

/// Delivery mode carried in a packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SendType {
    /// Deliver to the target node only
    #[default]
    Unicast,
    /// Deliver to every node in the rectangle between sender and target
    Broadcast,
}

impl SendType {
    /// Header bit encoding.
    pub const fn bit(self) -> u64 {
        match self {
            Self::Unicast => 0,
            Self::Broadcast => 1,
        }
    }

    /// Decode the header bit; only the lowest bit is considered.
    pub const fn from_bit(bit: u64) -> Self {
        if bit & 1 == 0 {
            Self::Unicast
        } else {
            Self::Broadcast
        }
    }
}

/// Dimension-order (X then Y) route for a unicast packet.
///
/// Returns `{Here}` when the packet has arrived, otherwise exactly one
/// neighbor direction. Y is only considered once X matches.
pub fn unicast_directions(my: Coord, target: Coord) -> DirectionSet {
    let dir = if target == my {
        Direction::Here
    } else if target.x != my.x {
        if target.x > my.x {
            Direction::East
        } else {
            Direction::West
        }
    } else if target.y < my.y {
        Direction::North
    } else {
        Direction::South
    };
    DirectionSet::single(dir)
}

/// Flood directions for a broadcast packet.
///
/// Always delivers locally and continues towards the target on each axis
/// where the target differs from this node.
pub fn broadcast_directions(my: Coord, target: Coord) -> DirectionSet {
    let mut dirs = DirectionSet::single(Direction::Here);
    if my.y > target.y {
        dirs.insert(Direction::North);
    }
    if my.y < target.y {
        dirs.insert(Direction::South);
    }
    if my.x < target.x {
        dirs.insert(Direction::East);
    }
    if my.x > target.x {
        dirs.insert(Direction::West);
    }
    dirs
}

/// Route a header by its send type.
pub fn routing_directions(send_type: SendType, my: Coord, target: Coord) -> DirectionSet {
    match send_type {
        SendType::Unicast => unicast_directions(my, target),
        SendType::Broadcast => broadcast_directions(my, target),
    }
}
