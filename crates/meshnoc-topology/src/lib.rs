//! Meshnoc Mesh Topology
//!
//! Coordinates, port directions and routing functions for a 2D mesh of
//! routers.
//!
//! # Coordinate System
//!
//! Nodes sit on an `width × height` grid. `x` grows to the East and `y` grows
//! to the South, so a node's North neighbor has `y - 1`.
//!
//! # Routing
//!
//! - **Unicast** packets are dimension-order routed: X is fully resolved
//!   before Y, which rules out routing cycles in a mesh.
//! - **Broadcast** packets flood the rectangle spanned by the current node and
//!   the target. Every hop strictly decreases the distance to the target.
//!
//! Each router has five ports, four facing neighbors plus the local (`Here`)
//! port towards its own compute tile.

mod coord;
mod direction;
mod error;
mod routing;

pub use coord::{Coord, MeshShape};
pub use direction::{Direction, DirectionSet};
pub use error::{Error, Result};
pub use routing::{broadcast_directions, routing_directions, unicast_directions, SendType};

/// Number of ports on every router (four neighbors plus local).
pub const PORTS_PER_NODE: usize = 5;

/// Ports facing neighboring routers.
pub const NEIGHBOR_PORTS: usize = 4;

/// Local ports towards the compute tile.
pub const LOCAL_PORTS: usize = 1;

// Compile-time assertion of the port count
const _: () = assert!(NEIGHBOR_PORTS + LOCAL_PORTS == PORTS_PER_NODE);
