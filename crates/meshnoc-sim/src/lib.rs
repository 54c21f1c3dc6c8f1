//! Meshnoc Simulation
//!
//! Runs a mesh of routers in lock-step with a traffic endpoint on every
//! local port.
//!
//! # Architecture
//!
//! - **Mesh**: wires nodes by their neighbor links and steps them together
//! - **Endpoint**: queues packets for injection and reassembles deliveries
//! - **Events**: a timeline of injections, deliveries and diagnostics
//!
//! # Usage
//!
//! ```ignore
//! let mut mesh = Mesh::new(MeshConfig::new(4, 4))?;
//! mesh.send(Coord::new(0, 0), &packet)?;
//! mesh.run_until_idle(1_000)?;
//! let got = mesh.delivered(Coord::new(3, 3))?;
//! ```

mod config;
mod endpoint;
mod error;
mod events;
mod mesh;

pub use config::MeshConfig;
pub use endpoint::Endpoint;
pub use error::{Result, SimError};
pub use events::{NetworkEvent, NodeTraffic, TrafficSummary};
pub use mesh::Mesh;
