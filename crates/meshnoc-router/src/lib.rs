//! Meshnoc Router
//!
//! Cycle-level model of a wormhole router for a 2D mesh.
//!
//! # Structure
//!
//! A [`Node`] holds one [`Router`] per logical channel. Each router has five
//! ports (North, East, South, West and the local `Here` port), each with an
//! [`IngressHandler`] and an [`EgressHandler`] joined by a crossbar that the
//! [`Scheduler`] arbitrates:
//!
//! - an ingress handler routes the header at its head and latches the result
//!   as the packet's connection until its payload has passed
//! - an egress handler grants one requester per step and stays locked to it
//!   for the rest of the packet, so packets never interleave on a link
//! - a word moves only when every egress in its connection can take it, so a
//!   broadcast advances on all branches together or not at all
//!
//! Ties are broken by a [`Rotation`] counter owned by the node and shared by
//! every port of every channel.
//!
//! # Flow Control
//!
//! Links use ready/valid with registered ready: every ingress and egress
//! stage is a [`SkidBuffer`] whose readiness is sampled at the start of the
//! step, so backpressure never propagates combinationally through a router.

mod channel;
mod config;
mod diagnostics;
mod egress;
mod error;
mod framing;
mod header;
mod ingress;
mod message;
mod node;
mod packet;
mod router;
mod scheduler;
mod skid;
mod word;

pub use channel::{ChannelMux, LocalDemux};
pub use config::RouterConfig;
pub use diagnostics::Diagnostics;
pub use egress::{EgressHandler, Lock};
pub use error::{Error, Result};
pub use framing::{Frame, PacketFramer};
pub use header::{Header, HeaderExtension, HeaderLayout, RouteInfo, MAX_PACKET_LENGTH};
pub use ingress::{Connection, IngressHandler, IngressRequest};
pub use message::MessageType;
pub use node::{Node, NodeInputs, NodeOutputs};
pub use packet::{Packet, PacketAssembler};
pub use router::{Router, RouterInputs, RouterOutputs};
pub use scheduler::{Rotation, Scheduler};
pub use skid::SkidBuffer;
pub use word::Word;

/// Default depth of every ingress and egress stage.
pub const DEFAULT_STAGE_DEPTH: usize = 2;

/// Default number of logical channels: requests and responses.
pub const DEFAULT_CHANNELS: usize = 2;
