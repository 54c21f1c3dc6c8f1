//! Ingress handler: one per input port.
//!
//! Every incoming word first lands in an elastic stage. When a header
//! reaches the head of the stage its output set is computed from the send
//! type, the target and this node's position, minus the port the word came
//! in on. The set is latched as the packet's connection and reused for every
//! payload word until the header's length is exhausted.
//!
//! The handler never consumes a word partially: the word is presented to all
//! ports in the connection at once and only leaves the stage in the step
//! where all of them take it.

use meshnoc_topology::{routing_directions, Coord, Direction, DirectionSet, SendType};
use tracing::debug;

use crate::{Frame, HeaderLayout, PacketFramer, RouteInfo, SkidBuffer, Word};

/// The latched output set of the packet in flight at an ingress port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub targets: DirectionSet,
    /// Payload words still to pass
    pub remaining: u8,
}

/// What an ingress handler wants to do with its head word this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngressRequest {
    pub word: Word,
    /// Egress ports that must all accept the word
    pub targets: DirectionSet,
    pub frame: Frame,
    /// The unicast route pointed back out of the arrival port
    pub routing_error: bool,
}

/// One input port of a router.
#[derive(Debug, Clone)]
pub struct IngressHandler {
    port: Direction,
    stage: SkidBuffer<Word>,
    framer: PacketFramer,
    targets: DirectionSet,
}

impl IngressHandler {
    pub fn new(port: Direction, depth: usize) -> Self {
        Self {
            port,
            stage: SkidBuffer::new(depth),
            framer: PacketFramer::new(),
            targets: DirectionSet::empty(),
        }
    }

    pub fn port(&self) -> Direction {
        self.port
    }

    /// Registered ready of the input stage.
    pub fn can_accept(&self) -> bool {
        self.stage.can_accept()
    }

    /// Store a word arriving on the link. The word is handed back if the
    /// stage was full.
    pub fn receive(&mut self, word: Word) -> Result<(), Word> {
        self.stage.push(word)
    }

    /// The connection of the packet in flight, if any.
    pub fn connection(&self) -> Option<Connection> {
        self.framer.is_active().then_some(Connection {
            targets: self.targets,
            remaining: self.framer.remaining(),
        })
    }

    /// Output set for a header arriving on this port.
    ///
    /// Neighbor ports never send a packet back where it came from. If that
    /// changes a unicast route the second value is set; the packet is left
    /// with no destinations rather than being redirected.
    pub fn route(&self, my: Coord, route: &RouteInfo) -> (DirectionSet, bool) {
        let computed = routing_directions(route.send_type, my, route.target);
        if !self.port.is_neighbor() {
            return (computed, false);
        }
        let targets = computed.without(self.port);
        let routing_error = route.send_type == SendType::Unicast && targets != computed;
        (targets, routing_error)
    }

    /// Build this step's request from the head word.
    pub fn request(&self, my: Coord, layout: &HeaderLayout) -> Option<IngressRequest> {
        let word = *self.stage.front()?;
        let frame = self.framer.classify(&word, |data| layout.route(data).length);
        let (targets, routing_error) = match frame {
            Frame::Header { .. } => self.route(my, &layout.route(word.data)),
            Frame::Payload { .. } | Frame::HeaderInPacket { .. } => (self.targets, false),
            // Nowhere to send it
            Frame::StrayPayload => (DirectionSet::empty(), false),
        };
        Some(IngressRequest {
            word,
            targets,
            frame,
            routing_error,
        })
    }

    /// Consume the head word after every destination took it.
    pub fn commit(&mut self, request: &IngressRequest) {
        self.stage.pop();
        self.framer.advance(request.frame);
        if request.frame.opens_packet() {
            self.targets = request.targets;
            if self.framer.is_active() {
                debug!(
                    port = %self.port,
                    targets = ?self.targets,
                    length = self.framer.remaining(),
                    "connection opened"
                );
            }
        } else if !self.framer.is_active() && !request.frame.is_error() {
            debug!(port = %self.port, targets = ?self.targets, "connection closed");
        }
        if !self.framer.is_active() {
            self.targets = DirectionSet::empty();
        }
    }

    /// No buffered words and no packet in flight.
    pub fn is_idle(&self) -> bool {
        self.stage.is_empty() && !self.framer.is_active()
    }
}
