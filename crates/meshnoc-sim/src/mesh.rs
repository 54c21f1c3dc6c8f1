//! Lock-step mesh of nodes with an endpoint on every local port.
//!
//! Each step first samples every link from committed state: the word a
//! node offers on an output and whether the node at the far end has room.
//! Only then are the nodes ticked, in any order. A word crosses a link
//! exactly when it was offered and the receiver was ready, and both ends
//! see the same decision.

use meshnoc_router::{Error as RouterError, HeaderLayout, Node, NodeInputs, NodeOutputs, Packet, Word};
use meshnoc_topology::{Coord, Direction, MeshShape};
use tracing::{debug, info, warn};

use crate::{Endpoint, MeshConfig, NetworkEvent, Result, SimError, TrafficSummary};

/// A `width × height` mesh of routers.
pub struct Mesh {
    config: MeshConfig,
    shape: MeshShape,
    layout: HeaderLayout,
    nodes: Vec<Node>,
    endpoints: Vec<Endpoint>,
    events: Vec<NetworkEvent>,
    current_step: u64,
}

impl Mesh {
    /// Build the mesh and wire every neighbor link. Links off the edge of
    /// the mesh are never valid and never ready.
    pub fn new(config: MeshConfig) -> Result<Self> {
        let shape = config.validate()?;
        let layout = config.router.validate()?;
        let nodes = shape
            .coords()
            .map(|coord| Node::new(coord, &config.router))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let endpoints = (0..nodes.len()).map(|_| Endpoint::new(layout)).collect();
        info!(
            width = config.width,
            height = config.height,
            channels = config.router.n_channels,
            "mesh built"
        );
        Ok(Self {
            config,
            shape,
            layout,
            nodes,
            endpoints,
            events: Vec::new(),
            current_step: 0,
        })
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    pub fn shape(&self) -> MeshShape {
        self.shape
    }

    pub fn layout(&self) -> &HeaderLayout {
        &self.layout
    }

    /// Number of steps run so far.
    pub fn current_step(&self) -> u64 {
        self.current_step
    }

    pub fn node(&self, coord: Coord) -> Result<&Node> {
        Ok(&self.nodes[self.shape.index_of(coord)?])
    }

    /// Queue a packet at `from`'s local port.
    pub fn send(&mut self, from: Coord, packet: &Packet) -> Result<()> {
        let index = self.shape.index_of(from)?;
        self.shape.index_of(packet.header.target)?;
        self.endpoints[index].enqueue(packet)?;
        debug!(
            node = %from,
            target = %packet.header.target,
            length = packet.header.length,
            "packet queued"
        );
        Ok(())
    }

    /// Queue raw words at `from`'s local port, bypassing packet checks.
    pub fn send_words(&mut self, from: Coord, words: impl IntoIterator<Item = Word>) -> Result<()> {
        let index = self.shape.index_of(from)?;
        self.endpoints[index].enqueue_words(words);
        Ok(())
    }

    /// Stop (or resume) the tile at `coord` taking words from its node.
    pub fn stall_sink(&mut self, coord: Coord, stalled: bool) -> Result<()> {
        let index = self.shape.index_of(coord)?;
        self.endpoints[index].set_stalled(stalled);
        Ok(())
    }

    /// Packets delivered to the tile at `coord`, in arrival order.
    pub fn delivered(&self, coord: Coord) -> Result<&[Packet]> {
        Ok(self.endpoints[self.shape.index_of(coord)?].delivered())
    }

    pub fn take_delivered(&mut self, coord: Coord) -> Result<Vec<Packet>> {
        let index = self.shape.index_of(coord)?;
        Ok(self.endpoints[index].take_delivered())
    }

    pub fn events(&self) -> &[NetworkEvent] {
        &self.events
    }

    /// The event log as a JSON array.
    pub fn events_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.events)?)
    }

    pub fn summary(&self) -> TrafficSummary {
        TrafficSummary::from_events(&self.events, self.events.len())
    }

    /// No words queued, buffered or half delivered anywhere.
    pub fn is_idle(&self) -> bool {
        self.nodes.iter().all(Node::is_idle) && self.endpoints.iter().all(Endpoint::is_idle)
    }

    /// Advance every node by one step.
    pub fn step(&mut self) {
        let inputs: Vec<NodeInputs> = (0..self.nodes.len()).map(|i| self.sample_links(i)).collect();
        let outputs: Vec<NodeOutputs> = self
            .nodes
            .iter_mut()
            .zip(&inputs)
            .map(|(node, node_inputs)| node.tick(node_inputs))
            .collect();
        for (index, out) in outputs.iter().enumerate() {
            self.record(index, out);
        }
        self.current_step += 1;
    }

    /// Run a fixed number of steps.
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Step until the network drains. Returns the number of steps taken.
    pub fn run_until_idle(&mut self, max_steps: u64) -> Result<u64> {
        let mut steps = 0;
        while !self.is_idle() {
            if steps >= max_steps {
                warn!(steps, "network did not drain");
                return Err(SimError::Stalled { steps });
            }
            self.step();
            steps += 1;
        }
        Ok(steps)
    }

    fn sample_links(&self, index: usize) -> NodeInputs {
        let node = &self.nodes[index];
        let n_channels = node.n_channels();
        let mut inputs = NodeInputs::new(n_channels);
        for dir in Direction::NEIGHBORS {
            let Some(far) = self
                .shape
                .neighbor(node.position(), dir)
                .and_then(|coord| self.shape.index_of(coord).ok())
            else {
                continue;
            };
            let far = &self.nodes[far];
            for (channel, links) in inputs.channels.iter_mut().enumerate() {
                links.incoming[dir.index()] = far.peek_output(channel, dir.opposite());
                links.downstream_ready[dir.index()] = far.input_ready(channel, dir.opposite());
            }
        }
        let endpoint = &self.endpoints[index];
        inputs.local_in = endpoint.offered();
        inputs.local_ready = endpoint.ready();
        inputs
    }

    fn record(&mut self, index: usize, out: &NodeOutputs) {
        let node = self.nodes[index].position();
        let step = self.current_step;

        if out.local_accepted {
            if let Some(word) = self.endpoints[index].accepted() {
                if word.is_header {
                    let route = self.layout.route(word.data);
                    self.events.push(NetworkEvent::PacketInjected {
                        node,
                        target: route.target,
                        send_type: route.send_type,
                        length: route.length,
                        step,
                    });
                }
            }
        }

        if let Some(word) = out.local_out {
            let event = match self.endpoints[index].receive(word) {
                Ok(Some(packet)) => {
                    debug!(%node, source = %packet.header.source, step, "packet delivered");
                    Some(NetworkEvent::PacketDelivered {
                        node,
                        source: packet.header.source,
                        message_type: packet.header.message_type,
                        send_type: packet.header.send_type,
                        length: packet.header.length,
                        step,
                    })
                }
                Ok(None) => None,
                Err(RouterError::UnknownMessageType(message_code)) => {
                    warn!(%node, message_code, step, "undecodable header at tile");
                    Some(NetworkEvent::UndecodableHeader {
                        node,
                        message_code,
                        step,
                    })
                }
                Err(err) => {
                    warn!(%node, %err, step, "bad word stream at tile");
                    Some(NetworkEvent::FramingError {
                        node,
                        channel: None,
                        port: None,
                        step,
                    })
                }
            };
            self.events.extend(event);
        }

        for (channel, channel_out) in out.channels.iter().enumerate() {
            for port in channel_out.diagnostics.routing_errors.iter() {
                self.events.push(NetworkEvent::RoutingError {
                    node,
                    channel,
                    port,
                    step,
                });
            }
            for port in channel_out.diagnostics.framing_errors.iter() {
                self.events.push(NetworkEvent::FramingError {
                    node,
                    channel: Some(channel),
                    port: Some(port),
                    step,
                });
            }
        }
        if out.diagnostics.local_framing_error {
            self.events.push(NetworkEvent::FramingError {
                node,
                channel: None,
                port: None,
                step,
            });
        }
    }
}

impl std::fmt::Debug for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mesh")
            .field("width", &self.config.width)
            .field("height", &self.config.height)
            .field("step", &self.current_step)
            .field("events", &self.events.len())
            .finish()
    }
}
