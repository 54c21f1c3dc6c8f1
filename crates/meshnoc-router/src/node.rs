//! A mesh node: one router plane per logical channel, a shared local port
//! and the rotating priority counter.
//!
//! The node is the single writer of the counter. It advances it once per
//! step, whatever the traffic, and every plane reads the same value.

use meshnoc_topology::{Coord, Direction};
use tracing::warn;

use crate::{
    ChannelMux, Diagnostics, Error, Frame, HeaderLayout, LocalDemux, Result, Rotation, Router,
    RouterConfig, RouterInputs, RouterOutputs, Word,
};

/// Link signals into a node for one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeInputs {
    /// Neighbor link signals per channel. The `Here` entries are ignored;
    /// the local port is driven by `local_in` and `local_ready`.
    pub channels: Vec<RouterInputs>,
    /// Word offered by the tile on the local port
    pub local_in: Option<Word>,
    /// Whether the tile can take a word from the local port
    pub local_ready: bool,
}

impl NodeInputs {
    /// Quiet links on every channel.
    pub fn new(n_channels: usize) -> Self {
        Self {
            channels: vec![RouterInputs::default(); n_channels],
            local_in: None,
            local_ready: false,
        }
    }
}

/// What a node did during one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeOutputs {
    /// Per-channel link activity
    pub channels: Vec<RouterOutputs>,
    /// Word delivered to the tile
    pub local_out: Option<Word>,
    /// The tile's offered word was taken
    pub local_accepted: bool,
    /// Flags from every plane plus the local port
    pub diagnostics: Diagnostics,
}

/// A router node with `n_channels` planes.
#[derive(Debug, Clone)]
pub struct Node {
    position: Coord,
    layout: HeaderLayout,
    rotation: Rotation,
    routers: Vec<Router>,
    mux: ChannelMux,
    demux: LocalDemux,
}

impl Node {
    pub fn new(position: Coord, config: &RouterConfig) -> Result<Self> {
        let layout = config.validate()?;
        let routers = (0..config.n_channels)
            .map(|channel| Router::new(position, channel, config))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            position,
            layout,
            rotation: Rotation::new(),
            routers,
            mux: ChannelMux::new(config.n_channels),
            demux: LocalDemux::new(config.n_channels),
        })
    }

    pub fn position(&self) -> Coord {
        self.position
    }

    pub fn layout(&self) -> &HeaderLayout {
        &self.layout
    }

    pub fn n_channels(&self) -> usize {
        self.routers.len()
    }

    /// Current value of the shared priority counter.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn router(&self, channel: usize) -> Result<&Router> {
        self.routers.get(channel).ok_or(Error::InvalidChannel {
            channel,
            n_channels: self.routers.len(),
        })
    }

    /// Registered ready of a neighbor input link.
    pub fn input_ready(&self, channel: usize, port: Direction) -> bool {
        self.routers.get(channel).is_some_and(|r| r.input_ready(port))
    }

    /// Word offered on a neighbor output link.
    pub fn peek_output(&self, channel: usize, port: Direction) -> Option<Word> {
        self.routers.get(channel).and_then(|r| r.peek_output(port))
    }

    /// Nothing buffered and no packet in flight in any plane or at the
    /// local port.
    pub fn is_idle(&self) -> bool {
        self.routers.iter().all(Router::is_idle) && self.mux.is_idle() && self.demux.is_idle()
    }

    /// Advance one step.
    pub fn tick(&mut self, inputs: &NodeInputs) -> NodeOutputs {
        let mut diagnostics = Diagnostics::default();
        let mut per_channel: Vec<RouterInputs> = (0..self.routers.len())
            .map(|c| inputs.channels.get(c).copied().unwrap_or_default())
            .collect();
        for channel_inputs in &mut per_channel {
            channel_inputs.incoming[Direction::Here.index()] = None;
            channel_inputs.downstream_ready[Direction::Here.index()] = false;
        }

        let local_accepted = match inputs.local_in {
            Some(word) => self.inject(word, &mut per_channel, &mut diagnostics),
            None => false,
        };

        let pending: Vec<bool> = self
            .routers
            .iter()
            .map(|r| r.peek_output(Direction::Here).is_some())
            .collect();
        let selected = if inputs.local_ready {
            self.mux.select(&pending)
        } else {
            None
        };
        if let Some(channel) = selected {
            per_channel[channel].downstream_ready[Direction::Here.index()] = true;
        }

        let rotation = self.rotation;
        let channels: Vec<RouterOutputs> = self
            .routers
            .iter_mut()
            .zip(&per_channel)
            .map(|(router, router_inputs)| router.tick(rotation, router_inputs))
            .collect();

        let local_out = selected.and_then(|c| channels[c].outgoing(Direction::Here));
        if let (Some(channel), Some(word)) = (selected, local_out) {
            let frame = self.mux.commit(channel, word, &self.layout);
            if frame.is_error() {
                warn!(node = %self.position, channel, ?frame, "framing error on local delivery");
                diagnostics.local_framing_error = true;
            }
        }

        for out in &channels {
            diagnostics.merge(&out.diagnostics);
        }
        self.rotation = self.rotation.advance();

        NodeOutputs {
            channels,
            local_out,
            local_accepted,
            diagnostics,
        }
    }

    /// Offer a tile word to its channel's local ingress. Returns whether the
    /// word was taken.
    fn inject(&mut self, word: Word, per_channel: &mut [RouterInputs], diagnostics: &mut Diagnostics) -> bool {
        let (channel, frame) = self.demux.route(&word, &self.layout);
        if frame == Frame::StrayPayload {
            warn!(node = %self.position, %word, "framing error: local payload with no packet open, discarded");
            self.demux.commit(channel, frame);
            diagnostics.local_framing_error = true;
            return true;
        }
        if !self.routers[channel].input_ready(Direction::Here) {
            return false;
        }
        per_channel[channel].incoming[Direction::Here.index()] = Some(word);
        self.demux.commit(channel, frame);
        if frame.is_error() {
            warn!(node = %self.position, channel, ?frame, "framing error on local injection");
            diagnostics.local_framing_error = true;
        }
        true
    }
}
