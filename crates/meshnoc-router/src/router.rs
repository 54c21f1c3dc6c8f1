//! One crossbar plane: five ingress handlers, five egress handlers and the
//! scheduler between them.
//!
//! # Step Semantics
//!
//! [`Router::tick`] advances the plane by one step. Everything it decides is
//! based on the state committed at the end of the previous step:
//!
//! 1. input and output stage readiness is sampled
//! 2. every ingress head posts its destination set; every egress port grants
//!    one requester
//! 3. output words leave towards ready downstream links
//! 4. each source whose destinations all granted it moves its head word into
//!    every one of those output stages at once
//! 5. words arriving on the input links are stored if their stage was ready
//!
//! A caller driving several routers samples [`Router::input_ready`] and
//! [`Router::peek_output`] on all of them before ticking any, so a link
//! transfer happens exactly when the sender offered a word and the receiver
//! was ready.

use meshnoc_topology::{Coord, Direction, DirectionSet, PORTS_PER_NODE};
use tracing::{trace, warn};

use crate::{
    Connection, Diagnostics, EgressHandler, HeaderLayout, IngressHandler, IngressRequest, Lock,
    Result, RouterConfig, Rotation, Scheduler, Word,
};

/// Link signals into a router for one step, indexed by [`Direction::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterInputs {
    /// Word transferred in on each input link
    pub incoming: [Option<Word>; PORTS_PER_NODE],
    /// Whether the far side of each output link can take a word
    pub downstream_ready: [bool; PORTS_PER_NODE],
}

impl RouterInputs {
    /// Offer a word on one input link.
    #[must_use]
    pub fn with_incoming(mut self, port: Direction, word: Word) -> Self {
        self.incoming[port.index()] = Some(word);
        self
    }

    /// Mark every output link ready.
    #[must_use]
    pub fn all_ready(mut self) -> Self {
        self.downstream_ready = [true; PORTS_PER_NODE];
        self
    }
}

/// What a router did during one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterOutputs {
    /// Word sent on each output link
    pub outgoing: [Option<Word>; PORTS_PER_NODE],
    /// Input links whose word was stored
    pub accepted: DirectionSet,
    pub diagnostics: Diagnostics,
}

impl RouterOutputs {
    pub fn outgoing(&self, port: Direction) -> Option<Word> {
        self.outgoing[port.index()]
    }
}

/// A single-channel router.
#[derive(Debug, Clone)]
pub struct Router {
    position: Coord,
    channel: usize,
    layout: HeaderLayout,
    rewrite_vertical_target_x: bool,
    ingress: [IngressHandler; PORTS_PER_NODE],
    egress: [EgressHandler; PORTS_PER_NODE],
    scheduler: Scheduler,
}

impl Router {
    /// Build a router at `position` for logical `channel`.
    pub fn new(position: Coord, channel: usize, config: &RouterConfig) -> Result<Self> {
        let layout = config.validate()?;
        Ok(Self {
            position,
            channel,
            layout,
            rewrite_vertical_target_x: config.rewrite_vertical_target_x,
            ingress: Direction::ALL.map(|d| IngressHandler::new(d, config.ingress_depth)),
            egress: Direction::ALL.map(|d| EgressHandler::new(d, config.egress_depth)),
            scheduler: Scheduler::new(),
        })
    }

    pub fn position(&self) -> Coord {
        self.position
    }

    pub fn channel(&self) -> usize {
        self.channel
    }

    pub fn layout(&self) -> &HeaderLayout {
        &self.layout
    }

    /// Registered ready of an input link.
    pub fn input_ready(&self, port: Direction) -> bool {
        self.ingress[port.index()].can_accept()
    }

    /// The word offered on an output link.
    pub fn peek_output(&self, port: Direction) -> Option<Word> {
        self.egress[port.index()].peek()
    }

    /// The connection latched at an ingress port.
    pub fn connection(&self, port: Direction) -> Option<Connection> {
        self.ingress[port.index()].connection()
    }

    /// The source an egress port is locked onto.
    pub fn egress_lock(&self, port: Direction) -> Option<Lock> {
        self.egress[port.index()].lock()
    }

    /// Last step's request/grant table.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// No buffered words and no packet in flight anywhere in the plane.
    pub fn is_idle(&self) -> bool {
        self.ingress.iter().all(IngressHandler::is_idle) && self.egress.iter().all(EgressHandler::is_idle)
    }

    /// Advance one step.
    pub fn tick(&mut self, rotation: Rotation, inputs: &RouterInputs) -> RouterOutputs {
        let mut outputs = RouterOutputs::default();
        let input_ready = Direction::ALL.map(|d| self.input_ready(d));

        let requests = self.collect_requests();
        self.scheduler.arbitrate(&self.egress, rotation);

        for port in Direction::ALL {
            if inputs.downstream_ready[port.index()] {
                outputs.outgoing[port.index()] = self.egress[port.index()].pop();
            }
        }

        for source in Direction::ALL {
            if let Some(request) = requests[source.index()] {
                self.commit(source, &request, &mut outputs.diagnostics);
            }
        }

        for port in Direction::ALL {
            let Some(word) = inputs.incoming[port.index()] else {
                continue;
            };
            if input_ready[port.index()] && self.ingress[port.index()].receive(word).is_ok() {
                outputs.accepted.insert(port);
            }
        }

        outputs
    }

    fn collect_requests(&mut self) -> [Option<IngressRequest>; PORTS_PER_NODE] {
        self.scheduler.clear();
        let requests = Direction::ALL.map(|d| self.ingress[d.index()].request(self.position, &self.layout));
        for source in Direction::ALL {
            if let Some(request) = &requests[source.index()] {
                self.scheduler.request(source, request.targets);
            }
        }
        requests
    }

    fn commit(&mut self, source: Direction, request: &IngressRequest, diagnostics: &mut Diagnostics) {
        if !self.scheduler.can_commit(source, request.targets) {
            trace!(
                node = %self.position,
                channel = self.channel,
                %source,
                targets = ?request.targets,
                "blocked"
            );
            return;
        }

        let rewrite = self.rewrite_vertical_target_x.then_some(self.position.x);
        for port in request.targets.iter() {
            self.egress[port.index()].accept(source, request.word, &self.layout, rewrite);
        }
        self.ingress[source.index()].commit(request);
        trace!(
            node = %self.position,
            channel = self.channel,
            %source,
            targets = ?request.targets,
            word = %request.word,
            "transferred"
        );

        if request.routing_error {
            warn!(
                node = %self.position,
                channel = self.channel,
                %source,
                "routing error: unicast route points back out of its arrival port"
            );
            diagnostics.routing_errors.insert(source);
        }
        if request.frame.is_error() {
            warn!(
                node = %self.position,
                channel = self.channel,
                %source,
                frame = ?request.frame,
                "framing error"
            );
            diagnostics.framing_errors.insert(source);
        }
    }
}
