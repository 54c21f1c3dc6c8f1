//! Egress handler: one per output port.
//!
//! Arbitrates among the five possible sources and, once a header with a
//! non-zero length is accepted, locks onto its source until the packet's
//! last payload word has passed. Other sources are refused meanwhile, which
//! mirrors the ingress side's wormhole atomicity.

use meshnoc_topology::{Direction, DirectionSet};
use tracing::{debug, warn};

use crate::{HeaderLayout, Rotation, SkidBuffer, Word};

/// An egress port's commitment to one source for the rest of a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lock {
    pub source: Direction,
    /// Payload words still to pass
    pub remaining: u8,
}

/// One output port of a router.
#[derive(Debug, Clone)]
pub struct EgressHandler {
    port: Direction,
    stage: SkidBuffer<Word>,
    lock: Option<Lock>,
}

impl EgressHandler {
    pub fn new(port: Direction, depth: usize) -> Self {
        Self {
            port,
            stage: SkidBuffer::new(depth),
            lock: None,
        }
    }

    pub fn port(&self) -> Direction {
        self.port
    }

    /// The source this port is locked onto, if a packet is in flight.
    pub fn lock(&self) -> Option<Lock> {
        self.lock
    }

    /// Registered ready of the output stage.
    pub fn can_accept(&self) -> bool {
        self.stage.can_accept()
    }

    /// Pick the source to serve this step.
    ///
    /// While locked only the locked source can win. Otherwise the requester
    /// with the best rank under the shared rotation wins.
    pub fn select(&self, requests: DirectionSet, rotation: Rotation) -> Option<Direction> {
        match self.lock {
            Some(lock) => requests.contains(lock.source).then_some(lock.source),
            None => rotation.first_of(requests),
        }
    }

    /// Take a granted word into the output stage.
    ///
    /// `rewrite_target_x` carries this node's X when the vertical rewrite is
    /// enabled; it is applied to headers leaving through North or South.
    pub fn accept(
        &mut self,
        source: Direction,
        mut word: Word,
        layout: &HeaderLayout,
        rewrite_target_x: Option<u16>,
    ) {
        match self.lock.as_mut() {
            Some(lock) => {
                lock.remaining = lock.remaining.saturating_sub(1);
                if lock.remaining == 0 {
                    debug!(port = %self.port, source = %lock.source, "egress released");
                    self.lock = None;
                }
            }
            None if word.is_header => {
                if let (Some(x), true) = (rewrite_target_x, self.port.is_vertical()) {
                    word.data = layout.with_target_x(word.data, x);
                }
                let length = layout.route(word.data).length;
                if length > 0 {
                    debug!(port = %self.port, %source, length, "egress locked");
                    self.lock = Some(Lock {
                        source,
                        remaining: length,
                    });
                }
            }
            None => {}
        }

        if let Err(word) = self.stage.push(word) {
            warn!(port = %self.port, %word, "egress stage overrun, word dropped");
        }
    }

    /// The word offered on the output link.
    pub fn peek(&self) -> Option<Word> {
        self.stage.front().copied()
    }

    /// Hand the offered word to the link.
    pub fn pop(&mut self) -> Option<Word> {
        self.stage.pop()
    }

    /// No buffered words and no packet in flight.
    pub fn is_idle(&self) -> bool {
        self.stage.is_empty() && self.lock.is_none()
    }
}
