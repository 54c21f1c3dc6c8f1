//! Per-step diagnostic flags.
//!
//! Routing and framing problems are contract violations by whoever built
//! the traffic. They are reported for the step in which they happen and
//! otherwise ignored: nothing is retried and well-formed traffic keeps
//! flowing.

use meshnoc_topology::DirectionSet;

/// Flags raised during one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Ingress ports whose unicast header pointed back out of the port
    pub routing_errors: DirectionSet,
    /// Ingress ports that saw a payload word with no connection, or a header
    /// while a connection was open
    pub framing_errors: DirectionSet,
    /// The shared local port saw a framing violation
    pub local_framing_error: bool,
}

impl Diagnostics {
    /// Nothing was flagged.
    pub fn is_clean(&self) -> bool {
        self.routing_errors.is_empty() && self.framing_errors.is_empty() && !self.local_framing_error
    }

    pub fn routing_error(&self) -> bool {
        !self.routing_errors.is_empty()
    }

    pub fn framing_error(&self) -> bool {
        !self.framing_errors.is_empty() || self.local_framing_error
    }

    /// Fold another set of flags into this one.
    pub fn merge(&mut self, other: &Self) {
        self.routing_errors = DirectionSet::from_bits(self.routing_errors.bits() | other.routing_errors.bits());
        self.framing_errors = DirectionSet::from_bits(self.framing_errors.bits() | other.framing_errors.bits());
        self.local_framing_error |= other.local_framing_error;
    }
}
