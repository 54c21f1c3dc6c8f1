//! Error types for meshnoc-sim.

use thiserror::Error;

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors raised while building or driving a simulated mesh.
#[derive(Debug, Error)]
pub enum SimError {
    /// Router configuration or packet encoding was rejected.
    #[error("router: {0}")]
    Config(#[from] meshnoc_router::Error),

    /// Mesh shape or coordinate problem.
    #[error("topology: {0}")]
    Topology(#[from] meshnoc_topology::Error),

    /// Configuration or event JSON could not be (de)serialized.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// Traffic was still in flight after the step limit.
    #[error("network still busy after {steps} steps")]
    Stalled { steps: u64 },
}
