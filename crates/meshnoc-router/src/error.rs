//! Error types for meshnoc-router.
//!
//! These cover setup-time and encoding failures only. Traffic problems seen
//! while the network runs are reported as [`crate::Diagnostics`] flags.

use meshnoc_topology::Coord;
use thiserror::Error;

use crate::HeaderExtension;

/// Result type for meshnoc-router operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring routers or encoding headers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Word width must be between 1 and 64 bits.
    #[error("word width must be 1..=64 bits, got {0}")]
    InvalidWordWidth(u32),

    /// Coordinate fields must be between 1 and 16 bits.
    #[error("coordinate width must be 1..=16 bits, got {0}")]
    InvalidCoordWidth(u32),

    /// A header layout does not fit in one word.
    #[error("{layout} header needs {bits} bits but words are {word_width} bits")]
    HeaderTooWide {
        layout: &'static str,
        bits: u32,
        word_width: u32,
    },

    /// A pipeline stage must hold at least one word.
    #[error("{stage} stage depth must be at least 1")]
    InvalidStageDepth { stage: &'static str },

    /// At least one logical channel is required.
    #[error("router needs at least one channel")]
    NoChannels,

    /// Channel index outside the configured range.
    #[error("channel {channel} out of range for {n_channels} channels")]
    InvalidChannel { channel: usize, n_channels: usize },

    /// Message type code not assigned to any operation.
    #[error("unknown message type code {0}")]
    UnknownMessageType(u8),

    /// A coordinate does not fit in the configured field width.
    #[error("coordinate {coord} does not fit in {coord_width}-bit fields")]
    CoordinateOverflow { coord: Coord, coord_width: u32 },

    /// Packets carry at most 15 payload words.
    #[error("payload of {0} words exceeds the 15-word packet limit")]
    PayloadTooLong(usize),

    /// A payload value does not fit in the configured word width.
    #[error("payload value {value:#x} does not fit in {word_width}-bit words")]
    PayloadOverflow { value: u64, word_width: u32 },

    /// Header extension bits do not fit above the base header fields.
    #[error("{extension:?} extension value {value:#x} does not fit in {available} bits")]
    ExtensionOverflow {
        extension: HeaderExtension,
        value: u64,
        available: u32,
    },

    /// Wrong number of field values for a header extension.
    #[error("{extension:?} extension takes {expected} fields, got {actual}")]
    ExtensionArity {
        extension: HeaderExtension,
        expected: usize,
        actual: usize,
    },

    /// A word stream broke packet framing.
    #[error("framing violation: {0}")]
    Framing(&'static str),
}
