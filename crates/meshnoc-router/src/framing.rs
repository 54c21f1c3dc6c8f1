//! Packet framing tracker.
//!
//! Counts the payload words still owed by the packet in flight and classifies
//! each new word against that count. Used wherever a word stream has to be
//! cut into packets: ingress connections, the local channel mux and demux,
//! and endpoint packet reassembly.

use crate::Word;

/// How a word relates to the packet in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// A header opening a packet of `length` payload words.
    Header { length: u8 },
    /// A payload word of the open packet; `last` closes it.
    Payload { last: bool },
    /// A payload word with no open packet.
    StrayPayload,
    /// A header while a packet is still open. It is carried as payload of
    /// the open packet.
    HeaderInPacket { last: bool },
}

impl Frame {
    /// Whether the word breaks framing.
    pub const fn is_error(self) -> bool {
        matches!(self, Self::StrayPayload | Self::HeaderInPacket { .. })
    }

    /// Whether the word opens a new packet.
    pub const fn opens_packet(self) -> bool {
        matches!(self, Self::Header { .. })
    }

    /// Whether no payload remains after this word.
    pub const fn ends_packet(self) -> bool {
        match self {
            Self::Header { length } => length == 0,
            Self::Payload { last } | Self::HeaderInPacket { last } => last,
            Self::StrayPayload => true,
        }
    }
}

/// Remaining-length counter for one word stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketFramer {
    remaining: u8,
}

impl PacketFramer {
    pub const fn new() -> Self {
        Self { remaining: 0 }
    }

    /// A packet is open and still owes payload words.
    pub const fn is_active(&self) -> bool {
        self.remaining > 0
    }

    pub const fn remaining(&self) -> u8 {
        self.remaining
    }

    /// Classify `word` without changing state. `length_of` reads the length
    /// field of a header word.
    pub fn classify(&self, word: &Word, length_of: impl FnOnce(u64) -> u8) -> Frame {
        match (self.is_active(), word.is_header) {
            (false, true) => Frame::Header {
                length: length_of(word.data),
            },
            (false, false) => Frame::StrayPayload,
            (true, false) => Frame::Payload {
                last: self.remaining == 1,
            },
            (true, true) => Frame::HeaderInPacket {
                last: self.remaining == 1,
            },
        }
    }

    /// Commit a classified word.
    pub fn advance(&mut self, frame: Frame) {
        match frame {
            Frame::Header { length } => self.remaining = length,
            Frame::Payload { .. } | Frame::HeaderInPacket { .. } => {
                self.remaining = self.remaining.saturating_sub(1)
            }
            Frame::StrayPayload => {}
        }
    }
}
