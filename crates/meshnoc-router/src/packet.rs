//! Whole packets as seen by the tiles at the edge of the network.

use crate::{Error, Frame, Header, HeaderLayout, PacketFramer, Result, Word, MAX_PACKET_LENGTH};

/// A header plus its payload words.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Packet {
    pub header: Header,
    pub payload: Vec<u64>,
}

impl Packet {
    /// Build a packet, setting the header's length from the payload.
    pub fn new(header: Header, payload: Vec<u64>) -> Result<Self> {
        if payload.len() > usize::from(MAX_PACKET_LENGTH) {
            return Err(Error::PayloadTooLong(payload.len()));
        }
        let length = payload.len() as u8;
        Ok(Self {
            header: header.with_length(length),
            payload,
        })
    }

    /// Words on the wire, header first.
    pub fn to_words(&self, layout: &HeaderLayout) -> Result<Vec<Word>> {
        let mut words = Vec::with_capacity(self.payload.len() + 1);
        words.push(Word::header(layout.encode(&self.header)?));
        for &value in &self.payload {
            if value & !layout.word_mask() != 0 {
                return Err(Error::PayloadOverflow {
                    value,
                    word_width: layout.word_width(),
                });
            }
            words.push(Word::payload(value));
        }
        Ok(words)
    }
}

/// Reassembles packets from a word stream.
#[derive(Debug, Clone)]
pub struct PacketAssembler {
    layout: HeaderLayout,
    framer: PacketFramer,
    current: Option<Packet>,
}

impl PacketAssembler {
    pub fn new(layout: HeaderLayout) -> Self {
        Self {
            layout,
            framer: PacketFramer::new(),
            current: None,
        }
    }

    /// A packet is partly assembled.
    pub fn is_active(&self) -> bool {
        self.framer.is_active()
    }

    /// Feed one word. Returns the packet once its last word arrives.
    ///
    /// A word that breaks framing is an error; the assembler drops any
    /// partial packet and resynchronizes on the next header. A header that
    /// cannot be decoded is an error too, and the payload it announces is
    /// skipped.
    pub fn push(&mut self, word: Word) -> Result<Option<Packet>> {
        let layout = self.layout;
        let frame = self.framer.classify(&word, |data| layout.route(data).length);
        self.framer.advance(frame);
        match frame {
            Frame::Header { length } => {
                let header = self.layout.decode(word.data)?;
                let packet = Packet {
                    header,
                    payload: Vec::with_capacity(usize::from(length)),
                };
                if length == 0 {
                    return Ok(Some(packet));
                }
                self.current = Some(packet);
                Ok(None)
            }
            Frame::Payload { last } => {
                // Payload of a header that failed to decode.
                let Some(packet) = self.current.as_mut() else {
                    return Ok(None);
                };
                packet.payload.push(word.data);
                if last {
                    Ok(self.current.take())
                } else {
                    Ok(None)
                }
            }
            Frame::StrayPayload => Err(Error::Framing("payload without a header")),
            Frame::HeaderInPacket { .. } => {
                self.framer = PacketFramer::new();
                self.current = None;
                Err(Error::Framing("header inside a packet"))
            }
        }
    }
}
