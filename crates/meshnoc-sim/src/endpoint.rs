//! The tile side of a node's local port.

use std::collections::VecDeque;

use meshnoc_router::{HeaderLayout, Packet, PacketAssembler, Result, Word};

/// Injects queued packets word by word and reassembles what arrives.
#[derive(Debug, Clone)]
pub struct Endpoint {
    layout: HeaderLayout,
    outbox: VecDeque<Word>,
    assembler: PacketAssembler,
    delivered: Vec<Packet>,
    stalled: bool,
}

impl Endpoint {
    pub fn new(layout: HeaderLayout) -> Self {
        Self {
            layout,
            outbox: VecDeque::new(),
            assembler: PacketAssembler::new(layout),
            delivered: Vec::new(),
            stalled: false,
        }
    }

    /// Queue a packet behind anything already waiting.
    pub fn enqueue(&mut self, packet: &Packet) -> Result<()> {
        let words = packet.to_words(&self.layout)?;
        self.outbox.extend(words);
        Ok(())
    }

    /// Queue raw words, well-formed or not.
    pub fn enqueue_words(&mut self, words: impl IntoIterator<Item = Word>) {
        self.outbox.extend(words);
    }

    /// Word offered to the node this step.
    pub fn offered(&self) -> Option<Word> {
        self.outbox.front().copied()
    }

    /// The node took the offered word.
    pub fn accepted(&mut self) -> Option<Word> {
        self.outbox.pop_front()
    }

    /// Whether the tile takes words from the node this step.
    pub fn ready(&self) -> bool {
        !self.stalled
    }

    pub fn set_stalled(&mut self, stalled: bool) {
        self.stalled = stalled;
    }

    /// Feed a word delivered by the node.
    pub fn receive(&mut self, word: Word) -> Result<Option<&Packet>> {
        match self.assembler.push(word)? {
            Some(packet) => {
                self.delivered.push(packet);
                Ok(self.delivered.last())
            }
            None => Ok(None),
        }
    }

    pub fn delivered(&self) -> &[Packet] {
        &self.delivered
    }

    /// Hand over every packet received so far.
    pub fn take_delivered(&mut self) -> Vec<Packet> {
        std::mem::take(&mut self.delivered)
    }

    pub fn pending_words(&self) -> usize {
        self.outbox.len()
    }

    /// Nothing left to send and no packet half received.
    pub fn is_idle(&self) -> bool {
        self.outbox.is_empty() && !self.assembler.is_active()
    }
}
