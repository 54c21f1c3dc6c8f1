//! Sharing one physical local port between logical channels.
//!
//! Each channel is its own router plane, but a tile has a single local
//! link in each direction. Both directions are served one packet at a time:
//! once a header with a non-zero length goes through, the port stays with
//! that channel until the length counter runs out.

use tracing::warn;

use crate::{Frame, HeaderLayout, MessageType, PacketFramer, Word};

/// Merges the channels' local egress streams onto the tile's input link.
#[derive(Debug, Clone)]
pub struct ChannelMux {
    n_channels: usize,
    framer: PacketFramer,
    held: Option<usize>,
    next: usize,
}

impl ChannelMux {
    pub fn new(n_channels: usize) -> Self {
        Self {
            n_channels: n_channels.max(1),
            framer: PacketFramer::new(),
            held: None,
            next: 0,
        }
    }

    /// The channel owning the port until its packet finishes.
    pub fn held(&self) -> Option<usize> {
        self.held
    }

    /// Choose the channel to serve this step. `pending[c]` says whether
    /// channel `c` has a word waiting.
    pub fn select(&self, pending: &[bool]) -> Option<usize> {
        let has_word = |c: usize| pending.get(c).copied().unwrap_or(false);
        match self.held {
            Some(channel) => has_word(channel).then_some(channel),
            None => (0..self.n_channels)
                .map(|i| (self.next + i) % self.n_channels)
                .find(|&c| has_word(c)),
        }
    }

    /// Record a word that went out from `channel`.
    pub fn commit(&mut self, channel: usize, word: Word, layout: &HeaderLayout) -> Frame {
        let frame = self.framer.classify(&word, |data| layout.route(data).length);
        self.framer.advance(frame);
        if self.framer.is_active() {
            self.held = Some(channel);
        } else {
            self.held = None;
            self.next = (channel + 1) % self.n_channels;
        }
        frame
    }

    pub fn is_idle(&self) -> bool {
        self.held.is_none()
    }
}

/// Steers words injected by the tile onto the right channel.
///
/// The channel is picked from the header's message type and kept for the
/// packet's payload.
#[derive(Debug, Clone)]
pub struct LocalDemux {
    n_channels: usize,
    framer: PacketFramer,
    channel: usize,
}

impl LocalDemux {
    pub fn new(n_channels: usize) -> Self {
        Self {
            n_channels: n_channels.max(1),
            framer: PacketFramer::new(),
            channel: 0,
        }
    }

    /// Channel a message-type code travels on, clamped to the channels
    /// available. Unknown codes use channel 0.
    pub fn channel_for(&self, message_code: u8) -> usize {
        let channel = match MessageType::from_code(message_code) {
            Ok(message_type) => message_type.channel(),
            Err(err) => {
                warn!(%err, "local injection with unknown message type, using channel 0");
                0
            }
        };
        channel.min(self.n_channels - 1)
    }

    /// Where `word` should go and how it fits the packet in flight.
    pub fn route(&self, word: &Word, layout: &HeaderLayout) -> (usize, Frame) {
        let frame = self.framer.classify(word, |data| layout.route(data).length);
        let channel = match frame {
            Frame::Header { .. } => self.channel_for(layout.route(word.data).message_code),
            _ => self.channel,
        };
        (channel, frame)
    }

    /// Record a word handed to `channel`.
    pub fn commit(&mut self, channel: usize, frame: Frame) {
        self.framer.advance(frame);
        self.channel = channel;
    }

    pub fn is_idle(&self) -> bool {
        !self.framer.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Header;
    use meshnoc_topology::Coord;

    fn layout() -> HeaderLayout {
        HeaderLayout::new(8, 64).unwrap()
    }

    fn header(message_type: MessageType, length: u8) -> Word {
        let h = Header::unicast(Coord::ORIGIN, Coord::new(1, 1), message_type).with_length(length);
        Word::header(layout().encode(&h).unwrap())
    }

    #[test]
    fn mux_holds_channel_for_packet() {
        let mut mux = ChannelMux::new(2);
        assert_eq!(mux.select(&[true, true]), Some(0));
        mux.commit(0, header(MessageType::Send, 2), &layout());
        assert_eq!(mux.held(), Some(0));

        // Channel 1 waits even when channel 0 has nothing this step.
        assert_eq!(mux.select(&[false, true]), None);
        assert_eq!(mux.select(&[true, true]), Some(0));
        mux.commit(0, Word::payload(1), &layout());
        mux.commit(0, Word::payload(2), &layout());
        assert_eq!(mux.held(), None);

        // Rotates past the channel just served.
        assert_eq!(mux.select(&[true, true]), Some(1));
    }

    #[test]
    fn mux_zero_length_packets_rotate() {
        let mut mux = ChannelMux::new(3);
        let mut served = Vec::new();
        for _ in 0..6 {
            let c = mux.select(&[true, true, true]).unwrap();
            let frame = mux.commit(c, header(MessageType::Send, 0), &layout());
            assert!(!frame.is_error());
            served.push(c);
        }
        assert_eq!(served, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn mux_flags_stray_payload() {
        let mut mux = ChannelMux::new(2);
        let frame = mux.commit(1, Word::payload(5), &layout());
        assert_eq!(frame, Frame::StrayPayload);
        assert!(mux.is_idle());
    }

    #[test]
    fn demux_picks_channel_by_message_type() {
        let mut demux = LocalDemux::new(2);
        let (channel, frame) = demux.route(&header(MessageType::ReadLine, 1), &layout());
        assert_eq!(channel, 1);
        demux.commit(channel, frame);

        // Payload follows its header's channel.
        let (channel, frame) = demux.route(&Word::payload(9), &layout());
        assert_eq!((channel, frame), (1, Frame::Payload { last: true }));
        demux.commit(channel, frame);
        assert!(demux.is_idle());

        let (channel, _) = demux.route(&header(MessageType::ReadLineResp, 0), &layout());
        assert_eq!(channel, 0);
    }

    #[test]
    fn demux_clamps_to_available_channels() {
        let demux = LocalDemux::new(1);
        assert_eq!(demux.channel_for(MessageType::ReadLine.code()), 0);
        assert_eq!(demux.channel_for(2), 0);
    }
}
