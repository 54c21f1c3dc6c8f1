//! Message type codes carried in packet headers.
//!
//! The router itself never interprets the operation; it only uses the code
//! to pick the logical channel a locally injected packet travels on.

use crate::{Error, Result};

/// Operation identifier carried in the 6-bit message-type header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum MessageType {
    Send = 0,
    Instructions = 1,

    WriteLine = 4,
    WriteLineResp = 5,
    ReadLine = 6,
    ReadLineResp = 7,
    WriteLineReadLine = 8,
    WriteLineReadLineResp = 9,

    ReadByte = 10,
    ReadByteResp = 11,
    ReadWords = 12,
    ReadWordsResp = 13,

    LoadByteResp = 14,
    LoadWordsResp = 15,

    LoadJ2jWordsReq = 16,
    LoadJ2jWordsResp = 17,
    LoadJ2jWordsDrop = 18,
    LoadJ2jWordsRetry = 19,

    StoreJ2jWordsReq = 20,
    StoreJ2jWordsResp = 21,
    StoreJ2jWordsDrop = 22,
    StoreJ2jWordsRetry = 23,

    LoadWordReq = 24,
    LoadWordResp = 25,
    LoadWordDrop = 26,
    LoadWordRetry = 27,

    StoreWordReq = 28,
    StoreWordResp = 29,
    StoreWordDrop = 30,
    StoreWordRetry = 31,

    ReadMemWordReq = 32,
    ReadMemWordResp = 33,
    ReadMemWordDrop = 34,

    WriteMemWordReq = 36,
    WriteMemWordResp = 37,
    WriteMemWordDrop = 38,
}

impl MessageType {
    /// Width of the header field holding the code.
    pub const BITS: u32 = 6;

    /// Every assigned code.
    pub const ALL: [Self; 36] = [
        Self::Send,
        Self::Instructions,
        Self::WriteLine,
        Self::WriteLineResp,
        Self::ReadLine,
        Self::ReadLineResp,
        Self::WriteLineReadLine,
        Self::WriteLineReadLineResp,
        Self::ReadByte,
        Self::ReadByteResp,
        Self::ReadWords,
        Self::ReadWordsResp,
        Self::LoadByteResp,
        Self::LoadWordsResp,
        Self::LoadJ2jWordsReq,
        Self::LoadJ2jWordsResp,
        Self::LoadJ2jWordsDrop,
        Self::LoadJ2jWordsRetry,
        Self::StoreJ2jWordsReq,
        Self::StoreJ2jWordsResp,
        Self::StoreJ2jWordsDrop,
        Self::StoreJ2jWordsRetry,
        Self::LoadWordReq,
        Self::LoadWordResp,
        Self::LoadWordDrop,
        Self::LoadWordRetry,
        Self::StoreWordReq,
        Self::StoreWordResp,
        Self::StoreWordDrop,
        Self::StoreWordRetry,
        Self::ReadMemWordReq,
        Self::ReadMemWordResp,
        Self::ReadMemWordDrop,
        Self::WriteMemWordReq,
        Self::WriteMemWordResp,
        Self::WriteMemWordDrop,
    ];

    /// The header code.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a header code.
    pub fn from_code(code: u8) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.code() == code)
            .ok_or(Error::UnknownMessageType(code))
    }

    /// Requests may provoke a response from the receiver, so they cannot be
    /// guaranteed to drain on their own.
    pub const fn is_request(self) -> bool {
        matches!(
            self,
            Self::WriteLine
                | Self::ReadLine
                | Self::WriteLineReadLine
                | Self::ReadByte
                | Self::ReadWords
                | Self::LoadJ2jWordsReq
                | Self::StoreJ2jWordsReq
                | Self::LoadWordReq
                | Self::StoreWordReq
                | Self::ReadMemWordReq
                | Self::WriteMemWordReq
        )
    }

    /// Logical channel this message travels on.
    ///
    /// Channel 0 carries traffic the receiver can always consume; channel 1
    /// carries requests. Keeping them apart stops a backlog of requests from
    /// blocking the responses that would drain it.
    pub const fn channel(self) -> usize {
        if self.is_request() {
            1
        } else {
            0
        }
    }
}

impl TryFrom<u8> for MessageType {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        Self::from_code(code)
    }
}
