//! Packet header model and its bit layout.
//!
//! A header occupies exactly one word. Fields are packed from the least
//! significant bit upwards:
//!
//! ```text
//! | target_x | target_y | source_x | source_y | length | message_type | send_type | extension ... |
//! |   cw     |   cw     |   cw     |   cw     |   4    |      6       |     1     |  remaining    |
//! ```
//!
//! where `cw` is the configured coordinate width. Extended header variants
//! used by the compute tiles put their extra fields in the bits above
//! `send_type`; they must still fit inside one word.

use meshnoc_topology::{Coord, SendType};

use crate::{Error, MessageType, Result};

/// Largest payload length a header can announce.
pub const MAX_PACKET_LENGTH: u8 = 15;

/// Decoded packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
    pub target: Coord,
    pub source: Coord,
    /// Number of payload words following the header (0..=15)
    pub length: u8,
    pub message_type: MessageType,
    pub send_type: SendType,
    /// Raw extension bits above the base fields
    pub extension: u64,
}

impl Header {
    /// A unicast header with no payload.
    pub const fn unicast(source: Coord, target: Coord, message_type: MessageType) -> Self {
        Self {
            target,
            source,
            length: 0,
            message_type,
            send_type: SendType::Unicast,
            extension: 0,
        }
    }

    /// A broadcast header with no payload, flooding the rectangle between
    /// `source` and `target`.
    pub const fn broadcast(source: Coord, target: Coord, message_type: MessageType) -> Self {
        Self {
            target,
            source,
            length: 0,
            message_type,
            send_type: SendType::Broadcast,
            extension: 0,
        }
    }

    #[must_use]
    pub const fn with_length(mut self, length: u8) -> Self {
        self.length = length;
        self
    }

    #[must_use]
    pub const fn with_extension(mut self, extension: u64) -> Self {
        self.extension = extension;
        self
    }
}

/// The header fields a router needs to route a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteInfo {
    pub target: Coord,
    pub length: u8,
    pub send_type: SendType,
    /// Raw message-type code; not validated on the routing path
    pub message_code: u8,
}

/// Extended header variants used by the compute tiles.
///
/// Each one adds fields above the base header. The router never decodes them
/// but a configuration enabling a variant that does not fit is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeaderExtension {
    /// Request/response identifier
    Ident,
    /// Identifier, reply tag and a word count or byte mask sharing 12 bits
    Tagged,
    /// Identifier and a 16-bit address
    Address,
    /// Identifier and a 16-bit immediate value
    Value,
    /// Identifier, 12-bit address and a 4-bit word count
    ShortAddress,
    /// Identifier and a write-set identifier
    WriteSetIdent,
}

impl HeaderExtension {
    pub const ALL: [Self; 6] = [
        Self::Ident,
        Self::Tagged,
        Self::Address,
        Self::Value,
        Self::ShortAddress,
        Self::WriteSetIdent,
    ];

    /// Field names and widths, least significant first.
    pub const fn fields(self) -> &'static [(&'static str, u32)] {
        match self {
            Self::Ident => &[("ident", 5)],
            Self::Tagged => &[("ident", 5), ("tag", 4), ("mask", 12)],
            Self::Address => &[("ident", 5), ("address", 16)],
            Self::Value => &[("ident", 5), ("value", 16)],
            Self::ShortAddress => &[("ident", 5), ("address", 12), ("words_requested", 4)],
            Self::WriteSetIdent => &[("ident", 5), ("writeset_ident", 5)],
        }
    }

    /// Total extension width.
    pub fn bits(self) -> u32 {
        self.fields().iter().map(|(_, w)| w).sum()
    }

    /// Pack field values (in [`Self::fields`] order) into raw extension bits.
    pub fn pack(self, values: &[u64]) -> Result<u64> {
        let fields = self.fields();
        if values.len() != fields.len() {
            return Err(Error::ExtensionArity {
                extension: self,
                expected: fields.len(),
                actual: values.len(),
            });
        }
        let mut raw = 0u64;
        let mut offset = 0;
        for (&value, &(_, width)) in values.iter().zip(fields) {
            if value >> width != 0 {
                return Err(Error::ExtensionOverflow {
                    extension: self,
                    value,
                    available: width,
                });
            }
            raw |= value << offset;
            offset += width;
        }
        Ok(raw)
    }

    /// Split raw extension bits into field values.
    pub fn unpack(self, raw: u64) -> Vec<u64> {
        let mut offset = 0;
        self.fields()
            .iter()
            .map(|&(_, width)| {
                let value = (raw >> offset) & mask(width);
                offset += width;
                value
            })
            .collect()
    }
}

#[inline]
const fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Bit positions of the header fields for a given coordinate width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLayout {
    coord_width: u32,
    word_width: u32,
}

impl HeaderLayout {
    pub const LENGTH_BITS: u32 = 4;
    pub const SEND_TYPE_BITS: u32 = 1;

    /// Build a layout, rejecting widths for which the base header does not
    /// fit in one word.
    pub fn new(coord_width: u32, word_width: u32) -> Result<Self> {
        if word_width == 0 || word_width > 64 {
            return Err(Error::InvalidWordWidth(word_width));
        }
        if coord_width == 0 || coord_width > 16 {
            return Err(Error::InvalidCoordWidth(coord_width));
        }
        let layout = Self {
            coord_width,
            word_width,
        };
        if layout.base_bits() > word_width {
            return Err(Error::HeaderTooWide {
                layout: "base",
                bits: layout.base_bits(),
                word_width,
            });
        }
        Ok(layout)
    }

    pub const fn coord_width(&self) -> u32 {
        self.coord_width
    }

    pub const fn word_width(&self) -> u32 {
        self.word_width
    }

    /// Mask selecting the valid bits of a word.
    pub const fn word_mask(&self) -> u64 {
        mask(self.word_width)
    }

    /// Width of the base header fields.
    pub const fn base_bits(&self) -> u32 {
        4 * self.coord_width + Self::LENGTH_BITS + MessageType::BITS + Self::SEND_TYPE_BITS
    }

    /// Bits left above the base header for extensions.
    pub const fn extension_bits(&self) -> u32 {
        self.word_width - self.base_bits()
    }

    /// Whether an extension variant fits in this layout.
    pub fn fits(&self, extension: HeaderExtension) -> bool {
        self.base_bits() + extension.bits() <= self.word_width
    }

    const fn target_x_offset(&self) -> u32 {
        0
    }

    const fn target_y_offset(&self) -> u32 {
        self.coord_width
    }

    const fn source_x_offset(&self) -> u32 {
        2 * self.coord_width
    }

    const fn source_y_offset(&self) -> u32 {
        3 * self.coord_width
    }

    const fn length_offset(&self) -> u32 {
        4 * self.coord_width
    }

    const fn message_type_offset(&self) -> u32 {
        self.length_offset() + Self::LENGTH_BITS
    }

    const fn send_type_offset(&self) -> u32 {
        self.message_type_offset() + MessageType::BITS
    }

    fn field(&self, bits: u64, offset: u32, width: u32) -> u64 {
        (bits >> offset) & mask(width)
    }

    fn coord_field(&self, bits: u64, offset: u32) -> u16 {
        // coord_width <= 16
        self.field(bits, offset, self.coord_width) as u16
    }

    fn check_coord(&self, coord: Coord) -> Result<()> {
        let limit = mask(self.coord_width);
        if u64::from(coord.x) > limit || u64::from(coord.y) > limit {
            return Err(Error::CoordinateOverflow {
                coord,
                coord_width: self.coord_width,
            });
        }
        Ok(())
    }

    /// Pack a header into one word.
    pub fn encode(&self, header: &Header) -> Result<u64> {
        self.check_coord(header.target)?;
        self.check_coord(header.source)?;
        if header.length > MAX_PACKET_LENGTH {
            return Err(Error::PayloadTooLong(usize::from(header.length)));
        }
        let available = self.extension_bits();
        if available < 64 && header.extension >> available != 0 {
            return Err(Error::HeaderTooWide {
                layout: "extended",
                bits: self.base_bits() + (64 - header.extension.leading_zeros()),
                word_width: self.word_width,
            });
        }

        let mut bits = u64::from(header.target.x) << self.target_x_offset();
        bits |= u64::from(header.target.y) << self.target_y_offset();
        bits |= u64::from(header.source.x) << self.source_x_offset();
        bits |= u64::from(header.source.y) << self.source_y_offset();
        bits |= u64::from(header.length) << self.length_offset();
        bits |= u64::from(header.message_type.code()) << self.message_type_offset();
        bits |= header.send_type.bit() << self.send_type_offset();
        if available > 0 {
            bits |= header.extension << self.base_bits();
        }
        Ok(bits)
    }

    /// Unpack every header field, validating the message type.
    pub fn decode(&self, bits: u64) -> Result<Header> {
        let route = self.route(bits);
        let message_type = MessageType::from_code(route.message_code)?;
        let extension = if self.extension_bits() > 0 {
            (bits & self.word_mask()) >> self.base_bits()
        } else {
            0
        };
        Ok(Header {
            target: route.target,
            source: Coord::new(
                self.coord_field(bits, self.source_x_offset()),
                self.coord_field(bits, self.source_y_offset()),
            ),
            length: route.length,
            message_type,
            send_type: route.send_type,
            extension,
        })
    }

    /// Extract the routing fields. Never fails: any bit pattern routes.
    pub fn route(&self, bits: u64) -> RouteInfo {
        RouteInfo {
            target: Coord::new(
                self.coord_field(bits, self.target_x_offset()),
                self.coord_field(bits, self.target_y_offset()),
            ),
            // 4-bit field
            length: self.field(bits, self.length_offset(), Self::LENGTH_BITS) as u8,
            send_type: SendType::from_bit(self.field(bits, self.send_type_offset(), Self::SEND_TYPE_BITS)),
            // 6-bit field
            message_code: self.field(bits, self.message_type_offset(), MessageType::BITS) as u8,
        }
    }

    /// Replace the target-X field, leaving every other bit untouched.
    pub fn with_target_x(&self, bits: u64, x: u16) -> u64 {
        let field_mask = mask(self.coord_width) << self.target_x_offset();
        (bits & !field_mask) | ((u64::from(x) << self.target_x_offset()) & field_mask)
    }
}
