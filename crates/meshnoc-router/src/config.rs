//! Router configuration.

use crate::{Error, HeaderExtension, HeaderLayout, Result, DEFAULT_CHANNELS, DEFAULT_STAGE_DEPTH};

/// Configuration shared by every router in a mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RouterConfig {
    /// Link word width in bits (1..=64).
    pub word_width: u32,

    /// Width of each coordinate field in a header (1..=16).
    pub coord_width: u32,

    /// Depth of the elastic stage in front of each ingress handler.
    /// 1 is a plain register stage (half throughput), 2 is a full skid buffer.
    pub ingress_depth: usize,

    /// Depth of the elastic stage behind each egress handler.
    pub egress_depth: usize,

    /// Number of logical channels sharing the local port.
    /// Each channel is an independent router plane.
    pub n_channels: usize,

    /// Whether North/South egress ports overwrite the header's target-X with
    /// this node's X. Broadcast floods rely on this to visit every node once.
    pub rewrite_vertical_target_x: bool,

    /// Extended header variants the compute tiles will send. Each must fit
    /// in one word alongside the base header.
    pub extensions: Vec<HeaderExtension>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            word_width: 64,
            coord_width: 8,
            ingress_depth: DEFAULT_STAGE_DEPTH,
            egress_depth: DEFAULT_STAGE_DEPTH,
            n_channels: DEFAULT_CHANNELS,
            rewrite_vertical_target_x: true,
            extensions: HeaderExtension::ALL.to_vec(),
        }
    }
}

impl RouterConfig {
    /// A single channel plane, as used by most tests.
    #[must_use]
    pub fn single_channel() -> Self {
        Self {
            n_channels: 1,
            ..Default::default()
        }
    }

    /// Register stages instead of skid buffers: smaller, half throughput.
    #[must_use]
    pub fn minimal_buffering() -> Self {
        Self {
            ingress_depth: 1,
            egress_depth: 1,
            ..Default::default()
        }
    }

    /// Check every parameter and return the header layout they describe.
    pub fn validate(&self) -> Result<HeaderLayout> {
        let layout = HeaderLayout::new(self.coord_width, self.word_width)?;
        if let Some(ext) = self.extensions.iter().find(|ext| !layout.fits(**ext)) {
            return Err(Error::HeaderTooWide {
                layout: extension_name(*ext),
                bits: layout.base_bits() + ext.bits(),
                word_width: self.word_width,
            });
        }
        if self.ingress_depth == 0 {
            return Err(Error::InvalidStageDepth { stage: "ingress" });
        }
        if self.egress_depth == 0 {
            return Err(Error::InvalidStageDepth { stage: "egress" });
        }
        if self.n_channels == 0 {
            return Err(Error::NoChannels);
        }
        Ok(layout)
    }
}

fn extension_name(ext: HeaderExtension) -> &'static str {
    match ext {
        HeaderExtension::Ident => "ident",
        HeaderExtension::Tagged => "tagged",
        HeaderExtension::Address => "address",
        HeaderExtension::Value => "value",
        HeaderExtension::ShortAddress => "short-address",
        HeaderExtension::WriteSetIdent => "write-set-ident",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let layout = RouterConfig::default().validate().unwrap();
        assert_eq!(layout.base_bits(), 43);
        assert!(RouterConfig::single_channel().validate().is_ok());
        assert!(RouterConfig::minimal_buffering().validate().is_ok());
    }

    #[test]
    fn oversized_extension_rejected() {
        let config = RouterConfig {
            word_width: 48,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(Error::HeaderTooWide {
                layout: "tagged",
                bits: 64,
                word_width: 48
            })
        );
    }

    #[test]
    fn narrow_words_fit_without_extensions() {
        let config = RouterConfig {
            word_width: 32,
            coord_width: 5,
            extensions: vec![HeaderExtension::Ident],
            ..Default::default()
        };
        // 4 * 5 + 11 = 31, plus 5 for ident = 36 > 32
        assert!(matches!(config.validate(), Err(Error::HeaderTooWide { layout: "ident", .. })));

        let config = RouterConfig {
            extensions: Vec::new(),
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_depths_and_channels_rejected() {
        let config = RouterConfig {
            ingress_depth: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(Error::InvalidStageDepth { stage: "ingress" }));

        let config = RouterConfig {
            egress_depth: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(Error::InvalidStageDepth { stage: "egress" }));

        let config = RouterConfig {
            n_channels: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(Error::NoChannels));
    }
}
