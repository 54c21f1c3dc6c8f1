//! Mesh configuration.

use meshnoc_router::{Error as RouterError, RouterConfig};
use meshnoc_topology::{Coord, MeshShape};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Shape of the mesh plus the configuration every router shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub width: u16,
    pub height: u16,
    pub router: RouterConfig,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            width: 4,
            height: 4,
            router: RouterConfig::default(),
        }
    }
}

impl MeshConfig {
    /// A `width × height` mesh with default routers.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_router(mut self, router: RouterConfig) -> Self {
        self.router = router;
        self
    }

    /// Parse a configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the mesh and router settings together. Every coordinate must
    /// fit in the header's coordinate fields.
    pub fn validate(&self) -> Result<MeshShape> {
        let shape = MeshShape::new(self.width, self.height)?;
        self.router.validate()?;
        let far = Coord::new(self.width - 1, self.height - 1);
        let limit = (1u64 << self.router.coord_width) - 1;
        if u64::from(far.x) > limit || u64::from(far.y) > limit {
            return Err(RouterError::CoordinateOverflow {
                coord: far,
                coord_width: self.router.coord_width,
            }
            .into());
        }
        Ok(shape)
    }
}
