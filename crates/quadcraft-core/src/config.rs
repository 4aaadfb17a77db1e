use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CHUNK_EXTENT, MAX_MESH_INDICES, MAX_MESH_VERTICES};
use crate::error::ConfigError;

/// Per-chunk caps on generated geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshLimits {
    pub max_vertices: usize,
    pub max_indices: usize,
}

impl Default for MeshLimits {
    fn default() -> Self {
        Self {
            max_vertices: MAX_MESH_VERTICES,
            max_indices: MAX_MESH_INDICES,
        }
    }
}

/// Data-driven settings shared by the store and the mesher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Chunk side length in √2-scaled Cartesian lattice units.
    #[serde(default = "default_extent")]
    pub chunk_extent: i32,
    #[serde(default)]
    pub mesh_limits: MeshLimits,
}

fn default_extent() -> i32 {
    DEFAULT_CHUNK_EXTENT
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            chunk_extent: DEFAULT_CHUNK_EXTENT,
            mesh_limits: MeshLimits::default(),
        }
    }
}

impl CoreConfig {
    /// Reject degenerate settings at the boundary instead of clamping them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_extent <= 0 {
            return Err(ConfigError::InvalidChunkExtent(self.chunk_extent));
        }
        let limits = self.mesh_limits;
        if limits.max_vertices < 3 || limits.max_indices < 3 {
            return Err(ConfigError::InvalidMeshLimits {
                max_vertices: limits.max_vertices,
                max_indices: limits.max_indices,
            });
        }
        Ok(())
    }
}

/// Parse and validate a core config from RON.
pub fn load_config_from_str(ron_str: &str) -> Result<CoreConfig, ConfigError> {
    let options = ron::Options::default();
    let config: CoreConfig = options
        .from_str(ron_str)
        .map_err(|e| ConfigError::ConfigParseError(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
