use glam::IVec3;
use serde::{Deserialize, Serialize};

/// Newtype for material identifiers. 0 = air/empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub u16);

impl MaterialId {
    pub const AIR: MaterialId = MaterialId(0);

    pub fn is_air(self) -> bool {
        self == Self::AIR
    }
}

/// Chunk coordinate in chunk-space (each unit = chunk extent lattice points).
pub type ChunkCoord = IVec3;

/// Integer Cartesian lattice point: √2 · to_cartesian of an integer quadray.
pub type LatticePoint = IVec3;

/// Optional orientation tag carried verbatim by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Orientation(pub u8);

/// An occupied lattice cell's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub material: MaterialId,
    #[serde(default)]
    pub orientation: Option<Orientation>,
}

impl Cell {
    pub fn new(material: MaterialId) -> Self {
        Self {
            material,
            orientation: None,
        }
    }

    pub fn with_orientation(material: MaterialId, orientation: Orientation) -> Self {
        Self {
            material,
            orientation: Some(orientation),
        }
    }

    pub fn is_air(&self) -> bool {
        self.material.is_air()
    }
}
