//! Per-face shading. Colors are the material base color scaled by a
//! hash-driven variation and a simple occlusion term.

use quadcraft_core::lattice::LatticeCoord;
use quadcraft_core::math::{cell_hash, hash_to_unit};

/// Maximum darkening from per-cell/per-face hash variation.
pub const SHADE_VARIATION: f32 = 0.15;

/// Darkening per occupied face neighbor of the emitting cell.
/// 3 occupied neighbors (the most a visible face can have) → 0.7.
pub const OCCLUSION_PER_NEIGHBOR: f32 = 0.1;

/// Deterministic shade factor in (0, 1] for `face` of the cell at `coord`.
pub fn face_shade(coord: &LatticeCoord, face: usize, occupied_neighbors: u32) -> f32 {
    let jitter = hash_to_unit(cell_hash(coord, face as u32));
    let variation = 1.0 - SHADE_VARIATION * jitter;
    let occlusion = 1.0 - occupied_neighbors.min(4) as f32 * OCCLUSION_PER_NEIGHBOR;
    variation * occlusion
}

pub fn shade_color(base: [f32; 3], shade: f32) -> [f32; 3] {
    base.map(|c| (c * shade).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shade_range() {
        for face in 0..4 {
            for occupied in 0..=4 {
                let s = face_shade(&LatticeCoord::new(3, 1, 0, 2), face, occupied);
                assert!(s > 0.0 && s <= 1.0, "shade {s}");
            }
        }
    }

    #[test]
    fn test_shade_is_deterministic() {
        let c = LatticeCoord::new(5, 0, 2, 1);
        assert_eq!(face_shade(&c, 2, 1), face_shade(&c, 2, 1));
    }

    #[test]
    fn test_occlusion_darkens() {
        let c = LatticeCoord::ORIGIN;
        assert!(face_shade(&c, 0, 3) < face_shade(&c, 0, 0));
    }

    #[test]
    fn test_shade_color_clamps() {
        assert_eq!(shade_color([1.0, 0.5, 0.0], 2.0), [1.0, 1.0, 0.0]);
    }
}
