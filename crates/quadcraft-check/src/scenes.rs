use std::collections::BTreeSet;

use quadcraft_core::lattice::LatticeCoord;
use quadcraft_core::math::cell_hash;
use quadcraft_core::types::{Cell, MaterialId};

/// Salt for the material mix hash, distinct from the shading salts.
const MATERIAL_SALT: u32 = 0x5EED;

/// Configuration for a single check scene.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub name: String,
    /// Cartesian radius of the filled region around the origin.
    pub radius: f64,
    /// Keep only cells within one unit of the surface.
    pub hollow: bool,
}

/// The solid and hollow variants of a blob of `radius`.
pub fn standard_scenes(radius: f64) -> Vec<SceneConfig> {
    vec![
        SceneConfig {
            name: format!("blob-r{radius}"),
            radius,
            hollow: false,
        },
        SceneConfig {
            name: format!("shell-r{radius}"),
            radius,
            hollow: true,
        },
    ]
}

/// Every lattice position within `config.radius` of the origin, in key order.
pub fn blob_coords(config: &SceneConfig) -> Vec<LatticeCoord> {
    // Normalized coordinates inside the ball never exceed twice the radius.
    let n = (config.radius.max(0.0).ceil() as i32) * 2;
    let mut coords = BTreeSet::new();
    for a in 0..=n {
        for b in 0..=n {
            for c in 0..=n {
                for d in 0..=n {
                    let coord = LatticeCoord::new(a, b, c, d);
                    let r = coord.to_quadray().to_cartesian().length();
                    let inside = r <= config.radius;
                    let shell = !config.hollow || r > config.radius - 1.0;
                    if inside && shell {
                        coords.insert(coord);
                    }
                }
            }
        }
    }
    coords.into_iter().collect()
}

/// Deterministic material mix keyed on position.
/// ~40% stone, ~20% dirt, ~15% grass, ~10% sand, ~10% water, ~5% glass.
pub fn scene_material(coord: &LatticeCoord) -> MaterialId {
    match cell_hash(coord, MATERIAL_SALT) % 100 {
        0..=39 => MaterialId(1),
        40..=59 => MaterialId(2),
        60..=74 => MaterialId(3),
        75..=84 => MaterialId(5),
        85..=94 => MaterialId(4),
        _ => MaterialId(6),
    }
}

/// Cells for a scene, ready to write into a store.
pub fn generate_scene(config: &SceneConfig) -> Vec<(LatticeCoord, Cell)> {
    blob_coords(config)
        .into_iter()
        .map(|coord| (coord, Cell::new(scene_material(&coord))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(radius: f64, hollow: bool) -> SceneConfig {
        SceneConfig {
            name: "test".into(),
            radius,
            hollow,
        }
    }

    #[test]
    fn test_blob_contains_origin_and_close_packed_shell() {
        let coords = blob_coords(&scene(2.5, false));
        assert!(coords.contains(&LatticeCoord::ORIGIN));
        let shell = quadcraft_core::lattice::neighbors(
            &LatticeCoord::ORIGIN,
            quadcraft_core::lattice::Adjacency::ClosePacked,
        );
        for n in shell {
            assert!(coords.contains(&n), "missing {n}");
        }
    }

    #[test]
    fn test_blob_respects_radius() {
        for coord in blob_coords(&scene(3.0, false)) {
            assert!(coord.to_quadray().to_cartesian().length() <= 3.0);
        }
    }

    #[test]
    fn test_hollow_is_subset() {
        let solid = blob_coords(&scene(3.0, false));
        let hollow = blob_coords(&scene(3.0, true));
        assert!(hollow.len() < solid.len());
        assert!(!hollow.contains(&LatticeCoord::ORIGIN));
        assert!(hollow.iter().all(|c| solid.contains(c)));
    }

    #[test]
    fn test_material_mix_is_deterministic_and_never_air() {
        for (coord, cell) in generate_scene(&scene(2.0, false)) {
            assert_eq!(cell.material, scene_material(&coord));
            assert!(!cell.is_air());
        }
    }
}
