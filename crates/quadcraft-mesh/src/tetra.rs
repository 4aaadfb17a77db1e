//! Solid geometry of a single lattice cell.
//!
//! A cell is a tetrahedron with vertices at `center ± REACH·e_i` in quadray
//! space: outward for Tetra cells, inward for Octa cells. Face `i` is the
//! triangle opposite vertex `i`, and its neighbor across that face is the
//! reflection of the center through the face centroid.

use glam::DVec3;
use quadcraft_core::constants::{CELL_VERTEX_REACH, FACES_PER_CELL};
use quadcraft_core::lattice::{face_offsets, CellParity, LatticeCoord};
use quadcraft_core::quadray::Quadray;

/// Vertex indices of each face, in the order they are emitted before
/// winding correction.
pub const FACE_VERTICES: [[usize; 3]; FACES_PER_CELL] =
    [[1, 2, 3], [0, 2, 3], [0, 1, 3], [0, 1, 2]];

/// Cartesian triangle for one face with an outward unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceGeometry {
    pub corners: [DVec3; 3],
    pub normal: DVec3,
}

#[derive(Debug, Clone, Copy)]
pub struct CellSolid {
    pub coord: LatticeCoord,
    pub parity: CellParity,
    pub center: DVec3,
    pub vertices: [DVec3; 4],
}

impl CellSolid {
    pub fn new(coord: LatticeCoord) -> Self {
        let parity = coord.parity();
        let reach = parity.vertex_sign() as f64 * CELL_VERTEX_REACH;
        let base = coord.to_quadray().components();
        let vertices = std::array::from_fn(|i| {
            let mut c = base;
            c[i] += reach;
            Quadray::from_components(c).to_cartesian()
        });
        Self {
            coord,
            parity,
            center: coord.to_quadray().to_cartesian(),
            vertices,
        }
    }

    pub fn face_centroid(&self, face: usize) -> DVec3 {
        let [i, j, k] = FACE_VERTICES[face];
        (self.vertices[i] + self.vertices[j] + self.vertices[k]) / 3.0
    }

    /// Triangle for `face`, wound counter-clockwise seen from outside.
    pub fn face(&self, face: usize) -> FaceGeometry {
        let [i, j, k] = FACE_VERTICES[face];
        let (v0, mut v1, mut v2) = (self.vertices[i], self.vertices[j], self.vertices[k]);
        let mut normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        // Vertex `face` is the apex opposite this triangle.
        if normal.dot(self.vertices[face] - v0) > 0.0 {
            normal = -normal;
            std::mem::swap(&mut v1, &mut v2);
        }
        FaceGeometry {
            corners: [v0, v1, v2],
            normal,
        }
    }

    /// Lattice cell across `face`, found by reflecting the center through
    /// the face centroid. Falls back to the face-offset table if the
    /// reflection fails to snap onto it; this runs on mesh workers and
    /// must not panic.
    pub fn face_neighbor(&self, face: usize) -> LatticeCoord {
        let table = self.coord.offset(face_offsets(self.parity)[face]);
        let reflected = self.face_centroid(face) * 2.0 - self.center;
        match LatticeCoord::snap(&Quadray::from_cartesian(reflected)) {
            Ok(neighbor) if neighbor == table => neighbor,
            Ok(neighbor) => {
                log::warn!(
                    "face {face} of {} reflected to {neighbor}, using offset table {table}",
                    self.coord
                );
                table
            }
            Err(e) => {
                log::warn!("face {face} of {} did not snap ({e}), using offset table", self.coord);
                table
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadcraft_core::constants::MAX_LATTICE_COMPONENT;
    use quadcraft_core::lattice::{face_neighbors, grid};

    #[test]
    fn test_reflection_matches_offset_table() {
        for raw in grid(3) {
            let coord = LatticeCoord::from_array(raw);
            let solid = CellSolid::new(coord);
            let table = face_neighbors(&coord);
            for face in 0..FACES_PER_CELL {
                assert_eq!(solid.face_neighbor(face), table[face], "{coord} face {face}");
            }
        }
    }

    #[test]
    fn test_face_neighbor_at_lattice_bound() {
        let m = MAX_LATTICE_COMPONENT;
        for coord in [
            LatticeCoord::new(m, 0, 0, m),
            LatticeCoord::new(m, 0, 0, 0),
            LatticeCoord::new(m - 1, 3, 0, m),
        ] {
            let solid = CellSolid::new(coord);
            let table = face_neighbors(&coord);
            for face in 0..FACES_PER_CELL {
                assert_eq!(solid.face_neighbor(face), table[face], "{coord} face {face}");
            }
        }
    }

    #[test]
    fn test_normals_point_away_from_center() {
        let coords = [
            LatticeCoord::ORIGIN,
            LatticeCoord::new(1, 0, 0, 0),
            LatticeCoord::new(2, 1, 0, 4),
        ];
        for coord in coords {
            let solid = CellSolid::new(coord);
            for face in 0..FACES_PER_CELL {
                let geom = solid.face(face);
                assert!((geom.normal.length() - 1.0).abs() < 1e-9);
                assert!(geom.normal.dot(solid.face_centroid(face) - solid.center) > 0.0);
                let [v0, v1, v2] = geom.corners;
                let wound = (v1 - v0).cross(v2 - v0);
                assert!(wound.dot(geom.normal) > 0.0);
            }
        }
    }

    #[test]
    fn test_parities_invert_the_solid() {
        let tetra = CellSolid::new(LatticeCoord::ORIGIN);
        let octa = CellSolid::new(LatticeCoord::new(1, 0, 0, 0));
        assert_eq!(tetra.parity, CellParity::Tetra);
        assert_eq!(octa.parity, CellParity::Octa);
        let tetra_offset = tetra.vertices[0] - tetra.center;
        let octa_offset = octa.vertices[0] - octa.center;
        assert!((tetra_offset + octa_offset).length() < 1e-9);
    }
}
