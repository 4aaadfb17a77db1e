use std::sync::Arc;

use quadcraft_core::config::{CoreConfig, MeshLimits};
use quadcraft_core::constants::FACES_PER_CELL;
use quadcraft_core::lattice::LatticeCoord;
use quadcraft_core::material::{MaterialRegistry, MaterialTable};
use quadcraft_core::types::{Cell, ChunkCoord};
use quadcraft_world::{CellStore, NeighborSnapshot, NeighborState, OccupancySource};

use crate::mesh::{Mesh, MeshOutcome, Vertex};
use crate::shading::{face_shade, shade_color};
use crate::tetra::CellSolid;

/// Everything the mesher needs besides occupancy. Passed explicitly into
/// every call; cloning shares the registry.
#[derive(Clone)]
pub struct MeshContext {
    pub registry: Arc<dyn MaterialRegistry>,
    pub limits: MeshLimits,
}

impl MeshContext {
    pub fn new(registry: Arc<dyn MaterialRegistry>, limits: MeshLimits) -> Self {
        Self { registry, limits }
    }

    /// Built-in materials with limits from `config`.
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(Arc::new(MaterialTable::builtin()), config.mesh_limits)
    }
}

impl Default for MeshContext {
    fn default() -> Self {
        Self::from_config(&CoreConfig::default())
    }
}

impl std::fmt::Debug for MeshContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshContext")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

/// Whether a face bordering `neighbor` must be drawn.
fn face_visible(neighbor: &NeighborState, registry: &dyn MaterialRegistry) -> bool {
    match neighbor {
        NeighborState::Empty | NeighborState::Unavailable => true,
        NeighborState::Occupied(cell) => registry.is_transparent(cell.material),
    }
}

/// Mesh `cells` against `source`. `cells` must be sorted for the output to
/// be deterministic; every caller in this crate passes key-sorted cells.
pub fn mesh_cells<S>(cells: &[(LatticeCoord, Cell)], source: &S, ctx: &MeshContext) -> MeshOutcome
where
    S: OccupancySource + ?Sized,
{
    let limits = ctx.limits;
    let registry = ctx.registry.as_ref();
    let mut mesh = Mesh::new();
    let mut faces_culled = 0;
    let mut truncated = false;

    'cells: for (coord, cell) in cells {
        let solid = CellSolid::new(*coord);
        let neighbors: [NeighborState; FACES_PER_CELL] =
            std::array::from_fn(|face| source.query(&solid.face_neighbor(face)));
        let occupied = neighbors
            .iter()
            .filter(|state| matches!(state, NeighborState::Occupied(_)))
            .count() as u32;
        let base = registry.color(cell.material);

        for (face, state) in neighbors.iter().enumerate() {
            if !face_visible(state, registry) {
                faces_culled += 1;
                continue;
            }
            if mesh.vertices.len() + 3 > limits.max_vertices
                || mesh.indices.len() + 3 > limits.max_indices
            {
                truncated = true;
                break 'cells;
            }
            let geom = solid.face(face);
            let normal = geom.normal.as_vec3().to_array();
            let color = shade_color(base, face_shade(coord, face, occupied));
            mesh.push_triangle(
                geom.corners
                    .map(|p| Vertex::new(p.as_vec3().to_array(), normal, color)),
            );
        }
    }

    let faces_emitted = mesh.face_count();
    if truncated {
        log::warn!(
            "mesh truncated at {} vertices / {} indices ({} faces kept)",
            mesh.vertices.len(),
            mesh.indices.len(),
            faces_emitted
        );
    }
    MeshOutcome {
        mesh,
        truncated,
        faces_emitted,
        faces_culled,
    }
}

/// Mesh one chunk straight from the live store. An unloaded chunk yields
/// an empty mesh.
pub fn mesh_chunk(store: &CellStore, coord: ChunkCoord, ctx: &MeshContext) -> MeshOutcome {
    let Some(chunk) = store.chunk(&coord) else {
        return MeshOutcome::default();
    };
    let outcome = mesh_cells(&chunk.sorted_cells(), store, ctx);
    log::debug!(
        "chunk {coord}: {} cells, {} faces, {} culled",
        chunk.len(),
        outcome.faces_emitted,
        outcome.faces_culled
    );
    outcome
}

/// Mesh a detached snapshot. Safe to run off the thread that owns the store.
pub fn mesh_snapshot(snapshot: &NeighborSnapshot, ctx: &MeshContext) -> MeshOutcome {
    mesh_cells(&snapshot.sorted_cells(), snapshot, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;
    use quadcraft_core::lattice::face_neighbors;
    use quadcraft_core::types::MaterialId;

    const STONE: MaterialId = MaterialId(1);
    const WATER: MaterialId = MaterialId(4);

    fn store(extent: i32) -> CellStore {
        CellStore::with_extent(extent).expect("valid extent")
    }

    fn mesh_origin(store: &CellStore, ctx: &MeshContext) -> MeshOutcome {
        mesh_chunk(store, store.chunk_of(&LatticeCoord::ORIGIN), ctx)
    }

    #[test]
    fn test_isolated_cell_emits_four_faces() {
        let mut s = store(16);
        s.set_cell(LatticeCoord::ORIGIN, Cell::new(STONE));
        let out = mesh_origin(&s, &MeshContext::default());
        assert_eq!(out.faces_emitted, 4);
        assert_eq!(out.mesh.vertices.len(), 12);
        assert_eq!(out.mesh.triangle_count(), 4);
        assert_eq!(out.faces_culled, 0);
        assert!(!out.truncated);
    }

    #[test]
    fn test_adjacent_opaque_cells_share_a_hidden_face() {
        let mut s = store(16);
        let a = LatticeCoord::ORIGIN;
        let b = face_neighbors(&a)[0];
        s.set_cell(a, Cell::new(STONE));
        s.set_cell(b, Cell::new(STONE));
        let ctx = MeshContext::default();
        let total: usize = s
            .dirty_chunks()
            .into_iter()
            .map(|c| mesh_chunk(&s, c, &ctx).faces_emitted)
            .sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn test_clearing_neighbor_restores_face() {
        let mut s = store(16);
        let a = LatticeCoord::ORIGIN;
        let b = face_neighbors(&a)[2];
        s.set_cell(a, Cell::new(STONE));
        s.set_cell(b, Cell::new(STONE));
        let ctx = MeshContext::default();
        let cells = vec![(a, Cell::new(STONE))];
        assert_eq!(mesh_cells(&cells, &s, &ctx).faces_emitted, 3);
        s.clear_cell(&b);
        assert_eq!(mesh_cells(&cells, &s, &ctx).faces_emitted, 4);
    }

    #[test]
    fn test_transparent_neighbor_does_not_cull() {
        let mut s = store(16);
        let a = LatticeCoord::ORIGIN;
        s.set_cell(a, Cell::new(STONE));
        s.set_cell(face_neighbors(&a)[1], Cell::new(WATER));
        let cells = vec![(a, Cell::new(STONE))];
        let out = mesh_cells(&cells, &s, &MeshContext::default());
        assert_eq!(out.faces_emitted, 4);
    }

    #[test]
    fn test_unknown_material_neighbor_is_opaque() {
        let mut s = store(16);
        let a = LatticeCoord::ORIGIN;
        s.set_cell(a, Cell::new(STONE));
        s.set_cell(face_neighbors(&a)[3], Cell::new(MaterialId(4242)));
        let cells = vec![(a, Cell::new(STONE))];
        assert_eq!(mesh_cells(&cells, &s, &MeshContext::default()).faces_emitted, 3);
    }

    #[test]
    fn test_unloaded_neighbor_chunk_does_not_cull() {
        // Extent 1 puts every lattice point in its own chunk.
        let mut s = store(1);
        let a = LatticeCoord::ORIGIN;
        let b = face_neighbors(&a)[0];
        s.set_cell(a, Cell::new(STONE));
        assert_ne!(s.chunk_of(&a), s.chunk_of(&b));
        assert_eq!(s.query(&b), NeighborState::Unavailable);
        let ctx = MeshContext::default();
        assert_eq!(mesh_origin(&s, &ctx).faces_emitted, 4);

        s.set_cell(b, Cell::new(STONE));
        assert_eq!(mesh_origin(&s, &ctx).faces_emitted, 3);
    }

    #[test]
    fn test_truncates_at_whole_face() {
        let mut s = store(16);
        s.set_cell(LatticeCoord::ORIGIN, Cell::new(STONE));
        s.set_cell(LatticeCoord::new(4, 0, 0, 0), Cell::new(STONE));
        let ctx = MeshContext::new(
            Arc::new(MaterialTable::builtin()),
            MeshLimits {
                max_vertices: 7,
                max_indices: 1000,
            },
        );
        let out = mesh_cells(
            &s.chunk(&IVec3::ZERO).expect("loaded").sorted_cells(),
            &s,
            &ctx,
        );
        assert!(out.truncated);
        assert_eq!(out.faces_emitted, 2);
        assert_eq!(out.mesh.vertices.len(), 6);
        assert_eq!(out.mesh.indices.len(), 6);
    }

    #[test]
    fn test_output_is_deterministic() {
        let mut s = store(4);
        for raw in quadcraft_core::lattice::grid(3) {
            let coord = LatticeCoord::from_array(raw);
            let material = if coord.a() % 2 == 0 { STONE } else { WATER };
            s.set_cell(coord, Cell::new(material));
        }
        let ctx = MeshContext::default();
        for chunk in s.dirty_chunks() {
            assert_eq!(mesh_chunk(&s, chunk, &ctx), mesh_chunk(&s, chunk, &ctx));
        }
    }

    #[test]
    fn test_snapshot_mesh_matches_store_mesh() {
        let mut s = store(2);
        for raw in quadcraft_core::lattice::grid(3) {
            s.set_cell(LatticeCoord::from_array(raw), Cell::new(STONE));
        }
        let ctx = MeshContext::default();
        for chunk in s.dirty_chunks() {
            let snap = NeighborSnapshot::capture(&s, chunk).expect("loaded");
            assert_eq!(mesh_snapshot(&snap, &ctx), mesh_chunk(&s, chunk, &ctx));
        }
    }

    #[test]
    fn test_unloaded_chunk_meshes_empty() {
        let s = store(16);
        let out = mesh_chunk(&s, IVec3::new(9, 9, 9), &MeshContext::default());
        assert!(out.mesh.is_empty());
        assert!(!out.truncated);
    }
}
