use crate::lattice::LatticeCoord;
use crate::types::{ChunkCoord, LatticePoint};
use glam::IVec3;

/// Convert a lattice point to its containing chunk coordinate.
pub fn point_to_chunk(point: LatticePoint, extent: i32) -> ChunkCoord {
    IVec3::new(
        point.x.div_euclid(extent),
        point.y.div_euclid(extent),
        point.z.div_euclid(extent),
    )
}

/// Convert a lattice point to its local offset within a chunk.
pub fn point_to_local(point: LatticePoint, extent: i32) -> IVec3 {
    IVec3::new(
        point.x.rem_euclid(extent),
        point.y.rem_euclid(extent),
        point.z.rem_euclid(extent),
    )
}

/// Convert a chunk coordinate and local offset back to a lattice point.
pub fn chunk_local_to_point(chunk: ChunkCoord, local: IVec3, extent: i32) -> LatticePoint {
    chunk * extent + local
}

/// Chunk owning a lattice coordinate.
pub fn coord_to_chunk(coord: &LatticeCoord, extent: i32) -> ChunkCoord {
    point_to_chunk(coord.lattice_point(), extent)
}

/// Hash a lattice position and a salt into a deterministic pseudo-random u32.
pub fn cell_hash(coord: &LatticeCoord, salt: u32) -> u32 {
    let [a, b, c, d] = coord.components();
    let mut state = (a as u32)
        .wrapping_mul(0x9E3779B9)
        .wrapping_add((b as u32).wrapping_mul(0x517CC1B7))
        .wrapping_add((c as u32).wrapping_mul(0x6C62272E))
        .wrapping_add((d as u32).wrapping_mul(0x2545F491))
        .wrapping_add(salt.wrapping_mul(0x27D4EB2F));

    // PCG-style mixing rounds
    state = state ^ (state >> 16);
    state = state.wrapping_mul(0x45D9F3B);
    state = state ^ (state >> 16);
    state = state.wrapping_mul(0x45D9F3B);
    state = state ^ (state >> 16);

    state
}

/// Convert a hash value to a float in [0, 1).
pub fn hash_to_unit(hash: u32) -> f32 {
    (hash >> 8) as f32 / 16_777_216.0 // 2^24
}
