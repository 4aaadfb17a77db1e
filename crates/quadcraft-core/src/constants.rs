//! Single source of truth for shared constants.
//! Geometry, meshing and the integrity harness all read from here.

/// √2.
pub const ROOT2: f64 = std::f64::consts::SQRT_2;

/// Uniform scale between quadray units and Cartesian units (k = 1/√2).
pub const QUADRAY_SCALE: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Volumetric conversion between IVM tetravolumes and XYZ cubic volumes: √(9/8).
pub const S3: f64 = 1.060_660_171_779_821_2;

/// Angle in degrees between any two quadray basis vectors.
pub const TETRAHEDRAL_ANGLE_DEG: f64 = 109.471_220_634_490_7;

/// Cartesian length of a quadray basis vector: k·√3 = √(3/2).
pub const BASIS_CARTESIAN_LENGTH: f64 = 1.224_744_871_391_589;

/// Maximum quadray → XYZ → quadray error accepted by the round-trip check.
pub const ROUND_TRIP_TOLERANCE: f64 = 1e-4;

/// Tolerance for float comparisons in the integrity harness.
pub const INTEGRITY_TOLERANCE: f64 = 1e-6;

/// Angular tolerance (degrees) for the tetrahedral symmetry check.
pub const ANGLE_TOLERANCE_DEG: f64 = 1e-3;

/// Distance (in quadray units) from a cell center to each vertex of its
/// tetrahedral solid. At 3/2 a face centroid sits halfway to the face
/// neighbor, so reflecting the center across it lands on the neighbor.
pub const CELL_VERTEX_REACH: f64 = 1.5;

/// Largest normalized lattice component accepted from outside input
/// (snapping, text keys, serde). Leaves enough headroom that neighbor
/// offsets and scaled lattice points stay inside `i32`.
pub const MAX_LATTICE_COMPONENT: i32 = 1 << 28;

/// Default chunk side length, measured in integer lattice-point units
/// (√2 · Cartesian).
pub const DEFAULT_CHUNK_EXTENT: i32 = 16;

/// Default per-chunk vertex cap for mesh generation.
pub const MAX_MESH_VERTICES: usize = 65_536;

/// Default per-chunk index cap for mesh generation.
pub const MAX_MESH_INDICES: usize = 98_304;

/// Faces per occupied cell. Every cell renders as a 4-faced solid.
pub const FACES_PER_CELL: usize = 4;

/// Number of close-packed (twelve-around-one) neighbors.
pub const CLOSE_PACKED_NEIGHBORS: usize = 12;

/// Number of axial (±basis) neighbors.
pub const AXIAL_NEIGHBORS: usize = 8;
