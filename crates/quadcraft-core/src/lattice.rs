use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_LATTICE_COMPONENT;
use crate::error::CoordError;
use crate::quadray::Quadray;
use crate::types::LatticePoint;

/// Per-component ceiling for any stored coordinate. Keeps
/// `a - b - c + d` and small offsets inside `i32`.
const ARITHMETIC_LIMIT: i32 = i32::MAX / 4;

/// An integer quadray, always stored in zero-minimum form.
///
/// Two coordinates naming the same lattice position compare equal and hash
/// identically, which makes this the cell-store key.
///
/// Components never exceed `i32::MAX / 4`. Input from outside the crate
/// ([`LatticeCoord::try_new`], [`LatticeCoord::snap`], text keys, serde)
/// is held to [`MAX_LATTICE_COMPONENT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "[i32; 4]", into = "[i32; 4]")]
pub struct LatticeCoord([i32; 4]);

impl LatticeCoord {
    pub const ORIGIN: LatticeCoord = LatticeCoord([0, 0, 0, 0]);

    /// Normalize an integer quadray.
    ///
    /// # Panics
    ///
    /// If a normalized component exceeds `i32::MAX / 4`. Untrusted input
    /// goes through [`LatticeCoord::try_new`].
    pub fn new(a: i32, b: i32, c: i32, d: i32) -> Self {
        Self::from_wide([a as i64, b as i64, c as i64, d as i64])
    }

    /// Normalize, rejecting coordinates outside [`MAX_LATTICE_COMPONENT`].
    pub fn try_new(a: i32, b: i32, c: i32, d: i32) -> Result<Self, CoordError> {
        Self::checked_wide([a as i64, b as i64, c as i64, d as i64], MAX_LATTICE_COMPONENT)
    }

    fn from_wide(v: [i64; 4]) -> Self {
        match Self::checked_wide(v, ARITHMETIC_LIMIT) {
            Ok(coord) => coord,
            Err(e) => panic!("{e}"),
        }
    }

    fn checked_wide(v: [i64; 4], limit: i32) -> Result<Self, CoordError> {
        let m = v[0].min(v[1]).min(v[2]).min(v[3]);
        let mut out = [0i32; 4];
        for (slot, x) in out.iter_mut().zip(v) {
            let n = x - m;
            if n > limit as i64 {
                return Err(CoordError::OutOfRange {
                    value: n as f64,
                    limit,
                });
            }
            *slot = n as i32;
        }
        Ok(Self(out))
    }

    pub fn from_array(v: [i32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }

    /// Snap a real quadray to the nearest integer lattice position.
    pub fn snap(q: &Quadray) -> Result<Self, CoordError> {
        if !q.is_finite() {
            return Err(CoordError::NonFinite(q.a, q.b, q.c, q.d));
        }
        let n = q.normalized().components().map(f64::round);
        if let Some(&value) = n.iter().find(|&&x| x > MAX_LATTICE_COMPONENT as f64) {
            return Err(CoordError::OutOfRange {
                value,
                limit: MAX_LATTICE_COMPONENT,
            });
        }
        Self::try_new(n[0] as i32, n[1] as i32, n[2] as i32, n[3] as i32)
    }

    pub fn components(&self) -> [i32; 4] {
        self.0
    }

    pub fn a(&self) -> i32 {
        self.0[0]
    }

    pub fn b(&self) -> i32 {
        self.0[1]
    }

    pub fn c(&self) -> i32 {
        self.0[2]
    }

    pub fn d(&self) -> i32 {
        self.0[3]
    }

    pub fn to_quadray(&self) -> Quadray {
        let [a, b, c, d] = self.0;
        Quadray::new(a as f64, b as f64, c as f64, d as f64)
    }

    /// Exact integer Cartesian position scaled by √2.
    ///
    /// Integer quadrays land on integer points of this scaled grid, so chunk
    /// partitioning never goes through floating point. The component
    /// ceiling keeps every sum in range.
    pub fn lattice_point(&self) -> LatticePoint {
        let [a, b, c, d] = self.0;
        LatticePoint::new(a - b - c + d, a - b + c - d, a + b - c - d)
    }

    /// Apply a raw (possibly negative) offset and renormalize.
    ///
    /// # Panics
    ///
    /// If the result leaves the `i32::MAX / 4` ceiling. Table offsets
    /// applied to coordinates within [`MAX_LATTICE_COMPONENT`] never do.
    pub fn offset(&self, delta: [i32; 4]) -> Self {
        Self::from_wide(std::array::from_fn(|i| self.0[i] as i64 + delta[i] as i64))
    }

    pub fn parity(&self) -> CellParity {
        let [a, b, c, d] = self.0;
        CellParity::from_sum(a as i64 + b as i64 + c as i64 + d as i64)
    }

    /// Canonical text key "a,b,c,d". Parses back via [`FromStr`].
    pub fn to_key(&self) -> String {
        let [a, b, c, d] = self.0;
        format!("{a},{b},{c},{d}")
    }
}

impl TryFrom<[i32; 4]> for LatticeCoord {
    type Error = CoordError;

    fn try_from(v: [i32; 4]) -> Result<Self, Self::Error> {
        Self::try_new(v[0], v[1], v[2], v[3])
    }
}

impl From<LatticeCoord> for [i32; 4] {
    fn from(c: LatticeCoord) -> Self {
        c.0
    }
}

impl fmt::Display for LatticeCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "({a}, {b}, {c}, {d})")
    }
}

impl FromStr for LatticeCoord {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<i32> = s
            .split(',')
            .map(|p| p.trim().parse::<i32>())
            .collect::<Result<_, _>>()
            .map_err(|_| CoordError::MalformedKey(s.to_string()))?;
        match parts.as_slice() {
            [a, b, c, d] => Self::try_new(*a, *b, *c, *d),
            _ => Err(CoordError::MalformedKey(s.to_string())),
        }
    }
}

/// The two cell shapes of the IVM, alternating with coordinate-sum parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellParity {
    /// Even coordinate sum.
    Tetra,
    /// Odd coordinate sum.
    Octa,
}

impl CellParity {
    pub fn from_sum(sum: i64) -> Self {
        if sum.rem_euclid(2) == 0 {
            CellParity::Tetra
        } else {
            CellParity::Octa
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            CellParity::Tetra => CellParity::Octa,
            CellParity::Octa => CellParity::Tetra,
        }
    }

    /// Sign applied to the basis vectors that point at this cell's vertices.
    pub fn vertex_sign(self) -> i32 {
        match self {
            CellParity::Tetra => 1,
            CellParity::Octa => -1,
        }
    }
}

impl fmt::Display for CellParity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellParity::Tetra => write!(f, "tetra"),
            CellParity::Octa => write!(f, "octa"),
        }
    }
}

/// Classify a (possibly real-valued) quadray by the parity of round(a+b+c+d).
///
/// Sums past 2⁵³ have no integer parity in `f64` and are rejected.
pub fn cell_parity(a: f64, b: f64, c: f64, d: f64) -> Result<CellParity, CoordError> {
    let sum = (a + b + c + d).round();
    if !sum.is_finite() {
        return Err(CoordError::NonFinite(a, b, c, d));
    }
    if sum.abs() > EXACT_F64_INTEGER {
        return Err(CoordError::OutOfRange {
            value: sum,
            limit: i32::MAX,
        });
    }
    Ok(CellParity::from_sum(sum as i64))
}

/// 2⁵³, the largest magnitude below which every integer is an `f64`.
const EXACT_F64_INTEGER: f64 = 9_007_199_254_740_992.0;

/// The twelve "twelve-around-one" offsets: all distinct permutations of
/// {0, 1, 1, 2}. Each is e_i − e_j up to the all-ones vector, so these
/// neighbors share the cell's parity.
pub const CLOSE_PACKED_OFFSETS: [[i32; 4]; 12] = [
    [0, 1, 1, 2],
    [0, 1, 2, 1],
    [0, 2, 1, 1],
    [1, 0, 1, 2],
    [1, 0, 2, 1],
    [1, 1, 0, 2],
    [1, 1, 2, 0],
    [1, 2, 0, 1],
    [1, 2, 1, 0],
    [2, 0, 1, 1],
    [2, 1, 0, 1],
    [2, 1, 1, 0],
];

/// Unit steps along ±basis. Every entry flips parity.
pub const AXIAL_OFFSETS: [[i32; 4]; 8] = [
    [1, 0, 0, 0],
    [0, 1, 0, 0],
    [0, 0, 1, 0],
    [0, 0, 0, 1],
    [-1, 0, 0, 0],
    [0, -1, 0, 0],
    [0, 0, -1, 0],
    [0, 0, 0, -1],
];

/// Face directions of a tetra-parity cell: face i lies opposite vertex i
/// and looks along −e_i.
pub const TETRA_FACE_OFFSETS: [[i32; 4]; 4] = [
    [-1, 0, 0, 0],
    [0, -1, 0, 0],
    [0, 0, -1, 0],
    [0, 0, 0, -1],
];

/// Face directions of an octa-parity cell (the inverted solid): +e_i.
pub const OCTA_FACE_OFFSETS: [[i32; 4]; 4] = [
    [1, 0, 0, 0],
    [0, 1, 0, 0],
    [0, 0, 1, 0],
    [0, 0, 0, 1],
];

/// Face-offset table for a cell shape. Tetra and octa sets together make
/// up [`AXIAL_OFFSETS`], and each face of one shape is answered by the
/// opposite face of the other, so face adjacency is symmetric.
pub fn face_offsets(parity: CellParity) -> &'static [[i32; 4]; 4] {
    match parity {
        CellParity::Tetra => &TETRA_FACE_OFFSETS,
        CellParity::Octa => &OCTA_FACE_OFFSETS,
    }
}

/// Which neighbor convention a consumer wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjacency {
    /// The 4 face-sharing neighbors used by meshing.
    Face,
    /// All 8 ±basis steps.
    Axial,
    /// The 12 closest-packing neighbors used for pathfinding-style queries.
    ClosePacked,
}

impl Adjacency {
    pub fn count(self) -> usize {
        match self {
            Adjacency::Face => 4,
            Adjacency::Axial => 8,
            Adjacency::ClosePacked => 12,
        }
    }
}

/// The 4 face neighbors of a cell, in face order.
pub fn face_neighbors(coord: &LatticeCoord) -> [LatticeCoord; 4] {
    let offsets = *face_offsets(coord.parity());
    offsets.map(|delta| coord.offset(delta))
}

/// Neighbors of `coord` under the given convention.
pub fn neighbors(coord: &LatticeCoord, adjacency: Adjacency) -> Vec<LatticeCoord> {
    match adjacency {
        Adjacency::Face => face_neighbors(coord).to_vec(),
        Adjacency::Axial => AXIAL_OFFSETS.iter().map(|d| coord.offset(*d)).collect(),
        Adjacency::ClosePacked => CLOSE_PACKED_OFFSETS
            .iter()
            .map(|d| coord.offset(*d))
            .collect(),
    }
}

/// Whether every raw component lies in `[0, size)`.
pub fn in_bounds(v: [i32; 4], size: i32) -> bool {
    v.iter().all(|&x| (0..size).contains(&x))
}

/// Close-packed neighbors whose raw (un-renormalized) components stay
/// inside a size⁴ grid.
pub fn bounded_neighbors(coord: &LatticeCoord, size: i32) -> Vec<LatticeCoord> {
    let base = coord.components();
    CLOSE_PACKED_OFFSETS
        .iter()
        .map(|d| [base[0] + d[0], base[1] + d[1], base[2] + d[2], base[3] + d[3]])
        .filter(|v| in_bounds(*v, size))
        .map(LatticeCoord::from_array)
        .collect()
}

/// Every raw integer tuple of a size⁴ grid, in lexicographic order.
/// Tuples that differ by the all-ones vector collapse to one coordinate.
pub fn grid(size: i32) -> Vec<[i32; 4]> {
    let n = size.max(0);
    let mut cells = Vec::with_capacity((n as usize).pow(4));
    for a in 0..n {
        for b in 0..n {
            for c in 0..n {
                for d in 0..n {
                    cells.push([a, b, c, d]);
                }
            }
        }
    }
    cells
}
