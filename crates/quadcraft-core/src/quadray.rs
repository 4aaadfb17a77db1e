//! Four-component tetrahedral coordinates (quadrays).
//!
//! A quadray (a, b, c, d) is a weighted sum of four basis vectors pointing
//! from the center of a regular tetrahedron to its vertices. Adding the same
//! constant to all four components names the same point, so every
//! operation that produces a position returns the zero-minimum
//! representative unless noted otherwise.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::QUADRAY_SCALE;
use crate::error::CoordError;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quadray {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Quadray {
    pub const ORIGIN: Quadray = Quadray::new(0.0, 0.0, 0.0, 0.0);
    pub const A: Quadray = Quadray::new(1.0, 0.0, 0.0, 0.0);
    pub const B: Quadray = Quadray::new(0.0, 1.0, 0.0, 0.0);
    pub const C: Quadray = Quadray::new(0.0, 0.0, 1.0, 0.0);
    pub const D: Quadray = Quadray::new(0.0, 0.0, 0.0, 1.0);

    /// The four basis vectors in (a, b, c, d) order.
    pub const BASIS: [Quadray; 4] = [Self::A, Self::B, Self::C, Self::D];

    pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    /// Checked constructor: NaN and infinite components are rejected, never clamped.
    pub fn try_new(a: f64, b: f64, c: f64, d: f64) -> Result<Self, CoordError> {
        let q = Self::new(a, b, c, d);
        if q.is_finite() {
            Ok(q)
        } else {
            Err(CoordError::NonFinite(a, b, c, d))
        }
    }

    pub fn components(&self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }

    pub fn from_components(c: [f64; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }

    pub fn is_finite(&self) -> bool {
        self.components().iter().all(|v| v.is_finite())
    }

    pub fn min_component(&self) -> f64 {
        self.a.min(self.b).min(self.c).min(self.d)
    }

    /// Zero-minimum normalization. Idempotent.
    pub fn normalized(&self) -> Self {
        let m = self.min_component();
        Self::new(self.a - m, self.b - m, self.c - m, self.d - m)
    }

    /// Convert to Cartesian (x, y, z) with k = 1/√2.
    pub fn to_cartesian(&self) -> DVec3 {
        let k = QUADRAY_SCALE;
        DVec3::new(
            k * (self.a - self.b - self.c + self.d),
            k * (self.a - self.b + self.c - self.d),
            k * (self.a + self.b - self.c - self.d),
        )
    }

    /// Convert a Cartesian point to a normalized quadray.
    ///
    /// Each signed axis splits into the two basis vectors whose sum lies
    /// along it, so the result is exact up to float rounding.
    pub fn from_cartesian(v: DVec3) -> Self {
        let k = QUADRAY_SCALE;
        let pos = |t: f64| t.max(0.0);
        let neg = |t: f64| (-t).max(0.0);
        Self::new(
            k * (pos(v.x) + pos(v.y) + pos(v.z)),
            k * (neg(v.x) + neg(v.y) + pos(v.z)),
            k * (neg(v.x) + pos(v.y) + neg(v.z)),
            k * (pos(v.x) + neg(v.y) + neg(v.z)),
        )
        .normalized()
    }

    /// Checked variant of [`Quadray::from_cartesian`].
    pub fn try_from_cartesian(v: DVec3) -> Result<Self, CoordError> {
        if v.is_finite() {
            Ok(Self::from_cartesian(v))
        } else {
            Err(CoordError::NonFiniteCartesian(v.x, v.y, v.z))
        }
    }

    /// Quadray vector length: √((a² + b² + c² + d²) / 2).
    pub fn length(&self) -> f64 {
        let [a, b, c, d] = self.components();
        ((a * a + b * b + c * c + d * d) / 2.0).sqrt()
    }

    /// Distance as the length of the raw (unnormalized) difference.
    pub fn distance(&self, other: &Quadray) -> f64 {
        (*self - *other).length()
    }

    /// Equality after normalization, within `epsilon` per component.
    pub fn approx_eq(&self, other: &Quadray, epsilon: f64) -> bool {
        let n1 = self.normalized().components();
        let n2 = other.normalized().components();
        n1.iter().zip(n2.iter()).all(|(x, y)| (x - y).abs() < epsilon)
    }

    /// Manhattan distance over the four raw components.
    pub fn manhattan(&self, other: &Quadray) -> f64 {
        let d = *self - *other;
        d.a.abs() + d.b.abs() + d.c.abs() + d.d.abs()
    }

    /// Four-component Euclidean distance, not routed through Cartesian space.
    pub fn euclidean_4d(&self, other: &Quadray) -> f64 {
        let [a, b, c, d] = (*self - *other).components();
        (a * a + b * b + c * c + d * d).sqrt()
    }
}

/// Angle in degrees between two quadray vectors, measured in Cartesian space.
/// Zero-length inputs yield 0.
pub fn angle_between(q1: &Quadray, q2: &Quadray) -> f64 {
    let v1 = q1.to_cartesian();
    let v2 = q2.to_cartesian();
    let mags = v1.length() * v2.length();
    if mags == 0.0 {
        return 0.0;
    }
    (v1.dot(v2) / mags).clamp(-1.0, 1.0).acos().to_degrees()
}

impl Add for Quadray {
    type Output = Quadray;

    /// Normalized sum.
    fn add(self, rhs: Quadray) -> Quadray {
        Quadray::new(
            self.a + rhs.a,
            self.b + rhs.b,
            self.c + rhs.c,
            self.d + rhs.d,
        )
        .normalized()
    }
}

impl Sub for Quadray {
    type Output = Quadray;

    /// Raw difference. Not normalized, so distances keep their sign structure.
    fn sub(self, rhs: Quadray) -> Quadray {
        Quadray::new(
            self.a - rhs.a,
            self.b - rhs.b,
            self.c - rhs.c,
            self.d - rhs.d,
        )
    }
}

impl Mul<f64> for Quadray {
    type Output = Quadray;

    fn mul(self, s: f64) -> Quadray {
        Quadray::new(self.a * s, self.b * s, self.c * s, self.d * s)
    }
}

impl Neg for Quadray {
    type Output = Quadray;

    fn neg(self) -> Quadray {
        Quadray::new(-self.a, -self.b, -self.c, -self.d)
    }
}

impl fmt::Display for Quadray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.2}, {:.2}, {:.2}, {:.2})",
            self.a, self.b, self.c, self.d
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    fn samples() -> Vec<Quadray> {
        vec![
            Quadray::ORIGIN,
            Quadray::A,
            Quadray::new(2.0, 1.0, 0.0, 1.0),
            Quadray::new(3.0, 2.0, 1.0, 0.0),
            Quadray::new(-1.5, 0.25, 7.0, 3.0),
            Quadray::new(0.1, 0.2, 0.3, 0.4),
            Quadray::new(-4.0, -4.0, -2.0, 5.5),
            Quadray::new(10.0, 10.0, 10.0, 10.0),
        ]
    }

    #[test]
    fn test_normalized_has_zero_minimum() {
        for q in samples() {
            let n = q.normalized();
            assert_eq!(n.min_component(), 0.0, "{q}");
            assert_eq!(n.normalized(), n, "normalize not idempotent for {q}");
        }
    }

    #[test]
    fn test_round_trip_fidelity() {
        for q in samples() {
            let back = Quadray::from_cartesian(q.to_cartesian());
            let err = q.normalized().distance(&back);
            assert!(err < ROUND_TRIP_TOLERANCE, "{q} -> {back}: err {err}");
        }
    }

    #[test]
    fn test_basis_cartesian_length() {
        for q in Quadray::BASIS {
            let len = q.to_cartesian().length();
            assert!((len - BASIS_CARTESIAN_LENGTH).abs() < 1e-12, "got {len}");
        }
    }

    #[test]
    fn test_tetrahedral_angle() {
        let angle = angle_between(&Quadray::A, &Quadray::B);
        assert!((angle - TETRAHEDRAL_ANGLE_DEG).abs() < 1e-9, "got {angle}");
    }

    #[test]
    fn test_basis_sums_to_origin() {
        let sum: DVec3 = Quadray::BASIS.iter().map(|q| q.to_cartesian()).sum();
        assert!(sum.length() < 1e-12);
    }

    #[test]
    fn test_distance_symmetry_and_triangle() {
        let pts = samples();
        for p in &pts {
            for q in &pts {
                assert!((p.distance(q) - q.distance(p)).abs() < 1e-12);
                for r in &pts {
                    assert!(p.distance(r) <= p.distance(q) + q.distance(r) + 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_add_is_normalized() {
        let s = Quadray::A + Quadray::B;
        assert_eq!(s, Quadray::new(1.0, 1.0, 0.0, 0.0));
        let all = Quadray::A + Quadray::B + Quadray::C + Quadray::D;
        assert_eq!(all, Quadray::ORIGIN);
    }

    #[test]
    fn test_sub_is_raw() {
        let d = Quadray::A - Quadray::B;
        assert_eq!(d, Quadray::new(1.0, -1.0, 0.0, 0.0));
    }

    #[test]
    fn test_try_new_rejects_nan() {
        assert!(Quadray::try_new(f64::NAN, 0.0, 0.0, 0.0).is_err());
        assert!(Quadray::try_new(0.0, f64::INFINITY, 0.0, 0.0).is_err());
        assert!(Quadray::try_new(1.0, 2.0, 3.0, 4.0).is_ok());
        assert!(Quadray::try_from_cartesian(DVec3::new(0.0, f64::NAN, 0.0)).is_err());
    }

    #[test]
    fn test_approx_eq_ignores_offset() {
        let q = Quadray::new(1.0, 2.0, 3.0, 4.0);
        let shifted = Quadray::new(11.0, 12.0, 13.0, 14.0);
        assert!(q.approx_eq(&shifted, 1e-9));
        assert!(!q.approx_eq(&Quadray::A, 1e-9));
    }

    #[test]
    fn test_metrics() {
        assert_eq!(Quadray::A.manhattan(&Quadray::B), 2.0);
        assert!((Quadray::A.euclidean_4d(&Quadray::B) - ROOT2).abs() < 1e-12);
        assert!((Quadray::A.length() - QUADRAY_SCALE).abs() < 1e-12);
    }
}
