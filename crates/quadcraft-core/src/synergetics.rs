//! Synergetics volume bookkeeping for the IVM.
//!
//! Volumes are measured in tetravolumes: the unit-edge regular
//! tetrahedron has volume 1.

use serde::{Deserialize, Serialize};

use crate::constants::{CLOSE_PACKED_NEIGHBORS, S3};

/// Icosahedron volume in tetravolumes, as Fuller tabulates it.
pub const ICOSAHEDRON_TETRAVOLUME: f64 = 18.512_296;

/// Spheres touching one sphere in closest packing.
pub const KISSING_NUMBER: usize = CLOSE_PACKED_NEIGHBORS;

/// Fraction of space filled by face-centred cubic packing: π / (3√2).
pub const FCC_PACKING_DENSITY: f64 = 0.740_480_489_693_061;

/// Golden ratio, which governs the icosahedral phase of the jitterbug.
pub const PHI: f64 = 1.618_033_988_749_895;

/// Sphere diameter over radius in IVM units.
pub const D_OVER_R: f64 = 2.0;

/// Reference polyhedra of the isotropic vector matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polyhedron {
    Tetrahedron,
    Cube,
    Octahedron,
    RhombicDodecahedron,
    Cuboctahedron,
}

impl Polyhedron {
    pub const ALL: [Polyhedron; 5] = [
        Polyhedron::Tetrahedron,
        Polyhedron::Cube,
        Polyhedron::Octahedron,
        Polyhedron::RhombicDodecahedron,
        Polyhedron::Cuboctahedron,
    ];

    /// Whole-number volume in tetravolumes.
    pub fn tetravolume(self) -> u32 {
        match self {
            Polyhedron::Tetrahedron => 1,
            Polyhedron::Cube => 3,
            Polyhedron::Octahedron => 4,
            Polyhedron::RhombicDodecahedron => 6,
            Polyhedron::Cuboctahedron => 20,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Polyhedron::Tetrahedron => "tetrahedron",
            Polyhedron::Cube => "cube",
            Polyhedron::Octahedron => "octahedron",
            Polyhedron::RhombicDodecahedron => "rhombic dodecahedron",
            Polyhedron::Cuboctahedron => "cuboctahedron",
        }
    }
}

/// XYZ cubic volume → IVM tetravolume.
pub fn xyz_to_ivm_volume(xyz_volume: f64) -> f64 {
    xyz_volume * S3
}

/// IVM tetravolume → XYZ cubic volume.
pub fn ivm_to_xyz_volume(ivm_volume: f64) -> f64 {
    ivm_volume / S3
}

/// Counts for a frequency-`f` IVM tetrahedron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IvmGrid {
    pub frequency: u32,
}

impl IvmGrid {
    pub fn new(frequency: u32) -> Self {
        Self { frequency }
    }

    /// (f+1)(f+2)(f+3)/6
    pub fn vertex_count(&self) -> u64 {
        let f = self.frequency as u64;
        (f + 1) * (f + 2) * (f + 3) / 6
    }

    /// f³
    pub fn tetra_count(&self) -> u64 {
        (self.frequency as u64).pow(3)
    }

    /// f(f−1)(f−2)/6, zero below frequency 3.
    pub fn octa_count(&self) -> u64 {
        let f = self.frequency as u64;
        if f < 3 {
            return 0;
        }
        f * (f - 1) * (f - 2) / 6
    }

    /// Edge length in sphere diameters. None at frequency 0.
    pub fn edge_length(&self) -> Option<f64> {
        (self.frequency > 0).then(|| 1.0 / self.frequency as f64)
    }

    /// Volume of one small tetrahedron, in tetravolumes.
    pub fn volume_tetra(&self) -> Option<f64> {
        self.edge_length().map(|e| e.powi(3))
    }

    /// Volume of one small octahedron: four small tetrahedra.
    pub fn volume_octa(&self) -> Option<f64> {
        self.volume_tetra()
            .map(|v| v * Polyhedron::Octahedron.tetravolume() as f64)
    }
}

/// One named stop of the jitterbug transformation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JitterbugPhase {
    pub name: &'static str,
    pub angle_deg: f64,
    pub volume: f64,
}

/// Fuller's jitterbug: the vector equilibrium (cuboctahedron) folding
/// through the icosahedron down to the octahedron as its triangles twist.
///
/// Volume is interpolated piecewise-linearly between the three phases.
pub struct Jitterbug;

impl Jitterbug {
    pub const VE: JitterbugPhase = JitterbugPhase {
        name: "VE (cuboctahedron)",
        angle_deg: 0.0,
        volume: 20.0,
    };
    pub const ICOSAHEDRON: JitterbugPhase = JitterbugPhase {
        name: "icosahedron",
        angle_deg: 10.8123,
        volume: ICOSAHEDRON_TETRAVOLUME,
    };
    pub const OCTAHEDRON: JitterbugPhase = JitterbugPhase {
        name: "octahedron",
        angle_deg: 30.0,
        volume: 4.0,
    };

    pub fn phases() -> [JitterbugPhase; 3] {
        [Self::VE, Self::ICOSAHEDRON, Self::OCTAHEDRON]
    }

    /// Approximate tetravolume at a twist angle in degrees. Angles past
    /// either end clamp to that end's volume; NaN yields NaN.
    pub fn volume_at_angle(theta_deg: f64) -> f64 {
        let (ve, ico, oct) = (Self::VE, Self::ICOSAHEDRON, Self::OCTAHEDRON);
        if theta_deg.is_nan() {
            return f64::NAN;
        }
        if theta_deg <= ve.angle_deg {
            return ve.volume;
        }
        if theta_deg >= oct.angle_deg {
            return oct.volume;
        }
        let (from, to) = if theta_deg <= ico.angle_deg {
            (ve, ico)
        } else {
            (ico, oct)
        };
        let t = (theta_deg - from.angle_deg) / (to.angle_deg - from.angle_deg);
        from.volume + t * (to.volume - from.volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_ratios() {
        let vols: Vec<u32> = Polyhedron::ALL.iter().map(|p| p.tetravolume()).collect();
        assert_eq!(vols, vec![1, 3, 4, 6, 20]);
    }

    #[test]
    fn test_volume_conversion_inverts() {
        let v = 12.5;
        assert!((ivm_to_xyz_volume(xyz_to_ivm_volume(v)) - v).abs() < 1e-12);
        assert!((xyz_to_ivm_volume(1.0) - S3).abs() < 1e-15);
    }

    #[test]
    fn test_grid_counts() {
        let g = IvmGrid::new(1);
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.tetra_count(), 1);
        let g = IvmGrid::new(3);
        assert_eq!(g.vertex_count(), 20);
        assert_eq!(g.tetra_count(), 27);
        assert_eq!(g.octa_count(), 1);
        assert_eq!(IvmGrid::new(2).octa_count(), 0);
        assert_eq!(IvmGrid::new(5).octa_count(), 10);
    }

    #[test]
    fn test_grid_cell_volumes() {
        let g = IvmGrid::new(2);
        assert_eq!(g.edge_length(), Some(0.5));
        assert_eq!(g.volume_tetra(), Some(0.125));
        assert_eq!(g.volume_octa(), Some(0.5));
        assert_eq!(IvmGrid::new(0).edge_length(), None);
        assert_eq!(IvmGrid::new(0).volume_octa(), None);
    }

    #[test]
    fn test_jitterbug_phases() {
        let phases = Jitterbug::phases();
        assert_eq!(phases[0].volume, Polyhedron::Cuboctahedron.tetravolume() as f64);
        assert_eq!(phases[2].volume, Polyhedron::Octahedron.tetravolume() as f64);
        for p in phases {
            assert!((Jitterbug::volume_at_angle(p.angle_deg) - p.volume).abs() < 1e-12);
        }
        assert!(phases.windows(2).all(|w| w[0].volume > w[1].volume));
    }

    #[test]
    fn test_jitterbug_interpolates_and_clamps() {
        assert_eq!(Jitterbug::volume_at_angle(-5.0), 20.0);
        assert_eq!(Jitterbug::volume_at_angle(45.0), 4.0);
        let mid = Jitterbug::volume_at_angle(Jitterbug::ICOSAHEDRON.angle_deg / 2.0);
        assert!((mid - (20.0 + ICOSAHEDRON_TETRAVOLUME) / 2.0).abs() < 1e-9);
        let mut prev = f64::INFINITY;
        for step in 0..=30 {
            let v = Jitterbug::volume_at_angle(step as f64);
            assert!(v <= prev);
            prev = v;
        }
        assert!(Jitterbug::volume_at_angle(f64::NAN).is_nan());
    }

    #[test]
    fn test_packing_constants() {
        let density = std::f64::consts::PI / (3.0 * std::f64::consts::SQRT_2);
        assert!((FCC_PACKING_DENSITY - density).abs() < 1e-12);
        assert_eq!(KISSING_NUMBER, 12);
        assert!((PHI - (1.0 + 5f64.sqrt()) / 2.0).abs() < 1e-15);
    }
}
