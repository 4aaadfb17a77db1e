//! Standing integrity checks for the coordinate engine and lattice tables.
//!
//! Consumers run [`verify_integrity`] at startup. A failed check is
//! reported and logged, never raised: callers choose whether to continue
//! with degraded confidence or stop via [`require_integrity`].

use std::fmt::Write as _;

use serde::Serialize;

use crate::constants::*;
use crate::error::CoreError;
use crate::lattice::{
    face_neighbors, neighbors, Adjacency, LatticeCoord, AXIAL_OFFSETS, CLOSE_PACKED_OFFSETS,
};
use crate::quadray::{angle_between, Quadray};
use crate::synergetics::Polyhedron;

/// Result of one verification check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub description: String,
    pub expected: String,
    pub actual: String,
    pub passed: bool,
}

/// Full verification report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntegrityReport {
    pub checks: Vec<CheckResult>,
}

impl IntegrityReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn pass_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }

    pub fn summary(&self) -> String {
        let mut out = String::from("Lattice integrity report\n");
        for c in &self.checks {
            let mark = if c.passed { "ok  " } else { "FAIL" };
            let _ = writeln!(
                out,
                "  [{mark}] {} (expected {}, got {})",
                c.name, c.expected, c.actual
            );
        }
        if self.all_passed() {
            out.push_str("Result: ALL PASSED");
        } else {
            let _ = write!(out, "Result: {}/{} passed", self.pass_count(), self.checks.len());
        }
        out
    }
}

/// Fixed sample set: the basis, a few mixed points, and unnormalized or
/// negative representatives.
fn sample_points() -> Vec<Quadray> {
    vec![
        Quadray::A,
        Quadray::B,
        Quadray::C,
        Quadray::D,
        Quadray::new(2.0, 1.0, 0.0, 1.0),
        Quadray::new(3.0, 2.0, 1.0, 0.0),
        Quadray::new(-2.0, 0.5, 1.25, 4.0),
        Quadray::new(7.0, 7.0, 7.5, 9.0),
    ]
}

/// Verify quadray → XYZ → quadray fidelity for one point.
pub fn verify_round_trip(q: &Quadray, tolerance: f64) -> CheckResult {
    let recovered = Quadray::from_cartesian(q.to_cartesian());
    let error = q.normalized().distance(&recovered);
    CheckResult {
        name: "Round-Trip".into(),
        description: format!("quadray -> XYZ -> quadray for {q}"),
        expected: format!("error < {tolerance}"),
        actual: format!("error={error:.3e}"),
        passed: error < tolerance,
    }
}

fn check_basis_lengths() -> CheckResult {
    let lengths: Vec<f64> = Quadray::BASIS
        .iter()
        .map(|b| b.to_cartesian().length())
        .collect();
    let passed = lengths
        .iter()
        .all(|l| (l - BASIS_CARTESIAN_LENGTH).abs() < INTEGRITY_TOLERANCE);
    CheckResult {
        name: "Basis Vector Lengths".into(),
        description: "all 4 basis vectors share one Cartesian length".into(),
        expected: format!("{BASIS_CARTESIAN_LENGTH:.6}"),
        actual: format!("{lengths:.6?}"),
        passed,
    }
}

fn check_tetrahedral_angles() -> CheckResult {
    let mut angles = Vec::with_capacity(6);
    for i in 0..4 {
        for j in (i + 1)..4 {
            angles.push(angle_between(&Quadray::BASIS[i], &Quadray::BASIS[j]));
        }
    }
    let passed = angles
        .iter()
        .all(|a| (a - TETRAHEDRAL_ANGLE_DEG).abs() < ANGLE_TOLERANCE_DEG);
    CheckResult {
        name: "Tetrahedral Symmetry".into(),
        description: "every pair of basis vectors meets at the tetrahedral angle".into(),
        expected: format!("{TETRAHEDRAL_ANGLE_DEG:.4}"),
        actual: format!("{angles:.4?}"),
        passed,
    }
}

fn check_origin_identity() -> CheckResult {
    let o = Quadray::ORIGIN.to_cartesian();
    let back = Quadray::from_cartesian(o);
    CheckResult {
        name: "Origin Identity".into(),
        description: "(0,0,0,0) maps to Cartesian (0,0,0) and back".into(),
        expected: "(0, 0, 0)".into(),
        actual: format!("({:.4}, {:.4}, {:.4})", o.x, o.y, o.z),
        passed: o.length() < INTEGRITY_TOLERANCE && back == Quadray::ORIGIN,
    }
}

fn check_round_trips() -> CheckResult {
    let results: Vec<CheckResult> = sample_points()
        .iter()
        .map(|q| verify_round_trip(q, ROUND_TRIP_TOLERANCE))
        .collect();
    CheckResult {
        name: "Round-Trip Conversion".into(),
        description: "quadray -> XYZ -> quadray recovers the normalized position".into(),
        expected: format!("all errors < {ROUND_TRIP_TOLERANCE}"),
        actual: results
            .iter()
            .map(|r| r.actual.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        passed: results.iter().all(|r| r.passed),
    }
}

fn check_distance_symmetry() -> CheckResult {
    let pts = sample_points();
    let mut worst = 0.0f64;
    for p in &pts {
        for q in &pts {
            worst = worst.max((p.distance(q) - q.distance(p)).abs());
        }
    }
    CheckResult {
        name: "Distance Symmetry".into(),
        description: "distance(p, q) == distance(q, p)".into(),
        expected: "max asymmetry 0".into(),
        actual: format!("max asymmetry {worst:.3e}"),
        passed: worst < INTEGRITY_TOLERANCE,
    }
}

fn check_triangle_inequality() -> CheckResult {
    let pts = sample_points();
    let mut violations = 0usize;
    for p in &pts {
        for q in &pts {
            for r in &pts {
                if p.distance(r) > p.distance(q) + q.distance(r) + INTEGRITY_TOLERANCE {
                    violations += 1;
                }
            }
        }
    }
    CheckResult {
        name: "Triangle Inequality".into(),
        description: "d(p, r) <= d(p, q) + d(q, r) for all sample triples".into(),
        expected: "0 violations".into(),
        actual: format!("{violations} violations"),
        passed: violations == 0,
    }
}

fn check_s3_constant() -> CheckResult {
    let expected = (9.0f64 / 8.0).sqrt();
    CheckResult {
        name: "S3 Constant Validation".into(),
        description: "S3 = sqrt(9/8)".into(),
        expected: format!("{expected:.10}"),
        actual: format!("{S3:.10}"),
        passed: (S3 - expected).abs() < INTEGRITY_TOLERANCE,
    }
}

/// Cartesian volume of each reference polyhedron sized to the lattice's
/// close-packing edge, divided by the tetrahedron's.
fn measured_tetravolume(p: Polyhedron, edge: f64) -> f64 {
    let e3 = edge.powi(3);
    let tetra = e3 / (6.0 * ROOT2);
    let volume = match p {
        Polyhedron::Tetrahedron => tetra,
        // Cube whose face diagonals are tetrahedron edges.
        Polyhedron::Cube => (edge / ROOT2).powi(3),
        Polyhedron::Octahedron => ROOT2 / 3.0 * e3,
        // Twice its inscribed cube.
        Polyhedron::RhombicDodecahedron => 2.0 * (edge / ROOT2).powi(3),
        Polyhedron::Cuboctahedron => 5.0 * ROOT2 / 3.0 * e3,
    };
    volume / tetra
}

fn check_volume_ratios() -> CheckResult {
    let edge = LatticeCoord::ORIGIN
        .to_quadray()
        .to_cartesian()
        .distance(LatticeCoord::from_array(CLOSE_PACKED_OFFSETS[0]).to_quadray().to_cartesian());
    let measured: Vec<f64> = Polyhedron::ALL
        .iter()
        .map(|p| measured_tetravolume(*p, edge))
        .collect();
    let table: Vec<u32> = Polyhedron::ALL.iter().map(|p| p.tetravolume()).collect();
    let passed = table == [1, 3, 4, 6, 20]
        && measured
            .iter()
            .zip(&table)
            .all(|(m, t)| (m - *t as f64).abs() < INTEGRITY_TOLERANCE);
    CheckResult {
        name: "Synergetics Volume Ratios".into(),
        description: "tetra:cube:octa:rhombic-dodeca:cubocta = 1:3:4:6:20".into(),
        expected: "[1, 3, 4, 6, 20]".into(),
        actual: format!("{measured:.4?}"),
        passed,
    }
}

fn check_parity_alternation() -> CheckResult {
    let mut violations = 0usize;
    for raw in crate::lattice::grid(3) {
        let c = LatticeCoord::from_array(raw);
        for off in AXIAL_OFFSETS {
            if c.offset(off).parity() == c.parity() {
                violations += 1;
            }
        }
        for n in face_neighbors(&c) {
            if !face_neighbors(&n).contains(&c) {
                violations += 1;
            }
        }
    }
    CheckResult {
        name: "Parity Alternation".into(),
        description: "unit steps flip cell parity and face adjacency is symmetric".into(),
        expected: "0 violations".into(),
        actual: format!("{violations} violations"),
        passed: violations == 0,
    }
}

fn check_close_packing() -> CheckResult {
    let origin = LatticeCoord::ORIGIN;
    let around = neighbors(&origin, Adjacency::ClosePacked);
    let mut unique = around.clone();
    unique.sort();
    unique.dedup();
    let same_parity = around.iter().all(|n| n.parity() == origin.parity());
    CheckResult {
        name: "Twelve Around One".into(),
        description: "close-packed offsets give 12 distinct same-shape neighbors".into(),
        expected: format!("{CLOSE_PACKED_NEIGHBORS} distinct"),
        actual: format!("{} distinct, same parity: {same_parity}", unique.len()),
        passed: unique.len() == CLOSE_PACKED_NEIGHBORS && same_parity,
    }
}

/// Run every check and log the outcome.
pub fn verify_integrity() -> IntegrityReport {
    let report = IntegrityReport {
        checks: vec![
            check_basis_lengths(),
            check_tetrahedral_angles(),
            check_origin_identity(),
            check_round_trips(),
            check_distance_symmetry(),
            check_triangle_inequality(),
            check_s3_constant(),
            check_volume_ratios(),
            check_parity_alternation(),
            check_close_packing(),
        ],
    };
    for failed in report.failures() {
        log::warn!(
            "integrity check '{}' failed: expected {}, got {}",
            failed.name,
            failed.expected,
            failed.actual
        );
    }
    log::info!(
        "Integrity: {}/{} checks passed",
        report.pass_count(),
        report.checks.len()
    );
    report
}

/// Run the harness and fail if any check did not pass.
pub fn require_integrity() -> Result<IntegrityReport, CoreError> {
    let report = verify_integrity();
    if report.all_passed() {
        Ok(report)
    } else {
        Err(CoreError::Integrity {
            failed: report.checks.len() - report.pass_count(),
            total: report.checks.len(),
        })
    }
}
