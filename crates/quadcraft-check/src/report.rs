use quadcraft_core::IntegrityReport;

use crate::runner::SceneResult;

/// Everything a check run produced.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckReport {
    pub integrity: IntegrityReport,
    pub scenes: Vec<SceneResult>,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.integrity.all_passed() && self.scenes.iter().all(|s| s.scheduler_consistent)
    }
}

pub fn to_json(report: &CheckReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Format the integrity checks as a markdown table.
pub fn format_integrity(report: &IntegrityReport) -> String {
    let mut out = String::new();
    out.push_str("| Check | Expected | Actual | Result |\n");
    out.push_str("|-------|----------|--------|--------|\n");
    for check in &report.checks {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            check.name,
            check.expected,
            check.actual,
            if check.passed { "ok" } else { "FAIL" }
        ));
    }
    out.push_str(&format!(
        "\n{}/{} checks passed\n",
        report.pass_count(),
        report.checks.len()
    ));
    out
}

/// Format scene results as a markdown summary table.
pub fn format_markdown(results: &[SceneResult]) -> String {
    let mut out = String::new();
    out.push_str("| Scene | Cells | Chunks | Faces | Culled | Truncated | Mean (ms) | Median (ms) | P95 (ms) | Background |\n");
    out.push_str("|-------|-------|--------|-------|--------|-----------|-----------|-------------|----------|------------|\n");

    for r in results {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {:.2} | {:.2} | {:.2} | {} |\n",
            r.scene_name,
            r.cells,
            r.chunk_count,
            r.faces,
            r.culled,
            r.truncated_chunks,
            r.timings.mean_ms,
            r.timings.median_ms,
            r.timings.p95_ms,
            if r.scheduler_consistent { "match" } else { "MISMATCH" },
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadcraft_core::verify_integrity;

    #[test]
    fn test_integrity_table_lists_every_check() {
        let integrity = verify_integrity();
        let table = format_integrity(&integrity);
        for check in &integrity.checks {
            assert!(table.contains(&check.name));
        }
        assert!(!table.contains("FAIL"));
    }

    #[test]
    fn test_json_report_shape() {
        let report = CheckReport {
            integrity: verify_integrity(),
            scenes: Vec::new(),
        };
        assert!(report.passed());
        let json = to_json(&report).expect("serializable");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert!(value["integrity"]["checks"].is_array());
        assert_eq!(value["scenes"].as_array().map(|s| s.len()), Some(0));
    }
}
