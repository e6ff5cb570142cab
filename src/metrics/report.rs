//! Markdown reports for single runs and batches.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use super::MissionMetrics;
use crate::core::error::FleetResult;
use crate::simulation::batch::{BatchSummary, MetricStats};

pub fn render_run_report(metrics: &MissionMetrics, coalition_id: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str("# Evaluation Report - Dynamic Events\n\n");
    out.push_str("| Metric | Value |\n| :--- | :--- |\n");
    let _ = writeln!(out, "| **Average Area Coverage (%)** | {:.2} |", metrics.area_coverage);
    let _ = writeln!(out, "| **Route Redundancy (%)** | {:.2} |", metrics.route_redundancy);
    for (drone_id, count) in &metrics.recharge_counts {
        let _ = writeln!(out, "| **Recharges ({})** | {} |", drone_id, count);
    }
    if let Some(id) = coalition_id {
        let _ = writeln!(out, "\nLast coalition contract: `{}`", id);
    }
    out
}

fn stats_row(out: &mut String, label: &str, stats: &MetricStats) {
    let _ = writeln!(
        out,
        "| **{}** | {:.2} | {:.2} | {:.2} | {:.2} |",
        label, stats.mean, stats.std_dev, stats.min, stats.max
    );
}

pub fn render_batch_report(summary: &BatchSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Batch Report - Dynamic Events ({} runs)\n", summary.runs.len());
    out.push_str("| Metric | Mean | Std Dev | Min | Max |\n");
    out.push_str("| :--- | :--- | :--- | :--- | :--- |\n");
    stats_row(&mut out, "Average Area Coverage (%)", &summary.area_coverage);
    stats_row(&mut out, "Route Redundancy (%)", &summary.route_redundancy);
    out
}

pub fn write_report(path: impl AsRef<Path>, report: &str) -> FleetResult<()> {
    fs::write(path, report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn metrics() -> MissionMetrics {
        MissionMetrics {
            area_coverage: 12.3456,
            route_redundancy: 0.5,
            recharge_counts: BTreeMap::from([("D1".to_string(), 2)]),
        }
    }

    #[test]
    fn test_run_report_table() {
        let report = render_run_report(&metrics(), Some("abcd1234"));

        assert!(report.contains("| **Average Area Coverage (%)** | 12.35 |"));
        assert!(report.contains("| **Route Redundancy (%)** | 0.50 |"));
        assert!(report.contains("| **Recharges (D1)** | 2 |"));
        assert!(report.contains("`abcd1234`"));
    }

    #[test]
    fn test_write_report() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("report.md");

        write_report(&path, &render_run_report(&metrics(), None)).expect("write");
        let written = fs::read_to_string(&path).expect("read back");
        assert!(written.starts_with("# Evaluation Report"));
    }
}
