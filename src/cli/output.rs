//! Output formatting helpers for the final run summary

use crate::metrics::MetricsSnapshot;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

/// Format the end-of-run metrics as a table.
pub fn format_summary_table(snapshot: &MetricsSnapshot) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Metric", "Value"]);

    let failed = if snapshot.failed_requests > 0 {
        snapshot.failed_requests.to_string().red().to_string()
    } else {
        snapshot.failed_requests.to_string().green().to_string()
    };

    table.add_row(vec![
        Cell::new("Total Requests"),
        Cell::new(snapshot.total_requests),
    ]);
    table.add_row(vec![
        Cell::new("Success Requests"),
        Cell::new(snapshot.success_requests),
    ]);
    table.add_row(vec![Cell::new("Failed Requests"), Cell::new(failed)]);
    table.add_row(vec![
        Cell::new("Average Latency (ms)"),
        Cell::new(format!("{:.2}", snapshot.average_latency_ms)),
    ]);

    table.to_string()
}

/// Format the summary as JSON (for scripting around headless runs).
pub fn format_summary_json(snapshot: &MetricsSnapshot) -> String {
    serde_json::to_string_pretty(snapshot).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: 10,
            success_requests: 8,
            failed_requests: 2,
            average_latency_ms: 42.5,
        }
    }

    #[test]
    fn test_summary_table_contains_counters() {
        let output = format_summary_table(&sample_snapshot());
        assert!(output.contains("Total Requests"));
        assert!(output.contains("10"));
        assert!(output.contains("42.50"));
    }

    #[test]
    fn test_summary_table_empty_run() {
        let output = format_summary_table(&MetricsSnapshot::default());
        assert!(output.contains("Average Latency"));
        assert!(output.contains("0.00"));
    }

    #[test]
    fn test_summary_json_valid() {
        let output = format_summary_json(&sample_snapshot());
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["total_requests"], 10);
        assert_eq!(parsed["failed_requests"], 2);
    }
}
