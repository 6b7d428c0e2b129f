use super::types::{FailureRecord, RunSummary};
use chrono::Local;
use std::path::Path;

/// Compose the chat summary message. The layout is fixed wire format for the
/// receiving chat integrations, so every line is exact:
///
/// ```text
/// *Test Summary*
/// :white_check_mark: All 3 tests passed
/// :stopwatch: Duration: 4.2 seconds
/// :date: Date: 2025-01-31
/// ```
pub fn compose(summary: &RunSummary, failures: &[FailureRecord]) -> String {
    let mut lines = vec!["*Test Summary*".to_string()];

    if summary.failed == 0 && summary.total > 0 {
        lines.push(format!(
            ":white_check_mark: All {} tests passed",
            summary.total
        ));
    } else if summary.total == 0 {
        lines.push(":warning: No tests were run".to_string());
    } else {
        lines.push(format!(
            ":x: {} failed · {} passed · {} skipped",
            summary.failed, summary.passed, summary.skipped
        ));
    }

    lines.push(format!(
        ":stopwatch: Duration: {:.1} seconds",
        summary.duration_ms as f64 / 1000.0
    ));
    lines.push(format!(":date: Date: {}", Local::now().format("%Y-%m-%d")));

    let mut text = lines.join("\n");
    if !failures.is_empty() {
        // Titles and file names only, never error text, to keep messages short.
        let listed: Vec<String> = failures
            .iter()
            .take(5)
            .map(|f| format!("• *{}* — {}", f.title, basename(&f.file)))
            .collect();
        text.push_str("\n\nTop failures:\n");
        text.push_str(&listed.join("\n"));
    }
    text
}

pub fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}
