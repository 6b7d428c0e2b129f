use serde::{Deserialize, Serialize};

/// Terminal status of one test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
    Flaky,
}

/// A file attached to a test case, typically a failure screenshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub path: String,
}

/// The terminal outcome of one executed test case, produced by the runner and
/// consumed read-only by the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOutcome {
    pub title: String,
    /// Source location of the test, for the short failure listing.
    pub file: String,
    pub status: TestStatus,
    pub error_messages: Vec<String>,
    pub attachments: Vec<Attachment>,
    pub duration_ms: u64,
}

impl TestOutcome {
    pub fn passed(title: &str, file: &str, duration_ms: u64) -> Self {
        Self {
            title: title.to_string(),
            file: file.to_string(),
            status: TestStatus::Passed,
            error_messages: Vec::new(),
            attachments: Vec::new(),
            duration_ms,
        }
    }

    pub fn failed(title: &str, file: &str, error: String, duration_ms: u64) -> Self {
        Self {
            title: title.to_string(),
            file: file.to_string(),
            status: TestStatus::Failed,
            error_messages: vec![error],
            attachments: Vec::new(),
            duration_ms,
        }
    }
}

/// Captured details of one failed test.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureRecord {
    pub title: String,
    pub file: String,
    pub errors: Vec<String>,
    pub attachments: Vec<Attachment>,
}

/// Aggregate counters for one run. `total` always equals the sum of the
/// status counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub flaky: u32,
    pub duration_ms: u64,
}

/// Frozen result of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub session_id: String,
    pub summary: RunSummary,
    pub failures: Vec<FailureRecord>,
    pub generated_at: String,
}
