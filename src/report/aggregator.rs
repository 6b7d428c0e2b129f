use super::types::{Attachment, FailureRecord, RunReport, RunSummary, TestOutcome, TestStatus};
use super::RunObserver;
use chrono::Local;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

struct Collected {
    started_at: Option<Instant>,
    summary: RunSummary,
    failures: Vec<FailureRecord>,
}

/// Accumulates test outcomes over one run and freezes them into a
/// [`RunReport`] at the end.
///
/// Scenario tasks finish concurrently, so all mutation goes through one lock.
pub struct RunAggregator {
    session_id: String,
    inner: Mutex<Collected>,
}

impl RunAggregator {
    pub fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            inner: Mutex::new(Collected {
                started_at: None,
                summary: RunSummary::default(),
                failures: Vec::new(),
            }),
        }
    }

    /// Build the immutable report. Valid with zero recorded outcomes.
    pub fn finish(&self) -> RunReport {
        let inner = self.inner.lock().unwrap();
        let mut summary = inner.summary.clone();
        summary.duration_ms = inner
            .started_at
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);
        RunReport {
            session_id: self.session_id.clone(),
            summary,
            failures: inner.failures.clone(),
            generated_at: Local::now().to_rfc3339(),
        }
    }
}

impl RunObserver for RunAggregator {
    fn begin(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.started_at = Some(Instant::now());
    }

    fn on_outcome(&self, outcome: &TestOutcome) {
        let mut inner = self.inner.lock().unwrap();
        inner.summary.total += 1;
        match outcome.status {
            TestStatus::Passed => inner.summary.passed += 1,
            TestStatus::Failed => inner.summary.failed += 1,
            TestStatus::Skipped => inner.summary.skipped += 1,
            TestStatus::Flaky => inner.summary.flaky += 1,
        }

        if outcome.status == TestStatus::Failed {
            // Attachments whose backing file vanished are dropped silently.
            let attachments: Vec<Attachment> = outcome
                .attachments
                .iter()
                .filter(|a| Path::new(&a.path).exists())
                .cloned()
                .collect();
            inner.failures.push(FailureRecord {
                title: outcome.title.clone(),
                file: outcome.file.clone(),
                errors: outcome.error_messages.clone(),
                attachments,
            });
        }
    }

    fn end(&self) -> RunReport {
        self.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn outcome(status: TestStatus) -> TestOutcome {
        TestOutcome {
            title: "booking flow for John Doe".to_string(),
            file: "tests/booking.rs".to_string(),
            status,
            error_messages: vec!["assertion failed".to_string()],
            attachments: Vec::new(),
            duration_ms: 12,
        }
    }

    #[test]
    fn test_counters_sum_to_total() {
        let agg = RunAggregator::new("s1");
        agg.begin();
        agg.on_outcome(&outcome(TestStatus::Passed));
        agg.on_outcome(&outcome(TestStatus::Passed));
        agg.on_outcome(&outcome(TestStatus::Failed));
        agg.on_outcome(&outcome(TestStatus::Skipped));
        agg.on_outcome(&outcome(TestStatus::Flaky));

        let report = agg.end();
        let s = &report.summary;
        assert_eq!(s.total, 5);
        assert_eq!(s.total, s.passed + s.failed + s.skipped + s.flaky);
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn test_zero_tests_is_a_valid_run() {
        let agg = RunAggregator::new("s2");
        agg.begin();
        let report = agg.end();
        assert_eq!(report.summary.total, 0);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_missing_attachment_files_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("shot.png");
        std::fs::File::create(&kept)
            .unwrap()
            .write_all(b"png")
            .unwrap();

        let mut o = outcome(TestStatus::Failed);
        o.attachments = vec![
            Attachment {
                name: "screenshot".to_string(),
                path: kept.to_string_lossy().to_string(),
            },
            Attachment {
                name: "gone".to_string(),
                path: "/nonexistent/shot.png".to_string(),
            },
        ];

        let agg = RunAggregator::new("s3");
        agg.begin();
        agg.on_outcome(&o);
        let report = agg.end();
        assert_eq!(report.failures[0].attachments.len(), 1);
        assert_eq!(report.failures[0].attachments[0].name, "screenshot");
    }

    #[test]
    fn test_concurrent_outcomes_do_not_lose_updates() {
        let agg = std::sync::Arc::new(RunAggregator::new("s4"));
        agg.begin();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let agg = agg.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..50 {
                    agg.on_outcome(&outcome(TestStatus::Passed));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(agg.end().summary.total, 400);
    }
}
