//! Standalone results forwarder: reads a JSON results file and posts a
//! `{summary, results}` payload to an n8n webhook.

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_RESULTS_FILE: &str = "playwright-report/results.json";

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("missing n8n webhook URL. Set N8N_WEBHOOK_URL or pass --url <webhook>")]
    MissingUrl,

    #[error("results file not found: {0}")]
    MissingFile(PathBuf),

    #[error("failed to parse JSON results: {0}")]
    InvalidResults(String),

    #[error("n8n webhook returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("failed to send to n8n webhook: {0}")]
    Transport(String),
}

impl ForwardError {
    /// Process exit code: 1 = setup problem, 2 = webhook rejected,
    /// 3 = network error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ForwardError::MissingUrl
            | ForwardError::MissingFile(_)
            | ForwardError::InvalidResults(_) => 1,
            ForwardError::Rejected { .. } => 2,
            ForwardError::Transport(_) => 3,
        }
    }
}

/// Parse a results file leniently. When strict parsing fails the file may
/// carry log lines around the JSON, so a substring between the first and last
/// JSON delimiter is tried before giving up. Returns the value and whether
/// recovery was needed.
pub fn parse_results_lenient(raw: &str) -> Result<(Value, bool), String> {
    match serde_json::from_str(raw) {
        Ok(v) => Ok((v, false)),
        Err(first_err) => {
            let start = match (raw.find('{'), raw.find('[')) {
                (Some(b), Some(k)) => Some(b.min(k)),
                (b, k) => b.or(k),
            };
            let end = match (raw.rfind('}'), raw.rfind(']')) {
                (Some(b), Some(k)) => Some(b.max(k)),
                (b, k) => b.or(k),
            };
            match (start, end) {
                (Some(s), Some(e)) if e > s => serde_json::from_str(&raw[s..=e])
                    .map(|v| (v, true))
                    .map_err(|e2| {
                        format!(
                            "original parse error: {}; candidate substring also failed: {}",
                            first_err, e2
                        )
                    }),
                _ => Err(format!(
                    "no JSON substring could be identified; original parse error: {}",
                    first_err
                )),
            }
        }
    }
}

/// Collect test entries from the runner's nested suite tree. Suites nest
/// arbitrarily and may carry tests directly or under specs.
pub fn collect_tests(data: &Value) -> Vec<&Value> {
    fn from_suite<'a>(suite: &'a Value, out: &mut Vec<&'a Value>) {
        if let Some(tests) = suite.get("tests").and_then(|t| t.as_array()) {
            out.extend(tests);
        }
        if let Some(suites) = suite.get("suites").and_then(|s| s.as_array()) {
            for s in suites {
                from_suite(s, out);
            }
        }
        if let Some(specs) = suite.get("specs").and_then(|s| s.as_array()) {
            for spec in specs {
                if let Some(tests) = spec.get("tests").and_then(|t| t.as_array()) {
                    out.extend(tests);
                }
            }
        }
    }

    let mut out = Vec::new();
    if let Some(suites) = data.get("suites").and_then(|s| s.as_array()) {
        for s in suites {
            from_suite(s, &mut out);
        }
    } else if let Some(tests) = data.get("tests").and_then(|t| t.as_array()) {
        out.extend(tests);
    }
    out
}

/// Build the webhook payload: a small computed summary plus the raw results.
pub fn build_payload(data: &Value) -> Value {
    let tests = collect_tests(data);
    let mut passed = 0u64;
    let mut failed = 0u64;
    let mut skipped = 0u64;
    for t in &tests {
        match t.get("ok").and_then(|v| v.as_bool()) {
            Some(true) => passed += 1,
            Some(false) => failed += 1,
            None => skipped += 1,
        }
    }
    json!({
        "summary": {
            "total": tests.len(),
            "passed": passed,
            "failed": failed,
            "skipped": skipped,
            "duration": data.get("duration").cloned().unwrap_or(json!(0)),
        },
        "results": data,
    })
}

/// Read, parse (leniently) and forward a results file. On recovery a cleaned
/// copy is written next to the original for inspection.
pub async fn forward(url: Option<&str>, file: Option<&Path>) -> Result<(), ForwardError> {
    let url = match url {
        Some(u) => u.to_string(),
        None => std::env::var("N8N_WEBHOOK_URL").map_err(|_| ForwardError::MissingUrl)?,
    };
    let file = match file {
        Some(f) => f.to_path_buf(),
        None => std::env::var("PLAYWRIGHT_RESULTS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_RESULTS_FILE)),
    };

    if !file.exists() {
        return Err(ForwardError::MissingFile(file));
    }
    let raw = std::fs::read_to_string(&file)
        .map_err(|e| ForwardError::InvalidResults(e.to_string()))?;
    let (data, recovered) = parse_results_lenient(&raw).map_err(ForwardError::InvalidResults)?;
    if recovered {
        let cleaned = file.with_extension("clean.json");
        if let Ok(pretty) = serde_json::to_string_pretty(&data) {
            if std::fs::write(&cleaned, pretty).is_ok() {
                log::warn!(
                    "results file contained non-JSON leading/trailing data; cleaned copy written to {}",
                    cleaned.display()
                );
            }
        }
    }

    let payload = build_payload(&data);
    let res = reqwest::Client::new()
        .post(&url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| ForwardError::Transport(e.to_string()))?;
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(ForwardError::Rejected {
            status: status.as_u16(),
            body,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_json_parses_without_recovery() {
        let (v, recovered) = parse_results_lenient(r#"{"suites": []}"#).unwrap();
        assert!(!recovered);
        assert!(v.get("suites").is_some());
    }

    #[test]
    fn test_recovers_json_wrapped_in_log_lines() {
        let raw = "Running 3 tests\n{\"suites\": [], \"duration\": 9}\nDone.";
        let (v, recovered) = parse_results_lenient(raw).unwrap();
        assert!(recovered);
        assert_eq!(v["duration"], 9);
    }

    #[test]
    fn test_unrecoverable_input_fails() {
        assert!(parse_results_lenient("no json here at all").is_err());
        assert!(parse_results_lenient("{ broken").is_err());
    }

    #[test]
    fn test_collects_tests_from_nested_suites_and_specs() {
        let data = serde_json::json!({
            "suites": [
                {
                    "tests": [{"ok": true}],
                    "suites": [
                        { "specs": [ { "tests": [{"ok": false}, {"ok": true}] } ] }
                    ]
                }
            ]
        });
        assert_eq!(collect_tests(&data).len(), 3);
    }

    #[test]
    fn test_payload_summary_counts() {
        let data = serde_json::json!({
            "duration": 1234,
            "suites": [
                { "tests": [{"ok": true}, {"ok": false}, {"status": "skipped"}] }
            ]
        });
        let payload = build_payload(&data);
        assert_eq!(payload["summary"]["total"], 3);
        assert_eq!(payload["summary"]["passed"], 1);
        assert_eq!(payload["summary"]["failed"], 1);
        assert_eq!(payload["summary"]["skipped"], 1);
        assert_eq!(payload["summary"]["duration"], 1234);
        assert_eq!(payload["results"]["duration"], 1234);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ForwardError::MissingUrl.exit_code(), 1);
        assert_eq!(ForwardError::MissingFile("x.json".into()).exit_code(), 1);
        assert_eq!(ForwardError::InvalidResults("bad".into()).exit_code(), 1);
        assert_eq!(
            ForwardError::Rejected {
                status: 500,
                body: String::new()
            }
            .exit_code(),
            2
        );
        assert_eq!(ForwardError::Transport("refused".into()).exit_code(), 3);
    }

    #[tokio::test]
    async fn test_forward_missing_file_maps_to_setup_error() {
        let err = forward(Some("http://localhost:1/hook"), Some(Path::new("/nope.json")))
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
}
