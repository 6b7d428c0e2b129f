use super::types::{TestOutcome, TestStatus};
use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

/// Render per-test outcomes as JUnit XML for CI consumption.
pub fn generate_junit_xml(session_id: &str, outcomes: &[TestOutcome]) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let failures = outcomes
        .iter()
        .filter(|o| o.status == TestStatus::Failed)
        .count();
    let skipped = outcomes
        .iter()
        .filter(|o| o.status == TestStatus::Skipped)
        .count();
    let total_duration: u64 = outcomes.iter().map(|o| o.duration_ms).sum();

    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", "booker-tester-run"));
    suites_start.push_attribute(("tests", outcomes.len().to_string().as_str()));
    suites_start.push_attribute(("failures", failures.to_string().as_str()));
    suites_start.push_attribute(("skipped", skipped.to_string().as_str()));
    suites_start.push_attribute((
        "time",
        (total_duration as f64 / 1000.0).to_string().as_str(),
    ));
    writer.write_event(Event::Start(suites_start))?;

    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", "booking-api"));
    suite_start.push_attribute(("tests", outcomes.len().to_string().as_str()));
    suite_start.push_attribute(("failures", failures.to_string().as_str()));
    suite_start.push_attribute(("skipped", skipped.to_string().as_str()));
    suite_start.push_attribute(("id", session_id));
    suite_start.push_attribute((
        "time",
        (total_duration as f64 / 1000.0).to_string().as_str(),
    ));
    writer.write_event(Event::Start(suite_start))?;

    for outcome in outcomes {
        let mut case = BytesStart::new("testcase");
        case.push_attribute(("name", outcome.title.as_str()));
        case.push_attribute(("classname", outcome.file.as_str()));
        case.push_attribute((
            "time",
            (outcome.duration_ms as f64 / 1000.0).to_string().as_str(),
        ));
        writer.write_event(Event::Start(case))?;

        match outcome.status {
            TestStatus::Failed => {
                let mut failure = BytesStart::new("failure");
                if let Some(first) = outcome.error_messages.first() {
                    failure.push_attribute(("message", first.as_str()));
                }
                writer.write_event(Event::Start(failure))?;
                writer.write_event(Event::Text(BytesText::new(
                    &outcome.error_messages.join("\n"),
                )))?;
                writer.write_event(Event::End(BytesEnd::new("failure")))?;
            }
            TestStatus::Skipped => {
                writer.write_event(Event::Empty(BytesStart::new("skipped")))?;
            }
            TestStatus::Passed | TestStatus::Flaky => {}
        }

        writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

/// Write the JUnit report to a file, or print it when no path is given.
pub fn generate(session_id: &str, outcomes: &[TestOutcome], output: Option<&Path>) -> Result<()> {
    let xml = generate_junit_xml(session_id, outcomes)?;
    if let Some(path) = output {
        std::fs::write(path, xml)?;
        println!("JUnit report saved to: {}", path.display());
    } else {
        println!("{}", xml);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_junit_xml_counts_and_cases() {
        let outcomes = vec![
            TestOutcome::passed("booking flow for John Doe", "tests/booking.rs", 1200),
            TestOutcome::failed(
                "booking flow for Alice Smith",
                "tests/booking.rs",
                "expected 200, got 404".to_string(),
                800,
            ),
        ];
        let xml = generate_junit_xml("session-1", &outcomes).unwrap();
        assert!(xml.contains(r#"tests="2""#));
        assert!(xml.contains(r#"failures="1""#));
        assert!(xml.contains("booking flow for John Doe"));
        assert!(xml.contains("expected 200, got 404"));
        assert!(xml.contains(r#"id="session-1""#));
    }

    #[test]
    fn test_skipped_outcome_renders_skipped_element() {
        let mut o = TestOutcome::passed("held back", "tests/booking.rs", 0);
        o.status = TestStatus::Skipped;
        let xml = generate_junit_xml("s", &[o]).unwrap();
        assert!(xml.contains("<skipped"));
    }
}
