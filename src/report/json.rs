use super::types::RunReport;
use anyhow::Result;
use std::path::Path;

/// Write the run report as pretty JSON, or print it when no path is given.
pub fn generate(report: &RunReport, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;

    if let Some(path) = output {
        std::fs::write(path, json)?;
        println!("JSON report saved to: {}", path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}
