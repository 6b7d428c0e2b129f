//! Tabular fixture source for data-driven scenarios.
//!
//! One CSV row drives one booking scenario. Missing the backing file is a hard
//! setup error that aborts the suite before any scenario runs.

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Columns every booking row must provide.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "firstname",
    "lastname",
    "totalprice",
    "depositpaid",
    "checkin",
    "checkout",
];

/// One record of scenario input, column name -> raw cell value.
/// Missing optional cells read as the empty string.
#[derive(Debug, Clone, Default)]
pub struct FixtureRow {
    values: HashMap<String, String>,
}

impl FixtureRow {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }

    /// Numeric coercion: non-numeric input defaults to 0.
    pub fn number(&self, column: &str) -> f64 {
        self.get(column).trim().parse().unwrap_or(0.0)
    }

    /// Boolean coercion: only a case-insensitive "true" counts.
    pub fn boolean(&self, column: &str) -> bool {
        self.get(column).trim().eq_ignore_ascii_case("true")
    }

    fn validate(&self, index: usize) -> Result<()> {
        // Presence of the column is required; an empty cell is not an error,
        // the coercion rules give it a defined value downstream.
        for col in REQUIRED_COLUMNS {
            if !self.values.contains_key(col) {
                return Err(anyhow!("fixture row {} is missing required column `{}`", index, col));
            }
        }
        Ok(())
    }
}

/// Read all fixture rows from a CSV file. Absence of the file aborts the suite.
pub fn load_rows(path: &Path) -> Result<Vec<FixtureRow>> {
    if !path.exists() {
        return Err(anyhow!(
            "test data file not found: {}. Run `booker-tester generate-data` to create a sample.",
            path.display()
        ));
    }
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open test data file {}", path.display()))?;
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("malformed CSV record {}", i + 1))?;
        let mut values = HashMap::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            values.insert(header.trim().to_string(), cell.trim().to_string());
        }
        let row = FixtureRow::new(values);
        row.validate(i + 1)?;
        rows.push(row);
    }
    Ok(rows)
}

const SAMPLE_HEADERS: [&str; 7] = [
    "firstname",
    "lastname",
    "totalprice",
    "depositpaid",
    "checkin",
    "checkout",
    "additionalneeds",
];

/// The two canonical sample rows every fresh checkout starts from.
pub fn sample_rows() -> Vec<Vec<String>> {
    vec![
        vec![
            "John".into(),
            "Doe".into(),
            "123".into(),
            "true".into(),
            "2025-01-01".into(),
            "2025-01-10".into(),
            "Breakfast".into(),
        ],
        vec![
            "Alice".into(),
            "Smith".into(),
            "200".into(),
            "false".into(),
            "2025-02-01".into(),
            "2025-02-05".into(),
            "Late checkout".into(),
        ],
    ]
}

/// Generate one randomized booking row.
pub fn random_row() -> Vec<String> {
    use fake::faker::name::en::{FirstName, LastName};
    use fake::Fake;
    use rand::Rng;

    let mut rng = rand::thread_rng();
    let price: u32 = rng.gen_range(50..500);
    let deposit = rng.gen_bool(0.5);
    let start = rng.gen_range(1..20);
    let nights = rng.gen_range(1..9);
    vec![
        FirstName().fake(),
        LastName().fake(),
        price.to_string(),
        deposit.to_string(),
        format!("2025-03-{:02}", start),
        format!("2025-03-{:02}", start + nights),
        String::new(),
    ]
}

/// Write a sample fixture CSV with the canonical rows plus `extra` random ones.
pub fn write_sample_csv(path: &Path, extra: usize) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(SAMPLE_HEADERS)?;
    for row in sample_rows() {
        writer.write_record(&row)?;
    }
    for _ in 0..extra {
        writer.write_record(&random_row())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn row(pairs: &[(&str, &str)]) -> FixtureRow {
        let values = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        FixtureRow::new(values)
    }

    #[test]
    fn test_missing_column_reads_empty() {
        let r = row(&[("firstname", "John")]);
        assert_eq!(r.get("additionalneeds"), "");
    }

    #[test]
    fn test_number_coercion_defaults_to_zero() {
        let r = row(&[("totalprice", "123"), ("bad", "abc")]);
        assert_eq!(r.number("totalprice"), 123.0);
        assert_eq!(r.number("bad"), 0.0);
        assert_eq!(r.number("absent"), 0.0);
    }

    #[test]
    fn test_boolean_coercion_exact_true_only() {
        assert!(row(&[("depositpaid", "true")]).boolean("depositpaid"));
        assert!(row(&[("depositpaid", "TRUE")]).boolean("depositpaid"));
        assert!(!row(&[("depositpaid", "yes")]).boolean("depositpaid"));
        assert!(!row(&[("depositpaid", "1")]).boolean("depositpaid"));
        assert!(!row(&[("depositpaid", "")]).boolean("depositpaid"));
    }

    #[test]
    fn test_load_rows_missing_file_is_setup_error() {
        let err = load_rows(Path::new("/nonexistent/bookings.csv")).unwrap_err();
        assert!(err.to_string().contains("test data file not found"));
    }

    #[test]
    fn test_load_rows_parses_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookings.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "firstname,lastname,totalprice,depositpaid,checkin,checkout,additionalneeds").unwrap();
        writeln!(f, "John,Doe,123,true,2025-01-01,2025-01-10,Breakfast").unwrap();
        drop(f);

        let rows = load_rows(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("firstname"), "John");
        assert_eq!(rows[0].number("totalprice"), 123.0);
        assert!(rows[0].boolean("depositpaid"));
    }

    #[test]
    fn test_load_rows_keeps_rows_with_empty_required_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookings.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "firstname,lastname,totalprice,depositpaid,checkin,checkout,additionalneeds").unwrap();
        writeln!(f, "John,Doe,123,true,2025-01-01,2025-01-10,Breakfast").unwrap();
        writeln!(f, "Alice,Smith,200,,2025-02-01,2025-02-05,").unwrap();
        drop(f);

        // An empty cell coerces (false / 0 / ""), it never aborts the suite.
        let rows = load_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(!rows[1].boolean("depositpaid"));
        assert_eq!(rows[1].get("additionalneeds"), "");
        assert_eq!(rows[1].number("totalprice"), 200.0);
    }

    #[test]
    fn test_load_rows_rejects_missing_required_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "firstname,lastname").unwrap();
        writeln!(f, "John,Doe").unwrap();
        drop(f);

        let err = load_rows(&path).unwrap_err();
        assert!(err.to_string().contains("required column"));
    }

    #[test]
    fn test_write_sample_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.csv");
        write_sample_csv(&path, 3).unwrap();

        let rows = load_rows(&path).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].get("firstname"), "John");
        assert_eq!(rows[1].get("lastname"), "Smith");
    }
}
