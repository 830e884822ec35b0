//! High-poverty county classification.
//!
//! Backed by a tab-delimited reference file with a header row. Only the
//! `County`, `State` and `Hipov` columns are read; rows with an empty `Hipov`
//! cell carry no classification and are dropped at load time.

use std::path::Path;

use crate::error::{GeoError, Result};
use crate::types::{CountyPovertyRecord, CountyRef, same_name};

const COUNTY_COLUMN: &str = "County";
const STATE_COLUMN: &str = "State";
const FLAG_COLUMN: &str = "Hipov";

#[derive(Debug, Clone, Default)]
pub struct PovertyClassifier {
    records: Vec<CountyPovertyRecord>,
}

impl PovertyClassifier {
    pub fn from_records(records: Vec<CountyPovertyRecord>) -> Self {
        Self { records }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| GeoError::Dataset {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let records = parse_tsv(&raw).map_err(|message| GeoError::Dataset {
            path: path.display().to_string(),
            message,
        })?;
        tracing::info!(
            path = %path.display(),
            records = records.len(),
            flagged = records.iter().filter(|r| r.is_high_poverty).count(),
            "Loaded county poverty data"
        );
        Ok(Self::from_records(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the county is flagged. Unknown counties are simply not flagged.
    pub fn is_high_poverty(&self, county: &str, state: &str) -> bool {
        let county = county.trim();
        let state = state.trim();
        self.records.iter().any(|r| {
            r.is_high_poverty
                && same_name(&r.county, county)
                && same_name(&r.state, state)
        })
    }

    /// Keeps flagged counties, preserving input order and duplicates.
    pub fn filter_high_poverty(&self, counties: &[CountyRef]) -> Vec<CountyRef> {
        counties
            .iter()
            .filter(|c| self.is_high_poverty(&c.county, &c.state))
            .cloned()
            .collect()
    }
}

fn parse_tsv(raw: &str) -> std::result::Result<Vec<CountyPovertyRecord>, String> {
    let mut lines = raw.lines();
    let header = lines
        .next()
        .ok_or_else(|| "empty file, expected a header row".to_string())?;
    let header: Vec<String> = header
        .trim_start_matches('\u{feff}')
        .split('\t')
        .map(unquote)
        .collect();

    let column = |name: &str| {
        header
            .iter()
            .position(|h| *h == name)
            .ok_or_else(|| format!("missing column {name:?}"))
    };
    let county_idx = column(COUNTY_COLUMN)?;
    let state_idx = column(STATE_COLUMN)?;
    let flag_idx = column(FLAG_COLUMN)?;

    let mut records = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<String> = line.split('\t').map(unquote).collect();
        let cell = |idx: usize| cells.get(idx).map(String::as_str).unwrap_or("");

        let flag = cell(flag_idx);
        if flag.is_empty() {
            continue;
        }
        records.push(CountyPovertyRecord {
            county: cell(county_idx).to_string(),
            state: cell(state_idx).to_string(),
            is_high_poverty: flag == "1",
        });
    }
    Ok(records)
}

/// Trims a cell and removes one pair of surrounding double quotes, turning
/// `""` inside a quoted cell back into `"`.
fn unquote(cell: &str) -> String {
    let cell = cell.trim();
    match cell.strip_prefix('"').and_then(|c| c.strip_suffix('"')) {
        Some(inner) => inner.replace("\"\"", "\""),
        None => cell.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\u{feff}County\tState\tPop\tHipov\n\
        Jackson\tIL\t58000\t1\n\
        Madison\tIL\t265000\t0\n\
        Cook\tIL\t5100000\t\n\
        Iron\tMO\t10000\t1\n";

    fn classifier() -> PovertyClassifier {
        PovertyClassifier::from_records(parse_tsv(SAMPLE).unwrap())
    }

    #[test]
    fn test_rows_without_flag_are_dropped() {
        let classifier = classifier();
        assert_eq!(classifier.len(), 3);
        assert!(!classifier.is_high_poverty("Cook", "IL"));
    }

    #[test]
    fn test_is_high_poverty() {
        let classifier = classifier();
        assert!(classifier.is_high_poverty("JACKSON", "il"));
        assert!(!classifier.is_high_poverty("Madison", "IL"));
        assert!(!classifier.is_high_poverty("Jackson", "MO"));
        assert!(!classifier.is_high_poverty("Nowhere", "ZZ"));
    }

    #[test]
    fn test_filter_preserves_order_and_duplicates() {
        let input = vec![
            CountyRef::new("IRON", "MO"),
            CountyRef::new("MADISON", "IL"),
            CountyRef::new("JACKSON", "IL"),
            CountyRef::new("IRON", "MO"),
        ];
        let kept = classifier().filter_high_poverty(&input);
        assert_eq!(
            kept,
            vec![
                CountyRef::new("IRON", "MO"),
                CountyRef::new("JACKSON", "IL"),
                CountyRef::new("IRON", "MO"),
            ]
        );
    }

    #[test]
    fn test_quoted_cells() {
        let rows = parse_tsv("\"County\"\t\"State\"\t\"Hipov\"\n\"Jackson\"\t\"IL\"\t\"1\"\n\"O\"\"Brien\"\tIA\t0\n").unwrap();
        assert_eq!(rows[1].county, "O\"Brien");
        let classifier = PovertyClassifier::from_records(rows);
        assert!(classifier.is_high_poverty("JACKSON", "IL"));
        assert_eq!(classifier.len(), 2);
        assert_eq!(unquote(" \"Doña Ana\" "), "Doña Ana");
        assert_eq!(unquote("\""), "\"");
    }

    #[test]
    fn test_non_ascii_county_names() {
        let classifier = PovertyClassifier::from_records(
            parse_tsv("County\tState\tHipov\nDoña Ana\tNM\t1\nMayagüez\tPR\t1\n").unwrap(),
        );
        assert!(classifier.is_high_poverty("DOÑA ANA", "nm"));
        assert_eq!(
            classifier.filter_high_poverty(&[CountyRef::new("mayagüez", "PR"), CountyRef::new("Añasco", "PR")]),
            vec![CountyRef::new("MAYAGÜEZ", "PR")]
        );
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let err = parse_tsv("County\tState\nJackson\tIL\n").unwrap_err();
        assert!(err.contains("Hipov"));
        assert!(parse_tsv("").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("county_data.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        let classifier = PovertyClassifier::load(&path).unwrap();
        assert!(classifier.is_high_poverty("Iron", "MO"));
    }
}
