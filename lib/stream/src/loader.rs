//! Reference dataset loading
//!
//! Supported formats, dispatched on file extension:
//!
//! * `.json` – `[{ "vector": [...], "outcome": 12.5, "label": "north" }, ...]`
//! * `.csv`  – one item per record: `[label,] f1, ..., fD, outcome`.
//!   A leading header row is detected and skipped.

use crate::{Error, Result};
use sensorknn_core::{FeatureVector, ReferenceDataset, ReferenceItem};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Load a reference dataset with vectors of `vector_dim` values
pub fn load_dataset(path: &Path, vector_dim: usize) -> Result<ReferenceDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "json" => {
            let text = std::fs::read_to_string(path)?;
            ReferenceDataset::from_json_str(vector_dim, &text)?
        }
        "csv" => load_csv(std::fs::File::open(path)?, vector_dim)?,
        other => return Err(Error::UnsupportedFormat(format!(".{}", other))),
    };

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    info!(
        "Loaded {} reference items ({} dimensions) from {:?}",
        dataset.len(),
        vector_dim,
        path
    );
    Ok(dataset.named(name))
}

/// Read CSV reference items from any reader
pub fn load_csv<R: Read>(reader: R, vector_dim: usize) -> Result<ReferenceDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut dataset = ReferenceDataset::with_dimension(vector_dim);

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(row_no as u64 + 1);

        if record.len() < vector_dim + 1 {
            return Err(Error::InvalidRecord {
                line,
                reason: format!(
                    "expected at least {} columns, found {}",
                    vector_dim + 1,
                    record.len()
                ),
            });
        }

        let outcome_idx = record.len() - 1;
        let first_feature = outcome_idx - vector_dim;

        let parsed: Vec<Option<f64>> = (first_feature..=outcome_idx)
            .map(|i| record.get(i).and_then(|field| field.parse::<f64>().ok()))
            .collect();

        // a header has no numeric value columns at all
        if row_no == 0 && parsed.iter().all(Option::is_none) {
            warn!(line, header = ?record, "Skipping CSV header row");
            continue;
        }

        let mut values = match parsed.iter().position(Option::is_none) {
            None => parsed.into_iter().flatten().collect::<Vec<f64>>(),
            Some(offset) => {
                let column = first_feature + offset;
                let field = record.get(column).unwrap_or("");
                return Err(Error::InvalidRecord {
                    line,
                    reason: format!("column {} is not a number: {:?}", column + 1, field),
                });
            }
        };

        let outcome = values.pop().unwrap_or_default();
        let mut item = ReferenceItem::new(FeatureVector::new(values), outcome);
        if first_feature > 0 {
            if let Some(label) = record.get(0).filter(|l| !l.is_empty()) {
                item = item.with_label(label);
            }
        }

        dataset.push(item)?;
    }

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_csv_with_header_and_labels() {
        let data = "\
label,a,b,c,outcome
north,0,0,0,0
# calibration row
east,10,0,0,90
";
        let dataset = load_csv(data.as_bytes(), 3).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.get(1).unwrap().outcome, 90.0);
        assert_eq!(dataset.get(1).unwrap().label.as_deref(), Some("east"));
        assert_eq!(dataset.get(1).unwrap().vector.as_slice(), &[10.0, 0.0, 0.0]);
    }

    #[test]
    fn test_load_csv_without_header() {
        let dataset = load_csv("1,2,3\n4,5,6\n".as_bytes(), 2).unwrap();
        assert_eq!(dataset.len(), 2);
        assert!(dataset.get(0).unwrap().label.is_none());
        assert_eq!(dataset.outcome_range(), Some((3.0, 6.0)));
    }

    #[test]
    fn test_load_csv_bad_value() {
        let err = load_csv("1,2,3\n4,x,6\n".as_bytes(), 2).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord { line: 2, .. }));
    }

    #[test]
    fn test_load_csv_corrupt_first_row_is_not_a_header() {
        let err = load_csv("north,0,x,0,0\neast,10,0,0,90\n".as_bytes(), 3).unwrap_err();
        match err {
            Error::InvalidRecord { line, reason } => {
                assert_eq!(line, 1);
                assert!(reason.contains("column 3"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_load_csv_short_record() {
        let err = load_csv("1,2\n".as_bytes(), 2).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord { line: 1, .. }));
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"vector": [0, 0], "outcome": 10}}, {{"vector": [10, 10], "outcome": 20, "label": "far"}}]"#
        )
        .unwrap();

        let dataset = load_dataset(file.path(), 2).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.get(1).unwrap().label.as_deref(), Some("far"));
    }

    #[test]
    fn test_load_json_dimension_mismatch() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"vector": [0, 0, 0], "outcome": 10}}]"#).unwrap();

        let err = load_dataset(file.path(), 2).unwrap_err();
        assert!(matches!(
            err,
            Error::Core(sensorknn_core::Error::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        assert!(matches!(
            load_dataset(file.path(), 6),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
