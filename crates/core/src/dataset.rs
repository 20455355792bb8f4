//! Tabular dataset parsing for hospital uploads.
//!
//! A dataset is a UTF-8 CSV file with a header row. Every column except the
//! last is a numeric feature; the last column is the class label. The file
//! is parsed once at upload time (to reject malformed input early) and again
//! from the stored bytes when a training run starts.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::CoreError;

/// Minimum number of columns: at least one feature plus the label.
const MIN_COLUMNS: usize = 2;

/// Minimum number of distinct labels a classifier can be fit on.
const MIN_CLASSES: usize = 2;

/// A parsed, validated dataset ready for training.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Header names of the feature columns, in file order.
    pub feature_names: Vec<String>,
    /// One row of feature values per sample.
    pub features: Vec<Vec<f64>>,
    /// Raw label of each sample (same length as `features`).
    pub labels: Vec<String>,
}

/// Shape summary persisted alongside the uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetShape {
    pub row_count: usize,
    pub feature_count: usize,
    pub class_count: usize,
}

impl Dataset {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    /// Distinct labels in canonical order (see [`compare_labels`]).
    pub fn classes(&self) -> Vec<String> {
        let unique: BTreeSet<&str> = self.labels.iter().map(String::as_str).collect();
        let mut classes: Vec<String> = unique.into_iter().map(str::to_string).collect();
        classes.sort_by(|a, b| compare_labels(a, b));
        classes
    }

    pub fn shape(&self) -> DatasetShape {
        DatasetShape {
            row_count: self.len(),
            feature_count: self.feature_count(),
            class_count: self.classes().len(),
        }
    }
}

/// Order labels numerically when both parse as numbers, lexically otherwise.
///
/// Numeric labels sort before non-numeric ones so `"2" < "10"` and mixed
/// label sets still have a total order.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Parse raw CSV bytes into a [`Dataset`].
///
/// Blank lines are skipped. Fails with [`CoreError::Validation`] when the
/// file is not UTF-8, has no header, has fewer than two columns, has no data
/// rows, has a row with the wrong number of cells, has a non-numeric or
/// non-finite feature value, has an empty label, or has only one class.
pub fn parse_dataset(data: &[u8]) -> Result<Dataset, CoreError> {
    let text = std::str::from_utf8(data)
        .map_err(|e| invalid(format!("Dataset is not valid UTF-8: {e}")))?;
    // Tolerate a UTF-8 byte order mark written by spreadsheet exports.
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

    let (_, header_line) = lines.next().ok_or_else(|| invalid("Dataset is empty".into()))?;
    let headers: Vec<String> = parse_csv_line(header_line)
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.len() < MIN_COLUMNS {
        return Err(invalid(format!(
            "Dataset must have at least {MIN_COLUMNS} columns (features + target)"
        )));
    }

    let feature_count = headers.len() - 1;
    let mut features = Vec::new();
    let mut labels = Vec::new();

    for (index, line) in lines {
        let line_no = index + 1;
        let cells = parse_csv_line(line);
        if cells.len() != headers.len() {
            return Err(invalid(format!(
                "Line {line_no}: expected {} columns, found {}",
                headers.len(),
                cells.len()
            )));
        }

        let mut row = Vec::with_capacity(feature_count);
        for (column, cell) in headers.iter().zip(&cells).take(feature_count) {
            let value = cell.trim().parse::<f64>().map_err(|_| {
                invalid(format!(
                    "Line {line_no}: column '{column}' has non-numeric value '{}'",
                    cell.trim()
                ))
            })?;
            if !value.is_finite() {
                return Err(invalid(format!(
                    "Line {line_no}: column '{column}' has non-finite value"
                )));
            }
            row.push(value);
        }

        let label = cells[feature_count].trim();
        if label.is_empty() {
            return Err(invalid(format!("Line {line_no}: label is empty")));
        }

        features.push(row);
        labels.push(label.to_string());
    }

    if features.is_empty() {
        return Err(invalid("Dataset has a header but no data rows".into()));
    }

    let dataset = Dataset {
        feature_names: headers[..feature_count].to_vec(),
        features,
        labels,
    };

    if dataset.classes().len() < MIN_CLASSES {
        return Err(invalid(
            "Dataset target column must contain at least two distinct classes".into(),
        ));
    }

    Ok(dataset)
}

fn invalid(msg: String) -> CoreError {
    CoreError::Validation(msg)
}

/// Parse a single CSV line, handling quoted fields and `""` escapes.
fn parse_csv_line(line: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(ch);
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == ',' {
            result.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    result.push(current);
    result
}
