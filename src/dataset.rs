//! Labeled dataset ingestion and cleaning.
//!
//! A [`Dataset`] is the raw tabular input (columns `text` and `label`),
//! read from a CSV file on disk or any [`io::Read`] (uploads share the same
//! entry point). [`Dataset::clean`] canonicalizes labels, normalizes text,
//! and drops unusable rows, producing the [`CleanDataset`] the trainer
//! operates on.

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::normalize;
use crate::config::NumericLabelConvention;
use crate::error::{Result, SiftError};

/// Canonical binary label. Every row in a cleaned training set carries
/// exactly one of these two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Ham,
    Spam,
}

impl Label {
    /// Canonical string form (`"ham"` / `"spam"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Ham => "ham",
            Label::Spam => "spam",
        }
    }

    /// Canonicalize a raw label value. Case and surrounding whitespace are
    /// ignored; numeric encodings are resolved through `convention`.
    /// Returns `None` for anything else, and such rows are dropped.
    pub fn canonicalize(raw: &str, convention: NumericLabelConvention) -> Option<Label> {
        match raw.trim().to_lowercase().as_str() {
            "spam" => Some(Label::Spam),
            "ham" => Some(Label::Ham),
            "1" => Some(match convention {
                NumericLabelConvention::OneIsSpam => Label::Spam,
                NumericLabelConvention::ZeroIsSpam => Label::Ham,
            }),
            "0" => Some(match convention {
                NumericLabelConvention::OneIsSpam => Label::Ham,
                NumericLabelConvention::ZeroIsSpam => Label::Spam,
            }),
            _ => None,
        }
    }

    /// Both labels, in a fixed iteration order.
    pub fn all() -> [Label; 2] {
        [Label::Ham, Label::Spam]
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw (text, label) row as found in the source table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub text: String,
    pub label: String,
}

/// An ordered collection of raw labeled rows.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<RawRecord>,
}

impl Dataset {
    /// Build a dataset directly from rows (mainly for tests and embedding).
    pub fn from_records(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    /// Read a dataset from a CSV file on disk.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_csv_reader(file)
    }

    /// Read a dataset from any CSV byte stream.
    ///
    /// The header row must contain both a `text` and a `label` column
    /// (any order, extra columns ignored); otherwise this fails with a
    /// validation error before any row is processed.
    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let text_idx = find_column(&headers, "text")?;
        let label_idx = find_column(&headers, "label")?;

        let mut records = Vec::new();
        for row in csv_reader.records() {
            let row = row?;
            let text = row.get(text_idx).unwrap_or("").to_string();
            let label = row.get(label_idx).unwrap_or("").to_string();
            records.push(RawRecord { text, label });
        }

        Ok(Self { records })
    }

    /// Number of raw rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Raw rows, in input order.
    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    /// Clean the dataset for training:
    ///
    /// 1. canonicalize labels (rows with unknown labels are dropped)
    /// 2. drop duplicate (message, label) pairs, keeping the first
    /// 3. normalize text; rows whose normalized text is empty are dropped
    ///
    /// Input order is preserved among surviving rows.
    pub fn clean(&self, convention: NumericLabelConvention) -> CleanDataset {
        let mut seen: HashSet<(String, Label)> = HashSet::new();
        let mut texts = Vec::new();
        let mut labels = Vec::new();

        for record in &self.records {
            let Some(label) = Label::canonicalize(&record.label, convention) else {
                continue;
            };
            let key = (record.text.trim().to_string(), label);
            if !seen.insert(key) {
                continue;
            }
            let normalized = normalize(&record.text);
            if normalized.is_empty() {
                continue;
            }
            texts.push(normalized);
            labels.push(label);
        }

        CleanDataset { texts, labels }
    }
}

/// Locate a required column in the header row, trimming whitespace and
/// ignoring case.
fn find_column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            SiftError::validation(format!(
                "dataset must contain 'text' and 'label' columns; missing '{name}'"
            ))
        })
}

/// A cleaned dataset: normalized texts paired with canonical labels.
#[derive(Debug, Clone)]
pub struct CleanDataset {
    /// Normalized message texts.
    pub texts: Vec<String>,
    /// Canonical labels, aligned with `texts`.
    pub labels: Vec<Label>,
}

impl CleanDataset {
    /// Number of usable rows.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// True if no usable rows survived cleaning.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Row counts per label, in [`Label::all`] order.
    pub fn class_counts(&self) -> [usize; 2] {
        let mut counts = [0usize; 2];
        for label in &self.labels {
            match label {
                Label::Ham => counts[0] += 1,
                Label::Spam => counts[1] += 1,
            }
        }
        counts
    }

    /// Fail fast if the dataset does not contain both classes, since
    /// stratified splitting is impossible with a single class.
    pub fn ensure_two_classes(&self) -> Result<()> {
        let [ham, spam] = self.class_counts();
        if ham == 0 || spam == 0 {
            return Err(SiftError::validation(format!(
                "training requires both classes; got {ham} ham and {spam} spam rows"
            )));
        }
        Ok(())
    }
}
