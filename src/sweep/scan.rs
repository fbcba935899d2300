//! Scanner - per-file occurrence counts for a target set
//!
//! Files are read whole, lower-cased and newline-flattened, then every
//! identifier of the target set is counted with the shared matcher. Any file
//! that cannot be read fails the whole scan.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::core::error::SweepResult;
use crate::core::file_reader::read_text;
use crate::matcher::{flatten_newlines, IdentifierPattern};
use crate::sweep::TargetSet;

/// Identifier (as written in the workbook) -> occurrence count, only counts >= 1
pub type ColumnCounts = BTreeMap<String, usize>;

/// Scan result for a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCounts {
    pub path: PathBuf,
    pub counts: ColumnCounts,
}

impl FileCounts {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Pattern plus the key it reports under
struct CompiledTarget {
    key: String,
    pattern: IdentifierPattern,
}

fn compile_targets(targets: &TargetSet) -> SweepResult<Vec<CompiledTarget>> {
    targets
        .identifiers
        .iter()
        .filter(|identifier| !identifier.trim().is_empty())
        .map(|identifier| {
            Ok(CompiledTarget {
                key: identifier.clone(),
                pattern: IdentifierPattern::new(&identifier.to_lowercase())?,
            })
        })
        .collect()
}

/// Count every identifier of `targets` in every file, preserving file order.
pub fn scan_files(files: &[PathBuf], targets: &TargetSet) -> SweepResult<Vec<FileCounts>> {
    let compiled = compile_targets(targets)?;

    files
        .iter()
        .map(|path| scan_file(path, &compiled))
        .collect()
}

fn scan_file(path: &Path, compiled: &[CompiledTarget]) -> SweepResult<FileCounts> {
    let text = read_text(path)?;
    let lowered = text.to_lowercase();
    let body = flatten_newlines(&lowered);

    let mut counts = ColumnCounts::new();
    for target in compiled {
        let n = target.pattern.count(&body);
        if n > 0 {
            counts.insert(target.key.clone(), n);
        }
    }

    Ok(FileCounts {
        path: path.to_path_buf(),
        counts,
    })
}

/// One file of the combined table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRow {
    pub path: PathBuf,
    /// Label -> counts; a label missing here was never scanned for this file
    cells: BTreeMap<String, ColumnCounts>,
}

impl ScanRow {
    pub fn cell(&self, label: &str) -> Option<&ColumnCounts> {
        self.cells.get(label)
    }

    /// `{label: {identifier: count}}` with `null` for absent cells
    pub fn to_json(&self, labels: &[String]) -> Value {
        let mut object = Map::new();
        for label in labels {
            let cell = match self.cells.get(label) {
                Some(counts) => serde_json::to_value(counts).unwrap_or(Value::Null),
                None => Value::Null,
            };
            object.insert(label.clone(), cell);
        }
        Value::Object(object)
    }
}

/// Wide table keyed by file path with one column per target-set label.
///
/// Merging is an outer join: a file seen by any merged scan gets exactly one
/// row, and labels that never covered it stay absent rather than zero.
#[derive(Debug, Clone, Default)]
pub struct ScanTable {
    labels: Vec<String>,
    rows: Vec<ScanRow>,
    index: HashMap<PathBuf, usize>,
}

impl ScanTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one scan under `label`. Merging the same label twice overwrites
    /// that label's cells.
    pub fn merge(&mut self, label: &str, results: Vec<FileCounts>) {
        if !self.labels.iter().any(|l| l == label) {
            self.labels.push(label.to_string());
        }

        for result in results {
            let i = match self.index.get(&result.path).copied() {
                Some(i) => i,
                None => {
                    let i = self.rows.len();
                    self.index.insert(result.path.clone(), i);
                    self.rows.push(ScanRow {
                        path: result.path.clone(),
                        cells: BTreeMap::new(),
                    });
                    i
                }
            };
            self.rows[i].cells.insert(label.to_string(), result.counts);
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn rows(&self) -> &[ScanRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
