//! Sweep module - the scanner and the renamer
//!
//! Both consume identifiers loaded from a workbook and apply
//! [`crate::matcher::IdentifierPattern`] to SQL files:
//! - scan: count occurrences per file, combine several target sets
//! - rename: rewrite identifiers in place, one mapping at a time

pub mod rename;
pub mod scan;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ordered identifiers to look for, loaded from one sheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSet {
    pub label: String,
    pub identifiers: Vec<String>,
}

impl TargetSet {
    pub fn new(label: impl Into<String>, identifiers: Vec<String>) -> Self {
        Self {
            label: label.into(),
            identifiers,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

/// One substitution job: rename `old` to `new` inside `file`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameMapping {
    pub old: String,
    pub new: String,
    pub file: PathBuf,
}

impl RenameMapping {
    pub fn new(old: impl Into<String>, new: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
            file: file.into(),
        }
    }
}
