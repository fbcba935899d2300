//! Renamer - rewrite identifiers in place
//!
//! Mappings run strictly in order and each one re-reads its file, so two
//! mappings for the same file see each other's writes. The first failure stops
//! the run; files already written stay written.

use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::SweepResult;
use crate::core::file_reader::{read_text, write_text};
use crate::core::util::hash_bytes;
use crate::matcher::IdentifierPattern;
use crate::sweep::RenameMapping;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenameOptions {
    /// Compute every outcome without touching the filesystem
    pub dry_run: bool,
}

/// What one mapping did to its file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameOutcome {
    pub mapping: RenameMapping,
    pub replacements: usize,
    pub changed: bool,
    /// XXH3 of the file content after this mapping
    pub hash: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RenameReport {
    pub outcomes: Vec<RenameOutcome>,
    pub dry_run: bool,
}

impl RenameReport {
    pub fn total_replacements(&self) -> usize {
        self.outcomes.iter().map(|o| o.replacements).sum()
    }

    /// Distinct files modified by at least one mapping
    pub fn files_changed(&self) -> usize {
        let mut seen: Vec<PathBuf> = self
            .outcomes
            .iter()
            .filter(|o| o.changed)
            .map(|o| file_key(&o.mapping.file))
            .collect();
        seen.sort();
        seen.dedup();
        seen.len()
    }
}

/// One key per file however a row spells its path (`a.sql`, `./a.sql`)
fn file_key(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Apply `mappings` in order.
pub fn apply_renames(
    mappings: &[RenameMapping],
    options: RenameOptions,
) -> SweepResult<RenameReport> {
    // Dry runs keep rewritten content here so later mappings for the same file
    // see earlier ones, exactly as they would on disk.
    let mut pending: HashMap<PathBuf, String> = HashMap::new();
    let mut report = RenameReport {
        outcomes: Vec::with_capacity(mappings.len()),
        dry_run: options.dry_run,
    };

    for mapping in mappings {
        let pattern = IdentifierPattern::new(&mapping.old)?;
        let key = file_key(&mapping.file);

        let current = match pending.get(&key) {
            Some(content) => content.clone(),
            None => read_text(&mapping.file)?,
        };

        let replacements = pattern.count(&current);
        let rewritten = pattern.replace_all(&current, &mapping.new);
        let changed = rewritten != current.as_str();
        let hash = hash_bytes(rewritten.as_bytes());

        if changed {
            if options.dry_run {
                pending.insert(key, rewritten.into_owned());
            } else {
                write_text(&mapping.file, &rewritten)?;
            }
        }

        report.outcomes.push(RenameOutcome {
            mapping: mapping.clone(),
            replacements,
            changed,
            hash,
        });
    }

    Ok(report)
}
