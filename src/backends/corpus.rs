//! SQL corpus discovery
//!
//! Uses the ignore crate for traversal. Every `.sql` file under the root is
//! part of the corpus unless the caller opts into skipping hidden entries or
//! honoring ignore files.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::core::error::{SweepError, SweepResult};

const SQL_EXTENSION: &str = "sql";

/// Traversal filters, all off by default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorpusOptions {
    /// Skip hidden files/directories (dotfiles)
    pub skip_hidden: bool,
    /// Honor .gitignore and friends
    pub respect_ignore: bool,
}

fn is_sql_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(SQL_EXTENSION))
}

/// Every `.sql` file under `root`, sorted by path
pub fn discover_sql_files(root: &Path, options: CorpusOptions) -> SweepResult<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(SweepError::InvalidInput(format!(
            "repository path {} does not exist or is not a directory",
            root.display()
        )));
    }

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(options.skip_hidden)
        .ignore(options.respect_ignore)
        .parents(options.respect_ignore)
        .git_ignore(options.respect_ignore)
        .git_global(options.respect_ignore)
        .git_exclude(options.respect_ignore)
        .require_git(false);

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry.map_err(|e| {
            SweepError::InvalidInput(format!("cannot walk {}: {}", root.display(), e))
        })?;

        let is_file = entry.file_type().is_some_and(|t| t.is_file());
        if is_file && is_sql_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}
