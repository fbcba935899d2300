//! Directory-of-CSV workbook
//!
//! Each `<sheet>.csv` directly inside the workbook directory is one sheet; the
//! first record is the header row. Sheets are listed in file-name order.

use csv::{ReaderBuilder, WriterBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::error::{SweepError, SweepResult};
use crate::core::paths::is_hidden;
use crate::workbook::{Sheet, Workbook};

const SHEET_EXTENSION: &str = "csv";

#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    dir: PathBuf,
}

impl CsvWorkbook {
    pub fn open(dir: &Path) -> SweepResult<Self> {
        if !dir.is_dir() {
            return Err(SweepError::InvalidInput(format!(
                "workbook {} is not a directory",
                dir.display()
            )));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// `(sheet name, path)` for every sheet file, in file-name order
    fn sheet_files(&self) -> SweepResult<Vec<(String, PathBuf)>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| SweepError::Io {
                path: self.dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            if !is_sheet_file(path) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                files.push((stem.to_string(), path.to_path_buf()));
            }
        }
        Ok(files)
    }

    /// Existing file for `name`, whatever the case of its extension
    fn locate(&self, name: &str) -> SweepResult<Option<PathBuf>> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(SweepError::InvalidInput(format!(
                "invalid sheet name '{name}'"
            )));
        }
        Ok(self
            .sheet_files()?
            .into_iter()
            .find(|(stem, _)| stem == name)
            .map(|(_, path)| path))
    }

    fn sheet_error(name: &str, source: csv::Error) -> SweepError {
        SweepError::Sheet {
            sheet: name.to_string(),
            source,
        }
    }
}

fn is_sheet_file(path: &Path) -> bool {
    path.is_file()
        && !is_hidden(path)
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(SHEET_EXTENSION))
}

impl Workbook for CsvWorkbook {
    fn sheet_names(&self) -> SweepResult<Vec<String>> {
        Ok(self
            .sheet_files()?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    fn read_sheet(&self, name: &str) -> SweepResult<Sheet> {
        let path = self
            .locate(name)?
            .ok_or_else(|| SweepError::UnknownSheet(name.to_string()))?;

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(&path)
            .map_err(|e| Self::sheet_error(name, e))?;

        let headers = reader
            .headers()
            .map_err(|e| Self::sheet_error(name, e))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut sheet = Sheet::new(name, headers);
        for record in reader.records() {
            let record = record.map_err(|e| Self::sheet_error(name, e))?;
            sheet.rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(sheet)
    }

    fn write_sheet(&mut self, sheet: &Sheet) -> SweepResult<()> {
        let path = match self.locate(&sheet.name)? {
            Some(existing) => existing,
            None => self.dir.join(format!("{}.{SHEET_EXTENSION}", sheet.name)),
        };

        let mut writer = WriterBuilder::new()
            .flexible(true)
            .from_path(&path)
            .map_err(|e| Self::sheet_error(&sheet.name, e))?;

        writer
            .write_record(&sheet.headers)
            .map_err(|e| Self::sheet_error(&sheet.name, e))?;
        for row in &sheet.rows {
            writer
                .write_record(row)
                .map_err(|e| Self::sheet_error(&sheet.name, e))?;
        }
        writer.flush().map_err(|source| SweepError::Write { path, source })?;

        Ok(())
    }
}
