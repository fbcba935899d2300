//! Workbook repository
//!
//! The spreadsheet that drives a run is reached only through [`Workbook`]:
//! list sheets, read one, replace one. Loading target sets and rename
//! mappings, and persisting the combined scan table, are built on top of those
//! three operations so every backend behaves the same.
//!
//! Backends:
//! - csv_store: a directory holding one `<sheet>.csv` per sheet
//! - memory: in-process sheets for tests

pub mod csv_store;
pub mod layout;
#[cfg(test)]
pub mod memory;

use std::path::Path;

use crate::core::error::{SweepError, SweepResult};
use crate::core::paths::{display_path, resolve_under};
use crate::sweep::scan::ScanTable;
use crate::sweep::{RenameMapping, TargetSet};
use layout::SheetLayout;

/// Header of the key column in a written scan table
pub const FILE_NAME_HEADER: &str = "file_name";

/// One sheet: a header row and string cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Index of `header`, compared after trimming both sides
    pub fn column(&self, header: &str) -> SweepResult<usize> {
        self.headers
            .iter()
            .position(|h| h.trim() == header.trim())
            .ok_or_else(|| SweepError::MissingHeader {
                sheet: self.name.clone(),
                header: header.to_string(),
            })
    }

    /// Trimmed cell value; short rows read as empty
    fn cell(row: &[String], index: usize) -> &str {
        row.get(index).map(|s| s.trim()).unwrap_or("")
    }
}

pub trait Workbook {
    /// Sheet names in workbook order
    fn sheet_names(&self) -> SweepResult<Vec<String>>;

    fn read_sheet(&self, name: &str) -> SweepResult<Sheet>;

    /// Create or replace the sheet named `sheet.name`
    fn write_sheet(&mut self, sheet: &Sheet) -> SweepResult<()>;

    /// Identifiers of a scan sheet, skipping blank cells
    fn load_targets(&self, name: &str, layout: &SheetLayout) -> SweepResult<TargetSet> {
        let sheet = self.read_sheet(name)?;
        let column = sheet.column(&layout.column_header)?;

        let identifiers = sheet
            .rows
            .iter()
            .map(|row| Sheet::cell(row, column))
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect();

        Ok(TargetSet::new(name, identifiers))
    }

    /// Rename rows of a sheet, with file paths resolved against `root`
    fn load_renames(
        &self,
        name: &str,
        layout: &SheetLayout,
        root: &Path,
    ) -> SweepResult<Vec<RenameMapping>> {
        let sheet = self.read_sheet(name)?;
        let change_type = sheet.column(&layout.change_type_header)?;
        let old = sheet.column(&layout.old_header)?;
        let new = sheet.column(&layout.new_header)?;
        let file = sheet.column(&layout.file_header)?;

        let mut mappings = Vec::new();
        for (i, row) in sheet.rows.iter().enumerate() {
            if !layout.is_rename_row(Sheet::cell(row, change_type)) {
                continue;
            }

            // Spreadsheet numbering: header is row 1
            let row_number = i + 2;
            let required = |index: usize, header: &str| -> SweepResult<String> {
                match Sheet::cell(row, index) {
                    "" => Err(SweepError::InvalidInput(format!(
                        "sheet '{}' row {}: '{}' is empty",
                        name, row_number, header
                    ))),
                    value => Ok(value.to_string()),
                }
            };

            let old_name = required(old, &layout.old_header)?;
            let new_name = required(new, &layout.new_header)?;
            let path = required(file, &layout.file_header)?;

            mappings.push(RenameMapping::new(
                old_name,
                new_name,
                resolve_under(root, &path),
            ));
        }

        Ok(mappings)
    }

    /// Persist a scan table as sheet `name`: `file_name` then one column per
    /// label. Scanned cells hold the JSON object of counts, absent cells are
    /// left empty.
    fn write_table(&mut self, name: &str, table: &ScanTable, root: &Path) -> SweepResult<()> {
        let mut headers = vec![FILE_NAME_HEADER.to_string()];
        headers.extend(table.labels().iter().cloned());

        let mut sheet = Sheet::new(name, headers);
        for row in table.rows() {
            let mut cells = vec![display_path(&row.path, root)];
            for label in table.labels() {
                let cell = match row.cell(label) {
                    Some(counts) => serde_json::to_string(counts).map_err(|e| {
                        SweepError::InvalidInput(format!("cannot encode counts: {e}"))
                    })?,
                    None => String::new(),
                };
                cells.push(cell);
            }
            sheet.rows.push(cells);
        }

        self.write_sheet(&sheet)
    }
}

/// Sheets to process: the requested ones, or every sheet except `result_sheet`.
/// Requested names are deduplicated and must exist.
pub fn select_sheets(
    workbook: &dyn Workbook,
    requested: &[String],
    result_sheet: &str,
) -> SweepResult<Vec<String>> {
    let available = workbook.sheet_names()?;

    if requested.is_empty() {
        return Ok(available
            .into_iter()
            .filter(|name| name != result_sheet)
            .collect());
    }

    let mut selected: Vec<String> = Vec::new();
    for name in requested {
        if !available.contains(name) {
            return Err(SweepError::UnknownSheet(name.clone()));
        }
        if !selected.contains(name) {
            selected.push(name.clone());
        }
    }
    Ok(selected)
}
