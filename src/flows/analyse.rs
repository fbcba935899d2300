//! Analyse flow - sheet listing and the combined column scan

use serde_json::json;
use std::path::Path;

use crate::backends::corpus::{discover_sql_files, CorpusOptions};
use crate::core::diag::Diagnostics;
use crate::core::error::{SweepError, SweepResult};
use crate::core::model::{Meta, ResultItem, ResultSet};
use crate::core::paths::display_path;
use crate::core::util::{get_file_size, now_rfc3339};
use crate::sweep::scan::{scan_files, ScanTable};
use crate::workbook::layout::SheetLayout;
use crate::workbook::{select_sheets, Workbook};

/// One `sheet` item per workbook sheet, with its headers and row count
pub fn list_sheets(workbook: &dyn Workbook) -> SweepResult<ResultSet> {
    workbook
        .sheet_names()?
        .into_iter()
        .map(|name| -> SweepResult<ResultItem> {
            let sheet = workbook.read_sheet(&name)?;
            Ok(ResultItem::sheet(name).with_data(json!({
                "headers": sheet.headers,
                "rows": sheet.rows.len(),
            })))
        })
        .collect()
}

/// Scan options
#[derive(Debug, Clone)]
pub struct ScanRequest<'a> {
    pub root: &'a Path,
    /// Requested sheets; empty means every sheet with the identifier column,
    /// except `result_sheet`
    pub sheets: &'a [String],
    pub layout: &'a SheetLayout,
    pub result_sheet: &'a str,
    pub corpus: CorpusOptions,
    /// Persist the combined table as `result_sheet`
    pub write: bool,
}

/// Scan every `.sql` file under the root once per selected sheet and combine
/// the per-sheet results into one table.
pub fn run_scan(
    workbook: &mut dyn Workbook,
    request: &ScanRequest,
    diag: &Diagnostics,
) -> SweepResult<ResultSet> {
    let files = discover_sql_files(request.root, request.corpus)?;
    let labels = select_sheets(workbook, request.sheets, request.result_sheet)?;
    let explicit = !request.sheets.is_empty();

    diag.note(format!("Scanning {} SQL files", files.len()));

    let mut table = ScanTable::new();
    for label in &labels {
        let targets = match workbook.load_targets(label, request.layout) {
            Ok(targets) => targets,
            Err(SweepError::MissingHeader { header, .. }) if !explicit => {
                diag.detail(format!("skipping sheet '{}': no '{}' column", label, header));
                continue;
            }
            Err(e) => return Err(e),
        };
        if targets.is_empty() {
            diag.warn(format!("sheet '{}' lists no identifiers", label));
        }

        let results = scan_files(&files, &targets)?;
        let matched = results.iter().filter(|r| r.total() > 0).count();
        diag.detail(format!(
            "{}: {} identifiers, {} files with matches",
            label,
            targets.identifiers.len(),
            matched
        ));

        table.merge(label, results);
    }

    if table.labels().is_empty() {
        return Err(SweepError::InvalidInput(
            "workbook has no sheets to scan".to_string(),
        ));
    }
    if table.is_empty() {
        diag.warn(format!("no SQL files under {}", request.root.display()));
    }

    let mut result_set: ResultSet = table
        .rows()
        .iter()
        .map(|row| {
            let item = ResultItem::scan(
                display_path(&row.path, request.root),
                row.to_json(table.labels()),
            );
            match get_file_size(&row.path) {
                Ok(size) => item.with_meta(Meta {
                    size: Some(size),
                    ..Meta::default()
                }),
                Err(_) => item,
            }
        })
        .collect();

    if request.write {
        workbook.write_table(request.result_sheet, &table, request.root)?;
        diag.success(format!(
            "Wrote {} rows to sheet '{}'",
            table.rows().len(),
            request.result_sheet
        ));

        result_set.push(
            ResultItem::sheet(request.result_sheet)
                .with_data(json!({
                    "rows": table.rows().len(),
                    "labels": table.labels(),
                }))
                .with_meta(Meta {
                    changed: true,
                    generated_at: Some(now_rfc3339()),
                    ..Meta::default()
                }),
        );
    }

    Ok(result_set)
}
