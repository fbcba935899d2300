//! Rename flow - apply rename sheets, optionally on a fresh git branch
//!
//! With a push request the order is fixed: prepare the branch, rewrite the
//! files, then commit and push. Publishing only happens after every mapping
//! was applied.

use serde_json::json;
use std::path::Path;

use crate::backends::vcs::{CommandRunner, GitFlow, GitStep};
use crate::core::diag::Diagnostics;
use crate::core::error::{SweepError, SweepResult};
use crate::core::model::{Meta, ResultItem, ResultSet};
use crate::core::paths::display_path;
use crate::sweep::rename::{apply_renames, RenameOptions};
use crate::sweep::RenameMapping;
use crate::workbook::layout::SheetLayout;
use crate::workbook::{select_sheets, Workbook};

/// Branch/commit/push parameters for `rename --push`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRequest {
    pub default_branch: String,
    pub branch: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct RenameRequest<'a> {
    /// Repository root; relative file paths resolve here and git runs here
    pub root: &'a Path,
    /// Requested sheets; empty means every sheet that has the rename columns
    pub sheets: &'a [String],
    pub layout: &'a SheetLayout,
    pub result_sheet: &'a str,
    pub dry_run: bool,
    pub push: Option<PushRequest>,
}

/// `(sheet label, mapping)` for every rename row, in sheet then row order
fn collect_mappings(
    workbook: &dyn Workbook,
    request: &RenameRequest,
    diag: &Diagnostics,
) -> SweepResult<Vec<(String, RenameMapping)>> {
    let explicit = !request.sheets.is_empty();
    let mut collected = Vec::new();

    for label in select_sheets(workbook, request.sheets, request.result_sheet)? {
        let mappings = match workbook.load_renames(&label, request.layout, request.root) {
            Ok(mappings) => mappings,
            Err(SweepError::MissingHeader { header, .. }) if !explicit => {
                diag.detail(format!("skipping sheet '{}': no '{}' column", label, header));
                continue;
            }
            Err(e) => return Err(e),
        };

        diag.detail(format!("{}: {} rename rows", label, mappings.len()));
        collected.extend(mappings.into_iter().map(|m| (label.clone(), m)));
    }

    for (label, mapping) in &collected {
        if !mapping.file.is_file() {
            return Err(SweepError::InvalidInput(format!(
                "sheet '{}': file {} does not exist",
                label,
                mapping.file.display()
            )));
        }
    }

    Ok(collected)
}

fn step_item(step: &GitStep) -> ResultItem {
    ResultItem::git(step.command.as_str()).with_data(json!({
        "stdout": step.output.stdout.trim_end(),
        "stderr": step.output.stderr.trim_end(),
    }))
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Apply every rename row of the selected sheets.
pub fn run_rename<R: CommandRunner>(
    workbook: &dyn Workbook,
    request: &RenameRequest,
    runner: &mut R,
    diag: &Diagnostics,
) -> SweepResult<ResultSet> {
    if request.dry_run && request.push.is_some() {
        return Err(SweepError::InvalidInput(
            "--push cannot be combined with --dry-run".to_string(),
        ));
    }

    // Everything is validated before git touches the working tree
    let collected = collect_mappings(workbook, request, diag)?;
    if collected.is_empty() {
        diag.warn("no rename rows found");
    }

    let mut git = request
        .push
        .as_ref()
        .map(|_| GitFlow::new(runner, request.root));

    if let (Some(flow), Some(push)) = (git.as_mut(), request.push.as_ref()) {
        diag.note(format!(
            "Creating branch '{}' from '{}'",
            push.branch, push.default_branch
        ));
        flow.prepare(&push.default_branch, &push.branch)?;
    }
    let prepared = git.as_ref().map_or(0, |flow| flow.steps().len());

    let (labels, mappings): (Vec<String>, Vec<RenameMapping>) = collected.into_iter().unzip();
    let report = apply_renames(
        &mappings,
        RenameOptions {
            dry_run: request.dry_run,
        },
    )?;

    if report.dry_run {
        diag.note("Dry run: no files were written");
    }
    diag.success(format!(
        "{} replacement{} across {} file{}",
        report.total_replacements(),
        plural(report.total_replacements()),
        report.files_changed(),
        plural(report.files_changed())
    ));

    if let (Some(flow), Some(push)) = (git.as_mut(), request.push.as_ref()) {
        if report.files_changed() == 0 {
            diag.warn("nothing changed; skipping commit and push");
        } else {
            diag.note(format!("Pushing '{}' to origin", push.branch));
            flow.publish(&push.branch, &push.message)?;
        }
    }

    let steps: Vec<GitStep> = git
        .as_ref()
        .map(|flow| flow.steps().to_vec())
        .unwrap_or_default();

    let mut result_set = ResultSet::new();
    result_set.extend(steps[..prepared].iter().map(step_item));

    for (label, outcome) in labels.iter().zip(&report.outcomes) {
        let mapping = &outcome.mapping;
        let excerpt = format!(
            "{} → {} ({} replacement{})",
            mapping.old,
            mapping.new,
            outcome.replacements,
            plural(outcome.replacements)
        );

        result_set.push(
            ResultItem::rename(display_path(&mapping.file, request.root), excerpt)
                .with_label(label)
                .with_data(json!({
                    "old": mapping.old,
                    "new": mapping.new,
                    "replacements": outcome.replacements,
                    "dry_run": report.dry_run,
                }))
                .with_meta(Meta {
                    hash: Some(outcome.hash.clone()),
                    changed: outcome.changed,
                    ..Meta::default()
                }),
        );
    }

    result_set.extend(steps[prepared..].iter().map(step_item));

    Ok(result_set)
}
