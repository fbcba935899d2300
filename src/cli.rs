//! CLI module - Command-line interface definitions and handlers

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};

use crate::backends::corpus::CorpusOptions;
use crate::backends::doctor::doctor_report;
use crate::backends::vcs::SystemRunner;
use crate::core::diag::Diagnostics;
use crate::core::error::SweepError;
use crate::core::model::{ResultItem, ResultSet, SweepIssue};
use crate::core::render::{OutputFormat, RenderConfig, Renderer};
use crate::flows::analyse::{list_sheets, run_scan, ScanRequest};
use crate::flows::rename::{run_rename, PushRequest, RenameRequest};
use crate::workbook::csv_store::CsvWorkbook;
use crate::workbook::layout::{
    SheetLayout, DEFAULT_CHANGE_TYPE_HEADER, DEFAULT_COLUMN_HEADER, DEFAULT_FILE_HEADER,
    DEFAULT_NEW_HEADER, DEFAULT_OLD_HEADER, DEFAULT_RENAME_MARKER, DEFAULT_RESULT_SHEET,
};

/// colsweep - find and rename column identifiers across a SQL repository.
#[derive(Parser, Debug)]
#[command(name = "colsweep")]
#[command(
    author,
    version,
    about,
    long_about = r#"colsweep reads column identifiers from a workbook, counts where they occur in
the .sql files of a repository, and renames them in place.

A workbook is a directory with one <sheet>.csv file per sheet. Every command
prints a ResultSet in the selected format (default: jsonl).

Output formats:
- jsonl: one JSON object per line (best for piping into tools)
- json: a single JSON array
- md: human-friendly Markdown

Examples:
    colsweep sheets --workbook columns/
    colsweep --root ../warehouse scan --workbook columns/
    colsweep scan --workbook columns/ --sheet orders,users --no-write
    colsweep rename --workbook columns/ --sheet changes --dry-run
    colsweep rename --workbook columns/ --sheet changes --push \
        --default-branch main --branch rename/user-id --message "Rename user_id"
"#
)]
pub struct Cli {
    /// Root directory of the SQL repository.
    #[arg(
        long,
        global = true,
        default_value = ".",
        value_name = "ROOT",
        long_help = "Root directory of the SQL repository (defaults to the current directory).\n\n\
Every .sql file under it is scanned, relative File cells of rename sheets are\n\
resolved against it, git runs inside it, and emitted paths are relative to it."
    )]
    pub root: PathBuf,

    /// Output format (jsonl/json/md).
    #[arg(
        long,
        global = true,
        default_value = "jsonl",
        value_name = "FORMAT",
        long_help = "Select the output format for ResultSet.\n\n\
Supported values:\n\
- jsonl (default)\n\
- json\n\
- md (markdown)"
    )]
    pub format: String,

    /// Disable colored output (when applicable).
    #[arg(
        long,
        global = true,
        long_help = "Disable colored diagnostics. This is useful when piping stderr to files or\n\
when your terminal does not support ANSI colors."
    )]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Suppress progress notes on stderr. Warnings and machine-readable results\n\
are still printed."
    )]
    pub quiet: bool,

    /// Verbose mode (more diagnostics).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Print per-sheet details on stderr, such as identifier counts and skipped\n\
sheets."
    )]
    pub verbose: bool,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(
        long,
        global = true,
        long_help = "Pretty-print JSON and JSONL output with indentation for human readability.\n\n\
Has no effect on md format."
    )]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the workbook lives and which sheets to use
#[derive(Args, Debug)]
pub struct WorkbookArgs {
    /// Workbook directory (one <sheet>.csv per sheet).
    #[arg(long, env = "COLSWEEP_WORKBOOK", value_name = "DIR")]
    pub workbook: PathBuf,

    /// Sheets to process (repeatable or comma-separated).
    #[arg(
        long = "sheet",
        value_name = "NAME",
        value_delimiter = ',',
        long_help = "Sheets to process, by file stem. Repeat the flag or separate names with\n\
commas. If omitted, every sheet except the result sheet is processed."
    )]
    pub sheets: Vec<String>,

    /// Name of the sheet holding the combined scan table.
    #[arg(long, default_value = DEFAULT_RESULT_SHEET, value_name = "NAME")]
    pub result_sheet: String,
}

/// Header names of the workbook sheets
#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Header of the identifier column in scan sheets.
    #[arg(long, env = "COLSWEEP_COLUMN_HEADER", default_value = DEFAULT_COLUMN_HEADER, value_name = "HEADER")]
    pub column_header: String,

    /// Header of the column selecting rename rows.
    #[arg(long, env = "COLSWEEP_CHANGE_TYPE_HEADER", default_value = DEFAULT_CHANGE_TYPE_HEADER, value_name = "HEADER")]
    pub change_type_header: String,

    /// Change type value marking a rename row.
    #[arg(long, env = "COLSWEEP_RENAME_MARKER", default_value = DEFAULT_RENAME_MARKER, value_name = "VALUE")]
    pub rename_marker: String,

    /// Header of the old identifier column.
    #[arg(long, env = "COLSWEEP_OLD_HEADER", default_value = DEFAULT_OLD_HEADER, value_name = "HEADER")]
    pub old_header: String,

    /// Header of the new identifier column.
    #[arg(long, env = "COLSWEEP_NEW_HEADER", default_value = DEFAULT_NEW_HEADER, value_name = "HEADER")]
    pub new_header: String,

    /// Header of the file path column.
    #[arg(long, env = "COLSWEEP_FILE_HEADER", default_value = DEFAULT_FILE_HEADER, value_name = "HEADER")]
    pub file_header: String,
}

impl From<LayoutArgs> for SheetLayout {
    fn from(args: LayoutArgs) -> Self {
        Self {
            column_header: args.column_header,
            change_type_header: args.change_type_header,
            rename_marker: args.rename_marker,
            old_header: args.old_header,
            new_header: args.new_header,
            file_header: args.file_header,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the sheets of a workbook.
    #[command(
        long_about = "Emit one sheet item per workbook sheet with its headers and row count.\n\n\
Examples:\n\
  colsweep sheets --workbook columns/\n"
    )]
    Sheets {
        /// Workbook directory (one <sheet>.csv per sheet).
        #[arg(long, env = "COLSWEEP_WORKBOOK", value_name = "DIR")]
        workbook: PathBuf,
    },

    /// Count identifier occurrences per SQL file.
    #[command(
        long_about = "Scan every .sql file under ROOT once per selected sheet and emit one scan\n\
item per file with the counts of every identifier found, grouped by sheet.\n\n\
Matching is case-insensitive and boundary-safe: user_id matches in `[user_id]` and\n\
`u.user_id` but not inside `user_id_old`.\n\n\
The combined table is written back to the workbook as the result sheet unless\n\
--no-write is given.\n\n\
Examples:\n\
  colsweep scan --workbook columns/\n\
  colsweep scan --workbook columns/ --sheet orders --no-write\n"
    )]
    Scan {
        #[command(flatten)]
        workbook: WorkbookArgs,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Do not write the result sheet.
        #[arg(long)]
        no_write: bool,

        /// Skip hidden files/directories (dotfiles).
        #[arg(
            long,
            long_help = "Skip hidden files and directories (dotfiles).\n\n\
By default, every .sql file under ROOT is scanned, hidden or not."
        )]
        skip_hidden: bool,

        /// Honor .gitignore and other ignore rules.
        #[arg(
            long,
            long_help = "Skip files matched by ignore files (.gitignore, .ignore, global ignores).\n\n\
By default, ignored .sql files are scanned too."
        )]
        respect_ignore: bool,
    },

    /// Rename identifiers in place from rename sheets.
    #[command(
        long_about = "Apply every rename row (Change Type = COL RENAME) of the selected sheets.\n\
Each row rewrites one identifier in one file; rows run in order and later rows\n\
see the results of earlier ones.\n\n\
With --push the renames happen on a new branch created from --default-branch,\n\
and the result is committed and pushed to origin.\n\n\
Examples:\n\
  colsweep rename --workbook columns/ --sheet changes --dry-run\n\
  colsweep rename --workbook columns/ --push --default-branch main \\\n\
      --branch rename/user-id --message \"Rename user_id\"\n"
    )]
    Rename {
        #[command(flatten)]
        workbook: WorkbookArgs,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Report what would change without writing files.
        #[arg(long)]
        dry_run: bool,

        /// Run on a new branch, then commit and push.
        #[arg(
            long,
            conflicts_with = "dry_run",
            requires_all = ["default_branch", "branch", "message"]
        )]
        push: bool,

        /// Branch to start from (with --push).
        #[arg(long, value_name = "BRANCH")]
        default_branch: Option<String>,

        /// Branch to create (with --push).
        #[arg(long, value_name = "BRANCH")]
        branch: Option<String>,

        /// Commit message (with --push).
        #[arg(long, short = 'm', value_name = "MESSAGE")]
        message: Option<String>,
    },

    /// Check external dependencies (git).
    #[command(
        long_about = "Check that the external tools colsweep relies on are available.\n\n\
git is only needed for rename --push."
    )]
    Doctor,
}

/// Print a result set to stdout
fn emit(result_set: &ResultSet, config: RenderConfig) -> Result<()> {
    Renderer::with_config(config)
        .render_to(result_set, io::stdout().lock())
        .context("failed to write output")
}

/// Error result item for a failed command
fn error_item(err: &anyhow::Error) -> ResultItem {
    let code = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<SweepError>())
        .map_or("FAILED", SweepError::code);
    ResultItem::error(SweepIssue::new(code, format!("{:#}", err)))
}

fn ensure_dir(path: &Path, what: &str) -> Result<()> {
    if !path.is_dir() {
        bail!("{} {} does not exist or is not a directory", what, path.display());
    }
    Ok(())
}

fn open_workbook(path: &Path) -> Result<CsvWorkbook> {
    CsvWorkbook::open(path).with_context(|| format!("cannot open workbook {}", path.display()))
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let format: OutputFormat = cli.format.parse().map_err(anyhow::Error::msg)?;
    let render_config = RenderConfig::with_pretty(format, cli.pretty);
    let diag = Diagnostics::new(cli.quiet, cli.verbose, cli.no_color);

    // Get absolute root path
    let root = cli.root.canonicalize().unwrap_or(cli.root);

    match dispatch(cli.command, &root, &diag) {
        Ok(result_set) => emit(&result_set, render_config),
        Err(err) => {
            let mut result_set = ResultSet::new();
            result_set.push(error_item(&err));
            emit(&result_set, render_config)?;
            Err(err)
        }
    }
}

fn dispatch(command: Commands, root: &Path, diag: &Diagnostics) -> Result<ResultSet> {
    match command {
        Commands::Sheets { workbook } => {
            let book = open_workbook(&workbook)?;
            list_sheets(&book).context("cannot list sheets")
        }

        Commands::Scan {
            workbook,
            layout,
            no_write,
            skip_hidden,
            respect_ignore,
        } => {
            ensure_dir(root, "repository root")?;
            let mut book = open_workbook(&workbook.workbook)?;
            let layout = SheetLayout::from(layout);
            let request = ScanRequest {
                root,
                sheets: &workbook.sheets,
                layout: &layout,
                result_sheet: &workbook.result_sheet,
                corpus: CorpusOptions {
                    skip_hidden,
                    respect_ignore,
                },
                write: !no_write,
            };
            run_scan(&mut book, &request, diag).context("scan failed")
        }

        Commands::Rename {
            workbook,
            layout,
            dry_run,
            push,
            default_branch,
            branch,
            message,
        } => {
            ensure_dir(root, "repository root")?;
            let book = open_workbook(&workbook.workbook)?;
            let layout = SheetLayout::from(layout);

            let push = match (push, default_branch, branch, message) {
                (false, ..) => None,
                (true, Some(default_branch), Some(branch), Some(message)) => Some(PushRequest {
                    default_branch,
                    branch,
                    message,
                }),
                (true, ..) => bail!("--push requires --default-branch, --branch and --message"),
            };

            let request = RenameRequest {
                root,
                sheets: &workbook.sheets,
                layout: &layout,
                result_sheet: &workbook.result_sheet,
                dry_run,
                push,
            };
            run_rename(&book, &request, &mut SystemRunner, diag).context("rename failed")
        }

        Commands::Doctor => {
            let report = doctor_report();
            if report.items.iter().any(|item| !item.errors.is_empty()) {
                diag.warn("Some dependencies are missing");
            }
            Ok(report)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sheet_flag_accepts_commas_and_repeats() {
        let cli = Cli::try_parse_from([
            "colsweep",
            "scan",
            "--workbook",
            "book",
            "--sheet",
            "orders,users",
            "--sheet",
            "items",
        ])
        .unwrap();

        match cli.command {
            Commands::Scan { workbook, .. } => {
                assert_eq!(workbook.sheets, vec!["orders", "users", "items"]);
                assert_eq!(workbook.result_sheet, "result");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_layout_defaults() {
        let cli =
            Cli::try_parse_from(["colsweep", "rename", "--workbook", "book", "--dry-run"]).unwrap();

        match cli.command {
            Commands::Rename { layout, .. } => {
                assert_eq!(SheetLayout::from(layout), SheetLayout::default());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_push_requires_branch_arguments() {
        let result = Cli::try_parse_from([
            "colsweep",
            "rename",
            "--workbook",
            "book",
            "--push",
            "--branch",
            "x",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_push_conflicts_with_dry_run() {
        let result = Cli::try_parse_from([
            "colsweep",
            "rename",
            "--workbook",
            "book",
            "--dry-run",
            "--push",
            "--default-branch",
            "main",
            "--branch",
            "x",
            "--message",
            "m",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_error_item_uses_sweep_error_code() {
        let err = anyhow::Error::new(SweepError::UnknownSheet("orders".into()))
            .context("scan failed");

        let item = error_item(&err);
        assert_eq!(item.errors[0].code, "UNKNOWN_SHEET");
        assert_eq!(
            item.errors[0].message,
            "scan failed: sheet 'orders' not found in workbook"
        );
    }

    #[test]
    fn test_error_item_without_sweep_error() {
        let item = error_item(&anyhow::anyhow!("boom"));
        assert_eq!(item.errors[0].code, "FAILED");
    }
}
