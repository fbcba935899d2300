//! colsweep - find and rename column identifiers across a SQL repository
//!
//! colsweep provides:
//! - Workbook-driven target sets (one sheet per label)
//! - Case-insensitive, boundary-safe identifier counting per .sql file
//! - In-place renames, optionally on a new git branch that is committed and pushed
//! - Unified output format (jsonl/json/md)

use anyhow::Result;
use clap::Parser;

mod backends;
mod cli;
mod core;
mod flows;
mod matcher;
mod sweep;
mod workbook;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::run(cli)
}
