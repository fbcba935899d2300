//! Typed errors shared by the matcher, sweep, workbook and vcs layers
//!
//! CLI handlers wrap these in `anyhow` with extra context; everything below the
//! CLI returns `Result<T, SweepError>`.

use std::path::PathBuf;
use thiserror::Error;

pub type SweepResult<T> = std::result::Result<T, SweepError>;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("identifier must not be empty")]
    EmptyIdentifier,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8 (first invalid byte at offset {offset})")]
    Decode { path: PathBuf, offset: usize },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sheet '{0}' not found in workbook")]
    UnknownSheet(String),

    #[error("sheet '{sheet}' has no '{header}' column")]
    MissingHeader { sheet: String, header: String },

    #[error("sheet '{sheet}': {source}")]
    Sheet {
        sheet: String,
        #[source]
        source: csv::Error,
    },

    #[error("cannot list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("invalid branch name '{0}'")]
    InvalidBranch(String),

    #[error("command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("{0}")]
    InvalidInput(String),
}

impl SweepError {
    /// Stable machine-readable code for the error result item
    pub fn code(&self) -> &'static str {
        match self {
            SweepError::EmptyIdentifier => "EMPTY_IDENTIFIER",
            SweepError::Read { .. } => "READ_FAILED",
            SweepError::Decode { .. } => "DECODE_FAILED",
            SweepError::Write { .. } => "WRITE_FAILED",
            SweepError::UnknownSheet(_) => "UNKNOWN_SHEET",
            SweepError::MissingHeader { .. } => "MISSING_HEADER",
            SweepError::Sheet { .. } => "SHEET_INVALID",
            SweepError::Io { .. } => "IO_FAILED",
            SweepError::InvalidBranch(_) => "INVALID_BRANCH",
            SweepError::CommandFailed { .. } => "COMMAND_FAILED",
            SweepError::InvalidInput(_) => "INVALID_INPUT",
        }
    }
}
