//! Strict text file I/O for the scanner and renamer
//!
//! SQL files are read whole and must be valid UTF-8. Nothing is skipped,
//! truncated or converted lossily: a file that cannot be read exactly is an
//! error for the whole operation.

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::core::error::{SweepError, SweepResult};

/// Read a whole file as UTF-8 text
pub fn read_text(path: &Path) -> SweepResult<String> {
    let bytes = read_bytes(path).map_err(|source| SweepError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    String::from_utf8(bytes).map_err(|e| SweepError::Decode {
        path: path.to_path_buf(),
        offset: e.utf8_error().valid_up_to(),
    })
}

/// Overwrite a file with the given text
pub fn write_text(path: &Path, content: &str) -> SweepResult<()> {
    fs::write(path, content).map_err(|source| SweepError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn read_bytes(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = fs::File::open(path)?;
    let size = file.metadata()?.len() as usize;

    let mut reader = std::io::BufReader::new(file);
    let mut buffer = Vec::with_capacity(size);
    reader.read_to_end(&mut buffer)?;

    Ok(buffer)
}
