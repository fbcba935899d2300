//! Sheet layout: which header names carry which field

use serde::{Deserialize, Serialize};

pub const DEFAULT_COLUMN_HEADER: &str = "Column Name";
pub const DEFAULT_CHANGE_TYPE_HEADER: &str = "Change Type";
pub const DEFAULT_RENAME_MARKER: &str = "COL RENAME";
pub const DEFAULT_OLD_HEADER: &str = "Search Key";
pub const DEFAULT_NEW_HEADER: &str = "Renamed objects";
pub const DEFAULT_FILE_HEADER: &str = "File";
pub const DEFAULT_RESULT_SHEET: &str = "result";

/// Header names used when reading sheets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    /// Identifier column of a scan sheet
    pub column_header: String,
    /// Column whose value selects rename rows
    pub change_type_header: String,
    /// Value of `change_type_header` marking a rename row
    pub rename_marker: String,
    pub old_header: String,
    pub new_header: String,
    pub file_header: String,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            column_header: DEFAULT_COLUMN_HEADER.to_string(),
            change_type_header: DEFAULT_CHANGE_TYPE_HEADER.to_string(),
            rename_marker: DEFAULT_RENAME_MARKER.to_string(),
            old_header: DEFAULT_OLD_HEADER.to_string(),
            new_header: DEFAULT_NEW_HEADER.to_string(),
            file_header: DEFAULT_FILE_HEADER.to_string(),
        }
    }
}

impl SheetLayout {
    pub fn is_rename_row(&self, change_type: &str) -> bool {
        change_type.trim() == self.rename_marker
    }
}
