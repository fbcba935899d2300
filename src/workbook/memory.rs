//! In-memory workbook used as a test fixture

use crate::core::error::{SweepError, SweepResult};
use crate::workbook::{Sheet, Workbook};

#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<Sheet>,
}

impl MemoryWorkbook {
    pub fn with_sheets(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }
}

impl Workbook for MemoryWorkbook {
    fn sheet_names(&self) -> SweepResult<Vec<String>> {
        Ok(self.sheets.iter().map(|s| s.name.clone()).collect())
    }

    fn read_sheet(&self, name: &str) -> SweepResult<Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| SweepError::UnknownSheet(name.to_string()))
    }

    fn write_sheet(&mut self, sheet: &Sheet) -> SweepResult<()> {
        match self.sheets.iter_mut().find(|s| s.name == sheet.name) {
            Some(existing) => *existing = sheet.clone(),
            None => self.sheets.push(sheet.clone()),
        }
        Ok(())
    }
}
