use serde::{Deserialize, Serialize};

use crate::cell::CellValue;
use crate::error::StoreError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// Sheets in creation order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheets.iter().any(|s| s.name == name)
    }

    pub fn sheet(&self, name: &str) -> Result<&Sheet, StoreError> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| StoreError::SheetNotFound(name.to_string()))
    }

    fn sheet_mut(&mut self, name: &str) -> Result<&mut Sheet, StoreError> {
        self.sheets
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| StoreError::SheetNotFound(name.to_string()))
    }

    pub fn create_sheet(&mut self, name: &str, header: Vec<String>) -> Result<(), StoreError> {
        if self.has_sheet(name) {
            return Err(StoreError::SheetExists(name.to_string()));
        }
        self.sheets.push(Sheet {
            name: name.to_string(),
            header,
            rows: Vec::new(),
        });
        Ok(())
    }

    /// Append a row of written values; returns its data-row index.
    pub fn append_row(&mut self, name: &str, values: &[String]) -> Result<usize, StoreError> {
        let sheet = self.sheet_mut(name)?;
        sheet
            .rows
            .push(values.iter().map(|v| CellValue::from_input(v)).collect());
        Ok(sheet.rows.len() - 1)
    }

    /// Overwrite one cell, growing the row with empty cells if needed.
    pub fn write_cell(
        &mut self,
        name: &str,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), StoreError> {
        let sheet = self.sheet_mut(name)?;
        let cells = sheet
            .rows
            .get_mut(row)
            .ok_or_else(|| StoreError::RowOutOfRange {
                sheet: name.to_string(),
                row,
            })?;

        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = CellValue::from_input(value);
        Ok(())
    }

    /// Remove a row; later rows shift up by one.
    pub fn delete_row(&mut self, name: &str, row: usize) -> Result<(), StoreError> {
        let sheet = self.sheet_mut(name)?;
        if row >= sheet.rows.len() {
            return Err(StoreError::RowOutOfRange {
                sheet: name.to_string(),
                row,
            });
        }
        sheet.rows.remove(row);
        Ok(())
    }
}
