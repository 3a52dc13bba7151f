//! In-process store. Backs the JSON workbook and the engine's tests.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::error::StoreError;

use super::{Highlight, SheetStore, StoreOp};

#[derive(Debug, Default)]
pub struct MemoryStore {
    pub(super) sheets: BTreeMap<String, Vec<Vec<String>>>,
    /// Highlighted `(row, column)` cells per sheet.
    pub(super) highlights: BTreeMap<String, BTreeSet<(usize, usize)>>,
    calls: Vec<StoreOp>,
    failures: VecDeque<(StoreOp, StoreError)>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a sheet with the given rows.
    #[must_use]
    pub fn with_sheet(mut self, name: &str, rows: Vec<Vec<String>>) -> Self {
        self.sheets.insert(name.to_owned(), rows);
        self
    }

    /// Queues `error` to be returned by the next call of `op` instead of running it.
    pub fn fail_next(&mut self, op: StoreOp, error: StoreError) {
        self.failures.push_back((op, error));
    }

    /// Every call made against the store, in order, including failed ones.
    #[must_use]
    pub fn calls(&self) -> &[StoreOp] {
        &self.calls
    }

    #[must_use]
    pub fn count_calls(&self, op: StoreOp) -> usize {
        self.calls.iter().filter(|c| **c == op).count()
    }

    #[must_use]
    pub fn rows(&self, sheet: &str) -> Option<&Vec<Vec<String>>> {
        self.sheets.get(sheet)
    }

    #[must_use]
    pub fn is_highlighted(&self, sheet: &str, row: usize, column: usize) -> bool {
        self.highlights
            .get(sheet)
            .is_some_and(|cells| cells.contains(&(row, column)))
    }

    fn begin(&mut self, op: StoreOp) -> Result<(), StoreError> {
        self.calls.push(op);
        match self.failures.iter().position(|(o, _)| *o == op) {
            Some(i) => Err(self
                .failures
                .remove(i)
                .map_or_else(|| StoreError::Backend("injected failure".into()), |(_, e)| e)),
            None => Ok(()),
        }
    }

    fn sheet_mut(&mut self, sheet: &str) -> Result<&mut Vec<Vec<String>>, StoreError> {
        self.sheets
            .get_mut(sheet)
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_owned()))
    }

    /// Grows `rows` so that 1-based `row` exists.
    fn ensure_row(rows: &mut Vec<Vec<String>>, row: usize) {
        while rows.len() < row {
            rows.push(Vec::new());
        }
    }
}

impl SheetStore for MemoryStore {
    fn read_sheet(&mut self, sheet: &str) -> Result<Vec<Vec<String>>, StoreError> {
        self.begin(StoreOp::Read)?;
        self.sheets
            .get(sheet)
            .cloned()
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_owned()))
    }

    fn create_sheet(&mut self, sheet: &str, _columns: usize) -> Result<(), StoreError> {
        self.begin(StoreOp::CreateSheet)?;
        if self.sheets.contains_key(sheet) {
            return Err(StoreError::Backend(format!("sheet {sheet} already exists")));
        }
        self.sheets.insert(sheet.to_owned(), Vec::new());
        Ok(())
    }

    fn append_row(&mut self, sheet: &str, values: &[String]) -> Result<(), StoreError> {
        self.begin(StoreOp::AppendRow)?;
        let rows = self.sheet_mut(sheet)?;
        // Like a spreadsheet, append lands after the last non-empty row.
        while rows.last().is_some_and(|r| r.iter().all(|c| c.is_empty())) {
            rows.pop();
        }
        rows.push(values.to_vec());
        Ok(())
    }

    fn insert_row(
        &mut self,
        sheet: &str,
        row: usize,
        values: &[String],
    ) -> Result<(), StoreError> {
        self.begin(StoreOp::InsertRow)?;
        if row == 0 {
            return Err(StoreError::RowOutOfRange {
                sheet: sheet.to_owned(),
                row,
            });
        }
        let rows = self.sheet_mut(sheet)?;
        Self::ensure_row(rows, row - 1);
        rows.insert(row - 1, values.to_vec());

        if let Some(cells) = self.highlights.get_mut(sheet) {
            let shifted = cells
                .iter()
                .map(|&(r, c)| if r >= row { (r + 1, c) } else { (r, c) })
                .collect();
            *cells = shifted;
        }
        Ok(())
    }

    fn update_row(
        &mut self,
        sheet: &str,
        row: usize,
        values: &[String],
    ) -> Result<(), StoreError> {
        self.begin(StoreOp::UpdateRow)?;
        if row == 0 {
            return Err(StoreError::RowOutOfRange {
                sheet: sheet.to_owned(),
                row,
            });
        }
        let rows = self.sheet_mut(sheet)?;
        Self::ensure_row(rows, row);
        let target = &mut rows[row - 1];
        if target.len() < values.len() {
            target.resize(values.len(), String::new());
        }
        target[..values.len()].clone_from_slice(values);
        Ok(())
    }

    fn update_cell(
        &mut self,
        sheet: &str,
        row: usize,
        column: usize,
        value: &str,
    ) -> Result<(), StoreError> {
        self.begin(StoreOp::UpdateCell)?;
        if row == 0 {
            return Err(StoreError::RowOutOfRange {
                sheet: sheet.to_owned(),
                row,
            });
        }
        let rows = self.sheet_mut(sheet)?;
        Self::ensure_row(rows, row);
        let target = &mut rows[row - 1];
        if target.len() <= column {
            target.resize(column + 1, String::new());
        }
        value.clone_into(&mut target[column]);
        Ok(())
    }

    fn highlight_cell(
        &mut self,
        sheet: &str,
        row: usize,
        column: usize,
        _color: Highlight,
    ) -> Result<(), StoreError> {
        self.begin(StoreOp::Highlight)?;
        if !self.sheets.contains_key(sheet) {
            return Err(StoreError::SheetNotFound(sheet.to_owned()));
        }
        self.highlights
            .entry(sheet.to_owned())
            .or_default()
            .insert((row, column));
        Ok(())
    }
}
