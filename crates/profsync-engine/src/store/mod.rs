//! The tabular store the engine reads from and writes to.
//!
//! Rows are 1-based (row 1 is the header); columns are 0-based indices into
//! the layout. A sheet that does not exist is reported as
//! [`StoreError::SheetNotFound`] so callers can create it on demand.

mod file;
mod memory;

use crate::error::StoreError;

pub use file::JsonWorkbook;
pub use memory::MemoryStore;

/// Background colour used to mark a changed cell. Components are 0.0–1.0.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Highlight {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Highlight {
    /// The light yellow used for cells rewritten by a patch update.
    pub const CHANGED: Highlight = Highlight {
        red: 1.0,
        green: 0.95,
        blue: 0.6,
    };
}

/// The operations a store supports, used to label calls and inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Read,
    CreateSheet,
    AppendRow,
    InsertRow,
    UpdateRow,
    UpdateCell,
    Highlight,
}

/// A spreadsheet-like store of named sheets holding rows of string cells.
///
/// Every call either applies completely or not at all: a throttled call is
/// retried whole.
pub trait SheetStore {
    /// All rows of `sheet`, header included. Trailing empty cells may be omitted.
    ///
    /// # Errors
    ///
    /// [`StoreError::SheetNotFound`] when the sheet does not exist.
    fn read_sheet(&mut self, sheet: &str) -> Result<Vec<Vec<String>>, StoreError>;

    /// Creates an empty sheet sized for `columns` columns.
    ///
    /// # Errors
    ///
    /// Backend failures.
    fn create_sheet(&mut self, sheet: &str, columns: usize) -> Result<(), StoreError>;

    /// Adds `values` after the last row.
    ///
    /// # Errors
    ///
    /// Backend failures or a missing sheet.
    fn append_row(&mut self, sheet: &str, values: &[String]) -> Result<(), StoreError>;

    /// Inserts `values` at `row`, pushing that row and everything below it down.
    ///
    /// # Errors
    ///
    /// Backend failures or a missing sheet.
    fn insert_row(&mut self, sheet: &str, row: usize, values: &[String])
        -> Result<(), StoreError>;

    /// Overwrites `row` starting at the first column.
    ///
    /// # Errors
    ///
    /// Backend failures or a missing sheet.
    fn update_row(&mut self, sheet: &str, row: usize, values: &[String])
        -> Result<(), StoreError>;

    /// Overwrites a single cell.
    ///
    /// # Errors
    ///
    /// Backend failures or a missing sheet.
    fn update_cell(
        &mut self,
        sheet: &str,
        row: usize,
        column: usize,
        value: &str,
    ) -> Result<(), StoreError>;

    /// Sets the background colour of a single cell.
    ///
    /// # Errors
    ///
    /// Backend failures or a missing sheet.
    fn highlight_cell(
        &mut self,
        sheet: &str,
        row: usize,
        column: usize,
        color: Highlight,
    ) -> Result<(), StoreError>;
}

/// Converts a 0-based column index to its A1 letter(s): 0 → `A`, 26 → `AA`.
#[must_use]
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + u8::try_from(rem).unwrap_or(0)));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}
