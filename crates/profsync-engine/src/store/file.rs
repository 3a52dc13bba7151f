//! A workbook persisted as a single JSON file on local disk.
//!
//! The whole workbook is held in memory and rewritten after every mutation
//! (write to a sibling temp file, then rename over the original).

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

use super::{Highlight, MemoryStore, SheetStore};

#[derive(Debug, Default, Serialize, Deserialize)]
struct WorkbookFile {
    #[serde(default)]
    sheets: BTreeMap<String, Vec<Vec<String>>>,
    #[serde(default)]
    highlights: BTreeMap<String, BTreeSet<(usize, usize)>>,
}

#[derive(Debug)]
pub struct JsonWorkbook {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonWorkbook {
    /// Opens the workbook at `path`. A missing file is an empty workbook;
    /// nothing is written until the first mutation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::Json`] if an existing file
    /// cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut inner = MemoryStore::new();
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let file: WorkbookFile = serde_json::from_str(&content)?;
            inner.sheets = file.sheets;
            inner.highlights = file.highlights;
            tracing::debug!(path = %path.display(), sheets = inner.sheets.len(), "workbook loaded");
        }
        Ok(Self { path, inner })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-only view of a sheet's rows.
    #[must_use]
    pub fn rows(&self, sheet: &str) -> Option<&Vec<Vec<String>>> {
        self.inner.rows(sheet)
    }

    fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = WorkbookFile {
            sheets: self.inner.sheets.clone(),
            highlights: self.inner.highlights.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SheetStore for JsonWorkbook {
    fn read_sheet(&mut self, sheet: &str) -> Result<Vec<Vec<String>>, StoreError> {
        self.inner.read_sheet(sheet)
    }

    fn create_sheet(&mut self, sheet: &str, columns: usize) -> Result<(), StoreError> {
        self.inner.create_sheet(sheet, columns)?;
        self.save()
    }

    fn append_row(&mut self, sheet: &str, values: &[String]) -> Result<(), StoreError> {
        self.inner.append_row(sheet, values)?;
        self.save()
    }

    fn insert_row(
        &mut self,
        sheet: &str,
        row: usize,
        values: &[String],
    ) -> Result<(), StoreError> {
        self.inner.insert_row(sheet, row, values)?;
        self.save()
    }

    fn update_row(
        &mut self,
        sheet: &str,
        row: usize,
        values: &[String],
    ) -> Result<(), StoreError> {
        self.inner.update_row(sheet, row, values)?;
        self.save()
    }

    fn update_cell(
        &mut self,
        sheet: &str,
        row: usize,
        column: usize,
        value: &str,
    ) -> Result<(), StoreError> {
        self.inner.update_cell(sheet, row, column, value)?;
        self.save()
    }

    fn highlight_cell(
        &mut self,
        sheet: &str,
        row: usize,
        column: usize,
        color: Highlight,
    ) -> Result<(), StoreError> {
        self.inner.highlight_cell(sheet, row, column, color)?;
        self.save()
    }
}
