//! Snapshot of the profile sheet keyed by identifier.

use std::collections::HashMap;

use profsync_core::SheetLayout;

/// One stored row: its 1-based sheet position and its cell values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    pub position: usize,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RowIndex {
    rows: HashMap<String, StoredRow>,
    /// Highest occupied row number, header included.
    last_row: usize,
}

impl RowIndex {
    /// Builds the index from a full sheet read (row 1 is the header and is skipped).
    ///
    /// Rows with an empty identifier are ignored. When an identifier appears
    /// more than once, the later row wins.
    #[must_use]
    pub fn from_rows(rows: &[Vec<String>], layout: SheetLayout) -> Self {
        let id_col = layout.identifier_index();
        let mut index = HashMap::new();
        for (offset, values) in rows.iter().enumerate().skip(1) {
            let key = values.get(id_col).map_or("", |v| v.trim());
            if key.is_empty() {
                continue;
            }
            let previous = index.insert(
                key.to_owned(),
                StoredRow {
                    position: offset + 1,
                    values: values.clone(),
                },
            );
            if let Some(previous) = previous {
                tracing::debug!(
                    nickname = key,
                    dropped_row = previous.position,
                    kept_row = offset + 1,
                    "duplicate identifier in sheet, later row wins"
                );
            }
        }
        let last_row = rows
            .iter()
            .rposition(|r| r.iter().any(|c| !c.trim().is_empty()))
            .map_or(1, |i| i + 1);
        Self {
            rows: index,
            last_row: last_row.max(1),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&StoredRow> {
        self.rows.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row number an append would land on.
    #[must_use]
    pub fn next_append_position(&self) -> usize {
        self.last_row + 1
    }

    /// Reflects a row inserted at `position`: rows at or below it move down one.
    pub fn record_insert(&mut self, position: usize, key: &str, values: Vec<String>) {
        for row in self.rows.values_mut() {
            if row.position >= position {
                row.position += 1;
            }
        }
        self.last_row = self.last_row.max(position - 1) + 1;
        self.rows
            .insert(key.to_owned(), StoredRow { position, values });
    }

    /// Reflects new values written over an existing row.
    pub fn record_update(&mut self, key: &str, values: Vec<String>) {
        if let Some(row) = self.rows.get_mut(key) {
            row.values = values;
        }
    }
}
