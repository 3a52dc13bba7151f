//! Per-record CREATE / UPDATE / NO-OP decision.
//!
//! A field counts as changed only when the incoming value is non-empty and
//! differs (after trimming) from the stored one, so an empty observation never
//! erases a stored value. Comparison is plain string equality: `"5"` and
//! `"05"` differ. TAGS is outside the significance set but a TAGS difference
//! alone still makes the row stale.

use profsync_core::{ProfileRecord, SheetLayout, UpdateMode};

use crate::row_index::RowIndex;
use crate::tag_index::TagIndex;

/// One cell to rewrite in a patch update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellPatch {
    /// Zero-based column index.
    pub column: usize,
    pub value: String,
    /// Whether the cell should be marked as changed.
    pub highlight: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatePayload {
    /// The full merged row, written from the first column.
    Row(Vec<String>),
    /// Only the touched cells, in column order.
    Cells(Vec<CellPatch>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowUpdate {
    /// 1-based row of the stored record.
    pub position: usize,
    pub payload: UpdatePayload,
    /// The row as it reads after the update is applied.
    pub merged: Vec<String>,
    /// Significance-set columns whose value changed.
    pub changed_columns: Vec<usize>,
    pub tags_changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The record has no identifier and is dropped.
    Skip,
    /// Brand-new identifier; the projected row to insert.
    Create(Vec<String>),
    Update(RowUpdate),
    NoOp,
}

/// Decides what to write for `record`, filling its TAGS from `tags`.
#[must_use]
pub fn reconcile(
    record: &mut ProfileRecord,
    rows: &RowIndex,
    tags: &TagIndex,
    layout: SheetLayout,
    mode: UpdateMode,
) -> Decision {
    let key = record.key().to_owned();
    if key.is_empty() {
        return Decision::Skip;
    }
    record.tags = tags.tags_for(&key);

    let incoming = layout.project(record);
    let Some(stored) = rows.get(&key) else {
        return Decision::Create(incoming);
    };

    let width = layout.width();
    let mut existing = stored.values.clone();
    existing.resize(width, String::new());

    let changed_columns: Vec<usize> = layout
        .significant_indices()
        .into_iter()
        .filter(|&i| {
            let new = incoming[i].trim();
            !new.is_empty() && new != existing[i].trim()
        })
        .collect();

    let tags_col = layout.tags_index();
    let tags_changed = incoming[tags_col].trim() != existing[tags_col].trim();

    if changed_columns.is_empty() && !tags_changed {
        return Decision::NoOp;
    }

    let (payload, merged) = match mode {
        UpdateMode::FullRow => {
            let merged: Vec<String> = (0..width)
                .map(|i| {
                    if i != tags_col && incoming[i].trim().is_empty() {
                        existing[i].clone()
                    } else {
                        incoming[i].clone()
                    }
                })
                .collect();
            (UpdatePayload::Row(merged.clone()), merged)
        }
        UpdateMode::CellPatch => {
            let mut patches: Vec<CellPatch> = layout
                .timestamp_indices()
                .into_iter()
                .filter(|&i| !incoming[i].trim().is_empty())
                .map(|i| CellPatch {
                    column: i,
                    value: incoming[i].clone(),
                    highlight: false,
                })
                .collect();
            patches.extend(changed_columns.iter().map(|&i| CellPatch {
                column: i,
                value: incoming[i].clone(),
                highlight: true,
            }));
            if tags_changed {
                patches.push(CellPatch {
                    column: tags_col,
                    value: incoming[tags_col].clone(),
                    highlight: true,
                });
            }
            patches.sort_by_key(|p| p.column);

            let mut merged = existing;
            for patch in &patches {
                merged[patch.column].clone_from(&patch.value);
            }
            (UpdatePayload::Cells(patches), merged)
        }
    };

    Decision::Update(RowUpdate {
        position: stored.position,
        payload,
        merged,
        changed_columns,
        tags_changed,
    })
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
