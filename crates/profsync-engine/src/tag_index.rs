//! Identifier → rendered tag string, built from the tags sheet.
//!
//! Each column of the tags sheet is a category named by its header; every
//! non-empty body cell in that column names an identifier carrying the tag.
//! Labels are concatenated in column order with no deduplication.

use std::collections::HashMap;

use profsync_core::TagLabels;

use crate::context::RunContext;
use crate::error::StoreError;
use crate::store::SheetStore;

/// Separator between labels in the TAGS column.
pub const TAG_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagIndex {
    tags: HashMap<String, Vec<String>>,
}

impl TagIndex {
    #[must_use]
    pub fn from_rows(rows: &[Vec<String>], labels: &TagLabels) -> Self {
        let Some((header, body)) = rows.split_first() else {
            return Self::default();
        };

        let mut tags: HashMap<String, Vec<String>> = HashMap::new();
        for (col, category) in header.iter().enumerate() {
            if category.trim().is_empty() {
                continue;
            }
            let label = labels.label_for(category);
            for row in body {
                let id = row.get(col).map_or("", |v| v.trim());
                if !id.is_empty() {
                    tags.entry(id.to_owned()).or_default().push(label.clone());
                }
            }
        }
        Self { tags }
    }

    /// Reads the tags sheet through `ctx`. A missing sheet yields an empty index.
    ///
    /// # Errors
    ///
    /// Any store error other than [`StoreError::SheetNotFound`].
    pub fn load(
        store: &mut dyn SheetStore,
        ctx: &mut RunContext<'_>,
        sheet: &str,
        labels: &TagLabels,
    ) -> Result<Self, StoreError> {
        match ctx.read(|| store.read_sheet(sheet)) {
            Ok(rows) => {
                let index = Self::from_rows(&rows, labels);
                tracing::info!(sheet, tagged = index.len(), "tag index loaded");
                Ok(index)
            }
            Err(StoreError::SheetNotFound(_)) => {
                tracing::warn!(sheet, "tags sheet not found, continuing without tags");
                Ok(Self::default())
            }
            Err(err) => Err(err),
        }
    }

    /// The tag string for `key`; empty when untagged.
    #[must_use]
    pub fn tags_for(&self, key: &str) -> String {
        self.tags
            .get(key.trim())
            .map(|labels| labels.join(TAG_SEPARATOR))
            .unwrap_or_default()
    }

    /// Every tagged identifier with its tag string, sorted by identifier.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .tags
            .iter()
            .map(|(id, labels)| (id.clone(), labels.join(TAG_SEPARATOR)))
            .collect();
        entries.sort();
        entries
    }

    /// Number of tagged identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
