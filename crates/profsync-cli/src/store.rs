//! Store selection and tag-label loading shared by the commands.

use anyhow::Context;
use profsync_core::{load_tag_labels, AppConfig, StoreBackend, TagLabels};
use profsync_engine::{JsonWorkbook, SheetStore};
use profsync_sheets::SheetsClient;

/// Opens the configured store backend.
pub(crate) fn open_store(config: &AppConfig) -> anyhow::Result<Box<dyn SheetStore>> {
    match config.store {
        StoreBackend::File => {
            let workbook = JsonWorkbook::open(&config.workbook_path).with_context(|| {
                format!("failed to open workbook {}", config.workbook_path.display())
            })?;
            tracing::info!(path = %config.workbook_path.display(), "using JSON workbook");
            Ok(Box::new(workbook))
        }
        StoreBackend::Sheets => {
            let client =
                SheetsClient::from_config(config).context("failed to build Sheets client")?;
            tracing::info!(
                spreadsheet = config.spreadsheet_id.as_deref().unwrap_or_default(),
                "using Google Sheets"
            );
            Ok(Box::new(client))
        }
    }
}

/// Built-in tag labels, plus overrides from `PROFSYNC_TAG_LABELS_PATH` if set.
pub(crate) fn load_labels(config: &AppConfig) -> anyhow::Result<TagLabels> {
    match &config.tag_labels_path {
        Some(path) => load_tag_labels(path)
            .with_context(|| format!("failed to load tag labels from {}", path.display())),
        None => Ok(TagLabels::default()),
    }
}
