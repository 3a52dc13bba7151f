use std::path::PathBuf;

use crate::layout::SheetLayout;

/// Where the profile workbook lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// A JSON workbook file on local disk.
    File,
    /// A Google Sheets spreadsheet over the REST API.
    Sheets,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::File => write!(f, "file"),
            StoreBackend::Sheets => write!(f, "sheets"),
        }
    }
}

/// Where brand-new rows go. The two policies are never combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertionPolicy {
    /// Insert immediately below the header (row 2).
    #[default]
    Top,
    /// Append after the last row.
    Append,
}

impl std::str::FromStr for InsertionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(InsertionPolicy::Top),
            "append" => Ok(InsertionPolicy::Append),
            other => Err(format!(
                "unknown insertion policy '{other}' (expected 'top' or 'append')"
            )),
        }
    }
}

/// How an existing row is rewritten when it changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Replace the whole row with the merged values.
    #[default]
    FullRow,
    /// Patch only the changed cells (plus the timestamp) and highlight them.
    CellPatch,
}

impl std::str::FromStr for UpdateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "row" | "full" => Ok(UpdateMode::FullRow),
            "cells" | "patch" => Ok(UpdateMode::CellPatch),
            other => Err(format!(
                "unknown update mode '{other}' (expected 'row' or 'cells')"
            )),
        }
    }
}

/// Engine tuning: quota, pacing, batching, and sheet selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Store operations allowed per sliding minute.
    pub max_requests_per_minute: usize,
    /// Operations kept in reserve below the quota.
    pub rate_headroom: usize,
    /// Blocking pause once the window fills.
    pub rate_pause_secs: u64,
    /// Records accumulated before a flush.
    pub batch_size: usize,
    /// Pause after every successful write.
    pub request_delay_ms: u64,
    /// Pause before the single retry of a throttled operation.
    pub throttle_backoff_secs: u64,
    pub layout: SheetLayout,
    pub insertion: InsertionPolicy,
    pub update_mode: UpdateMode,
    pub profiles_sheet: String,
    pub tags_sheet: String,
    pub target_sheet: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_requests_per_minute: 50,
            rate_headroom: 0,
            rate_pause_secs: 65,
            batch_size: 3,
            request_delay_ms: 1200,
            throttle_backoff_secs: 65,
            layout: SheetLayout::A,
            insertion: InsertionPolicy::Top,
            update_mode: UpdateMode::FullRow,
            profiles_sheet: "Online".to_owned(),
            tags_sheet: "Tags".to_owned(),
            target_sheet: "Target".to_owned(),
        }
    }
}

impl SyncConfig {
    /// Window size at which the rate limiter pauses.
    #[must_use]
    pub fn effective_quota(&self) -> usize {
        self.max_requests_per_minute
            .saturating_sub(self.rate_headroom)
            .max(1)
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub store: StoreBackend,
    pub workbook_path: PathBuf,
    pub spreadsheet_id: Option<String>,
    pub sheets_access_token: Option<String>,
    pub sheets_api_base: String,
    pub request_timeout_secs: u64,
    pub tag_labels_path: Option<PathBuf>,
    pub sync: SyncConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("store", &self.store)
            .field("workbook_path", &self.workbook_path)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field(
                "sheets_access_token",
                &self.sheets_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("sheets_api_base", &self.sheets_api_base)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("tag_labels_path", &self.tag_labels_path)
            .field("sync", &self.sync)
            .finish()
    }
}
