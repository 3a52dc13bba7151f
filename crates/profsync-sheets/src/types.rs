//! Request and response bodies for the Sheets v4 API.

use serde::{Deserialize, Serialize};

/// Body of `values.get`, and of `values.update` / `values.append` requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    /// Absent when the range is empty.
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

/// The subset of `spreadsheets.get` used to resolve sheet ids.
#[derive(Debug, Clone, Deserialize)]
pub struct SpreadsheetMeta {
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetEntry {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
}

/// `spreadsheets.batchUpdate` response; only `addSheet` replies are read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchUpdateResponse {
    #[serde(default)]
    pub replies: Vec<BatchReply>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReply {
    #[serde(default)]
    pub add_sheet: Option<SheetEntry>,
}
