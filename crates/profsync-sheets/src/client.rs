//! Blocking HTTP client for the Google Sheets v4 API.

use std::collections::HashMap;
use std::time::Duration;

use profsync_core::AppConfig;
use profsync_engine::{Highlight, SheetStore, StoreError};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::SheetsError;
use crate::range::{cell_range, encode, row_range, sheet_range};
use crate::types::{BatchUpdateResponse, SpreadsheetMeta, ValueRange};

/// Rows allocated for a sheet created on demand.
const NEW_SHEET_ROWS: usize = 1000;

/// A [`SheetStore`] backed by one spreadsheet.
///
/// HTTP 429 surfaces as [`SheetsError::RateLimited`], and an unknown sheet
/// (404, or a 400 "Unable to parse range") as [`SheetsError::SheetNotFound`].
/// Numeric sheet ids, needed for structural requests, are looked up once and
/// cached.
pub struct SheetsClient {
    client: Client,
    api_base: String,
    spreadsheet_id: String,
    access_token: String,
    sheet_ids: HashMap<String, i64>,
}

impl std::fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsClient")
            .field("api_base", &self.api_base)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("access_token", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl SheetsClient {
    /// # Errors
    ///
    /// Returns [`SheetsError::Http`] if the HTTP client cannot be built.
    pub fn new(
        api_base: &str,
        spreadsheet_id: &str,
        access_token: &str,
        timeout_secs: u64,
    ) -> Result<Self, SheetsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("profsync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_owned(),
            spreadsheet_id: spreadsheet_id.to_owned(),
            access_token: access_token.to_owned(),
            sheet_ids: HashMap::new(),
        })
    }

    /// # Errors
    ///
    /// [`SheetsError::MissingConfig`] when the spreadsheet id or access token
    /// is unset, or [`SheetsError::Http`] if the client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, SheetsError> {
        let spreadsheet_id = config
            .spreadsheet_id
            .as_deref()
            .ok_or(SheetsError::MissingConfig("PROFSYNC_SPREADSHEET_ID"))?;
        let token = config
            .sheets_access_token
            .as_deref()
            .ok_or(SheetsError::MissingConfig("PROFSYNC_SHEETS_ACCESS_TOKEN"))?;
        Self::new(
            &config.sheets_api_base,
            spreadsheet_id,
            token,
            config.request_timeout_secs,
        )
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/v4/spreadsheets/{}", self.api_base, self.spreadsheet_id)
    }

    fn values_url(&self, range: &str) -> String {
        format!("{}/values/{}", self.spreadsheet_url(), encode(range))
    }

    fn send(&self, request: RequestBuilder, sheet: &str) -> Result<Response, SheetsError> {
        let response = request.bearer_auth(&self.access_token).send()?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(SheetsError::RateLimited { retry_after_secs });
        }

        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().unwrap_or_default();
        if status == StatusCode::NOT_FOUND
            || (status == StatusCode::BAD_REQUEST && body.contains("Unable to parse range"))
        {
            return Err(SheetsError::SheetNotFound {
                sheet: sheet.to_owned(),
            });
        }
        Err(SheetsError::UnexpectedStatus {
            status: status.as_u16(),
            url,
            body,
        })
    }

    fn parse<T: DeserializeOwned>(response: Response, context: &str) -> Result<T, SheetsError> {
        let body = response.text()?;
        serde_json::from_str(&body).map_err(|source| SheetsError::Deserialize {
            context: context.to_owned(),
            source,
        })
    }

    /// All rows of `sheet`, as displayed.
    ///
    /// # Errors
    ///
    /// See the type-level docs for status mapping.
    pub fn get_values(&self, sheet: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let request = self
            .client
            .get(self.values_url(&sheet_range(sheet)))
            .query(&[("valueRenderOption", "FORMATTED_VALUE")]);
        let response = self.send(request, sheet)?;
        let values: ValueRange = Self::parse(response, &format!("values of {sheet}"))?;
        Ok(values.values)
    }

    fn put_values(&self, sheet: &str, range: &str, values: &[String]) -> Result<(), SheetsError> {
        let body = ValueRange {
            range: Some(range.to_owned()),
            major_dimension: Some("ROWS".to_owned()),
            values: vec![values.to_vec()],
        };
        let request = self
            .client
            .put(self.values_url(range))
            .query(&[("valueInputOption", "RAW")])
            .json(&body);
        self.send(request, sheet)?;
        Ok(())
    }

    fn batch_update(&self, sheet: &str, requests: Value) -> Result<BatchUpdateResponse, SheetsError> {
        let request = self
            .client
            .post(format!("{}:batchUpdate", self.spreadsheet_url()))
            .json(&json!({ "requests": requests }));
        let response = self.send(request, sheet)?;
        Self::parse(response, "batchUpdate response")
    }

    /// Numeric id of `sheet`, fetched from the spreadsheet metadata on first use.
    fn sheet_id(&mut self, sheet: &str) -> Result<i64, SheetsError> {
        if let Some(id) = self.sheet_ids.get(sheet) {
            return Ok(*id);
        }
        let request = self
            .client
            .get(self.spreadsheet_url())
            .query(&[("fields", "sheets.properties(sheetId,title)")]);
        let response = self.send(request, sheet)?;
        let meta: SpreadsheetMeta = Self::parse(response, "spreadsheet metadata")?;
        for entry in meta.sheets {
            self.sheet_ids
                .insert(entry.properties.title, entry.properties.sheet_id);
        }
        self.sheet_ids
            .get(sheet)
            .copied()
            .ok_or_else(|| SheetsError::SheetNotFound {
                sheet: sheet.to_owned(),
            })
    }
}

impl SheetStore for SheetsClient {
    fn read_sheet(&mut self, sheet: &str) -> Result<Vec<Vec<String>>, StoreError> {
        Ok(self.get_values(sheet)?)
    }

    fn create_sheet(&mut self, sheet: &str, columns: usize) -> Result<(), StoreError> {
        let response = self.batch_update(
            sheet,
            json!([{
                "addSheet": {
                    "properties": {
                        "title": sheet,
                        "gridProperties": {
                            "rowCount": NEW_SHEET_ROWS,
                            "columnCount": columns,
                        }
                    }
                }
            }]),
        )?;
        if let Some(added) = response.replies.into_iter().find_map(|r| r.add_sheet) {
            self.sheet_ids
                .insert(added.properties.title, added.properties.sheet_id);
        }
        tracing::info!(sheet, columns, "sheet created");
        Ok(())
    }

    fn append_row(&mut self, sheet: &str, values: &[String]) -> Result<(), StoreError> {
        let range = sheet_range(sheet);
        let body = ValueRange {
            range: None,
            major_dimension: Some("ROWS".to_owned()),
            values: vec![values.to_vec()],
        };
        let request = self
            .client
            .post(format!("{}:append", self.values_url(&range)))
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&body);
        self.send(request, sheet)?;
        Ok(())
    }

    fn insert_row(
        &mut self,
        sheet: &str,
        row: usize,
        values: &[String],
    ) -> Result<(), StoreError> {
        if row == 0 {
            return Err(StoreError::RowOutOfRange {
                sheet: sheet.to_owned(),
                row,
            });
        }
        let sheet_id = self.sheet_id(sheet)?;
        let cells: Vec<Value> = values
            .iter()
            .map(|v| json!({ "userEnteredValue": { "stringValue": v } }))
            .collect();
        // Row and values go in one batchUpdate, which the API applies atomically.
        self.batch_update(
            sheet,
            json!([
                {
                    "insertDimension": {
                        "range": {
                            "sheetId": sheet_id,
                            "dimension": "ROWS",
                            "startIndex": row - 1,
                            "endIndex": row,
                        },
                        "inheritFromBefore": false,
                    }
                },
                {
                    "updateCells": {
                        "start": {
                            "sheetId": sheet_id,
                            "rowIndex": row - 1,
                            "columnIndex": 0,
                        },
                        "rows": [{ "values": cells }],
                        "fields": "userEnteredValue",
                    }
                }
            ]),
        )?;
        Ok(())
    }

    fn update_row(
        &mut self,
        sheet: &str,
        row: usize,
        values: &[String],
    ) -> Result<(), StoreError> {
        self.put_values(sheet, &row_range(sheet, row, values.len()), values)?;
        Ok(())
    }

    fn update_cell(
        &mut self,
        sheet: &str,
        row: usize,
        column: usize,
        value: &str,
    ) -> Result<(), StoreError> {
        self.put_values(sheet, &cell_range(sheet, row, column), &[value.to_owned()])?;
        Ok(())
    }

    fn highlight_cell(
        &mut self,
        sheet: &str,
        row: usize,
        column: usize,
        color: Highlight,
    ) -> Result<(), StoreError> {
        let sheet_id = self.sheet_id(sheet)?;
        self.batch_update(
            sheet,
            json!([{
                "repeatCell": {
                    "range": {
                        "sheetId": sheet_id,
                        "startRowIndex": row.saturating_sub(1),
                        "endRowIndex": row,
                        "startColumnIndex": column,
                        "endColumnIndex": column + 1,
                    },
                    "cell": {
                        "userEnteredFormat": {
                            "backgroundColor": {
                                "red": color.red,
                                "green": color.green,
                                "blue": color.blue,
                            }
                        }
                    },
                    "fields": "userEnteredFormat.backgroundColor",
                }
            }]),
        )?;
        Ok(())
    }
}
