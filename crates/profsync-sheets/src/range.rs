//! A1-notation ranges for the values endpoints.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use profsync_engine::store::column_letter;

/// `'Sheet Name'`, with embedded quotes doubled.
#[must_use]
pub fn quote_sheet(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

/// The whole sheet.
#[must_use]
pub fn sheet_range(sheet: &str) -> String {
    quote_sheet(sheet)
}

/// `width` cells of 1-based `row`, starting at column A.
#[must_use]
pub fn row_range(sheet: &str, row: usize, width: usize) -> String {
    let last = column_letter(width.max(1) - 1);
    format!("{}!A{row}:{last}{row}", quote_sheet(sheet))
}

/// One cell; `column` is 0-based.
#[must_use]
pub fn cell_range(sheet: &str, row: usize, column: usize) -> String {
    format!("{}!{}{row}", quote_sheet(sheet), column_letter(column))
}

/// Encodes a range for use as a URL path segment.
#[must_use]
pub fn encode(range: &str) -> String {
    utf8_percent_encode(range, NON_ALPHANUMERIC).to_string()
}
