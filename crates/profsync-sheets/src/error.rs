use profsync_engine::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by the Sheets API (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("sheet not found: {sheet}")]
    SheetNotFound { sheet: String },

    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("missing Sheets configuration: {0}")]
    MissingConfig(&'static str),
}

impl From<SheetsError> for StoreError {
    fn from(err: SheetsError) -> Self {
        match err {
            SheetsError::RateLimited { .. } => StoreError::Throttled(err.to_string()),
            SheetsError::SheetNotFound { sheet } => StoreError::SheetNotFound(sheet),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_maps_to_throttled() {
        let err: StoreError = SheetsError::RateLimited {
            retry_after_secs: 60,
        }
        .into();
        assert!(err.is_retriable());
    }

    #[test]
    fn not_found_keeps_sheet_name() {
        let err: StoreError = SheetsError::SheetNotFound {
            sheet: "Tags".to_owned(),
        }
        .into();
        assert!(matches!(err, StoreError::SheetNotFound(ref s) if s == "Tags"));
    }

    #[test]
    fn other_errors_are_backend_failures() {
        let err: StoreError = SheetsError::UnexpectedStatus {
            status: 500,
            url: "http://x".to_owned(),
            body: "oops".to_owned(),
        }
        .into();
        assert!(matches!(err, StoreError::Backend(ref m) if m.contains("500")));
        assert!(!err.is_retriable());
    }
}
