use thiserror::Error;

/// Errors surfaced by a [`SheetStore`](crate::store::SheetStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend asked us to slow down (HTTP 429 or equivalent).
    #[error("store throttled the request: {0}")]
    Throttled(String),

    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    #[error("row {row} is out of range for sheet {sheet}")]
    RowOutOfRange { sheet: String, row: usize },

    #[error("store backend error: {0}")]
    Backend(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("workbook JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Only throttling is worth a retry; everything else fails the same way twice.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(self, StoreError::Throttled(_))
    }
}

/// Flush-level failures. The batch is kept so the next flush can retry it.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to read sheet {sheet}: {source}")]
    Read {
        sheet: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to prepare sheet {sheet}: {source}")]
    Prepare {
        sheet: String,
        #[source]
        source: StoreError,
    },
}

/// Failures of the target work queue. Any of these ends the run's queue processing.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("target sheet '{0}' not found")]
    MissingSheet(String),

    #[error("target sheet '{sheet}' has a malformed header: {found:?}")]
    MalformedHeader { sheet: String, found: Vec<String> },

    #[error(transparent)]
    Store(#[from] StoreError),
}
