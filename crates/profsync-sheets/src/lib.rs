//! Google Sheets backend for the profsync engine.
//!
//! [`SheetsClient`] implements [`SheetStore`](profsync_engine::SheetStore)
//! over the Sheets v4 REST API with a blocking HTTP client. It does no rate
//! limiting or retrying of its own; the engine's run context does both.

pub mod client;
pub mod error;
pub mod range;
pub mod types;

pub use client::SheetsClient;
pub use error::SheetsError;
