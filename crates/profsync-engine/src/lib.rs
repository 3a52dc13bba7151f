//! Incremental reconciliation and export engine for profsync.
//!
//! Takes observed [`ProfileRecord`](profsync_core::ProfileRecord)s, compares
//! them against a snapshot of the profile sheet, and issues only the writes
//! needed to bring the sheet up to date. All store traffic goes through a
//! [`RunContext`], which enforces the per-minute quota, retries throttled
//! operations once, and paces writes.
//!
//! The engine is synchronous and single-threaded: the only suspension points
//! are the blocking sleeps issued through the [`Clock`].

pub mod clock;
pub mod context;
pub mod error;
pub mod export;
pub mod rate_limit;
pub mod reconcile;
pub mod row_index;
pub mod stats;
pub mod store;
pub mod tag_index;
pub mod target;
pub mod timefmt;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::RunContext;
pub use error::{ExportError, StoreError, TargetError};
pub use export::{BatchExporter, ExportStats, FlushReport, RecordFailure};
pub use rate_limit::RateLimiter;
pub use reconcile::{reconcile, CellPatch, Decision, RowUpdate, UpdatePayload};
pub use row_index::{RowIndex, StoredRow};
pub use stats::RunStats;
pub use store::{Highlight, JsonWorkbook, MemoryStore, SheetStore, StoreOp};
pub use tag_index::TagIndex;
pub use target::{TargetEntry, TargetQueue, TargetStatus};
