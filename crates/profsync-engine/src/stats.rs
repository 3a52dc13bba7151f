//! Run-level counters and the end-of-run summary.

use chrono::{DateTime, Local};

use crate::export::ExportStats;

#[derive(Debug, Clone)]
pub struct RunStats {
    /// Records handed to the run, including ones that failed to parse.
    pub total: usize,
    pub success: usize,
    pub errors: usize,
    pub tags_loaded: usize,
    pub export: ExportStats,
    pub started_at: DateTime<Local>,
}

impl RunStats {
    #[must_use]
    pub fn new(started_at: DateTime<Local>) -> Self {
        Self {
            total: 0,
            success: 0,
            errors: 0,
            tags_loaded: 0,
            export: ExportStats::default(),
            started_at,
        }
    }

    /// Folds the exporter's totals into the run counts.
    pub fn absorb(&mut self, export: ExportStats) {
        self.success += export.new_count + export.updated_count + export.unchanged_count;
        self.errors += export.error_count;
        self.export = export;
    }

    /// Share of records that ended up in sync, in percent.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.success as f64 / self.total as f64 * 100.0
    }

    /// Emits the final summary. Called once per run, including after a fatal error.
    pub fn log_summary(&self, finished_at: DateTime<Local>) {
        let elapsed = finished_at - self.started_at;
        tracing::info!(
            started = %self.started_at.format("%d-%b-%y %I:%M %p"),
            elapsed_secs = elapsed.num_seconds(),
            total = self.total,
            success = self.success,
            errors = self.errors,
            new = self.export.new_count,
            updated = self.export.updated_count,
            unchanged = self.export.unchanged_count,
            skipped = self.export.skipped_count,
            tags_loaded = self.tags_loaded,
            completion_pct = format!("{:.1}", self.completion_rate()),
            "run summary"
        );
    }
}
