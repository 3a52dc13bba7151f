//! Batched export of observed records into the profile sheet.
//!
//! Records accumulate until the batch size is reached, then one flush reads
//! the sheet once, reconciles every record in arrival order, and applies the
//! resulting writes through the [`RunContext`]. A failure before any write
//! (reading or preparing the sheet) keeps the batch for the next flush; a
//! failure on one record's write is counted and the flush moves on.

use profsync_core::{InsertionPolicy, ProfileRecord, SyncConfig, TagLabels};

use crate::context::RunContext;
use crate::error::{ExportError, StoreError};
use crate::reconcile::{reconcile, Decision, RowUpdate, UpdatePayload};
use crate::row_index::RowIndex;
use crate::store::{Highlight, SheetStore};
use crate::tag_index::TagIndex;

/// Row new records are inserted at under [`InsertionPolicy::Top`].
pub const TOP_ROW: usize = 2;

/// Counts accumulated over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub new_count: usize,
    pub updated_count: usize,
    pub unchanged_count: usize,
    pub skipped_count: usize,
    pub error_count: usize,
}

impl ExportStats {
    fn absorb(&mut self, report: &FlushReport) {
        self.new_count += report.created;
        self.updated_count += report.updated;
        self.unchanged_count += report.unchanged;
        self.skipped_count += report.skipped;
        self.error_count += report.failures.len();
    }
}

/// A record whose write failed.
#[derive(Debug)]
pub struct RecordFailure {
    pub nickname: String,
    pub error: StoreError,
}

/// Outcome of one flush.
#[derive(Debug, Default)]
pub struct FlushReport {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    /// Identifiers now up to date in the sheet (created, updated, or unchanged).
    pub synced: Vec<String>,
    pub failures: Vec<RecordFailure>,
}

#[derive(Debug)]
pub struct BatchExporter<'a> {
    config: &'a SyncConfig,
    labels: &'a TagLabels,
    pending: Vec<ProfileRecord>,
    tags: Option<TagIndex>,
    stats: ExportStats,
}

impl<'a> BatchExporter<'a> {
    #[must_use]
    pub fn new(config: &'a SyncConfig, labels: &'a TagLabels) -> Self {
        Self {
            config,
            labels,
            pending: Vec::new(),
            tags: None,
            stats: ExportStats::default(),
        }
    }

    /// Queues `record` and flushes once the batch is full.
    ///
    /// # Errors
    ///
    /// Flush-level failures; the batch, including `record`, is kept.
    pub fn push(
        &mut self,
        store: &mut dyn SheetStore,
        ctx: &mut RunContext<'_>,
        record: ProfileRecord,
    ) -> Result<Option<FlushReport>, ExportError> {
        self.pending.push(record);
        if self.pending.len() < self.config.batch_size.max(1) {
            return Ok(None);
        }
        self.flush(store, ctx).map(Some)
    }

    /// Flushes whatever is left and returns the run totals.
    ///
    /// # Errors
    ///
    /// Flush-level failures; the remaining batch is kept.
    pub fn finish(
        &mut self,
        store: &mut dyn SheetStore,
        ctx: &mut RunContext<'_>,
    ) -> Result<ExportStats, ExportError> {
        if !self.pending.is_empty() {
            self.flush(store, ctx)?;
        }
        Ok(self.stats)
    }

    #[must_use]
    pub fn stats(&self) -> ExportStats {
        self.stats
    }

    /// Records waiting for the next flush.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Size of the cached tag index, once loaded.
    #[must_use]
    pub fn tags_loaded(&self) -> Option<usize> {
        self.tags.as_ref().map(TagIndex::len)
    }

    /// Reconciles and writes the pending batch.
    ///
    /// # Errors
    ///
    /// [`ExportError`] when the sheet cannot be read or prepared. Nothing has
    /// been written for the batch in that case and it stays pending.
    pub fn flush(
        &mut self,
        store: &mut dyn SheetStore,
        ctx: &mut RunContext<'_>,
    ) -> Result<FlushReport, ExportError> {
        if self.pending.is_empty() {
            return Ok(FlushReport::default());
        }
        let config = self.config;
        let sheet = config.profiles_sheet.as_str();
        let layout = config.layout;

        let rows = self.prepare_sheet(store, ctx)?;
        let mut index = RowIndex::from_rows(&rows, layout);

        if self.tags.is_none() {
            match TagIndex::load(store, ctx, &config.tags_sheet, self.labels) {
                Ok(tags) => self.tags = Some(tags),
                Err(err) => tracing::warn!(
                    sheet = %config.tags_sheet,
                    error = %err,
                    "failed to load tags, continuing without tags for this batch"
                ),
            }
        }
        let fallback = TagIndex::default();
        let tags = self.tags.as_ref().unwrap_or(&fallback);

        let batch = std::mem::take(&mut self.pending);
        tracing::info!(records = batch.len(), known = index.len(), "flushing batch");

        let mut report = FlushReport::default();
        for mut record in batch {
            let decision = reconcile(&mut record, &index, tags, layout, config.update_mode);
            let key = record.key().to_owned();
            match decision {
                Decision::Skip => {
                    tracing::debug!("record without identifier dropped");
                    report.skipped += 1;
                }
                Decision::NoOp => {
                    tracing::debug!(nickname = %key, "unchanged");
                    report.unchanged += 1;
                    report.synced.push(key);
                }
                Decision::Create(values) => {
                    let (position, result) = match config.insertion {
                        InsertionPolicy::Top => (
                            TOP_ROW,
                            ctx.write(|| store.insert_row(sheet, TOP_ROW, &values)),
                        ),
                        InsertionPolicy::Append => (
                            index.next_append_position(),
                            ctx.write(|| store.append_row(sheet, &values)),
                        ),
                    };
                    match result {
                        Ok(()) => {
                            tracing::info!(nickname = %key, row = position, "created");
                            index.record_insert(position, &key, values);
                            report.created += 1;
                            report.synced.push(key);
                        }
                        Err(error) => record_failure(&mut report, key, error),
                    }
                }
                Decision::Update(update) => {
                    match apply_update(store, ctx, sheet, &key, &update, &mut index) {
                        Ok(()) => {
                            tracing::info!(
                                nickname = %key,
                                row = update.position,
                                changed = update.changed_columns.len(),
                                tags_changed = update.tags_changed,
                                "updated"
                            );
                            report.updated += 1;
                            report.synced.push(key);
                        }
                        Err(error) => record_failure(&mut report, key, error),
                    }
                }
            }
        }

        self.stats.absorb(&report);
        tracing::info!(
            created = report.created,
            updated = report.updated,
            unchanged = report.unchanged,
            skipped = report.skipped,
            errors = report.failures.len(),
            "batch flushed"
        );
        Ok(report)
    }

    /// Reads the profile sheet, creating it and writing the header as needed.
    fn prepare_sheet(
        &self,
        store: &mut dyn SheetStore,
        ctx: &mut RunContext<'_>,
    ) -> Result<Vec<Vec<String>>, ExportError> {
        let sheet = self.config.profiles_sheet.as_str();
        let layout = self.config.layout;
        let prepare_err = |source| ExportError::Prepare {
            sheet: sheet.to_owned(),
            source,
        };

        let mut rows = match ctx.read(|| store.read_sheet(sheet)) {
            Ok(rows) => rows,
            Err(StoreError::SheetNotFound(_)) => {
                tracing::info!(sheet, "profile sheet not found, creating it");
                ctx.write(|| store.create_sheet(sheet, layout.width()))
                    .map_err(prepare_err)?;
                Vec::new()
            }
            Err(source) => {
                return Err(ExportError::Read {
                    sheet: sheet.to_owned(),
                    source,
                })
            }
        };

        if rows.first().is_some_and(|first| layout.is_header(first)) {
            return Ok(rows);
        }
        let header = layout.header();
        if rows
            .first()
            .is_some_and(|first| first.iter().any(|c| !c.trim().is_empty()))
        {
            tracing::warn!(sheet, found = ?rows[0], "malformed header, rewriting it");
        }
        ctx.write(|| store.update_row(sheet, 1, &header))
            .map_err(prepare_err)?;
        match rows.first_mut() {
            Some(first) => *first = header,
            None => rows.push(header),
        }
        Ok(rows)
    }
}

/// Writes `update` and records in `index` whatever reached the sheet.
///
/// In cell mode every value is written before any highlight, and a failed
/// highlight only logs: the values are what makes the row current.
fn apply_update(
    store: &mut dyn SheetStore,
    ctx: &mut RunContext<'_>,
    sheet: &str,
    key: &str,
    update: &RowUpdate,
    index: &mut RowIndex,
) -> Result<(), StoreError> {
    let patches = match &update.payload {
        UpdatePayload::Row(values) => {
            ctx.write(|| store.update_row(sheet, update.position, values))?;
            index.record_update(key, update.merged.clone());
            return Ok(());
        }
        UpdatePayload::Cells(patches) => patches,
    };

    let mut applied = index
        .get(key)
        .map(|row| row.values.clone())
        .unwrap_or_default();
    applied.resize(update.merged.len(), String::new());
    for patch in patches {
        if let Err(error) =
            ctx.write(|| store.update_cell(sheet, update.position, patch.column, &patch.value))
        {
            index.record_update(key, applied);
            return Err(error);
        }
        applied[patch.column].clone_from(&patch.value);
    }
    index.record_update(key, applied);

    for patch in patches.iter().filter(|p| p.highlight) {
        let result = ctx.write(|| {
            store.highlight_cell(sheet, update.position, patch.column, Highlight::CHANGED)
        });
        if let Err(error) = result {
            tracing::warn!(
                nickname = %key,
                row = update.position,
                column = patch.column,
                error = %error,
                "failed to highlight changed cell"
            );
        }
    }
    Ok(())
}

fn record_failure(report: &mut FlushReport, nickname: String, error: StoreError) {
    tracing::error!(nickname = %nickname, error = %error, "failed to write record");
    report.failures.push(RecordFailure { nickname, error });
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
