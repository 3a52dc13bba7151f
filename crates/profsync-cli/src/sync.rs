//! The `sync` command: stream observed records through the batch exporter.
//!
//! Fatal conditions (target queue unavailable, a final flush that cannot
//! read the sheet) end the run early, but the summary is always logged.

use std::collections::{HashMap, HashSet};

use anyhow::Context;
use chrono::Local;
use profsync_core::AppConfig;
use profsync_engine::timefmt::{local_now, observation_stamp, resolve_relative_times};
use profsync_engine::{
    BatchExporter, FlushReport, RunContext, RunStats, SheetStore, SystemClock, TargetEntry,
    TargetQueue,
};

use crate::input::read_records;
use crate::store::{load_labels, open_store};
use crate::SyncArgs;

/// Note left on a target that had no record in the input.
const NO_RECORD_NOTE: &str = "no record observed";

/// Per-identifier outcome collected from flush reports.
#[derive(Debug, Default)]
struct Outcomes {
    synced: HashSet<String>,
    failed: HashMap<String, String>,
}

impl Outcomes {
    fn absorb(&mut self, report: FlushReport) {
        for failure in report.failures {
            self.failed
                .insert(failure.nickname, failure.error.to_string());
        }
        for key in report.synced {
            self.failed.remove(&key);
            self.synced.insert(key);
        }
    }
}

pub(crate) fn run_sync(mut config: AppConfig, args: &SyncArgs) -> anyhow::Result<()> {
    apply_overrides(&mut config, args)?;
    let labels = load_labels(&config)?;
    let mut store = open_store(&config)?;
    let clock = SystemClock;
    let mut ctx = RunContext::new(&config.sync, &clock);
    let mut stats = RunStats::new(Local::now());
    let now = local_now();

    tracing::info!(
        input = %args.input.display(),
        layout = ?config.sync.layout,
        insertion = ?config.sync.insertion,
        update_mode = ?config.sync.update_mode,
        batch_size = config.sync.batch_size,
        "sync started"
    );

    let queue = TargetQueue::new(config.sync.target_sheet.clone());
    let targets = if args.targets {
        match queue.load_pending(store.as_mut(), &mut ctx) {
            Ok(targets) => Some(targets),
            Err(err) => {
                tracing::error!(error = %err, "target queue unavailable, nothing to process");
                stats.log_summary(Local::now());
                return Ok(());
            }
        }
    } else {
        None
    };
    let wanted: Option<HashSet<&str>> = targets
        .as_ref()
        .map(|t| t.iter().map(|e| e.username.as_str()).collect());

    let records = read_records(&args.input)?;
    let mut exporter = BatchExporter::new(&config.sync, &labels);
    let mut outcomes = Outcomes::default();

    for (line_no, parsed) in records {
        let mut record = match parsed {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(line = line_no, error = %err, "skipping unreadable record");
                stats.total += 1;
                stats.errors += 1;
                continue;
            }
        };
        if let Some(wanted) = &wanted {
            if !wanted.contains(record.key()) {
                tracing::debug!(nickname = %record.key(), "not a pending target, skipped");
                continue;
            }
        }
        stats.total += 1;
        if args.relative_times {
            resolve_relative_times(&mut record, now);
        }

        match exporter.push(store.as_mut(), &mut ctx, record) {
            Ok(Some(report)) => outcomes.absorb(report),
            Ok(None) => {}
            Err(err) => tracing::warn!(
                error = %err,
                pending = exporter.pending_len(),
                "flush failed, batch kept for the next attempt"
            ),
        }
    }

    match exporter.flush(store.as_mut(), &mut ctx) {
        Ok(report) => outcomes.absorb(report),
        Err(err) => {
            tracing::error!(
                error = %err,
                lost = exporter.pending_len(),
                "final flush failed"
            );
            stats.errors += exporter.pending_len();
        }
    }

    stats.absorb(exporter.stats());
    stats.tags_loaded = exporter.tags_loaded().unwrap_or(0);

    if let Some(targets) = &targets {
        update_targets(&queue, store.as_mut(), &mut ctx, targets, &outcomes, now);
    }

    stats.log_summary(Local::now());
    println!(
        "synced {} of {} records: {} new, {} updated, {} unchanged, {} errors",
        stats.success,
        stats.total,
        stats.export.new_count,
        stats.export.updated_count,
        stats.export.unchanged_count,
        stats.errors
    );
    Ok(())
}

fn apply_overrides(config: &mut AppConfig, args: &SyncArgs) -> anyhow::Result<()> {
    if let Some(layout) = args.layout {
        config.sync.layout = layout;
    }
    if let Some(insertion) = args.insertion {
        config.sync.insertion = insertion;
    }
    if let Some(update_mode) = args.update_mode {
        config.sync.update_mode = update_mode;
    }
    if let Some(batch_size) = args.batch_size {
        config.sync.batch_size =
            usize::try_from(batch_size).context("--batch-size does not fit in usize")?;
    }
    Ok(())
}

/// Completes synced targets and leaves the rest pending with a reason.
fn update_targets(
    queue: &TargetQueue,
    store: &mut dyn SheetStore,
    ctx: &mut RunContext<'_>,
    targets: &[TargetEntry],
    outcomes: &Outcomes,
    now: chrono::NaiveDateTime,
) {
    let scraped_at = observation_stamp(now);
    for entry in targets {
        let result = if outcomes.synced.contains(&entry.username) {
            queue.mark_completed(store, ctx, entry, &scraped_at, "synced")
        } else {
            let note = outcomes
                .failed
                .get(&entry.username)
                .map_or_else(|| NO_RECORD_NOTE.to_owned(), |e| format!("export failed: {e}"));
            queue.mark_pending(store, ctx, entry, &note)
        };
        if let Err(err) = result {
            tracing::warn!(username = %entry.username, error = %err, "failed to update target");
        }
    }
}

#[cfg(test)]
mod tests {
    use profsync_engine::{RecordFailure, StoreError};

    use super::*;

    #[test]
    fn later_success_clears_earlier_failure() {
        let mut outcomes = Outcomes::default();
        outcomes.absorb(FlushReport {
            failures: vec![RecordFailure {
                nickname: "ali".to_owned(),
                error: StoreError::Throttled("429".to_owned()),
            }],
            ..FlushReport::default()
        });
        assert!(outcomes.failed.contains_key("ali"));

        outcomes.absorb(FlushReport {
            synced: vec!["ali".to_owned()],
            ..FlushReport::default()
        });
        assert!(outcomes.synced.contains("ali"));
        assert!(outcomes.failed.is_empty());
    }
}
