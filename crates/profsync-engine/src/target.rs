//! The target work queue: which identifiers still need a sync.
//!
//! The target sheet has the header `USERNAME, STATUS, LAST_SCRAPED, NOTES`.
//! Status is read case-insensitively and always written as `Pending` or
//! `Completed`. A missing sheet or a wrong header ends queue processing for
//! the run.

use std::str::FromStr;

use crate::context::RunContext;
use crate::error::{StoreError, TargetError};
use crate::store::SheetStore;

pub const TARGET_HEADER: [&str; 4] = ["USERNAME", "STATUS", "LAST_SCRAPED", "NOTES"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStatus {
    Pending,
    Completed,
}

impl TargetStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TargetStatus::Pending => "Pending",
            TargetStatus::Completed => "Completed",
        }
    }
}

impl FromStr for TargetStatus {
    type Err = String;

    /// An empty status is a freshly added target and counts as pending.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "PENDING" => Ok(TargetStatus::Pending),
            "COMPLETED" => Ok(TargetStatus::Completed),
            other => Err(format!("unknown target status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEntry {
    pub username: String,
    pub status: TargetStatus,
    pub last_scraped: String,
    pub notes: String,
    /// 1-based row in the target sheet.
    pub row: usize,
}

#[derive(Debug, Clone)]
pub struct TargetQueue {
    sheet: String,
}

impl TargetQueue {
    #[must_use]
    pub fn new(sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
        }
    }

    /// Reads the queue and returns the pending entries in sheet order.
    ///
    /// # Errors
    ///
    /// [`TargetError::MissingSheet`], [`TargetError::MalformedHeader`], or the
    /// underlying store failure.
    pub fn load_pending(
        &self,
        store: &mut dyn SheetStore,
        ctx: &mut RunContext<'_>,
    ) -> Result<Vec<TargetEntry>, TargetError> {
        let rows = match ctx.read(|| store.read_sheet(&self.sheet)) {
            Ok(rows) => rows,
            Err(StoreError::SheetNotFound(_)) => {
                return Err(TargetError::MissingSheet(self.sheet.clone()))
            }
            Err(err) => return Err(err.into()),
        };

        let header = rows.first().cloned().unwrap_or_default();
        let header_ok = header.len() >= TARGET_HEADER.len()
            && TARGET_HEADER
                .iter()
                .zip(&header)
                .all(|(want, got)| got.trim().eq_ignore_ascii_case(want));
        if !header_ok {
            return Err(TargetError::MalformedHeader {
                sheet: self.sheet.clone(),
                found: header,
            });
        }

        let mut pending = Vec::new();
        for (offset, row) in rows.iter().enumerate().skip(1) {
            let username = cell(row, 0);
            if username.is_empty() {
                continue;
            }
            let status = match cell(row, 1).parse::<TargetStatus>() {
                Ok(status) => status,
                Err(reason) => {
                    tracing::warn!(row = offset + 1, username = %username, %reason, "skipping target");
                    continue;
                }
            };
            if status == TargetStatus::Pending {
                pending.push(TargetEntry {
                    username,
                    status,
                    last_scraped: cell(row, 2),
                    notes: cell(row, 3),
                    row: offset + 1,
                });
            }
        }
        tracing::info!(sheet = %self.sheet, pending = pending.len(), "target queue loaded");
        Ok(pending)
    }

    /// Marks `entry` completed with the scrape time and a note.
    ///
    /// # Errors
    ///
    /// The underlying store failure.
    pub fn mark_completed(
        &self,
        store: &mut dyn SheetStore,
        ctx: &mut RunContext<'_>,
        entry: &TargetEntry,
        scraped_at: &str,
        note: &str,
    ) -> Result<(), TargetError> {
        self.write_status(store, ctx, entry, TargetStatus::Completed, scraped_at, note)
    }

    /// Leaves `entry` pending with an updated note; LAST_SCRAPED is kept.
    ///
    /// # Errors
    ///
    /// The underlying store failure.
    pub fn mark_pending(
        &self,
        store: &mut dyn SheetStore,
        ctx: &mut RunContext<'_>,
        entry: &TargetEntry,
        note: &str,
    ) -> Result<(), TargetError> {
        self.write_status(
            store,
            ctx,
            entry,
            TargetStatus::Pending,
            &entry.last_scraped,
            note,
        )
    }

    fn write_status(
        &self,
        store: &mut dyn SheetStore,
        ctx: &mut RunContext<'_>,
        entry: &TargetEntry,
        status: TargetStatus,
        last_scraped: &str,
        note: &str,
    ) -> Result<(), TargetError> {
        let values = [
            entry.username.clone(),
            status.as_str().to_owned(),
            last_scraped.to_owned(),
            note.to_owned(),
        ];
        ctx.write(|| store.update_row(&self.sheet, entry.row, &values))?;
        tracing::debug!(username = %entry.username, status = status.as_str(), "target updated");
        Ok(())
    }
}

fn cell(row: &[String], i: usize) -> String {
    row.get(i).map_or("", |v| v.trim()).to_owned()
}

#[cfg(test)]
mod tests {
    use profsync_core::SyncConfig;

    use super::*;
    use crate::clock::ManualClock;
    use crate::store::{MemoryStore, StoreOp};

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_owned()).collect()
    }

    fn queue_store() -> MemoryStore {
        MemoryStore::new().with_sheet(
            "Target",
            vec![
                row(&["username", "Status", "LAST_SCRAPED", "NOTES"]),
                row(&["ali", "PENDING", "", ""]),
                row(&["sana", "completed", "09-Jan-24 10:00 AM", "ok"]),
                row(&["", "pending"]),
                row(&["zara"]),
                row(&["omar", "archived"]),
            ],
        )
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!("pEnDiNg".parse::<TargetStatus>(), Ok(TargetStatus::Pending));
        assert_eq!(" COMPLETED ".parse::<TargetStatus>(), Ok(TargetStatus::Completed));
        assert!("done".parse::<TargetStatus>().is_err());
    }

    #[test]
    fn load_returns_pending_entries_with_rows() {
        let clock = ManualClock::new();
        let mut ctx = RunContext::new(&SyncConfig::default(), &clock);
        let mut store = queue_store();
        let pending = TargetQueue::new("Target")
            .load_pending(&mut store, &mut ctx)
            .unwrap();
        let found: Vec<(&str, usize)> = pending
            .iter()
            .map(|e| (e.username.as_str(), e.row))
            .collect();
        assert_eq!(found, vec![("ali", 2), ("zara", 5)]);
    }

    #[test]
    fn missing_sheet_is_fatal() {
        let clock = ManualClock::new();
        let mut ctx = RunContext::new(&SyncConfig::default(), &clock);
        let mut store = MemoryStore::new();
        let err = TargetQueue::new("Target")
            .load_pending(&mut store, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, TargetError::MissingSheet(ref s) if s == "Target"));
    }

    #[test]
    fn malformed_header_is_fatal() {
        let clock = ManualClock::new();
        let mut ctx = RunContext::new(&SyncConfig::default(), &clock);
        let mut store =
            MemoryStore::new().with_sheet("Target", vec![row(&["USER", "STATUS"]), row(&["ali"])]);
        let err = TargetQueue::new("Target")
            .load_pending(&mut store, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, TargetError::MalformedHeader { .. }));
    }

    #[test]
    fn mark_completed_writes_canonical_status() {
        let clock = ManualClock::new();
        let mut ctx = RunContext::new(&SyncConfig::default(), &clock);
        let mut store = queue_store();
        let queue = TargetQueue::new("Target");
        let pending = queue.load_pending(&mut store, &mut ctx).unwrap();

        queue
            .mark_completed(&mut store, &mut ctx, &pending[0], "10-Jan-24 03:00 PM", "synced")
            .unwrap();
        assert_eq!(
            store.rows("Target").unwrap()[1],
            row(&["ali", "Completed", "10-Jan-24 03:00 PM", "synced"])
        );
    }

    #[test]
    fn mark_pending_keeps_last_scraped_and_updates_note() {
        let clock = ManualClock::new();
        let mut ctx = RunContext::new(&SyncConfig::default(), &clock);
        let mut store = queue_store();
        let queue = TargetQueue::new("Target");
        let entry = TargetEntry {
            username: "zara".to_owned(),
            status: TargetStatus::Pending,
            last_scraped: "08-Jan-24 11:00 AM".to_owned(),
            notes: String::new(),
            row: 5,
        };
        queue
            .mark_pending(&mut store, &mut ctx, &entry, "no record observed")
            .unwrap();
        assert_eq!(
            store.rows("Target").unwrap()[4],
            row(&["zara", "Pending", "08-Jan-24 11:00 AM", "no record observed"])
        );
        assert_eq!(store.count_calls(StoreOp::UpdateRow), 1);
    }
}
