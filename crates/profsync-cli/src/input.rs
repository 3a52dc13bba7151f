//! Observed records arrive as JSON Lines, one object per line keyed by the
//! profile sheet headers. Blank lines are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use anyhow::Context;
use profsync_core::ProfileRecord;

pub(crate) struct RecordLines<R> {
    lines: Lines<R>,
    line_no: usize,
}

/// Opens `path` for line-by-line record parsing.
pub(crate) fn read_records(path: &Path) -> anyhow::Result<RecordLines<BufReader<File>>> {
    let file =
        File::open(path).with_context(|| format!("failed to open input {}", path.display()))?;
    Ok(RecordLines::new(BufReader::new(file)))
}

impl<R: BufRead> RecordLines<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for RecordLines<R> {
    /// 1-based line number and the parsed record.
    type Item = (usize, anyhow::Result<ProfileRecord>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_no += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some((self.line_no, Err(e.into()))),
            };
            if line.trim().is_empty() {
                continue;
            }
            let parsed = serde_json::from_str::<ProfileRecord>(&line)
                .with_context(|| format!("invalid record on line {}", self.line_no));
            return Some((self.line_no, parsed));
        }
    }
}
