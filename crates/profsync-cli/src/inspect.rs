//! Read-only commands: `tags`, `targets`, `normalize`.

use anyhow::Context;
use profsync_core::AppConfig;
use profsync_engine::timefmt::{local_now, post_timestamp, relative_to_date};
use profsync_engine::{RunContext, SystemClock, TagIndex, TargetQueue};

use crate::store::{load_labels, open_store};

pub(crate) fn run_tags(config: &AppConfig) -> anyhow::Result<()> {
    let labels = load_labels(config)?;
    let mut store = open_store(config)?;
    let clock = SystemClock;
    let mut ctx = RunContext::new(&config.sync, &clock);

    let index = TagIndex::load(store.as_mut(), &mut ctx, &config.sync.tags_sheet, &labels)
        .with_context(|| format!("failed to read tags sheet {}", config.sync.tags_sheet))?;
    for (nickname, tags) in index.entries() {
        println!("{nickname}\t{tags}");
    }
    println!("{} tagged identifiers", index.len());
    Ok(())
}

pub(crate) fn run_targets(config: &AppConfig) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    let clock = SystemClock;
    let mut ctx = RunContext::new(&config.sync, &clock);

    let queue = TargetQueue::new(config.sync.target_sheet.clone());
    let pending = queue
        .load_pending(store.as_mut(), &mut ctx)
        .context("failed to load target queue")?;
    for entry in &pending {
        println!(
            "row {}\t{}\t{}\t{}",
            entry.row, entry.username, entry.last_scraped, entry.notes
        );
    }
    println!("{} pending targets", pending.len());
    Ok(())
}

pub(crate) fn run_normalize(phrase: &str) {
    let now = local_now();
    println!("date:      {}", relative_to_date(phrase, now));
    println!("timestamp: {}", post_timestamp(phrase, now));
}
