//! Runs one aggregation and prints the feed as text cards.
//!
//! Usage: `feed_demo [all|video|microblog]`

use std::sync::Arc;

use chrono::Utc;
use feed_aggregator::display::card_text;
use feed_aggregator::{Aggregator, FeedConfig, FeedHandle, PlatformFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    feed_aggregator::init_tracing();

    let filter: PlatformFilter = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => PlatformFilter::All,
    };

    let cfg = FeedConfig::load_default()?;
    let feed = FeedHandle::new();
    feed.load(Arc::new(Aggregator::from_config(&cfg))).await;
    feed.set_filter(filter);

    let snap = feed.snapshot();
    for err in &snap.errors {
        eprintln!("{}", err.notice());
    }

    if snap.visible.is_empty() {
        println!("No feeds to display.");
        return Ok(());
    }

    let now = Utc::now();
    println!("{} of {} items (filter: {})\n", snap.visible.len(), snap.total, snap.filter);
    for item in &snap.visible {
        println!("{}", card_text(item, now));
    }
    Ok(())
}
