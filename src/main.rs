use bioswatch::batch::BatchRunner;
use bioswatch::config::Config;
use bioswatch::fetch::{FetchLadder, StaticFetcher};
use bioswatch::ratelimit::HostPacer;
use bioswatch::report;
use bioswatch::scraper::BoardScraper;
use bioswatch::state::Snapshot;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_file("config.toml")?;
    println!("✓ Configuration loaded");

    let boards = config.resolved_boards();
    if boards.is_empty() {
        println!("No boards configured; nothing to do.");
        return Ok(());
    }
    println!("✓ {} boards configured", boards.len());

    // Build the fetch ladder and pacing
    let fetcher = StaticFetcher::new(Duration::from_secs(config.scraping.timeout_seconds))?;
    let ladder = FetchLadder::new(Box::new(fetcher)).with_retry_policy(
        config.scraping.retries,
        config.scraping.backoff_ms,
        config.scraping.backoff_max_ms,
    );
    let pacer = HostPacer::new(config.scraping.delay_min_ms, config.scraping.delay_max_ms);

    let mut scraper = BoardScraper::new(ladder, pacer);
    if config.output.debug_snapshots {
        scraper = scraper.with_snapshot_dir(&config.output.debug_dir);
    }

    // Scrape every board; failures stay per-board
    let runner = BatchRunner::new(scraper, config.scraping.concurrent_boards);
    let results = runner.run(&boards).await;

    // Fold into the previous-run snapshot to find version bumps
    let mut snapshot = Snapshot::load(&config.output.state_path);
    let mut changes = Vec::new();
    for (board, result) in boards.iter().zip(&results) {
        if let Some(change) = snapshot.observe(&board.key(), result) {
            match &change.previous {
                Some(prev) => println!("✓ [{}] {} -> {}", change.board, prev, change.current),
                None => println!("✓ [{}] first sighting: {}", change.board, change.current),
            }
            changes.push(change);
        }
    }

    let today = chrono::Utc::now().date_naive();
    let report = report::build(&results, &changes, today);
    report::write(&report, &config.output.data_path)?;
    snapshot.save(&config.output.state_path)?;

    let failed = results.iter().filter(|r| !r.ok).count();
    println!(
        "✓ Wrote {} ({} boards, {} failed, {} changed)",
        config.output.data_path,
        results.len(),
        failed,
        changes.len()
    );
    Ok(())
}
