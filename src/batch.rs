use crate::config::Board;
use crate::models::ScrapeResult;
use crate::scraper::BoardScraper;
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Drives the configured boards through one scraper.
///
/// Boards are independent: no shared mutable state, one board's failure
/// never aborts the batch, and every board produces its own `ScrapeResult`.
/// Concurrency is bounded; 1 reproduces the original sequential behavior.
/// Per-host pacing lives in the scraper, so parallel boards on the same
/// vendor host still space their requests.
pub struct BatchRunner {
    scraper: Arc<BoardScraper>,
    concurrency: usize,
}

impl BatchRunner {
    pub fn new(scraper: BoardScraper, concurrency: usize) -> Self {
        BatchRunner {
            scraper: Arc::new(scraper),
            concurrency: concurrency.max(1),
        }
    }

    /// Scrape all boards; results come back in config order
    pub async fn run(&self, boards: &[Board]) -> Vec<ScrapeResult> {
        tracing::info!(boards = boards.len(), concurrency = self.concurrency, "starting batch");
        let results: Vec<ScrapeResult> = stream::iter(boards.to_vec())
            .map(|board| {
                let scraper = Arc::clone(&self.scraper);
                async move { scraper.latest_two(&board).await }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let failed = results.iter().filter(|r| !r.ok).count();
        tracing::info!(total = results.len(), failed, "batch finished");
        results
    }
}
