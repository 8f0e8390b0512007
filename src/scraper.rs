use crate::config::Board;
use crate::extract;
use crate::fetch::FetchLadder;
use crate::models::{ScrapeResult, Vendor};
use crate::ratelimit::HostPacer;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

/// Scrapes one board at a time: guess support URLs, walk the fetch ladder,
/// run the extraction pipeline, and always come back with a `ScrapeResult`.
/// Errors never cross this boundary.
pub struct BoardScraper {
    ladder: FetchLadder,
    pacer: HostPacer,
    snapshot_dir: Option<PathBuf>,
}

impl BoardScraper {
    pub fn new(ladder: FetchLadder, pacer: HostPacer) -> Self {
        BoardScraper {
            ladder,
            pacer,
            snapshot_dir: None,
        }
    }

    /// Keep fetched HTML under `dir` for offline diagnosis
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }

    /// Newest two versions for a board.
    ///
    /// URL candidates are tried in order. The first page that yields entries
    /// wins. A page that fetched but yielded nothing leaves `ok=true` with
    /// empty entries; only when no page fetched at all does the result turn
    /// into a failure.
    pub async fn latest_two(&self, board: &Board) -> ScrapeResult {
        let urls = candidate_urls(board.vendor, &board.model, board.url.as_deref());
        let mut last_err: Option<String> = None;
        let mut fetched_url: Option<String> = None;

        for url in &urls {
            if let Some(host) = host_of(url) {
                self.pacer.pause(&host).await;
            }
            match self.ladder.fetch_page(url).await {
                Ok(html) => {
                    self.maybe_snapshot(board.vendor, url, &html);
                    let entries = extract::extract_entries(&html, board.vendor);
                    if !entries.is_empty() {
                        tracing::info!(board = %board.model, vendor = %board.vendor, url = %url, found = entries.len(), "scrape ok");
                        return ScrapeResult::success(board.vendor, &board.model, url, entries);
                    }
                    fetched_url.get_or_insert_with(|| url.clone());
                }
                Err(e) => {
                    last_err = Some(e.to_string());
                }
            }
        }

        if let Some(url) = fetched_url {
            tracing::info!(board = %board.model, vendor = %board.vendor, "page loaded but nothing recognizable");
            return ScrapeResult::success(board.vendor, &board.model, url, Vec::new());
        }

        let url = urls.first().cloned().unwrap_or_default();
        let reason = last_err.unwrap_or_else(|| "no candidate urls".to_string());
        tracing::warn!(board = %board.model, vendor = %board.vendor, %reason, "scrape failed");
        ScrapeResult::failure(
            board.vendor,
            &board.model,
            url,
            format!("fetch/parse failed: {reason}"),
        )
    }

    /// Convenience truncation to the single newest version
    pub async fn latest_one(&self, board: &Board) -> ScrapeResult {
        let mut result = self.latest_two(board).await;
        result.entries.truncate(1);
        result
    }

    fn maybe_snapshot(&self, vendor: Vendor, url: &str, html: &str) {
        let Some(dir) = &self.snapshot_dir else {
            return;
        };
        let dir = dir.join(vendor.as_str().to_lowercase());
        let path = dir.join(snapshot_filename(url));
        if let Err(e) = std::fs::create_dir_all(&dir).and_then(|_| std::fs::write(&path, html)) {
            tracing::warn!(path = %path.display(), error = %e, "failed to write debug snapshot");
        }
    }
}

static UNSAFE_FILENAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").unwrap());

fn snapshot_filename(url: &str) -> String {
    let safe = UNSAFE_FILENAME.replace_all(url, "_");
    let mut name: String = safe.chars().take(120).collect();
    name.push_str(".html");
    name
}

pub fn host_of(url: &str) -> Option<String> {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

/// Candidate support URLs for a board, most likely first. An explicit URL
/// from the config short-circuits guessing.
pub fn candidate_urls(vendor: Vendor, model: &str, override_url: Option<&str>) -> Vec<String> {
    if let Some(url) = override_url {
        return vec![url.to_string()];
    }
    let urls = match vendor {
        Vendor::Asus => asus_urls(model),
        Vendor::Msi => msi_urls(model),
        Vendor::Gigabyte => gigabyte_urls(model),
        Vendor::Asrock => asrock_urls(model),
    };
    dedupe_keep_order(urls)
}

fn dedupe_keep_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    urls.into_iter().filter(|u| seen.insert(u.clone())).collect()
}

fn asus_urls(model: &str) -> Vec<String> {
    let slug = model.trim().to_lowercase().replace([' ', '/'], "-");
    vec![format!(
        "https://www.asus.com/supportonly/{slug}/helpdesk_bios/"
    )]
}

fn gigabyte_urls(model: &str) -> Vec<String> {
    let slug = model
        .trim()
        .replace('/', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    vec![
        format!("https://www.gigabyte.com/Motherboard/{slug}/support#support-dl-bios"),
        format!(
            "https://www.gigabyte.com/Motherboard/{}/support#support-dl-bios",
            slug.to_uppercase()
        ),
        format!(
            "https://www.gigabyte.com/Motherboard/{}/support#support-dl-bios",
            title_slug(&slug)
        ),
        format!("https://www.gigabyte.com/Motherboard/{slug}-rev-1x/support#support-dl-bios"),
    ]
}

fn msi_urls(model: &str) -> Vec<String> {
    let slug = model.trim().replace(' ', "-");
    let mut urls = Vec::new();
    for host in ["us.msi.com", "www.msi.com"] {
        for anchor in ["down-bios", "bios", ""] {
            let mut url = format!("https://{host}/Motherboard/{slug}/support");
            if !anchor.is_empty() {
                url.push('#');
                url.push_str(anchor);
            }
            urls.push(url);
        }
    }
    urls
}

fn asrock_urls(model: &str) -> Vec<String> {
    let slug = urlencoding::encode(model.trim()).into_owned();
    vec![
        format!("https://www.asrock.com/MB/AllSeries/{slug}/index.asp#BIOS"),
        format!("https://www.asrock.com/mb/AMD/{slug}/index.asp#BIOS"),
        format!("https://www.asrock.com/mb/Intel/{slug}/index.asp#BIOS"),
    ]
}

/// "b650-aorus-elite-ax" -> "B650-Aorus-Elite-Ax"
fn title_slug(slug: &str) -> String {
    let mut out = String::with_capacity(slug.len());
    let mut at_word_start = true;
    for c in slug.chars() {
        if c.is_ascii_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
