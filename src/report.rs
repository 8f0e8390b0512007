use crate::models::{DatedEntry, ScrapeResult};
use crate::state::Change;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to serialize report: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;

/// Releases within this many days get the fresh highlight downstream
const FRESH_WINDOW_DAYS: i64 = 7;

/// The document handed to the out-of-scope page renderer
#[derive(Debug, Serialize)]
pub struct Report {
    pub generated_at: i64,
    pub items: Vec<BoardItem>,
}

/// One board's row. Failed boards keep their error visible instead of being
/// dropped, so scraper health stays observable per board.
#[derive(Debug, Serialize)]
pub struct BoardItem {
    pub vendor: String,
    pub model: String,
    pub url: String,
    /// Newest first, at most two
    pub versions: Vec<VersionOut>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Newest version differs from the last run's snapshot
    pub changed: bool,
}

#[derive(Debug, Serialize)]
pub struct VersionOut {
    pub version: String,
    pub date: Option<String>,
    pub fresh: bool,
}

/// Fresh means released within the last week; future dates don't count
pub fn is_fresh(date: Option<NaiveDate>, today: NaiveDate) -> bool {
    match date {
        Some(d) => {
            let delta = (today - d).num_days();
            (0..=FRESH_WINDOW_DAYS).contains(&delta)
        }
        None => false,
    }
}

fn version_out(entry: &DatedEntry, today: NaiveDate) -> VersionOut {
    VersionOut {
        version: entry.version.display_version(),
        date: entry.date_iso(),
        fresh: is_fresh(entry.date, today),
    }
}

pub fn build(results: &[ScrapeResult], changes: &[Change], today: NaiveDate) -> Report {
    let changed_boards: HashSet<&str> = changes.iter().map(|c| c.board.as_str()).collect();
    let items = results
        .iter()
        .map(|r| {
            let key = format!("{}/{}", r.vendor, r.model);
            BoardItem {
                vendor: r.vendor.to_string(),
                model: r.model.clone(),
                url: r.url.clone(),
                versions: r.entries.iter().map(|e| version_out(e, today)).collect(),
                ok: r.ok,
                error: r.error.clone(),
                changed: changed_boards.contains(key.as_str()),
            }
        })
        .collect();
    Report {
        generated_at: Utc::now().timestamp(),
        items,
    }
}

pub fn write<P: AsRef<Path>>(report: &Report, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(report)?;
    std::fs::write(path, content)?;
    Ok(())
}
