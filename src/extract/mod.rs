pub mod context;
pub mod dates;
pub mod grammar;
pub mod rank;
pub mod scanner;

use crate::models::{DatedEntry, Vendor};

/// Run the full extraction pipeline over one page's text: scan for
/// version-shaped tokens, reject noise contexts, pair each survivor with its
/// nearest date and rank down to the top two.
///
/// An empty result is a valid outcome ("page loaded but nothing
/// recognizable"); the caller distinguishes it from a fetch failure.
pub fn extract_entries(text: &str, vendor: Vendor) -> Vec<DatedEntry> {
    let profile = grammar::profile(vendor);
    let candidates = scanner::scan(text, profile);
    let scanned = candidates.len();

    let mut entries = Vec::new();
    for mut cand in candidates {
        let start = cand.source_offset;
        let end = start + cand.raw_token.len();
        let range = context::window_around(text, start, end, profile.window_radius);
        let window = &text[range.clone()];
        if !context::accept(window, profile) {
            continue;
        }
        if context::marks_beta(window) && !cand.raw_token.to_lowercase().contains("beta") {
            cand.is_beta = true;
        }
        let date = dates::nearest_date(window, start - range.start);
        entries.push(DatedEntry {
            version: cand,
            date,
        });
    }

    let top = rank::top_two(entries, profile);
    tracing::debug!(
        vendor = %vendor,
        scanned,
        kept = top.len(),
        "extracted version entries"
    );
    top
}
