use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Motherboard vendors with a known support-page layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Vendor {
    Asus,
    Msi,
    Gigabyte,
    Asrock,
}

impl Vendor {
    /// Parse a vendor name as written in board configs ("ASUS", "GigaByte", "asrock", ...)
    pub fn parse(s: &str) -> Option<Vendor> {
        match s.trim().to_lowercase().as_str() {
            "asus" | "asus rog" | "rog" => Some(Vendor::Asus),
            "msi" => Some(Vendor::Msi),
            "gigabyte" | "aorus" => Some(Vendor::Gigabyte),
            "asrock" => Some(Vendor::Asrock),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::Asus => "ASUS",
            Vendor::Msi => "MSI",
            Vendor::Gigabyte => "GIGABYTE",
            Vendor::Asrock => "ASRock",
        }
    }

    pub fn all() -> &'static [Vendor] {
        &[Vendor::Asus, Vendor::Msi, Vendor::Gigabyte, Vendor::Asrock]
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A version token found during a single scan of one page.
/// Lives only for the duration of the scan; the ranked survivors end up in
/// `DatedEntry`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCandidate {
    /// The matched substring exactly as it appeared
    pub raw_token: String,
    /// Uppercased form used for dedup and display
    pub normalized_token: String,
    /// A "beta" marker was found in the surrounding window
    pub is_beta: bool,
    /// Byte offset of the match start in the source text
    pub source_offset: usize,
}

impl VersionCandidate {
    pub fn new(raw: impl Into<String>, source_offset: usize) -> Self {
        let raw_token = raw.into();
        let normalized_token = raw_token.trim().to_uppercase();
        VersionCandidate {
            raw_token,
            normalized_token,
            is_beta: false,
            source_offset,
        }
    }

    /// Display form, with a uniform beta label regardless of how the vendor wrote it
    pub fn display_version(&self) -> String {
        if self.is_beta {
            format!("{} (Beta)", self.normalized_token)
        } else {
            self.normalized_token.clone()
        }
    }
}

/// A version paired with the release date found nearest to it, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedEntry {
    pub version: VersionCandidate,
    pub date: Option<NaiveDate>,
}

impl DatedEntry {
    pub fn date_iso(&self) -> Option<String> {
        self.date.map(|d| d.format("%Y-%m-%d").to_string())
    }
}

/// The externally visible outcome of scraping one board.
///
/// `ok` means a page was fetched and scanned. `entries` may still be empty
/// ("page loaded but nothing recognizable"), which is a valid terminal state
/// distinct from a fetch failure; callers that want to treat it as a soft
/// failure can check both fields.
#[derive(Debug, Clone)]
pub struct ScrapeResult {
    pub vendor: Vendor,
    pub model: String,
    pub url: String,
    /// Newest first, at most two: the "current" and "previous" version
    pub entries: Vec<DatedEntry>,
    pub ok: bool,
    pub error: Option<String>,
}

/// Error strings are truncated to keep logs and alerts readable
const MAX_ERROR_LEN: usize = 200;

impl ScrapeResult {
    pub fn success(
        vendor: Vendor,
        model: impl Into<String>,
        url: impl Into<String>,
        entries: Vec<DatedEntry>,
    ) -> Self {
        ScrapeResult {
            vendor,
            model: model.into(),
            url: url.into(),
            entries,
            ok: true,
            error: None,
        }
    }

    pub fn failure(
        vendor: Vendor,
        model: impl Into<String>,
        url: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        let mut error = error.into();
        if error.len() > MAX_ERROR_LEN {
            let cut = (0..=MAX_ERROR_LEN)
                .rev()
                .find(|&i| error.is_char_boundary(i))
                .unwrap_or(0);
            error.truncate(cut);
        }
        ScrapeResult {
            vendor,
            model: model.into(),
            url: url.into(),
            entries: Vec::new(),
            ok: false,
            error: Some(error),
        }
    }

    /// The newest entry, when one was found
    pub fn latest(&self) -> Option<&DatedEntry> {
        self.entries.first()
    }

    /// The runner-up entry
    pub fn previous(&self) -> Option<&DatedEntry> {
        self.entries.get(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_parse() {
        assert_eq!(Vendor::parse("ASUS"), Some(Vendor::Asus));
        assert_eq!(Vendor::parse("gigabyte"), Some(Vendor::Gigabyte));
        assert_eq!(Vendor::parse("ASRock"), Some(Vendor::Asrock));
        assert_eq!(Vendor::parse(" msi "), Some(Vendor::Msi));
        assert_eq!(Vendor::parse("intel"), None);
    }

    #[test]
    fn test_candidate_normalization() {
        let cand = VersionCandidate::new("F22a", 10);
        assert_eq!(cand.raw_token, "F22a");
        assert_eq!(cand.normalized_token, "F22A");
        assert!(!cand.is_beta);
        assert_eq!(cand.source_offset, 10);
    }

    #[test]
    fn test_beta_display() {
        let mut cand = VersionCandidate::new("P3.90", 0);
        assert_eq!(cand.display_version(), "P3.90");
        cand.is_beta = true;
        assert_eq!(cand.display_version(), "P3.90 (Beta)");
    }

    #[test]
    fn test_error_truncated() {
        let long = "x".repeat(500);
        let res = ScrapeResult::failure(Vendor::Msi, "B650 TOMAHAWK", "https://example.com", long);
        assert!(!res.ok);
        assert_eq!(res.error.as_ref().unwrap().len(), 200);
        assert!(res.entries.is_empty());
    }

    #[test]
    fn test_success_has_no_error() {
        let res = ScrapeResult::success(Vendor::Asus, "PRIME X670-P", "https://example.com", vec![]);
        assert!(res.ok);
        assert!(res.error.is_none());
        assert!(res.latest().is_none());
    }
}
