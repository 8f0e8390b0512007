use super::grammar::VendorProfile;
use crate::models::DatedEntry;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Collapse duplicates, suppress numeric outliers where the vendor profile
/// asks for it, order newest-first and keep the top two.
pub fn top_two(entries: Vec<DatedEntry>, profile: &VendorProfile) -> Vec<DatedEntry> {
    let mut seen = HashSet::new();
    let mut unique: Vec<DatedEntry> = entries
        .into_iter()
        .filter(|e| seen.insert(e.version.normalized_token.clone()))
        .collect();

    if let Some(slack) = profile.outlier_slack {
        suppress_outliers(&mut unique, slack);
    }

    // Stable sort keeps document order for fully tied entries, so the
    // first-seen duplicate still wins its position
    unique.sort_by(compare_newest_first);
    unique.truncate(2);
    unique
}

fn compare_newest_first(a: &DatedEntry, b: &DatedEntry) -> Ordering {
    match (a.date, b.date) {
        (Some(da), Some(db)) => db
            .cmp(&da)
            .then_with(|| version_key_cmp(&b.version.normalized_token, &a.version.normalized_token)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => {
            version_key_cmp(&b.version.normalized_token, &a.version.normalized_token)
        }
    }
}

fn version_key_cmp(a: &str, b: &str) -> Ordering {
    version_sort_key(a).cmp(&version_sort_key(b))
}

/// Version-ordering key: alternating digit and letter runs, numbers compared
/// as integers (F22 > F8), letters ranked A=1..Z=26 so F22B > F22A and MSI
/// suffixes like 1P3 order by [1, P, 3].
pub fn version_sort_key(token: &str) -> Vec<u32> {
    let mut key = Vec::new();
    let mut digits = String::new();
    for c in token.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        flush_digits(&mut digits, &mut key);
        if c.is_ascii_alphabetic() {
            key.push(letter_rank(c));
        }
        // separators ('.', '-', spaces) only split runs
    }
    flush_digits(&mut digits, &mut key);
    key
}

fn flush_digits(digits: &mut String, key: &mut Vec<u32>) {
    if digits.is_empty() {
        return;
    }
    let n = digits.parse::<u64>().unwrap_or(u64::from(u32::MAX));
    key.push(n.min(u64::from(u32::MAX)) as u32);
    digits.clear();
}

fn letter_rank(c: char) -> u32 {
    (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1
}

/// First digit run as an integer; the piece outlier suppression and
/// F-number comparisons care about
pub fn numeric_component(token: &str) -> Option<u32> {
    let start = token.find(|c: char| c.is_ascii_digit())?;
    let digits: String = token[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Drop candidates whose numeric component sits far above the median of the
/// scanned set. Isolated page widgets occasionally inject a spurious
/// high-numbered token that would otherwise rank first.
fn suppress_outliers(entries: &mut Vec<DatedEntry>, slack: u32) {
    let mut comps: Vec<u32> = entries
        .iter()
        .filter_map(|e| numeric_component(&e.version.normalized_token))
        .collect();
    if comps.len() < 2 {
        return;
    }
    comps.sort_unstable();
    let mid = comps.len() / 2;
    let median = if comps.len() % 2 == 1 {
        comps[mid]
    } else {
        ((u64::from(comps[mid - 1]) + u64::from(comps[mid])) / 2) as u32
    };
    let cap = median.saturating_add(slack);
    entries.retain(|e| match numeric_component(&e.version.normalized_token) {
        Some(n) => n <= cap,
        None => true,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::grammar::profile;
    use crate::models::{Vendor, VersionCandidate};
    use chrono::NaiveDate;

    fn entry(token: &str, date: Option<(i32, u32, u32)>) -> DatedEntry {
        DatedEntry {
            version: VersionCandidate::new(token, 0),
            date: date.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap()),
        }
    }

    #[test]
    fn test_newer_date_beats_bigger_version() {
        let entries = vec![
            entry("F22", Some((2025, 1, 1))),
            entry("F8", Some((2025, 6, 1))),
        ];
        let top = top_two(entries, profile(Vendor::Gigabyte));
        assert_eq!(top[0].version.normalized_token, "F8");
        assert_eq!(top[1].version.normalized_token, "F22");
    }

    #[test]
    fn test_undated_sort_after_dated() {
        let entries = vec![entry("F30", None), entry("F2", Some((2020, 1, 1)))];
        let top = top_two(entries, profile(Vendor::Gigabyte));
        assert_eq!(top[0].version.normalized_token, "F2");
    }

    #[test]
    fn test_letter_tiebreak() {
        let entries = vec![entry("F22A", None), entry("F22B", None)];
        let top = top_two(entries, profile(Vendor::Gigabyte));
        assert_eq!(top[0].version.normalized_token, "F22B");
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        let entries = vec![entry("F8", None), entry("F22", None)];
        let top = top_two(entries, profile(Vendor::Gigabyte));
        assert_eq!(top[0].version.normalized_token, "F22");
    }

    #[test]
    fn test_dedup_case_insensitive_first_wins() {
        let entries = vec![
            entry("F22a", Some((2025, 1, 1))),
            entry("F22A", Some((2024, 1, 1))),
            entry("F21", None),
        ];
        let top = top_two(entries, profile(Vendor::Gigabyte));
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].version.normalized_token, "F22A");
        assert_eq!(top[0].date, NaiveDate::from_ymd_opt(2025, 1, 1));
    }

    #[test]
    fn test_bounded_to_two() {
        let entries = vec![
            entry("F10", None),
            entry("F9", None),
            entry("F8", None),
            entry("F7", None),
        ];
        assert_eq!(top_two(entries, profile(Vendor::Gigabyte)).len(), 2);
    }

    #[test]
    fn test_outlier_suppressed() {
        let entries = vec![entry("F8", None), entry("F9", None), entry("F79", None)];
        let top = top_two(entries, profile(Vendor::Gigabyte));
        let tokens: Vec<_> = top
            .iter()
            .map(|e| e.version.normalized_token.as_str())
            .collect();
        assert_eq!(tokens, vec!["F9", "F8"]);
    }

    #[test]
    fn test_outlier_rule_is_gigabyte_only() {
        let entries = vec![
            entry("1102", None),
            entry("1106", None),
            entry("3607", None),
        ];
        let top = top_two(entries, profile(Vendor::Asus));
        assert_eq!(top[0].version.normalized_token, "3607");
    }

    #[test]
    fn test_msi_suffix_ordering() {
        let entries = vec![entry("7D75V1B", None), entry("7D75V1C", None)];
        let top = top_two(entries, profile(Vendor::Msi));
        assert_eq!(top[0].version.normalized_token, "7D75V1C");
    }

    #[test]
    fn test_version_sort_key_shapes() {
        assert!(version_sort_key("F22") > version_sort_key("F8"));
        assert!(version_sort_key("F22B") > version_sort_key("F22A"));
        assert!(version_sort_key("F22A") > version_sort_key("F22"));
        assert!(version_sort_key("P3.90") > version_sort_key("P3.89"));
        assert!(version_sort_key("19.03") > version_sort_key("3.10"));
    }

    #[test]
    fn test_numeric_component() {
        assert_eq!(numeric_component("F22A"), Some(22));
        assert_eq!(numeric_component("1606"), Some(1606));
        assert_eq!(numeric_component("P3.90"), Some(3));
        assert_eq!(numeric_component("ABC"), None);
    }
}
