use super::grammar::VendorProfile;
use crate::models::VersionCandidate;

/// Scan raw page text for version-shaped tokens using the vendor's grammar.
///
/// One pass over the text, candidates in order of first occurrence. The input
/// may be stripped text or full markup; the grammar is applied either way.
/// Pure function: same text in, same candidates out.
pub fn scan(text: &str, profile: &VendorProfile) -> Vec<VersionCandidate> {
    let mut spans: Vec<(usize, usize, usize)> = Vec::new();
    for (priority, pattern) in profile.token_patterns.iter().enumerate() {
        for m in pattern.find_iter(text) {
            spans.push((m.start(), priority, m.end()));
        }
    }
    // Document order; on identical start the earlier-listed grammar wins
    spans.sort_by_key(|&(start, priority, _)| (start, priority));

    let mut candidates = Vec::new();
    let mut claimed_end = 0usize;
    for (start, _, end) in spans {
        // A span inside an already-claimed match is the lower-priority
        // grammar re-reading the same token
        if start < claimed_end {
            continue;
        }
        let token = &text[start..end];
        if !token_shape_ok(token, text, start, end, profile) {
            continue;
        }
        claimed_end = end;
        candidates.push(VersionCandidate::new(token, start));
    }
    candidates
}

fn token_shape_ok(
    token: &str,
    text: &str,
    start: usize,
    end: usize,
    profile: &VendorProfile,
) -> bool {
    if profile.reject_compound_adjacent && compound_adjacent(text, start, end) {
        return false;
    }
    if profile.digit_flanked_v && !token.to_uppercase().contains("AMS.") && !digit_flanked_v(token)
    {
        return false;
    }
    if let Some(limits) = profile.plain_digit_limits {
        if token.bytes().all(|b| b.is_ascii_digit()) {
            if token.len() < limits.min_len {
                return false;
            }
            let n = match token.parse::<u32>() {
                Ok(n) if n <= limits.max_value => n,
                _ => return false,
            };
            if limits.reject_years && token.len() == 4 && (1900..=2099).contains(&n) {
                return false;
            }
        }
    }
    true
}

/// True when the match butts up against a compound separator, i.e. it is one
/// segment of a dotted version like 19.0.5.1992 or a numeric date like
/// 2025/01/20
fn compound_adjacent(text: &str, start: usize, end: usize) -> bool {
    let is_sep = |b: u8| matches!(b, b'.' | b'/' | b'-');
    let bytes = text.as_bytes();
    let before = start.checked_sub(1).map(|i| bytes[i]);
    let after = bytes.get(end).copied();
    before.is_some_and(is_sep) || after.is_some_and(is_sep)
}

/// MSI v-tags need a digit on both sides of the separator: 7D75v1P3 yes,
/// OVERVIEW no
fn digit_flanked_v(token: &str) -> bool {
    let chars: Vec<char> = token.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if !c.eq_ignore_ascii_case(&'v') {
            continue;
        }
        let prefix = &chars[..i];
        let suffix = &chars[i + 1..];
        if (4..=6).contains(&prefix.len())
            && (1..=5).contains(&suffix.len())
            && prefix.iter().any(|c| c.is_ascii_digit())
            && suffix.iter().any(|c| c.is_ascii_digit())
        {
            return true;
        }
    }
    false
}
