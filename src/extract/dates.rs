use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // 2025-08-04, 2025/08/04, 2025.08.04
    static ref DATE_YMD: Regex =
        Regex::new(r"\b([0-9]{4})[./-]([0-9]{1,2})[./-]([0-9]{1,2})\b").unwrap();
    // Aug 12, 2025 / August 12, 2025 / Aug. 12 2025
    static ref DATE_MONTH_NAME: Regex = Regex::new(
        r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?|jul(?:y)?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+([0-9]{1,2}),?\s+([0-9]{4})\b"
    )
    .unwrap();
}

/// Find the date token closest to `center` (a byte offset into `window`) and
/// normalize it. Vendor rows often carry both a release date and a
/// "last checked" timestamp; picking the nearest one is what keeps a
/// version from stealing its neighbour's date. Equidistant matches prefer
/// the numeric grammar. Dates that fail calendar validation are skipped,
/// never raised.
pub fn nearest_date(window: &str, center: usize) -> Option<NaiveDate> {
    // (distance, grammar rank, date); lower wins on both keys
    let mut best: Option<(usize, u8, NaiveDate)> = None;

    let mut consider = |start: usize, rank: u8, date: NaiveDate| {
        let dist = start.abs_diff(center);
        let better = match best {
            None => true,
            Some((bd, br, _)) => dist < bd || (dist == bd && rank < br),
        };
        if better {
            best = Some((dist, rank, date));
        }
    };

    for caps in DATE_YMD.captures_iter(window) {
        if let Some(date) = ymd_from_caps(&caps) {
            consider(caps.get(0).map(|m| m.start()).unwrap_or(0), 0, date);
        }
    }
    for caps in DATE_MONTH_NAME.captures_iter(window) {
        if let Some(date) = month_name_from_caps(&caps) {
            consider(caps.get(0).map(|m| m.start()).unwrap_or(0), 1, date);
        }
    }

    best.map(|(_, _, date)| date)
}

fn ymd_from_caps(caps: &regex::Captures<'_>) -> Option<NaiveDate> {
    let y: i32 = caps.get(1)?.as_str().parse().ok()?;
    let m: u32 = caps.get(2)?.as_str().parse().ok()?;
    let d: u32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

fn month_name_from_caps(caps: &regex::Captures<'_>) -> Option<NaiveDate> {
    let mon = month_number(caps.get(1)?.as_str())?;
    let d: u32 = caps.get(2)?.as_str().parse().ok()?;
    let y: i32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(y, mon, d)
}

fn month_number(name: &str) -> Option<u32> {
    let low = name.to_lowercase();
    let key: String = low.chars().take(3).collect();
    match key.as_str() {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}
