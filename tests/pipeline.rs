/// End-to-end tests for the extraction pipeline and the per-board scrape:
/// 1. Vendor fixture text goes in, ranked version/date entries come out
/// 2. Noise contexts and dotted utility versions never become entries
/// 3. The scrape boundary contains failures and keeps empty-but-ok distinct
use async_trait::async_trait;
use bioswatch::{
    config::Board,
    extract::extract_entries,
    fetch::{FetchError, FetchLadder, FetchResult, PageFetcher},
    models::Vendor,
    ratelimit::HostPacer,
    scraper::BoardScraper,
};
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

#[test]
fn test_gigabyte_support_page_shape() {
    // Mimics the support tab: BIOS rows plus a driver row further down
    let text = r#"
        <div class="div-table-row"><span>F22a</span> <span>2025/03/12</span>
            Update AGESA, checksum 0xA1 BIOS download 12.4 MB</div>
        <div class="div-table-row"><span>F21</span> <span>2024/11/02</span>
            BIOS Improve memory compatibility</div>
        <div class="div-table-row"><span>F20</span> <span>2024/06/30</span>
            BIOS Initial release</div>
        <div class="driver-row">Realtek Audio Driver 6.0.9652.1 2025/04/01
            installer for Windows 11 utility suite update package download</div>
    "#;
    let entries = extract_entries(text, Vendor::Gigabyte);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].version.normalized_token, "F22A");
    assert_eq!(entries[0].date, date(2025, 3, 12));
    assert_eq!(entries[1].version.normalized_token, "F21");
    assert_eq!(entries[1].date, date(2024, 11, 2));
}

#[test]
fn test_gigabyte_scenario_from_flat_text() {
    let padding = ".".repeat(400);
    let text =
        format!("... BIOS Version F10 released 2024/05/01 ...{padding}... Audio Driver 5.2 ...");
    let entries = extract_entries(&text, Vendor::Gigabyte);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].version.normalized_token, "F10");
    assert_eq!(entries[0].date, date(2024, 5, 1));
}

#[test]
fn test_msi_page_with_me_firmware_noise() {
    // Real support pages put a few hundred bytes of changelog between rows;
    // the ME row has to sit outside the BIOS rows' windows for the noise
    // filter to see it alone
    let changelog = "Improve system stability and memory compatibility. \
                     Update AGESA. Fix fan curve regression under load. "
        .repeat(4);
    let text = format!(
        "<li>BIOS 7D75v1P3 Release Date 2025-08-04 {changelog}</li>\
         <li>BIOS 7D75v1P2 Release Date 2025-02-18 {changelog}</li>\
         <li>Intel Management Engine Firmware 16.1.30.2307v5A Release Date 2025-07-01 \
             driver package for chipset</li>"
    );
    let entries = extract_entries(&text, Vendor::Msi);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].version.normalized_token, "7D75V1P3");
    assert_eq!(entries[0].date, date(2025, 8, 4));
    assert_eq!(entries[1].version.normalized_token, "7D75V1P2");
}

#[test]
fn test_asus_numeric_versions_and_me_rejection() {
    let padding = " ".repeat(300);
    let text = format!(
        "BIOS Version 1606 2025/01/20 fix boot BIOS Version 1404 2024/09/02{padding}\
         Intel Management Engine Interface 19.0.5.1992v2_S 2025/02/02 chipset driver"
    );
    let entries = extract_entries(&text, Vendor::Asus);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].version.normalized_token, "1606");
    assert_eq!(entries[1].version.normalized_token, "1404");
}

#[test]
fn test_asrock_versions_with_beta() {
    let changelog =
        "Improve memory compatibility and stability for selected processors. ".repeat(5);
    let text = format!(
        "<tr><td>P3.90</td><td>2025/06/11</td><td>BIOS update {changelog}</td></tr>\
         <tr><td>P3.80 Beta</td><td>2025/04/01</td><td>BIOS AGESA update {changelog}</td></tr>"
    );
    let entries = extract_entries(&text, Vendor::Asrock);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].version.normalized_token, "P3.90");
    assert!(!entries[0].version.is_beta);
    assert_eq!(entries[0].date, date(2025, 6, 11));
    assert_eq!(entries[1].version.normalized_token, "P3.80");
    assert!(entries[1].version.is_beta);
    assert_eq!(entries[1].version.display_version(), "P3.80 (Beta)");
}

#[test]
fn test_pure_noise_page_yields_nothing() {
    let text = "Realtek Audio Driver version 2.80 download, LAN driver 10.068, \
                chipset utility 5.1.2600";
    for &vendor in Vendor::all() {
        assert!(
            extract_entries(text, vendor).is_empty(),
            "{vendor} should reject driver-only context"
        );
    }
}

#[test]
fn test_date_wins_over_version_magnitude() {
    let padding = ".".repeat(500);
    let text = format!(
        "BIOS F22 released 2025/01/01 stability{padding}BIOS F8 released 2025/06/01 security"
    );
    let entries = extract_entries(&text, Vendor::Gigabyte);
    assert_eq!(entries[0].version.normalized_token, "F8");
    assert_eq!(entries[1].version.normalized_token, "F22");
}

#[test]
fn test_outlier_version_from_page_widget() {
    // F79 injected by an unrelated widget; median+20 drops it
    let text = "BIOS F8 update BIOS F9 update promo widget F79 countdown";
    let entries = extract_entries(text, Vendor::Gigabyte);
    let tokens: Vec<_> = entries
        .iter()
        .map(|e| e.version.normalized_token.as_str())
        .collect();
    assert_eq!(tokens, vec!["F9", "F8"]);
}

#[test]
fn test_output_always_bounded_and_unique() {
    let text = "BIOS F1 F2 F3 F4 F5 F6 F7 F8 f8 F8a versions listed";
    let entries = extract_entries(text, Vendor::Gigabyte);
    assert!(entries.len() <= 2);
    let mut tokens: Vec<_> = entries
        .iter()
        .map(|e| e.version.normalized_token.clone())
        .collect();
    tokens.dedup();
    assert_eq!(tokens.len(), entries.len());
}

struct PageByUrl;

#[async_trait]
impl PageFetcher for PageByUrl {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn fetch(&self, url: &str) -> FetchResult<String> {
        if url.contains("blocked") {
            Err(FetchError::Blocked(url.to_string()))
        } else if url.contains("empty") {
            Ok("a page with no version tokens at all".to_string())
        } else {
            Ok("BIOS F12 released 2025/05/05 and BIOS F11 released 2025/01/05".to_string())
        }
    }
}

fn scraper() -> BoardScraper {
    let ladder = FetchLadder::new(Box::new(PageByUrl)).with_retry_policy(1, 1, 2);
    BoardScraper::new(ladder, HostPacer::new(0, 0))
}

fn board(url: &str) -> Board {
    Board {
        vendor: Vendor::Gigabyte,
        model: "B650 AORUS ELITE AX".to_string(),
        url: Some(url.to_string()),
    }
}

#[tokio::test]
async fn test_scrape_ok_with_entries() {
    let result = scraper().latest_two(&board("https://example.com/ok")).await;
    assert!(result.ok);
    assert_eq!(result.entries.len(), 2);
    assert_eq!(result.entries[0].version.normalized_token, "F12");
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_scrape_empty_page_is_ok_without_entries() {
    // "Page loaded but nothing recognizable" stays distinct from a fetch
    // failure
    let result = scraper().latest_two(&board("https://example.com/empty")).await;
    assert!(result.ok);
    assert!(result.entries.is_empty());
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_scrape_blocked_page_is_contained_failure() {
    let result = scraper()
        .latest_two(&board("https://example.com/blocked"))
        .await;
    assert!(!result.ok);
    assert!(result.entries.is_empty());
    let error = result.error.expect("failure carries an error string");
    assert!(error.starts_with("fetch/parse failed:"));
    assert!(error.len() <= 200);
}
