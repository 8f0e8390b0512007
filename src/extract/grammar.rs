use crate::models::Vendor;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

/// Window and vocabulary defaults shared by every vendor unless overridden.
/// Vendor pages list BIOS, chipset drivers and utilities in adjacent blocks;
/// a candidate whose window contains noise vocabulary without a confirming
/// term is rejected.
pub const DEFAULT_NOISE: &[&str] = &[
    "driver",
    "utility",
    "chipset",
    "audio",
    "realtek",
    "lan",
    "wireless",
    "wifi",
    "bluetooth",
    "graphics",
    "vga",
    "raid",
    "sata",
    "intel me",
    "management engine",
];

pub const DEFAULT_CONFIRM: &[&str] = &["bios", "uefi"];

/// Guard against bare digit runs that read as years or footnote numbers
/// rather than versions (ASRock pages are full of both).
#[derive(Debug, Clone, Copy)]
pub struct PlainDigitLimits {
    pub min_len: usize,
    pub max_value: u32,
    /// Also reject 4-digit runs that parse as calendar years
    pub reject_years: bool,
}

/// How one vendor writes BIOS version tokens and what surrounds them.
/// Vendor support is data-driven: adding a vendor means adding a profile,
/// not a code path.
#[derive(Debug)]
pub struct VendorProfile {
    pub vendor: Vendor,
    /// Token grammars in priority order; earlier patterns claim overlapping spans
    pub token_patterns: Vec<Regex>,
    pub noise: &'static [&'static str],
    pub confirm: &'static [&'static str],
    /// Context window radius in bytes around a candidate
    pub window_radius: usize,
    /// Reject tokens touching '.', '/' or '-': they are one segment of a
    /// compound token, a dotted Intel ME version like 19.0.5.1992 or a
    /// numeric date
    pub reject_compound_adjacent: bool,
    /// Require a digit on both sides of the 'v' separator (MSI v-tags;
    /// keeps "OVERVIEW" from matching)
    pub digit_flanked_v: bool,
    pub plain_digit_limits: Option<PlainDigitLimits>,
    /// Drop candidates whose numeric component exceeds median + slack
    /// before ranking (isolated page widgets inject spurious high tokens)
    pub outlier_slack: Option<u32>,
}

lazy_static! {
    static ref PROFILES: HashMap<Vendor, VendorProfile> = {
        let mut m = HashMap::new();

        // ASUS versions are plain 3-5 digit numbers: 902, 1606, 3607.
        // The digit bound is the whole gate; a 4-digit year can collide and
        // that limitation is accepted.
        m.insert(
            Vendor::Asus,
            VendorProfile {
                vendor: Vendor::Asus,
                token_patterns: vec![Regex::new(r"\b[0-9]{3,5}\b").unwrap()],
                noise: DEFAULT_NOISE,
                confirm: DEFAULT_CONFIRM,
                window_radius: 200,
                reject_compound_adjacent: true,
                digit_flanked_v: false,
                plain_digit_limits: None,
                outlier_slack: None,
            },
        );

        // GIGABYTE: F1 .. F135 with an optional trailing letter (F22, F22A, F17G)
        m.insert(
            Vendor::Gigabyte,
            VendorProfile {
                vendor: Vendor::Gigabyte,
                token_patterns: vec![Regex::new(r"(?i)\bF[0-9]{1,3}[A-Z]?\b").unwrap()],
                noise: DEFAULT_NOISE,
                confirm: DEFAULT_CONFIRM,
                window_radius: 220,
                reject_compound_adjacent: false,
                digit_flanked_v: false,
                plain_digit_limits: None,
                outlier_slack: Some(20),
            },
        );

        // MSI: the AMS filename form (E7D75AMS.1P3) and the v-tag form
        // (7D75v1P3). AMS is listed first so it wins overlapping spans.
        m.insert(
            Vendor::Msi,
            VendorProfile {
                vendor: Vendor::Msi,
                token_patterns: vec![
                    Regex::new(r"(?i)\bE[0-9A-F]{4,5}AMS\.[0-9A-Z]{2,6}\b").unwrap(),
                    Regex::new(r"(?i)\b[0-9A-Z]{4,6}V[0-9A-Z]{1,5}\b").unwrap(),
                ],
                noise: DEFAULT_NOISE,
                confirm: DEFAULT_CONFIRM,
                window_radius: 240,
                reject_compound_adjacent: false,
                digit_flanked_v: true,
                plain_digit_limits: None,
                outlier_slack: None,
            },
        );

        // ASRock: 19.03, 2.50, P1.90, L2.31, 3.10A
        m.insert(
            Vendor::Asrock,
            VendorProfile {
                vendor: Vendor::Asrock,
                token_patterns: vec![
                    Regex::new(r"\b[A-Za-z]?[0-9]+(?:\.[0-9]+)?[A-Za-z]?\b").unwrap(),
                ],
                noise: DEFAULT_NOISE,
                confirm: DEFAULT_CONFIRM,
                window_radius: 200,
                reject_compound_adjacent: false,
                digit_flanked_v: false,
                plain_digit_limits: Some(PlainDigitLimits {
                    min_len: 3,
                    max_value: 3000,
                    reject_years: true,
                }),
                outlier_slack: None,
            },
        );

        m
    };
}

pub fn profile(vendor: Vendor) -> &'static VendorProfile {
    &PROFILES[&vendor]
}
