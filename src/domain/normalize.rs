// src/domain/normalize.rs

use crate::domain::record::ListingRecord;
use crate::scraper::models::RawListing;
use std::collections::HashMap;

/// What came out of normalizing one page-worth of raw listings.
/// Skips are counters, not errors: the orchestrator logs them and moves on.
#[derive(Debug, Default)]
pub struct NormalizeOutcome {
    pub records: Vec<ListingRecord>,
    /// Listings with no whole-price component at all. The search page omits
    /// prices for unavailable or non-buyable items, so this is expected.
    pub skipped_no_price: usize,
    /// Listings with a price or product id we could not make sense of.
    pub malformed: usize,
}

/// Converts raw scraped listings into canonical records.
///
/// Duplicate product ids within one batch keep the last observed price
/// but the first-seen position.
pub fn normalize_listings(raw: &[RawListing]) -> NormalizeOutcome {
    let mut out = NormalizeOutcome::default();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for listing in raw {
        let whole = match listing.price_whole.as_deref() {
            Some(w) => w,
            None => {
                out.skipped_no_price += 1;
                continue;
            }
        };

        if listing.product_id.trim().is_empty() {
            out.malformed += 1;
            continue;
        }

        let price_cents = match parse_price_cents(whole, listing.price_fraction.as_deref()) {
            Some(c) => c,
            None => {
                out.malformed += 1;
                continue;
            }
        };

        let record = ListingRecord {
            title: listing.title.clone(),
            price_cents,
            product_id: listing.product_id.clone(),
        };

        match seen.get(&record.product_id) {
            Some(&idx) => out.records[idx] = record, // last write wins
            None => {
                seen.insert(record.product_id.clone(), out.records.len());
                out.records.push(record);
            }
        }
    }

    out
}

/// Parses a whole part like "1,299" and an optional fraction like "99"
/// into cents. Fraction digits are decimal digits, so a lone "5" means
/// fifty cents, not five.
fn parse_price_cents(whole: &str, fraction: Option<&str>) -> Option<i64> {
    let whole = whole.replace(',', "");
    let whole = whole.trim().trim_end_matches('.');
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let dollars: i64 = whole.parse().ok()?;

    let fraction = fraction.unwrap_or("00").trim();
    let cents = match fraction.len() {
        0 => 0,
        1 | 2 => {
            if !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let f: i64 = fraction.parse().ok()?;
            if fraction.len() == 1 {
                f * 10
            } else {
                f
            }
        }
        _ => return None,
    };

    Some(dollars * 100 + cents)
}
