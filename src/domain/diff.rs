// src/domain/diff.rs

use crate::domain::record::{ListingRecord, PriceDelta};
use std::collections::HashMap;

/// Inner join of current against previous on product id.
///
/// Products seen in only one generation produce no delta; this pipeline
/// only tracks movement on products it has observed twice. Pairs whose
/// old price is zero are excluded (undefined percentage).
///
/// Output is sorted by product id so callers and tests see a stable order.
pub fn compute_deltas(current: &[ListingRecord], previous: &[ListingRecord]) -> Vec<PriceDelta> {
    let old_prices: HashMap<&str, i64> = previous
        .iter()
        .map(|r| (r.product_id.as_str(), r.price_cents))
        .collect();

    let mut deltas: Vec<PriceDelta> = current
        .iter()
        .filter_map(|rec| {
            let old_cents = *old_prices.get(rec.product_id.as_str())?;
            if old_cents == 0 {
                return None;
            }
            let drop_percent = (rec.price_cents - old_cents) as f64 / old_cents as f64 * 100.0;
            Some(PriceDelta {
                product_id: rec.product_id.clone(),
                title: rec.title.clone(),
                old_cents,
                new_cents: rec.price_cents,
                drop_percent,
            })
        })
        .collect();

    deltas.sort_by(|a, b| a.product_id.cmp(&b.product_id));
    deltas
}
