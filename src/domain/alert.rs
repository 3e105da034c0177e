// src/domain/alert.rs

use crate::domain::record::{format_cents, PriceDelta};

/// Picks the deltas that cross the threshold and renders the digest.
///
/// The filter is the literal `drop_percent >= threshold` comparison the
/// upstream tracker shipped with. With a positive threshold and the signed
/// delta formula this selects price increases; see DESIGN.md for why the
/// comparison is kept as-is rather than silently flipped.
///
/// Returns `None` when nothing crosses the threshold, so no message is sent.
pub fn select_and_format(deltas: &[PriceDelta], threshold_percent: f64) -> Option<String> {
    let blocks: Vec<String> = deltas
        .iter()
        .filter(|d| d.drop_percent >= threshold_percent)
        .map(|d| {
            format!(
                "{}\nOld: ${}\nNew: ${}\nASIN: {}",
                d.title,
                format_cents(d.old_cents),
                format_cents(d.new_cents),
                d.product_id
            )
        })
        .collect();

    if blocks.is_empty() {
        None
    } else {
        Some(blocks.join("\n\n"))
    }
}
