// src/domain/record.rs

/// One observed product instance, normalized.
///
/// Prices are fixed-point cents so threshold checks downstream never
/// drift the way repeated float parsing would.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    pub title: String,
    pub price_cents: i64,
    pub product_id: String,
}

/// Price movement for one product seen in both the current and the
/// previous snapshot. Computed per run, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceDelta {
    pub product_id: String,
    pub title: String,
    pub old_cents: i64,
    pub new_cents: i64,
    /// Signed: negative means the price went down.
    pub drop_percent: f64,
}

/// Renders cents as a dollar amount with two decimal places.
pub fn format_cents(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}
