// One search-result card, as scraped.
//
// card
//  ├── h2                      -> title
//  ├── span.a-price-whole      -> price_whole  (may be absent: not buyable)
//  ├── span.a-price-fraction   -> price_fraction
//  └── @data-asin              -> product_id

#[derive(Debug, Clone)]
pub struct RawListing {
    pub title: String,
    pub price_whole: Option<String>,
    pub price_fraction: Option<String>,
    pub product_id: String,
}
