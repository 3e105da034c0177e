pub mod models;
pub mod scraper_error;
pub mod search;

pub use scraper_error::ScraperError;
pub use search::{AmazonSearch, ListingSource};
