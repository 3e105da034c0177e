// search.rs
use crate::scraper::models::RawListing;
use crate::scraper::ScraperError;
use rand::Rng;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

const SEARCH_URL: &str = "https://www.amazon.com/s";

/// One page-at-a-time view of search results for a term.
///
/// The pipeline holds exactly one source and walks it sequentially, so the
/// trait keeps pagination state behind `&mut self` rather than pretending
/// pages are independent.
pub trait ListingSource {
    fn fetch_page(&mut self, search_term: &str) -> Result<Vec<RawListing>, ScraperError>;
    fn has_next_page(&self) -> bool;
    fn go_next_page(&mut self) -> Result<(), ScraperError>;
}

pub struct AmazonSearch {
    client: Client,
    term: Option<String>,
    page: u32,
    next_available: bool,
}

impl AmazonSearch {
    pub fn new() -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        Ok(Self {
            client,
            term: None,
            page: 1,
            next_available: false,
        })
    }

    fn page_url(&self, term: &str) -> Result<Url, ScraperError> {
        let page = self.page.to_string();
        Url::parse_with_params(SEARCH_URL, &[("k", term), ("page", page.as_str())])
            .map_err(|e| ScraperError::UrlError(e.to_string()))
    }

    fn fetch_html(&self, url: &Url) -> Result<String, ScraperError> {
        const MAX_ATTEMPTS: u64 = 5;
        const MAX_BACKOFF_SECS: u64 = 10;
        const JITTER_MAX_SECS: u64 = 2;

        let mut last_err = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let start = std::time::Instant::now();

            match self.try_fetch_html(url) {
                Ok(html) => {
                    eprintln!("✅ Fetch success attempt {attempt} in {:?}", start.elapsed());
                    return Ok(html);
                }
                Err(e) => {
                    eprintln!(
                        "⚠️ Fetch attempt {attempt} failed in {:?}: {e}",
                        start.elapsed()
                    );

                    last_err = Some(e);

                    // backoff
                    let base = std::cmp::min(2 * attempt, MAX_BACKOFF_SECS);
                    let jitter = rand::thread_rng().gen_range(0..=JITTER_MAX_SECS);
                    std::thread::sleep(Duration::from_secs(base + jitter));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| ScraperError::Network("fetch retry loop failed".into())))
    }

    fn try_fetch_html(&self, url: &Url) -> Result<String, ScraperError> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ScraperError::Network(format!("HTTP {status} for {url}")));
        }

        Ok(text)
    }

    fn parse_results(html: &str) -> Result<(Vec<RawListing>, bool), ScraperError> {
        let document = Html::parse_document(html);

        let card_sel = Selector::parse(r#"div[data-component-type="s-search-result"]"#)
            .map_err(|e| ScraperError::HtmlParse(e.to_string()))?;
        let title_sel =
            Selector::parse("h2").map_err(|e| ScraperError::HtmlParse(e.to_string()))?;
        let whole_sel = Selector::parse("span.a-price-whole")
            .map_err(|e| ScraperError::HtmlParse(e.to_string()))?;
        let fraction_sel = Selector::parse("span.a-price-fraction")
            .map_err(|e| ScraperError::HtmlParse(e.to_string()))?;
        let next_sel = Selector::parse("a.s-pagination-next")
            .map_err(|e| ScraperError::HtmlParse(e.to_string()))?;

        let mut listings = Vec::new();
        for card in document.select(&card_sel) {
            let title = text_of(&card, &title_sel).unwrap_or_else(|| "N/A".to_string());
            let price_whole = text_of(&card, &whole_sel);
            let price_fraction = text_of(&card, &fraction_sel);
            let product_id = card
                .value()
                .attr("data-asin")
                .unwrap_or_default()
                .to_string();

            listings.push(RawListing {
                title,
                price_whole,
                price_fraction,
                product_id,
            });
        }

        if listings.is_empty() {
            return Err(ScraperError::NoResults);
        }

        // The next link is rendered disabled on the last page.
        let next_available = document
            .select(&next_sel)
            .next()
            .map(|a| {
                !a.value()
                    .attr("class")
                    .unwrap_or_default()
                    .contains("s-pagination-disabled")
            })
            .unwrap_or(false);

        Ok((listings, next_available))
    }
}

impl ListingSource for AmazonSearch {
    fn fetch_page(&mut self, search_term: &str) -> Result<Vec<RawListing>, ScraperError> {
        if self.term.as_deref() != Some(search_term) {
            self.term = Some(search_term.to_string());
            self.page = 1;
        }

        let url = self.page_url(search_term)?;
        eprintln!("📄 Fetching page {}: {url}", self.page);

        let html = self.fetch_html(&url)?;
        let (listings, next_available) = Self::parse_results(&html)?;

        eprintln!("✅ Page {} parsed ({} listings)", self.page, listings.len());

        self.next_available = next_available;
        Ok(listings)
    }

    fn has_next_page(&self) -> bool {
        self.next_available
    }

    fn go_next_page(&mut self) -> Result<(), ScraperError> {
        self.page += 1;
        self.next_available = false;
        Ok(())
    }
}

fn text_of(card: &ElementRef, selector: &Selector) -> Option<String> {
    let element = card.select(selector).next()?;
    let text: String = element.text().collect::<Vec<_>>().join(" ");
    let text = text.trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
