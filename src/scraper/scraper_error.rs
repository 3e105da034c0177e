use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum ScraperError {
    Network(String),
    HtmlParse(String),
    NoResults,
    UrlError(String),
}

impl fmt::Display for ScraperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScraperError::Network(msg) => write!(f, "Network error: {msg}"),
            ScraperError::HtmlParse(msg) => write!(f, "HTML parse error: {msg}"),
            ScraperError::NoResults => write!(f, "No search results found on page"),
            ScraperError::UrlError(msg) => write!(f, "Bad search URL: {msg}"),
        }
    }
}

impl Error for ScraperError {}
