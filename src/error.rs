//! Error taxonomy for the scrape pipeline.

use std::time::Duration;

/// Errors raised while driving the browser.
///
/// Only connect and club-page failures leave the crawler; errors on a
/// competition page are logged and dropped at the per-page boundary.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// No automation endpoint configured
    #[error("no browser automation endpoint configured")]
    ConfigurationMissing,

    #[error("cannot connect to browser endpoint: {0}")]
    Connection(String),

    #[error("navigation to {url} timed out after {timeout:?}")]
    NavigationTimeout { url: String, timeout: Duration },

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("extraction failed on {url}: {message}")]
    PageExtraction { url: String, message: String },

    /// Any other browser-side failure (context, page, close)
    #[error("browser error: {0}")]
    Browser(String),
}

impl ScrapeError {
    pub fn browser(err: impl std::fmt::Display) -> Self {
        Self::Browser(err.to_string())
    }
}
