//! Scraper for playrugbyleague.com competitions.
//!
//! Provides browser automation, text extraction and the dataset cache.

pub mod browser;
pub mod cache;
pub mod crawler;
pub mod dom;
pub mod normalize;
pub mod parsers;
pub mod rate_limiter;

#[cfg(test)]
pub mod testing;

pub use browser::Chromium;
pub use cache::GamesCache;
pub use crawler::Crawler;

/// Competitions site origin
pub const ORIGIN: &str = "https://www.playrugbyleague.com";

/// Build club competitions URL
pub fn club_url(club_slug: &str) -> String {
    format!("{}/competitions/club/{}", ORIGIN, club_slug)
}

/// Resolve an `href` from a site page to an absolute URL.
/// Returns `None` for anchors, scripts and other non-navigable links.
pub fn absolute_url(href: &str) -> Option<String> {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        Some(href.to_string())
    } else if let Some(rest) = href.strip_prefix("//") {
        Some(format!("https://{}", rest))
    } else if href.starts_with('/') {
        Some(format!("{}{}", ORIGIN, href))
    } else {
        None
    }
}
