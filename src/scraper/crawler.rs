//! Competition crawler.
//!
//! Opens the club page, follows its competition links one at a time and runs
//! every sizeable text block through [`GameParser`]. Only failing to reach the
//! browser or the club page is an error; a broken competition page is logged
//! and skipped.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::browser::{Automation, BrowserContext, BrowserPage, BrowserSession, ContextOptions, DomNode};
use super::parsers::{GameParser, PageContext};
use super::rate_limiter::RateLimiter;
use super::{absolute_url, club_url, ORIGIN};
use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::retry::{retry, RetryConfig};
use crate::types::{Dataset, GameRecord};

/// Links to competition pages
const COMPETITION_LINKS: &str = "a[href*='/competitions/']";
/// Generic list-ish containers scanned for game text
const TEXT_CONTAINERS: &str = "li, tr, article, div";
/// Deep links to individual matches
const MATCH_LINKS: &str = "a[href*='/match-centre/']";

const UNKNOWN_GRADE: &str = "Unknown Grade";

fn site_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(?:^|\s*\|)\s*Play Rugby League.*$").unwrap())
}

/// Limits and timing for one crawl
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub navigation_timeout: Duration,
    pub settle_delay: Duration,
    pub max_competition_links: usize,
    pub max_text_blocks: usize,
    pub min_block_chars: usize,
    pub max_match_links: usize,
    pub max_records: usize,
    pub user_agent: Option<String>,
}

impl From<&ScrapeConfig> for CrawlSettings {
    fn from(config: &ScrapeConfig) -> Self {
        Self {
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
            settle_delay: Duration::from_millis(config.settle_ms),
            max_competition_links: config.max_competition_links,
            max_text_blocks: config.max_text_blocks,
            min_block_chars: config.min_block_chars,
            max_match_links: config.max_match_links,
            max_records: config.max_records,
            user_agent: Some(config.user_agent.clone()).filter(|ua| !ua.is_empty()),
        }
    }
}

/// What one competition page yielded
#[derive(Debug, Default)]
struct PageContribution {
    upcoming: Vec<GameRecord>,
    results: Vec<GameRecord>,
}

/// Crawls a club's competitions through a browser [`Automation`]
pub struct Crawler {
    automation: Arc<dyn Automation>,
    settings: CrawlSettings,
    retry: RetryConfig,
    limiter: RateLimiter,
}

impl Crawler {
    pub fn new(automation: Arc<dyn Automation>, config: &ScrapeConfig) -> Self {
        Self {
            automation,
            settings: CrawlSettings::from(config),
            retry: RetryConfig::browser(),
            limiter: RateLimiter::new(
                config.requests_per_minute,
                config.min_delay_secs,
                config.max_delay_secs,
            ),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// Crawl the club and assemble a dataset.
    ///
    /// The browser session and context are closed on every path out.
    pub async fn crawl(
        &self,
        endpoint: &str,
        club_slug: &str,
        season: i32,
        timezone: &str,
    ) -> Result<Dataset, ScrapeError> {
        let mut session = retry(&self.retry, "Browser connect", || {
            self.automation.connect(endpoint)
        })
        .await?;
        info!("Connected to browser endpoint");

        let outcome = self
            .crawl_session(session.as_mut(), club_slug, season, timezone)
            .await;

        if let Err(e) = session.close().await {
            warn!("Failed to close browser session: {}", e);
        }
        outcome
    }

    async fn crawl_session(
        &self,
        session: &mut dyn BrowserSession,
        club_slug: &str,
        season: i32,
        timezone: &str,
    ) -> Result<Dataset, ScrapeError> {
        let tz = parse_timezone(timezone);
        let options = ContextOptions {
            timezone: tz.name().to_string(),
            user_agent: self.settings.user_agent.clone(),
        };
        let mut context = session.new_context(&options).await?;

        let outcome = self
            .crawl_context(context.as_mut(), club_slug, season, tz)
            .await;

        if let Err(e) = context.close().await {
            warn!("Failed to close browser context: {}", e);
        }
        outcome
    }

    async fn crawl_context(
        &self,
        context: &mut dyn BrowserContext,
        club_slug: &str,
        season: i32,
        tz: Tz,
    ) -> Result<Dataset, ScrapeError> {
        let mut page = context.new_page().await?;
        let club = club_url(club_slug);

        self.navigate(page.as_mut(), &club).await?;

        let links = match page.query_all(COMPETITION_LINKS).await {
            Ok(nodes) => competition_links(&nodes, &club, self.settings.max_competition_links),
            Err(e) => {
                warn!("Competition link discovery failed on {}: {}", club, e);
                Vec::new()
            }
        };
        info!("Discovered {} competition pages", links.len());

        let mut upcoming = Vec::new();
        let mut results = Vec::new();
        let now = Utc::now();

        for link in &links {
            self.limiter.acquire().await;
            match self.visit_competition(page.as_mut(), link, season, tz, now).await {
                Ok(contribution) => {
                    debug!(
                        "{}: {} upcoming, {} results",
                        link,
                        contribution.upcoming.len(),
                        contribution.results.len()
                    );
                    upcoming.extend(contribution.upcoming);
                    results.extend(contribution.results);
                }
                Err(e) => warn!("Skipping competition page {}: {}", link, e),
            }
        }

        let dataset = Dataset {
            upcoming: dedupe_and_cap(upcoming, self.settings.max_records),
            results: dedupe_and_cap(results, self.settings.max_records),
            ..Dataset::empty(season)
        };
        info!(
            "Crawl finished: {} upcoming, {} results",
            dataset.upcoming.len(),
            dataset.results.len()
        );
        Ok(dataset)
    }

    async fn navigate(&self, page: &mut dyn BrowserPage, url: &str) -> Result<(), ScrapeError> {
        page.goto(url, self.settings.navigation_timeout).await?;
        // let client-side rendering finish
        if !self.settings.settle_delay.is_zero() {
            tokio::time::sleep(self.settings.settle_delay).await;
        }
        Ok(())
    }

    async fn visit_competition(
        &self,
        page: &mut dyn BrowserPage,
        url: &str,
        season: i32,
        timezone: Tz,
        now: DateTime<Utc>,
    ) -> Result<PageContribution, ScrapeError> {
        self.navigate(page, url).await?;

        let texts = page
            .query_all(TEXT_CONTAINERS)
            .await?
            .into_iter()
            .map(|node| node.text)
            .filter(|text| text.chars().count() > self.settings.min_block_chars);
        let blocks = game_blocks(texts, self.settings.max_text_blocks);

        let match_links: Vec<String> = page
            .query_all(MATCH_LINKS)
            .await?
            .into_iter()
            .filter_map(|node| node.href.as_deref().and_then(absolute_url))
            .take(self.settings.max_match_links)
            .collect();

        let grade_hint = grade_hint(page).await;
        let ctx = PageContext {
            page_url: url,
            grade_hint: &grade_hint,
            match_links: &match_links,
            season,
            timezone,
            now,
        };

        let mut contribution = PageContribution::default();
        for block in &blocks {
            match GameParser::parse(block, &ctx) {
                Some(record) if record.is_result() => contribution.results.push(record),
                Some(record) => contribution.upcoming.push(record),
                None => {}
            }
        }
        Ok(contribution)
    }
}

/// Grade label for a competition page: title without the site name, else the
/// first heading
async fn grade_hint(page: &mut dyn BrowserPage) -> String {
    let title = page.title().await.ok().flatten().unwrap_or_default();
    let stripped = site_suffix_re().replace(&title, "").trim().to_string();
    if !stripped.is_empty() {
        return stripped;
    }

    match page.first_heading().await {
        Ok(Some(heading)) if !heading.trim().is_empty() => heading.trim().to_string(),
        _ => UNKNOWN_GRADE.to_string(),
    }
}

/// Blocks holding exactly one game.
///
/// Wrapper elements repeat the text of everything inside them, so a block with
/// several pairings, or one that wraps another candidate, is dropped in favour
/// of the innermost block.
fn game_blocks(texts: impl Iterator<Item = String>, max: usize) -> Vec<String> {
    let candidates: Vec<String> = texts
        .filter(|text| GameParser::pairing_count(text) == 1)
        .collect();
    candidates
        .iter()
        .filter(|outer| {
            !candidates
                .iter()
                .any(|inner| inner.len() < outer.len() && outer.contains(inner.as_str()))
        })
        .take(max)
        .cloned()
        .collect()
}

/// Same-site absolute URL
fn is_site_url(href: &str) -> bool {
    href.strip_prefix(ORIGIN)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Unique same-origin competition links, document order, club page excluded
fn competition_links(nodes: &[DomNode], club_url: &str, max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    nodes
        .iter()
        .filter_map(|node| node.href.as_deref().and_then(absolute_url))
        .filter(|href| is_site_url(href) && href.contains("/competitions/"))
        .filter(|href| href.trim_end_matches('/') != club_url.trim_end_matches('/'))
        .filter(|href| seen.insert(href.clone()))
        .take(max)
        .collect()
}

/// Drop repeated records (same serialized form), keep first-seen order, cap
pub fn dedupe_and_cap<T: Serialize>(records: Vec<T>, cap: usize) -> Vec<T> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| match serde_json::to_string(record) {
            Ok(key) => seen.insert(key),
            Err(_) => true,
        })
        .take(cap)
        .collect()
}

/// IANA zone from config, Sydney when unrecognised
pub fn parse_timezone(name: &str) -> Tz {
    name.parse().unwrap_or_else(|_| {
        warn!("Unknown timezone {:?}, using Australia/Sydney", name);
        chrono_tz::Australia::Sydney
    })
}
