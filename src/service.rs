//! Games service: cache reads, live refreshes and the sample fallback.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::sample::sample_dataset;
use crate::scraper::{Crawler, GamesCache};
use crate::types::{Dataset, Provenance};

/// Outcome of a refresh
#[derive(Debug, Clone)]
pub struct Refreshed {
    pub dataset: Dataset,
    pub provenance: Provenance,
}

/// Serves the club dataset, crawling at most once per freshness window.
///
/// `read` and `refresh` never fail: any crawl problem is logged and the sample
/// dataset takes its place.
pub struct GamesService {
    crawler: Crawler,
    scrape: ScrapeConfig,
    cache: Arc<GamesCache>,
    /// Serialises refreshes so overlapping stale reads share one crawl
    refresh_guard: Mutex<()>,
}

impl GamesService {
    pub fn new(crawler: Crawler, scrape: ScrapeConfig, cache: Arc<GamesCache>) -> Self {
        Self {
            crawler,
            scrape,
            cache,
            refresh_guard: Mutex::new(()),
        }
    }

    /// Cached dataset when fresh and `prefer_fresh` is false, otherwise a
    /// refreshed one.
    pub async fn read(&self, prefer_fresh: bool) -> Dataset {
        if !prefer_fresh {
            if let Some(data) = self.cache.get_fresh() {
                debug!(cached_at = ?self.cache.cached_at(), "Serving cached games");
                return data;
            }
        }

        let _guard = self.refresh_guard.lock().await;
        if !prefer_fresh {
            // Another request may have refreshed while we waited
            if let Some(data) = self.cache.get_fresh() {
                debug!("Serving games refreshed by a concurrent request");
                return data;
            }
        }
        self.refresh_locked().await.dataset
    }

    /// Rebuild the dataset and replace the cache entry.
    pub async fn refresh(&self) -> Refreshed {
        let _guard = self.refresh_guard.lock().await;
        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> Refreshed {
        let (dataset, provenance) = match self.scrape_live().await {
            Ok(dataset) => (dataset, Provenance::Scrape),
            Err(ScrapeError::ConfigurationMissing) => {
                info!("No browser endpoint configured, serving sample games");
                (sample_dataset(self.scrape.season), Provenance::Fallback)
            }
            Err(e) => {
                error!("Scrape failed, serving sample games: {}", e);
                (sample_dataset(self.scrape.season), Provenance::Fallback)
            }
        };

        self.cache.store(dataset.clone());
        info!(
            source = %provenance,
            upcoming = dataset.upcoming.len(),
            results = dataset.results.len(),
            "Games cache refreshed"
        );

        Refreshed {
            dataset,
            provenance,
        }
    }

    async fn scrape_live(&self) -> Result<Dataset, ScrapeError> {
        let endpoint = self
            .scrape
            .endpoint()
            .ok_or(ScrapeError::ConfigurationMissing)?;
        self.crawler
            .crawl(
                endpoint,
                &self.scrape.club_slug,
                self.scrape.season,
                &self.scrape.timezone,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryConfig;
    use crate::scraper::testing::{competition_html, FakeAutomation, CLUB_SLUG};
    use crate::scraper::rate_limiter::RateLimiter;
    use crate::scraper::{club_url, ORIGIN};

    fn scrape_config(endpoint: Option<&str>) -> ScrapeConfig {
        ScrapeConfig {
            endpoint: endpoint.map(str::to_string),
            club_slug: CLUB_SLUG.to_string(),
            settle_ms: 0,
            ..Default::default()
        }
    }

    fn service(
        automation: Arc<FakeAutomation>,
        endpoint: Option<&str>,
        max_age: chrono::Duration,
    ) -> GamesService {
        let scrape = scrape_config(endpoint);
        let crawler = Crawler::new(automation, &scrape)
            .with_retry(RetryConfig::none())
            .with_rate_limiter(RateLimiter::unlimited());
        GamesService::new(crawler, scrape, Arc::new(GamesCache::new(max_age)))
    }

    fn live_site() -> FakeAutomation {
        let comp = format!("{}/competitions/u16", ORIGIN);
        FakeAutomation::new()
            .page(
                &club_url(CLUB_SLUG),
                "<html><body><a href=\"/competitions/u16\">U16</a></body></html>",
            )
            .page(
                &comp,
                &competition_html(
                    "U16 Div 1",
                    &[
                        "Dudley Redhead v Kotara South Full Time 24-6",
                        "Lakes United v Dudley Redhead Sat 23 Aug at Cahill Oval",
                    ],
                ),
            )
    }

    #[tokio::test]
    async fn test_refresh_without_endpoint_falls_back() {
        let automation = Arc::new(FakeAutomation::new());
        let svc = service(automation.clone(), None, chrono::Duration::hours(6));

        let refreshed = svc.refresh().await;

        assert_eq!(refreshed.provenance, Provenance::Fallback);
        assert_eq!(refreshed.dataset.results.len(), 2);
        assert!(refreshed.dataset.results.iter().all(|g| g.source == "sample"));
        assert_eq!(automation.connects(), 0);
        assert!(svc.cache.cached_at().is_some());
    }

    #[tokio::test]
    async fn test_refresh_scrapes_when_endpoint_set() {
        let automation = Arc::new(live_site());
        let svc = service(automation.clone(), Some("ws://fake"), chrono::Duration::hours(6));

        let refreshed = svc.refresh().await;

        assert_eq!(refreshed.provenance, Provenance::Scrape);
        assert_eq!(refreshed.dataset.results.len(), 1);
        assert_eq!(refreshed.dataset.upcoming.len(), 1);
        assert_eq!(refreshed.dataset.results[0].scores(), (Some(24), Some(6)));
        assert!(automation.all_closed());
    }

    #[tokio::test]
    async fn test_connect_failure_falls_back() {
        let automation = Arc::new(FakeAutomation::new().refuse_connections());
        let svc = service(automation.clone(), Some("ws://fake"), chrono::Duration::hours(6));

        let refreshed = svc.refresh().await;

        assert_eq!(refreshed.provenance, Provenance::Fallback);
        assert_eq!(automation.connects(), 1);
        assert_eq!(
            svc.cache.get_fresh().map(|d| d.results.len()),
            Some(2)
        );
    }

    #[tokio::test]
    async fn test_fresh_reads_are_identical() {
        let automation = Arc::new(live_site());
        let svc = service(automation.clone(), Some("ws://fake"), chrono::Duration::hours(6));

        let first = svc.read(false).await;
        let second = svc.read(false).await;

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(automation.connects(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_stale_reads_share_one_crawl() {
        let automation = Arc::new(live_site());
        let svc = service(automation.clone(), Some("ws://fake"), chrono::Duration::hours(6));

        let (a, b) = tokio::join!(svc.read(false), svc.read(false));

        assert_eq!(a, b);
        assert_eq!(automation.connects(), 1);
    }

    #[tokio::test]
    async fn test_stale_entry_is_recrawled() {
        let automation = Arc::new(live_site());
        let svc = service(automation.clone(), Some("ws://fake"), chrono::Duration::zero());

        svc.read(false).await;
        svc.read(false).await;

        assert_eq!(automation.connects(), 2);
    }

    #[tokio::test]
    async fn test_prefer_fresh_always_refreshes() {
        let automation = Arc::new(live_site());
        let svc = service(automation.clone(), Some("ws://fake"), chrono::Duration::hours(6));

        svc.read(false).await;
        svc.read(true).await;
        svc.read(true).await;

        assert_eq!(automation.connects(), 3);
    }
}
