//! Configuration for the scores service.

use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Scrape configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// DevTools websocket of the remote browser. Unset means sample data only.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_club_slug")]
    pub club_slug: String,
    #[serde(default = "default_season")]
    pub season: i32,
    /// IANA timezone used by the browser and for reading dates
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,
    /// Extra wait after load for client-side rendering
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "default_max_competition_links")]
    pub max_competition_links: usize,
    #[serde(default = "default_max_text_blocks")]
    pub max_text_blocks: usize,
    /// Blocks must be longer than this to be parsed
    #[serde(default = "default_min_block_chars")]
    pub min_block_chars: usize,
    #[serde(default = "default_max_match_links")]
    pub max_match_links: usize,
    /// Cap for each of `upcoming` and `results`
    #[serde(default = "default_max_records")]
    pub max_records: usize,
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
    #[serde(default = "default_min_delay_secs")]
    pub min_delay_secs: f64,
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: f64,
}

fn default_club_slug() -> String {
    "dudley-redhead-junior-rlfc-inc-12074".to_string()
}

fn default_season() -> i32 {
    2025
}

fn default_timezone() -> String {
    "Australia/Sydney".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36".to_string()
}

fn default_navigation_timeout_secs() -> u64 {
    45
}

fn default_settle_ms() -> u64 {
    1500
}

fn default_max_competition_links() -> usize {
    10
}

fn default_max_text_blocks() -> usize {
    120
}

fn default_min_block_chars() -> usize {
    25
}

fn default_max_match_links() -> usize {
    100
}

fn default_max_records() -> usize {
    200
}

fn default_requests_per_minute() -> u32 {
    30
}

fn default_min_delay_secs() -> f64 {
    0.5
}

fn default_max_delay_secs() -> f64 {
    1.0
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            club_slug: default_club_slug(),
            season: default_season(),
            timezone: default_timezone(),
            user_agent: default_user_agent(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            settle_ms: default_settle_ms(),
            max_competition_links: default_max_competition_links(),
            max_text_blocks: default_max_text_blocks(),
            min_block_chars: default_min_block_chars(),
            max_match_links: default_max_match_links(),
            max_records: default_max_records(),
            requests_per_minute: default_requests_per_minute(),
            min_delay_secs: default_min_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

impl ScrapeConfig {
    /// Configured endpoint, ignoring blank values
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Freshness window in seconds
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: i64,
}

fn default_max_age_secs() -> i64 {
    6 * 60 * 60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_secs: default_max_age_secs(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load configuration from defaults, an optional config file and the
    /// environment.
    ///
    /// `DUDLEY__SCRAPE__ENDPOINT`, `DUDLEY__SERVER__PORT`, etc. override the
    /// file. The deployment variables `BROWSERLESS_WS`, `CLUB_SLUG`,
    /// `SEASON_YEAR` and `TZ` are honoured last.
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file if exists
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("DUDLEY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );
        let config = with_deployment_env(builder, |name| std::env::var(name).ok())?.build()?;

        Ok(config.try_deserialize()?)
    }
}

/// Deployment variable → config key
const DEPLOYMENT_ENV: &[(&str, &str)] = &[
    ("BROWSERLESS_WS", "scrape.endpoint"),
    ("CLUB_SLUG", "scrape.club_slug"),
    ("SEASON_YEAR", "scrape.season"),
    ("TZ", "scrape.timezone"),
];

fn with_deployment_env(
    mut builder: ConfigBuilder<DefaultState>,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ConfigBuilder<DefaultState>> {
    for (var, key) in DEPLOYMENT_ENV {
        let value = lookup(var).filter(|v| !v.trim().is_empty());
        builder = builder.set_override_option(*key, value)?;
    }
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.scrape.club_slug, "dudley-redhead-junior-rlfc-inc-12074");
        assert_eq!(config.scrape.season, 2025);
        assert_eq!(config.scrape.timezone, "Australia/Sydney");
        assert_eq!(config.scrape.navigation_timeout_secs, 45);
        assert_eq!(config.scrape.max_records, 200);
        assert_eq!(config.cache.max_age_secs, 21_600);
        assert!(config.scrape.endpoint.is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"scrape": {"endpoint": "ws://localhost:3000", "season": 2026}}"#,
        )
        .unwrap();
        assert_eq!(config.scrape.endpoint(), Some("ws://localhost:3000"));
        assert_eq!(config.scrape.season, 2026);
        assert_eq!(config.scrape.max_text_blocks, 120);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_blank_endpoint_is_unset() {
        let scrape = ScrapeConfig {
            endpoint: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(scrape.endpoint(), None);
    }

    #[test]
    fn test_deployment_env_overrides() {
        let builder = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default()).unwrap());
        let config: AppConfig = with_deployment_env(builder, |name| match name {
            "TZ" => Some("Australia/Perth".to_string()),
            "SEASON_YEAR" => Some("2026".to_string()),
            "CLUB_SLUG" => Some(" ".to_string()),
            _ => None,
        })
        .unwrap()
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap();

        assert_eq!(config.scrape.timezone, "Australia/Perth");
        assert_eq!(config.scrape.season, 2026);
        assert_eq!(config.scrape.club_slug, "dudley-redhead-junior-rlfc-inc-12074");
        assert!(config.scrape.endpoint.is_none());
    }
}
