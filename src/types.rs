//! Game records, datasets and API response types.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Display name stamped on every dataset
pub const CLUB_NAME: &str = "Dudley Redhead JRLFC";

/// Result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Full time, confirmed final
    #[serde(rename = "FT")]
    FullTime,
    /// Completed but not marked final
    Result,
}

/// What kind of game a record describes.
///
/// Flattened into [`GameRecord`], so a result carries score/status keys and a
/// fixture carries only `venue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum Outcome {
    Result {
        score_home: Option<u16>,
        score_away: Option<u16>,
        status: GameStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        match_url: Option<String>,
    },
    Fixture {
        venue: String,
    },
}

/// A single fixture or result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub date: DateTime<FixedOffset>,
    pub grade: String,
    pub home_team: String,
    pub away_team: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub source: String,
}

impl GameRecord {
    pub fn is_result(&self) -> bool {
        matches!(self.outcome, Outcome::Result { .. })
    }

    /// (home, away) scores; `(None, None)` for fixtures
    pub fn scores(&self) -> (Option<u16>, Option<u16>) {
        match self.outcome {
            Outcome::Result {
                score_home,
                score_away,
                ..
            } => (score_home, score_away),
            Outcome::Fixture { .. } => (None, None),
        }
    }
}

/// The aggregate served to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub updated: DateTime<Utc>,
    pub club: String,
    pub season: i32,
    pub upcoming: Vec<GameRecord>,
    pub results: Vec<GameRecord>,
}

impl Dataset {
    /// Empty dataset for the configured club
    pub fn empty(season: i32) -> Self {
        Self {
            updated: Utc::now(),
            club: CLUB_NAME.to_string(),
            season,
            upcoming: Vec::new(),
            results: Vec::new(),
        }
    }
}

/// How a dataset was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Scrape,
    Fallback,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Scrape => write!(f, "scrape"),
            Provenance::Fallback => write!(f, "fallback"),
        }
    }
}

/// Cron (refresh) response
#[derive(Debug, Serialize, Deserialize)]
pub struct CronResponse {
    pub ok: bool,
    pub source: Provenance,
    pub updated: DateTime<Utc>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
