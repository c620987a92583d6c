//! Hand-authored dataset served when no live crawl is possible.

use chrono::{DateTime, FixedOffset};

use crate::scraper::normalize::apply_score_suppression;
use crate::types::{Dataset, GameRecord, GameStatus, Outcome};

const SAMPLE_SOURCE: &str = "sample";

fn at(rfc3339: &str) -> DateTime<FixedOffset> {
    // Constant inputs below are valid RFC 3339
    DateTime::parse_from_rfc3339(rfc3339).unwrap_or_default()
}

fn fixture(date: &str, grade: &str, home: &str, away: &str, venue: &str) -> GameRecord {
    GameRecord {
        date: at(date),
        grade: grade.to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        outcome: Outcome::Fixture {
            venue: venue.to_string(),
        },
        source: SAMPLE_SOURCE.to_string(),
    }
}

fn full_time(
    date: &str,
    grade: &str,
    home: &str,
    away: &str,
    score: Option<(u16, u16)>,
) -> GameRecord {
    GameRecord {
        date: at(date),
        grade: grade.to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        outcome: Outcome::Result {
            score_home: score.map(|(home, _)| home),
            score_away: score.map(|(_, away)| away),
            status: GameStatus::FullTime,
            match_url: None,
        },
        source: SAMPLE_SOURCE.to_string(),
    }
}

/// Fallback dataset for `season`, stamped now
pub fn sample_dataset(season: i32) -> Dataset {
    let upcoming = vec![fixture(
        "2025-08-15T14:00:00+10:00",
        "U15 Div 1",
        "Dudley Redhead",
        "South Newcastle",
        "John Balcomb Field",
    )];

    let results = [
        full_time(
            "2025-08-09T10:00:00+10:00",
            "U13 Div 2",
            "Macquarie",
            "Dudley Redhead",
            Some((12, 18)),
        ),
        full_time(
            "2025-08-10T09:00:00+10:00",
            "U9",
            "Dudley Redhead",
            "Central",
            None,
        ),
    ]
    .iter()
    .map(apply_score_suppression)
    .collect();

    Dataset {
        upcoming,
        results,
        ..Dataset::empty(season)
    }
}
