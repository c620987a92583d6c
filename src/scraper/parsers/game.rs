//! Fixture/result extraction from rendered text blocks.
//!
//! Page markup on the competitions site is unknown and changes, so this works
//! on whitespace-collapsed text only: find a "Home v Away" pair, look for a
//! score and a full-time marker, and guess a date.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use chrono_tz::Tz;
use regex::Regex;
use std::sync::OnceLock;

use super::dates::infer_date;
use crate::scraper::normalize::apply_score_suppression;
use crate::types::{GameRecord, GameStatus, Outcome};

/// Fallback venue for fixtures
pub const VENUE_TBC: &str = "TBC";

/// Days ahead used when a fixture has no readable date
const FIXTURE_PLACEHOLDER_DAYS: i64 = 3;

/// Words that end a team name when scanning away from the "v"
const STOP_WORDS: &[&str] = &[
    "v", "vs", "ft", "full", "time", "result", "results", "final", "at", "am", "pm", "round",
    "rd", "venue", "mon", "monday", "tue", "tues", "tuesday", "wed", "wednesday", "thu",
    "thur", "thurs", "thursday", "fri", "friday", "sat", "saturday", "sun", "sunday", "jan",
    "january", "feb", "february", "mar", "march", "apr", "april", "may", "jun", "june", "jul",
    "july", "aug", "august", "sep", "sept", "september", "oct", "october", "nov", "november",
    "dec", "december",
];

struct GamePatterns {
    versus: Regex,
    score: Regex,
    full_time: Regex,
    venue: Regex,
}

fn patterns() -> &'static GamePatterns {
    static PATTERNS: OnceLock<GamePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| GamePatterns {
        versus: Regex::new(r"(?i)\s+(?:vs\.?|v)\s+").unwrap(),
        score: Regex::new(r"\b(\d{1,3})\s*[-–]\s*(\d{1,3})\b").unwrap(),
        full_time: Regex::new(r"(?i)full[\s-]*time|\bft\b").unwrap(),
        venue: Regex::new(r"(?i)\b(?:field|oval|park|ground|stadium)s?\b").unwrap(),
    })
}

/// Where a text block came from
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    pub page_url: &'a str,
    pub grade_hint: &'a str,
    /// Match-centre links seen on the page
    pub match_links: &'a [String],
    pub season: i32,
    pub timezone: Tz,
    /// Crawl start; undated games are placed relative to it
    pub now: DateTime<Utc>,
}

impl PageContext<'_> {
    fn local_now(&self) -> DateTime<FixedOffset> {
        self.now.with_timezone(&self.timezone).fixed_offset()
    }
}

/// Home and away team names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teams {
    pub home: String,
    pub away: String,
}

/// Parser for fixture/result text blocks
pub struct GameParser;

impl GameParser {
    /// Classify one text block. `None` when it is not a game.
    pub fn parse(text: &str, ctx: &PageContext<'_>) -> Option<GameRecord> {
        let text = text.trim();
        let teams = Self::parse_teams(text)?;
        let score = Self::parse_score_pair(text);
        let full_time = Self::looks_full_time(text);
        let date = infer_date(text, ctx.season, ctx.timezone);

        if full_time || score.is_some() {
            let (score_home, score_away) = match score {
                Some((home, away)) => (Some(home), Some(away)),
                None => (None, None),
            };
            let record = GameRecord {
                date: date.unwrap_or_else(|| ctx.local_now()),
                grade: ctx.grade_hint.to_string(),
                home_team: teams.home,
                away_team: teams.away,
                outcome: Outcome::Result {
                    score_home,
                    score_away,
                    status: if full_time {
                        GameStatus::FullTime
                    } else {
                        GameStatus::Result
                    },
                    match_url: Some(
                        Self::match_link(text, ctx.match_links)
                            .unwrap_or(ctx.page_url)
                            .to_string(),
                    ),
                },
                source: ctx.page_url.to_string(),
            };
            return Some(apply_score_suppression(&record));
        }

        let venue = if patterns().venue.is_match(text) {
            text.to_string()
        } else {
            VENUE_TBC.to_string()
        };

        Some(GameRecord {
            date: date
                .unwrap_or_else(|| ctx.local_now() + Duration::days(FIXTURE_PLACEHOLDER_DAYS)),
            grade: ctx.grade_hint.to_string(),
            home_team: teams.home,
            away_team: teams.away,
            outcome: Outcome::Fixture { venue },
            source: ctx.page_url.to_string(),
        })
    }

    /// Number of "v"/"vs" separators; a game block has exactly one
    pub fn pairing_count(text: &str) -> usize {
        patterns().versus.find_iter(text).count()
    }

    /// Find "Home v Away" / "Home vs Away"
    pub fn parse_teams(text: &str) -> Option<Teams> {
        for sep in patterns().versus.find_iter(text) {
            let home = home_name(&text[..sep.start()]);
            let away = away_name(&text[sep.end()..]);
            if home.chars().count() >= 2 && away.chars().count() >= 2 {
                return Some(Teams { home, away });
            }
        }
        None
    }

    /// Find a score like "12-18" or "12 – 18"
    pub fn parse_score_pair(text: &str) -> Option<(u16, u16)> {
        for caps in patterns().score.captures_iter(text) {
            let whole = caps.get(0)?;
            let before = text[..whole.start()].chars().next_back();
            let after = text[whole.end()..].chars().next();
            // part of a date or time, e.g. 2025-08-10
            if before.is_some_and(is_date_joiner) || after.is_some_and(is_date_joiner) {
                continue;
            }
            let home = caps[1].parse().ok()?;
            let away = caps[2].parse().ok()?;
            return Some((home, away));
        }
        None
    }

    /// "Full Time" or a standalone "FT"
    pub fn looks_full_time(text: &str) -> bool {
        patterns().full_time.is_match(text)
    }

    /// First match-centre link whose last path segment appears in the text
    pub fn match_link<'a>(text: &str, links: &'a [String]) -> Option<&'a str> {
        links
            .iter()
            .find(|link| {
                link.trim_end_matches('/')
                    .rsplit('/')
                    .next()
                    .is_some_and(|segment| !segment.is_empty() && text.contains(segment))
            })
            .map(String::as_str)
    }
}


fn is_date_joiner(c: char) -> bool {
    matches!(c, '-' | '–' | '/' | ':')
}

fn is_name_token(token: &str) -> bool {
    let allowed = token
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '&' | '.' | '\'' | '’' | '(' | ')' | '-'));
    let has_letter = token.chars().any(char::is_alphabetic);
    let bare = token.trim_end_matches('.').to_lowercase();
    allowed && has_letter && !STOP_WORDS.contains(&bare.as_str())
}

/// Trailing run of name tokens before the separator
fn home_name(before: &str) -> String {
    let mut tokens: Vec<&str> = before
        .split_whitespace()
        .rev()
        .take_while(|t| is_name_token(t))
        .collect();
    tokens.reverse();
    tokens.join(" ")
}

/// Leading run of name tokens after the separator
fn away_name(after: &str) -> String {
    let mut tokens = Vec::new();
    for token in after.split_whitespace() {
        let bare = token.trim_end_matches([',', ';', ':', '!']);
        if bare.is_empty() || !is_name_token(bare) {
            break;
        }
        tokens.push(bare);
        if bare.len() != token.len() {
            break;
        }
    }
    tokens.join(" ")
}
