//! Minis/Mods score suppression.
//!
//! Club policy: scores for the under-6 to under-12 grades (Minis and Mods) are
//! never published, whatever the source page shows.

use regex::Regex;
use std::sync::OnceLock;

use crate::types::{GameRecord, Outcome};

fn age_grade_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bu(?:[6-9]|1[0-2])\b").unwrap())
}

/// True for U6..U12 grades or labels mentioning "mini"/"mod"
pub fn is_minis_mods_grade(grade: Option<&str>) -> bool {
    let Some(grade) = grade else {
        return false;
    };
    let lower = grade.to_lowercase();
    age_grade_re().is_match(&lower) || lower.contains("mini") || lower.contains("mod")
}

/// Copy of `record` with scores nulled for Minis/Mods results
pub fn apply_score_suppression(record: &GameRecord) -> GameRecord {
    let mut out = record.clone();
    if is_minis_mods_grade(Some(&out.grade)) {
        if let Outcome::Result {
            score_home,
            score_away,
            ..
        } = &mut out.outcome
        {
            *score_home = None;
            *score_away = None;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GameStatus;
    use chrono::DateTime;

    fn result(grade: &str, home: u16, away: u16) -> GameRecord {
        GameRecord {
            date: DateTime::parse_from_rfc3339("2025-08-10T09:00:00+10:00").unwrap(),
            grade: grade.to_string(),
            home_team: "Dudley Redhead".to_string(),
            away_team: "Central".to_string(),
            outcome: Outcome::Result {
                score_home: Some(home),
                score_away: Some(away),
                status: GameStatus::FullTime,
                match_url: None,
            },
            source: "test".to_string(),
        }
    }

    #[test]
    fn test_minis_mods_grades() {
        for grade in ["U6", "u9", "U10 Div 2", "U12", "Under 8 Minis", "Mod League", "MINI"] {
            assert!(is_minis_mods_grade(Some(grade)), "{grade} should match");
        }
    }

    #[test]
    fn test_other_grades() {
        for grade in ["U13 Div 2", "U15 Div 1", "U19", "U1", "U5", "Open Men", ""] {
            assert!(!is_minis_mods_grade(Some(grade)), "{grade} should not match");
        }
        assert!(!is_minis_mods_grade(None));
    }

    #[test]
    fn test_suppresses_minis_scores() {
        let out = apply_score_suppression(&result("U9", 4, 10));
        assert_eq!(out.scores(), (None, None));
        assert_eq!(out.grade, "U9");
    }

    #[test]
    fn test_passes_other_scores_through() {
        let input = result("U15 Div 1", 12, 18);
        let out = apply_score_suppression(&input);
        assert_eq!(out, input);
        assert_eq!(out.scores(), (Some(12), Some(18)));
    }

    #[test]
    fn test_does_not_mutate_input() {
        let input = result("U7", 3, 2);
        let _ = apply_score_suppression(&input);
        assert_eq!(input.scores(), (Some(3), Some(2)));
    }

    #[test]
    fn test_idempotent() {
        for grade in ["U9", "U15 Div 1", "Mod"] {
            let once = apply_score_suppression(&result(grade, 20, 6));
            let twice = apply_score_suppression(&once);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_fixture_unchanged() {
        let mut fixture = result("U8", 0, 0);
        fixture.outcome = Outcome::Fixture {
            venue: "TBC".to_string(),
        };
        assert_eq!(apply_score_suppression(&fixture), fixture);
    }
}
