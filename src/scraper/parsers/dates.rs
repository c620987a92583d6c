//! Best-effort date inference from fixture/result text.
//!
//! Recognised forms: `10/08`, `10/08/2025`, `Sat 10 Aug`, `10th August 2025`,
//! `Aug 10`, `August 10, 2025`, each with an optional `10:30am` / `14:00` time.
//! Dates are day-first and read in the club's timezone.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use regex::Regex;
use std::sync::OnceLock;

const MONTHS: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

struct DatePatterns {
    numeric: Regex,
    day_month: Regex,
    month_day: Regex,
    time_12h: Regex,
    time_24h: Regex,
}

fn patterns() -> &'static DatePatterns {
    static PATTERNS: OnceLock<DatePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| DatePatterns {
        numeric: Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?\b").unwrap(),
        day_month: Regex::new(&format!(
            r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+{MONTHS}\b\.?(?:,?\s+(\d{{4}})\b)?"
        ))
        .unwrap(),
        month_day: Regex::new(&format!(
            r"(?i)\b{MONTHS}\b\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s*(\d{{4}})\b)?"
        ))
        .unwrap(),
        time_12h: Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*([ap])\.?m\b").unwrap(),
        time_24h: Regex::new(r"\b(\d{1,2}):(\d{2})\b").unwrap(),
    })
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.get(..3)?.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn parse_year(raw: Option<&str>, season: i32) -> Option<i32> {
    match raw {
        None => Some(season),
        Some(y) if y.len() == 2 => y.parse::<i32>().ok().map(|y| 2000 + y),
        Some(y) => y.parse().ok(),
    }
}

/// Calendar date mentioned in `text`, if any
pub fn find_date(text: &str, season: i32) -> Option<NaiveDate> {
    let p = patterns();

    if let Some(caps) = p.numeric.captures(text) {
        let day = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let year = parse_year(caps.get(3).map(|m| m.as_str()), season)?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = p.day_month.captures(text) {
        let day = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        let year = parse_year(caps.get(3).map(|m| m.as_str()), season)?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = p.month_day.captures(text) {
        let month = month_number(&caps[1])?;
        let day = caps[2].parse().ok()?;
        let year = parse_year(caps.get(3).map(|m| m.as_str()), season)?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

/// Kick-off time mentioned in `text`, if any
pub fn find_time(text: &str) -> Option<NaiveTime> {
    let p = patterns();

    if let Some(caps) = p.time_12h.captures(text) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = caps[3].eq_ignore_ascii_case("p");
        let hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    let caps = p.time_24h.captures(text)?;
    NaiveTime::from_hms_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, 0)
}

/// Date (and time, midnight if absent) in `text`, localised to `tz`
pub fn infer_date(text: &str, season: i32, tz: Tz) -> Option<DateTime<FixedOffset>> {
    let date = find_date(text, season)?;
    let time = find_time(text).unwrap_or_default();
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.fixed_offset())
}
