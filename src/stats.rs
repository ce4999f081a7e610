use crate::models::{ChartPoint, CheckLedger, HabitItem, ItemId};
use chrono::{Duration, Local, NaiveDate};

/// Window used when the requested day count is missing, zero, negative or garbage.
pub const DEFAULT_WINDOW_DAYS: usize = 7;
pub const MAX_WINDOW_DAYS: usize = 3650;
/// Average score at or above which a section counts as on target.
pub const GOAL_SCORE: u32 = 80;
/// Number of trailing window dates shown in a section's check grid.
pub const RECENT_DAYS: usize = 5;

/// Parses a free-text day count the way a lenient integer prefix parse would:
/// leading whitespace and sign are accepted, a `0x` prefix switches to hex,
/// and anything after the digits is ignored (`"14 days"` is 14).
pub fn parse_window(input: &str) -> usize {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (radix, digits) = match rest.get(..2) {
        Some("0x") | Some("0X") => (16, &rest[2..]),
        _ => (10, rest),
    };
    let count = digits
        .chars()
        .map_while(|c| c.to_digit(radix))
        .fold(0usize, |acc, digit| {
            acc.saturating_mul(radix as usize)
                .saturating_add(digit as usize)
        });

    if negative || count == 0 {
        DEFAULT_WINDOW_DAYS
    } else {
        count.min(MAX_WINDOW_DAYS)
    }
}

pub fn date_window(input: &str) -> Vec<String> {
    date_window_at(Local::now().date_naive(), parse_window(input))
}

/// `count` consecutive dates ending at `today`, oldest first.
pub fn date_window_at(today: NaiveDate, count: usize) -> Vec<String> {
    (0..count)
        .rev()
        .map(|offset| date_key(today - Duration::days(offset as i64)))
        .collect()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date_key(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

pub fn is_checked(checks: &CheckLedger, date: &str, item_id: ItemId) -> bool {
    checks
        .get(date)
        .and_then(|day| day.get(&item_id))
        .copied()
        .unwrap_or(false)
}

pub fn chart_series(checks: &CheckLedger, habits: &[&HabitItem], dates: &[String]) -> Vec<ChartPoint> {
    dates
        .iter()
        .map(|date| {
            let checked = habits
                .iter()
                .filter(|item| is_checked(checks, date, item.id))
                .count();
            let score = if habits.is_empty() {
                0
            } else {
                (checked as f64 / habits.len() as f64 * 100.0).round() as u32
            };
            ChartPoint {
                date: date.clone(),
                short_date: date.get(8..).unwrap_or(date.as_str()).to_string(),
                score,
            }
        })
        .collect()
}

pub fn average_score(series: &[ChartPoint]) -> u32 {
    if series.is_empty() {
        return 0;
    }
    let sum: u64 = series.iter().map(|point| u64::from(point.score)).sum();
    (sum as f64 / series.len() as f64).round() as u32
}

/// Checked days for an item across the whole ledger, not just a window.
pub fn total_completions(checks: &CheckLedger, item_id: ItemId) -> usize {
    checks
        .values()
        .filter(|day| day.get(&item_id).copied().unwrap_or(false))
        .count()
}
