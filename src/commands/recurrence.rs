use chrono::Local;
use serde::Serialize;

use crate::models::RecurringPattern;
use crate::services::{interpreter, occurrence};
use crate::utils::time;

#[derive(Debug, Clone, Serialize)]
pub struct PatternPreview {
    pub pattern: RecurringPattern,
    pub display: String,
    /// Upcoming due dates, unix seconds.
    pub upcoming: Vec<i64>,
}

/// `Ok(None)` means the text is not recurring.
pub fn parse_recurrence(input: String) -> Result<Option<RecurringPattern>, String> {
    Ok(interpreter::parse(&input))
}

pub fn describe_pattern(pattern: RecurringPattern) -> String {
    pattern.display_string()
}

pub fn next_due_date(pattern: RecurringPattern, from: i64) -> Result<i64, String> {
    let from = time::local_from_timestamp(from).ok_or_else(|| format!("Invalid timestamp: {}", from))?;
    Ok(time::timestamp_from_local(occurrence::next_occurrence(&pattern, from)))
}

pub fn preview_occurrences(
    pattern: RecurringPattern,
    from: Option<i64>,
    count: usize,
) -> Result<PatternPreview, String> {
    let from = match from {
        Some(ts) => time::local_from_timestamp(ts).ok_or_else(|| format!("Invalid timestamp: {}", ts))?,
        None => Local::now().naive_local(),
    };

    let upcoming = occurrence::upcoming_occurrences(&pattern, from, count)
        .into_iter()
        .map(time::timestamp_from_local)
        .collect();

    Ok(PatternPreview {
        display: pattern.display_string(),
        pattern,
        upcoming,
    })
}
