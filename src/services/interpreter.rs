//! Best-effort recurrence detection in free text ("every other Monday",
//! "2nd Sunday of the month", "water plants weekly").
//!
//! Rules run in a fixed order and the first one that produces a pattern wins.
//! Text that matches nothing is simply not recurring.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Frequency, RecurringPattern, WeekOfMonth};

trait RecurrenceRule: Sync {
    fn name(&self) -> &'static str;

    /// `text` is already lowercased.
    fn apply(&self, text: &str, interval: u32) -> Option<RecurringPattern>;
}

const RULES: &[&dyn RecurrenceRule] = &[&OrdinalMonthlyRule, &FrequencyKeywordRule, &WeekdayListRule];

pub fn parse(text: &str) -> Option<RecurringPattern> {
    let lowered = text.to_lowercase();
    let interval = detect_interval(&lowered);

    RULES.iter().find_map(|rule| {
        let pattern = rule.apply(&lowered, interval)?;
        log::debug!(
            "[Recurrence] '{}' matched {} rule: {}",
            text,
            rule.name(),
            pattern.display_string()
        );
        Some(pattern)
    })
}

fn interval_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"every\s+(\d+)").expect("valid interval regex"))
}

fn ordinal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(1st|first|2nd|second|3rd|third|4th|fourth|last)\b")
            .expect("valid ordinal regex")
    })
}

fn weekday_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(sundays?|sun|mondays?|mon|tuesdays?|tues|tue|wednesdays?|wed|thursdays?|thurs|thur|thu|fridays?|fri|saturdays?|sat)\b",
        )
        .expect("valid weekday regex")
    })
}

fn frequency_regexes() -> &'static [(Frequency, Regex)] {
    static RES: OnceLock<Vec<(Frequency, Regex)>> = OnceLock::new();
    RES.get_or_init(|| {
        [
            (Frequency::Daily, r"daily|every\s+(other\s+|\d+\s+)?day"),
            (Frequency::Yearly, r"yearly|annually|every\s+(other\s+|\d+\s+)?year"),
            (Frequency::Monthly, r"monthly|every\s+(other\s+|\d+\s+)?month"),
            (Frequency::Weekly, r"weekly|every\s+(other\s+|\d+\s+)?week"),
        ]
        .into_iter()
        .map(|(frequency, pattern)| (frequency, Regex::new(pattern).expect("valid frequency regex")))
        .collect()
    })
}

/// "every other" means 2, "every N" means N (so "every 2nd" is 2), otherwise 1.
fn detect_interval(text: &str) -> u32 {
    if text.contains("every other") {
        return 2;
    }
    interval_regex()
        .captures(text)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .map(|n| n.max(1))
        .unwrap_or(1)
}

fn weekday_number(word: &str) -> Option<u32> {
    match word.get(..3)? {
        "sun" => Some(1),
        "mon" => Some(2),
        "tue" => Some(3),
        "wed" => Some(4),
        "thu" => Some(5),
        "fri" => Some(6),
        "sat" => Some(7),
        _ => None,
    }
}

/// Weekday numbers in order of appearance.
fn weekdays_in(text: &str) -> Vec<u32> {
    weekday_regex()
        .find_iter(text)
        .filter_map(|m| weekday_number(m.as_str()))
        .collect()
}

fn week_of_month(word: &str) -> Option<WeekOfMonth> {
    match word {
        "1st" | "first" => Some(WeekOfMonth::First),
        "2nd" | "second" => Some(WeekOfMonth::Second),
        "3rd" | "third" => Some(WeekOfMonth::Third),
        "4th" | "fourth" => Some(WeekOfMonth::Fourth),
        "last" => Some(WeekOfMonth::Last),
        _ => None,
    }
}

/// "2nd Sunday of the month", "last friday".
struct OrdinalMonthlyRule;

impl RecurrenceRule for OrdinalMonthlyRule {
    fn name(&self) -> &'static str {
        "ordinal-monthly"
    }

    fn apply(&self, text: &str, interval: u32) -> Option<RecurringPattern> {
        let week = ordinal_regex()
            .find(text)
            .and_then(|m| week_of_month(m.as_str()))?;
        let weekday = *weekdays_in(text).first()?;

        // "every monday this week" is not an ordinal.
        let monthly_context =
            text.contains("month") || !(text.contains("week") || text.contains("daily"));
        if !monthly_context {
            return None;
        }

        Some(
            RecurringPattern::monthly()
                .with_interval(interval)
                .with_ordinal_weekday(week, weekday),
        )
    }
}

/// "daily", "every year", "monthly", "every other week".
struct FrequencyKeywordRule;

impl RecurrenceRule for FrequencyKeywordRule {
    fn name(&self) -> &'static str {
        "frequency-keyword"
    }

    fn apply(&self, text: &str, interval: u32) -> Option<RecurringPattern> {
        let frequency = frequency_regexes()
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(frequency, _)| *frequency)?;

        Some(RecurringPattern::new(frequency).with_interval(interval))
    }
}

/// Any weekday names at all: "every Monday", "tue/thu".
struct WeekdayListRule;

impl RecurrenceRule for WeekdayListRule {
    fn name(&self) -> &'static str {
        "weekday-list"
    }

    fn apply(&self, text: &str, interval: u32) -> Option<RecurringPattern> {
        let days: BTreeSet<u32> = weekdays_in(text).into_iter().collect();
        if days.is_empty() {
            return None;
        }
        Some(
            RecurringPattern::weekly()
                .with_interval(interval)
                .with_days_of_week(days),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MonthlySpec, FRIDAY, MONDAY, SUNDAY, THURSDAY, TUESDAY};

    fn days(pattern: &RecurringPattern) -> Vec<u32> {
        pattern.days_of_week().map(|d| d.iter().copied().collect()).unwrap_or_default()
    }

    #[test]
    fn test_every_monday() {
        let pattern = parse("every Monday").unwrap();
        assert_eq!(pattern.frequency(), Frequency::Weekly);
        assert_eq!(pattern.interval(), 1);
        assert_eq!(days(&pattern), vec![MONDAY]);
    }

    #[test]
    fn test_second_sunday_of_the_month() {
        let pattern = parse("2nd Sunday of the month").unwrap();
        assert_eq!(pattern.frequency(), Frequency::Monthly);
        assert_eq!(
            pattern.monthly_spec(),
            MonthlySpec::OrdinalWeekday { week: WeekOfMonth::Second, weekday: SUNDAY }
        );
    }

    #[test]
    fn test_last_friday_without_month_word() {
        let pattern = parse("Pay rent last Friday").unwrap();
        assert_eq!(
            pattern.monthly_spec(),
            MonthlySpec::OrdinalWeekday { week: WeekOfMonth::Last, weekday: FRIDAY }
        );
    }

    #[test]
    fn test_ordinal_with_week_context_is_not_monthly() {
        let pattern = parse("first thing every week on tuesday").unwrap();
        assert_eq!(pattern.frequency(), Frequency::Weekly);
        assert_eq!(pattern.days_of_week(), None);
    }

    #[test]
    fn test_every_other_week() {
        let pattern = parse("every other week").unwrap();
        assert_eq!(pattern.interval(), 2);
        assert_eq!(pattern.frequency(), Frequency::Weekly);
        assert_eq!(pattern.days_of_week(), None);
    }

    #[test]
    fn test_numeric_interval() {
        let pattern = parse("Backup every 3 days").unwrap();
        assert_eq!(pattern.frequency(), Frequency::Daily);
        assert_eq!(pattern.interval(), 3);

        assert_eq!(parse("every 2 months").unwrap().interval(), 2);
        assert_eq!(parse("every 0 days").unwrap().interval(), 1);
    }

    #[test]
    fn test_frequency_keywords_in_priority_order() {
        assert_eq!(parse("daily standup").unwrap().frequency(), Frequency::Daily);
        assert_eq!(parse("Every day").unwrap().frequency(), Frequency::Daily);
        assert_eq!(parse("renew passport annually").unwrap().frequency(), Frequency::Yearly);
        assert_eq!(parse("every year").unwrap().frequency(), Frequency::Yearly);
        assert_eq!(parse("monthly review").unwrap().frequency(), Frequency::Monthly);
        assert_eq!(parse("WEEKLY sync").unwrap().frequency(), Frequency::Weekly);
        // Daily is checked before weekly.
        assert_eq!(parse("daily and weekly").unwrap().frequency(), Frequency::Daily);

        let monthly = parse("every month").unwrap();
        assert_eq!(monthly.monthly_spec(), MonthlySpec::Unspecified);
    }

    #[test]
    fn test_weekly_keyword_has_no_explicit_days() {
        let pattern = parse("every week on Monday").unwrap();
        assert_eq!(pattern.frequency(), Frequency::Weekly);
        assert_eq!(pattern.days_of_week(), None);

        let pattern = parse("every 2 weeks on Mon and Wed").unwrap();
        assert_eq!(pattern.interval(), 2);
        assert_eq!(pattern.days_of_week(), None);
    }

    #[test]
    fn test_frequency_keywords_match_inside_words() {
        let pattern = parse("biweekly standup").unwrap();
        assert_eq!(pattern.frequency(), Frequency::Weekly);
        assert_eq!(pattern.interval(), 1);

        assert_eq!(parse("semiannually").unwrap().frequency(), Frequency::Yearly);
        assert_eq!(parse("bimonthly report").unwrap().frequency(), Frequency::Monthly);
    }

    #[test]
    fn test_weekday_list() {
        let pattern = parse("gym tue/thu").unwrap();
        assert_eq!(pattern.frequency(), Frequency::Weekly);
        assert_eq!(days(&pattern), vec![TUESDAY, THURSDAY]);

        let pattern = parse("every other Monday").unwrap();
        assert_eq!(pattern.interval(), 2);
        assert_eq!(days(&pattern), vec![MONDAY]);
    }

    #[test]
    fn test_month_is_not_monday() {
        let pattern = parse("last Friday of every month").unwrap();
        assert_eq!(
            pattern.monthly_spec(),
            MonthlySpec::OrdinalWeekday { week: WeekOfMonth::Last, weekday: FRIDAY }
        );
    }

    #[test]
    fn test_every_two_prefix_sets_interval() {
        let pattern = parse("every 2nd Tuesday").unwrap();
        assert_eq!(pattern.interval(), 2);
        assert_eq!(pattern.frequency(), Frequency::Monthly);
        assert_eq!(
            pattern.monthly_spec(),
            MonthlySpec::OrdinalWeekday { week: WeekOfMonth::Second, weekday: TUESDAY }
        );

        assert_eq!(parse("every 20 days").unwrap().interval(), 20);
    }

    #[test]
    fn test_no_pattern() {
        assert_eq!(parse("just buy milk"), None);
        assert_eq!(parse(""), None);
        assert_eq!(parse("call mom about the weekend"), None);
    }

    #[test]
    fn test_rules_in_isolation() {
        assert!(OrdinalMonthlyRule.apply("every monday", 1).is_none());
        assert!(FrequencyKeywordRule.apply("every monday", 1).is_none());
        assert!(WeekdayListRule.apply("every monday", 1).is_some());
        assert!(WeekdayListRule.apply("monthly", 1).is_none());
    }
}
