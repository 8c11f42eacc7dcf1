use chrono::{Local, NaiveDateTime};

use crate::models::{EndCondition, RecurringPattern};

/// Whether the pattern may produce another occurrence, judged against the
/// local clock. Call after the counter for the completed instance has been
/// advanced.
pub fn should_continue(pattern: &RecurringPattern) -> bool {
    should_continue_at(pattern, Local::now().naive_local())
}

pub fn should_continue_at(pattern: &RecurringPattern, now: NaiveDateTime) -> bool {
    match pattern.end_condition() {
        EndCondition::Never => true,
        EndCondition::OnDate { date } => now <= date,
        EndCondition::AfterOccurrences { count } => pattern.occurrence_count() < count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn test_never_always_continues() {
        let mut pattern = RecurringPattern::daily();
        for _ in 0..50 {
            pattern = pattern.with_incremented_occurrence();
        }
        assert!(should_continue_at(&pattern, at(2099, 1, 1)));
    }

    #[test]
    fn test_on_date_compares_against_now() {
        let pattern = RecurringPattern::daily()
            .with_end_condition(EndCondition::OnDate { date: at(2026, 6, 1) });

        assert!(should_continue_at(&pattern, at(2026, 5, 31)));
        assert!(should_continue_at(&pattern, at(2026, 6, 1)));
        assert!(!should_continue_at(&pattern, at(2026, 6, 2)));
    }

    #[test]
    fn test_after_occurrences_counts_completed_instances() {
        let pattern = RecurringPattern::weekly()
            .with_end_condition(EndCondition::AfterOccurrences { count: 3 });
        let now = at(2026, 1, 1);

        let first = pattern.with_incremented_occurrence();
        let second = first.with_incremented_occurrence();
        let third = second.with_incremented_occurrence();

        assert!(should_continue_at(&first, now));
        assert!(should_continue_at(&second, now));
        assert!(!should_continue_at(&third, now));
    }

    #[test]
    fn test_past_end_date_stops_with_live_clock() {
        let pattern = RecurringPattern::daily()
            .with_end_condition(EndCondition::OnDate { date: at(2000, 1, 1) });
        assert!(!should_continue(&pattern));
    }
}
