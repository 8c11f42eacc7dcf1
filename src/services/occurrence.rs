//! Next-occurrence arithmetic on the local Gregorian calendar.
//!
//! Every function here is total: malformed patterns degrade to a plain
//! "+interval" step and chrono range overflow returns the reference date.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime};

use crate::models::{
    is_valid_weekday, EndCondition, Frequency, MonthlySpec, RecurringPattern, WeekOfMonth,
};

pub fn next_occurrence(pattern: &RecurringPattern, from: NaiveDateTime) -> NaiveDateTime {
    let interval = pattern.interval().max(1);

    let next = match pattern.frequency() {
        Frequency::Daily | Frequency::Custom => add_days(from, interval as u64),
        Frequency::Weekly => next_weekly(pattern, from, interval),
        Frequency::Monthly => next_monthly(pattern.monthly_spec(), from, interval),
        Frequency::Yearly => add_months(from, interval.saturating_mul(12)),
    };

    next.unwrap_or_else(|| {
        log::warn!("[Recurrence] date overflow stepping {:?} from {}", pattern.frequency(), from);
        from
    })
}

/// The next `limit` due dates after `from`, without touching the counter.
///
/// `from` is the due date of the instance carrying `pattern`; that instance
/// uses up one of the remaining occurrences, so only the rest are listed.
/// Dates past an end date are dropped.
pub fn upcoming_occurrences(
    pattern: &RecurringPattern,
    from: NaiveDateTime,
    limit: usize,
) -> Vec<NaiveDateTime> {
    let budget = pattern
        .remaining_occurrences()
        .map_or(usize::MAX, |remaining| remaining.saturating_sub(1) as usize);

    let mut dates = Vec::new();
    let mut cursor = from;
    while dates.len() < limit.min(budget) {
        let next = next_occurrence(pattern, cursor);
        if next <= cursor {
            break;
        }
        if let EndCondition::OnDate { date } = pattern.end_condition() {
            if next > date {
                break;
            }
        }
        dates.push(next);
        cursor = next;
    }
    dates
}

fn next_weekly(
    pattern: &RecurringPattern,
    from: NaiveDateTime,
    interval: u32,
) -> Option<NaiveDateTime> {
    let days: Vec<u32> = pattern
        .days_of_week()
        .map(|set| set.iter().copied().filter(|d| is_valid_weekday(*d)).collect())
        .unwrap_or_default();

    // Set is ordered, so the first entry is the earliest weekday.
    let Some(&first_day) = days.first() else {
        return add_days(from, 7 * interval as u64);
    };

    let today = from.weekday().number_from_sunday();
    if let Some(&later) = days.iter().find(|d| **d > today) {
        return add_days(from, (later - today) as u64);
    }

    let week_start = from.checked_sub_days(Days::new((today - 1) as u64))?;
    add_days(week_start, 7 * interval as u64 + (first_day - 1) as u64)
}

fn next_monthly(spec: MonthlySpec, from: NaiveDateTime, interval: u32) -> Option<NaiveDateTime> {
    let target = add_months(from, interval)?;
    let (year, month) = (target.year(), target.month());

    let date = match spec {
        MonthlySpec::OrdinalWeekday { week, weekday } if is_valid_weekday(weekday) => {
            ordinal_weekday_in_month(year, month, week, weekday)?
        }
        MonthlySpec::DayOfMonth(day) if (1..=31).contains(&day) => {
            NaiveDate::from_ymd_opt(year, month, day.min(days_in_month(year, month)?))?
        }
        // add_months already clamps the reference day to the target month.
        _ => return Some(target),
    };

    Some(date.and_time(from.time()))
}

/// Nth or last `weekday` of the month. For an Nth that runs past the end of
/// the month the returned date lies in the following month.
pub fn ordinal_weekday_in_month(
    year: i32,
    month: u32,
    week: WeekOfMonth,
    weekday: u32,
) -> Option<NaiveDate> {
    match week.ordinal() {
        Some(n) => {
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            let offset = (weekday + 7 - first.weekday().number_from_sunday()) % 7;
            first.checked_add_days(Days::new((offset + 7 * (n - 1)) as u64))
        }
        None => {
            let mut day = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)?)?;
            while day.weekday().number_from_sunday() != weekday {
                day = day.pred_opt()?;
            }
            Some(day)
        }
    }
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = first.checked_add_months(Months::new(1))?;
    Some(next_first.pred_opt()?.day())
}

fn add_days(date: NaiveDateTime, days: u64) -> Option<NaiveDateTime> {
    date.checked_add_days(Days::new(days))
}

fn add_months(date: NaiveDateTime, months: u32) -> Option<NaiveDateTime> {
    date.checked_add_months(Months::new(months))
}
