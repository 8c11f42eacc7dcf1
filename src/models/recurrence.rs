use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const SUNDAY: u32 = 1;
pub const MONDAY: u32 = 2;
pub const TUESDAY: u32 = 3;
pub const WEDNESDAY: u32 = 4;
pub const THURSDAY: u32 = 5;
pub const FRIDAY: u32 = 6;
pub const SATURDAY: u32 = 7;

const SHORT_DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const LONG_DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Weekday numbers run 1 (Sunday) through 7 (Saturday).
pub fn is_valid_weekday(day: u32) -> bool {
    (SUNDAY..=SATURDAY).contains(&day)
}

pub fn short_day_name(day: u32) -> Option<&'static str> {
    is_valid_weekday(day).then(|| SHORT_DAY_NAMES[(day - 1) as usize])
}

pub fn long_day_name(day: u32) -> Option<&'static str> {
    is_valid_weekday(day).then(|| LONG_DAY_NAMES[(day - 1) as usize])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Custom,
}

impl Frequency {
    fn unit(&self) -> &'static str {
        match self {
            Self::Daily | Self::Custom => "day",
            Self::Weekly => "week",
            Self::Monthly => "month",
            Self::Yearly => "year",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekOfMonth {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl WeekOfMonth {
    /// 1-based ordinal, `None` for `Last`.
    pub fn ordinal(&self) -> Option<u32> {
        match self {
            Self::First => Some(1),
            Self::Second => Some(2),
            Self::Third => Some(3),
            Self::Fourth => Some(4),
            Self::Last => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::First => "1st",
            Self::Second => "2nd",
            Self::Third => "3rd",
            Self::Fourth => "4th",
            Self::Last => "last",
        }
    }
}

/// Which day of the month a monthly pattern lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthlySpec {
    /// Same day-of-month as the reference date.
    #[default]
    Unspecified,
    /// The Nth calendar day, clamped to the month length.
    DayOfMonth(u32),
    /// The Nth (or last) occurrence of a weekday.
    OrdinalWeekday { week: WeekOfMonth, weekday: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EndCondition {
    #[default]
    Never,
    OnDate { date: NaiveDateTime },
    AfterOccurrences { count: u32 },
}

/// A recurrence rule attached to a single task.
///
/// All fields are read-only; edits go through the `with_*` methods which
/// return a new value. The only field that changes over a pattern's life is
/// the occurrence counter, and that too is advanced by producing a copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PatternRecord", into = "PatternRecord")]
pub struct RecurringPattern {
    frequency: Frequency,
    interval: u32,
    days_of_week: Option<BTreeSet<u32>>,
    monthly: MonthlySpec,
    end_condition: EndCondition,
    occurrence_count: u32,
}

impl RecurringPattern {
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            days_of_week: None,
            monthly: MonthlySpec::Unspecified,
            end_condition: EndCondition::Never,
            occurrence_count: 0,
        }
    }

    pub fn daily() -> Self {
        Self::new(Frequency::Daily)
    }

    pub fn weekly() -> Self {
        Self::new(Frequency::Weekly)
    }

    pub fn monthly() -> Self {
        Self::new(Frequency::Monthly)
    }

    pub fn yearly() -> Self {
        Self::new(Frequency::Yearly)
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn days_of_week(&self) -> Option<&BTreeSet<u32>> {
        self.days_of_week.as_ref()
    }

    pub fn monthly_spec(&self) -> MonthlySpec {
        self.monthly
    }

    pub fn end_condition(&self) -> EndCondition {
        self.end_condition
    }

    pub fn occurrence_count(&self) -> u32 {
        self.occurrence_count
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Zero is not a valid interval and is stored as 1.
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval.max(1);
        self
    }

    pub fn with_days_of_week<I>(mut self, days: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        let days: BTreeSet<u32> = days.into_iter().collect();
        self.days_of_week = if days.is_empty() { None } else { Some(days) };
        self
    }

    /// Adds the day if absent, removes it if present.
    pub fn toggle_day(mut self, day: u32) -> Self {
        let mut days = self.days_of_week.take().unwrap_or_default();
        if !days.remove(&day) {
            days.insert(day);
        }
        self.days_of_week = if days.is_empty() { None } else { Some(days) };
        self
    }

    pub fn with_monthly(mut self, monthly: MonthlySpec) -> Self {
        self.monthly = monthly;
        self
    }

    pub fn with_day_of_month(self, day: u32) -> Self {
        self.with_monthly(MonthlySpec::DayOfMonth(day))
    }

    pub fn with_ordinal_weekday(self, week: WeekOfMonth, weekday: u32) -> Self {
        self.with_monthly(MonthlySpec::OrdinalWeekday { week, weekday })
    }

    pub fn with_end_condition(mut self, end_condition: EndCondition) -> Self {
        self.end_condition = end_condition;
        self
    }

    /// Copy of this pattern with the occurrence counter advanced by one.
    pub fn with_incremented_occurrence(&self) -> Self {
        Self {
            occurrence_count: self.occurrence_count.saturating_add(1),
            ..self.clone()
        }
    }

    /// Short label for the task pill, e.g. "Every 2 weeks on Mon, Wed".
    pub fn display_string(&self) -> String {
        let mut text = match (self.frequency, self.interval) {
            (Frequency::Custom, n) => format!("Custom (every {})", plural(n, "day")),
            (Frequency::Daily, 1) => "Daily".to_string(),
            (Frequency::Weekly, 1) => "Weekly".to_string(),
            (Frequency::Monthly, 1) => "Monthly".to_string(),
            (Frequency::Yearly, 1) => "Yearly".to_string(),
            (frequency, n) => format!("Every {} {}s", n, frequency.unit()),
        };

        match self.frequency {
            Frequency::Weekly => {
                let names: Vec<&str> = self
                    .days_of_week
                    .iter()
                    .flatten()
                    .filter_map(|d| short_day_name(*d))
                    .collect();
                if !names.is_empty() {
                    text.push_str(&format!(" on {}", names.join(", ")));
                }
            }
            Frequency::Monthly => match self.monthly {
                MonthlySpec::OrdinalWeekday { week, weekday } => {
                    if let Some(name) = long_day_name(weekday) {
                        text.push_str(&format!(" on the {} {}", week.label(), name));
                    }
                }
                MonthlySpec::DayOfMonth(day) => text.push_str(&format!(" on day {}", day)),
                MonthlySpec::Unspecified => {}
            },
            _ => {}
        }

        if let EndCondition::OnDate { date } = self.end_condition {
            text.push_str(&format!(" until {}", date.format("%b %-d, %Y")));
        }
        if let Some(remaining) = self.remaining_occurrences() {
            text.push_str(&format!(" ({} remaining)", remaining));
        }

        text
    }

    /// Occurrences still allowed under an `AfterOccurrences` budget, counting
    /// the instance that currently carries this pattern.
    pub fn remaining_occurrences(&self) -> Option<u32> {
        match self.end_condition {
            EndCondition::AfterOccurrences { count } => {
                Some(count.saturating_sub(self.occurrence_count))
            }
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

fn plural(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

/// Stored shape of a pattern: flat, independently nullable monthly fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PatternRecord {
    frequency: Frequency,
    #[serde(default = "default_interval")]
    interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    days_of_week: Option<BTreeSet<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    day_of_month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    week_of_month: Option<WeekOfMonth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weekday_for_ordinal: Option<u32>,
    #[serde(default)]
    end_condition: EndCondition,
    #[serde(default)]
    occurrence_count: u32,
}

fn default_interval() -> u32 {
    1
}

impl From<PatternRecord> for RecurringPattern {
    fn from(record: PatternRecord) -> Self {
        // Ordinal form wins when a legacy record carries both.
        let monthly = match (record.week_of_month, record.weekday_for_ordinal, record.day_of_month) {
            (Some(week), Some(weekday), _) => MonthlySpec::OrdinalWeekday { week, weekday },
            (_, _, Some(day)) => MonthlySpec::DayOfMonth(day),
            _ => MonthlySpec::Unspecified,
        };

        Self {
            frequency: record.frequency,
            interval: record.interval.max(1),
            days_of_week: record.days_of_week,
            monthly,
            end_condition: record.end_condition,
            occurrence_count: record.occurrence_count,
        }
    }
}

impl From<RecurringPattern> for PatternRecord {
    fn from(pattern: RecurringPattern) -> Self {
        let (day_of_month, week_of_month, weekday_for_ordinal) = match pattern.monthly {
            MonthlySpec::Unspecified => (None, None, None),
            MonthlySpec::DayOfMonth(day) => (Some(day), None, None),
            MonthlySpec::OrdinalWeekday { week, weekday } => (None, Some(week), Some(weekday)),
        };

        Self {
            frequency: pattern.frequency,
            interval: pattern.interval,
            days_of_week: pattern.days_of_week,
            day_of_month,
            week_of_month,
            weekday_for_ordinal,
            end_condition: pattern.end_condition,
            occurrence_count: pattern.occurrence_count,
        }
    }
}
