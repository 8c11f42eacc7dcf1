//! Task manager backend. The interesting part is the recurrence engine in
//! [`services`]: next-date arithmetic, end conditions, free-text pattern
//! detection, and successor creation when a recurring task is completed.

pub mod commands;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use error::StoreError;
pub use models::{EndCondition, Frequency, MonthlySpec, RecurringPattern, WeekOfMonth};
pub use services::interpreter::parse;
pub use services::occurrence::next_occurrence;
