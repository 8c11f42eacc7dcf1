//! What happens to a recurring task's series when one instance is completed.
//!
//! The decision (advance counter, check the end condition, compute the next
//! due date) is pure. Creating the successor is delegated to a [`TaskStore`];
//! callers that can race on the same task must run [`on_task_completed`]
//! under a single writer, as `database::queries::complete_task` does.

use chrono::{Local, NaiveDateTime};
use serde::Serialize;

use crate::error::StoreError;
use crate::models::{NewTask, RecurringPattern, Task};
use crate::services::{end_condition, occurrence};
use crate::utils::time;

pub trait TaskStore {
    fn create_task(&self, task: NewTask) -> Result<Task, StoreError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SuccessorPlan {
    NotRecurring,
    /// The advanced counter or the end date stops the series.
    Ended { final_pattern: RecurringPattern },
    Create(NewTask),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CompletionOutcome {
    NotRecurring,
    Ended { final_pattern: RecurringPattern },
    Spawned { successor: Task },
}

/// Decide whether `completed` gets a successor, reading the clock as `now`.
pub fn plan_successor(completed: &Task, now: NaiveDateTime) -> SuccessorPlan {
    let Some(pattern) = completed.recurring_pattern.as_ref() else {
        return SuccessorPlan::NotRecurring;
    };

    let advanced = pattern.with_incremented_occurrence();
    if !end_condition::should_continue_at(&advanced, now) {
        log::debug!(
            "[Recurrence] series for '{}' ended after {} occurrence(s)",
            completed.title,
            advanced.occurrence_count()
        );
        return SuccessorPlan::Ended { final_pattern: advanced };
    }

    let reference = completed
        .due_date
        .and_then(time::local_from_timestamp)
        .unwrap_or(now);
    let next_due = occurrence::next_occurrence(&advanced, reference);
    log::debug!(
        "[Recurrence] '{}' next due {} ({})",
        completed.title,
        next_due,
        advanced.display_string()
    );

    SuccessorPlan::Create(NewTask {
        title: completed.title.clone(),
        notes: completed.notes.clone(),
        project: completed.project.clone(),
        priority: completed.priority,
        due_date: Some(time::timestamp_from_local(next_due)),
        original_input: completed.original_input.clone(),
        recurring_pattern: Some(advanced),
        parent_id: None,
        is_current: false,
    })
}

/// Run the completion step for `completed` against `store`.
pub fn on_task_completed<S: TaskStore + ?Sized>(
    store: &S,
    completed: &Task,
) -> Result<CompletionOutcome, StoreError> {
    complete_at(store, completed, Local::now().naive_local())
}

pub fn complete_at<S: TaskStore + ?Sized>(
    store: &S,
    completed: &Task,
    now: NaiveDateTime,
) -> Result<CompletionOutcome, StoreError> {
    match plan_successor(completed, now) {
        SuccessorPlan::NotRecurring => Ok(CompletionOutcome::NotRecurring),
        SuccessorPlan::Ended { final_pattern } => Ok(CompletionOutcome::Ended { final_pattern }),
        SuccessorPlan::Create(new_task) => {
            let successor = store.create_task(new_task)?;
            log::info!(
                "[Recurrence] created successor {} for completed task {}",
                successor.id,
                completed.id
            );
            Ok(CompletionOutcome::Spawned { successor })
        }
    }
}
