use crate::database::queries;
use crate::models::{CreateTaskRequest, NewTask, RecurringPattern, Task, TaskStatus};
use crate::services::interpreter;
use crate::services::lifecycle::CompletionOutcome;

use super::AppState;

pub fn create_task(state: &AppState, request: CreateTaskRequest) -> Result<Task, String> {
    let conn = state.open_db()?;

    // Explicit patterns from the form win over anything in the text.
    let recurring_pattern = request.recurring_pattern.or_else(|| {
        if !state.settings.recurrence.infer_from_text {
            return None;
        }
        let text = request.original_input.as_deref().unwrap_or(&request.title);
        interpreter::parse(text)
    });

    let new_task = NewTask {
        title: request.title,
        notes: request.notes,
        project: request.project,
        priority: request.priority.unwrap_or_default(),
        due_date: request.due_date,
        original_input: request.original_input,
        recurring_pattern,
        parent_id: None,
        is_current: false,
    };

    queries::insert_task(&conn, new_task).map_err(|e| e.to_string())
}

pub fn get_tasks(
    state: &AppState,
    status: Option<String>,
    limit: Option<i32>,
) -> Result<Vec<Task>, String> {
    let status = match status {
        Some(s) => Some(TaskStatus::from_str(&s).ok_or_else(|| format!("Unknown status: {}", s))?),
        None => None,
    };

    let conn = state.open_db()?;
    queries::get_tasks(&conn, status, limit).map_err(|e| e.to_string())
}

pub fn complete_task(state: &AppState, id: String) -> Result<CompletionOutcome, String> {
    let mut conn = state.open_db()?;
    queries::complete_task(&mut conn, &id).map_err(|e| e.to_string())
}

/// Set the pattern from the edit form (`pattern`) or from free text (`text`).
/// Text with no recognizable recurrence clears the pattern.
pub fn set_task_pattern(
    state: &AppState,
    id: String,
    pattern: Option<RecurringPattern>,
    text: Option<String>,
) -> Result<Task, String> {
    let pattern = pattern.or_else(|| text.as_deref().and_then(interpreter::parse));

    let conn = state.open_db()?;
    queries::update_task_pattern(&conn, &id, pattern.as_ref()).map_err(|e| e.to_string())
}

pub fn delete_task(state: &AppState, id: String) -> Result<(), String> {
    let conn = state.open_db()?;
    queries::delete_task(&conn, &id).map_err(|e| e.to_string())
}
