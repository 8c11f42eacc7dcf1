use rusqlite::{Connection, OptionalExtension, TransactionBehavior};

use crate::error::StoreError;
use crate::models::{NewTask, Priority, RecurringPattern, Task, TaskStatus};
use crate::services::lifecycle::{self, CompletionOutcome, TaskStore};

const TASK_COLUMNS: &str = "id, title, notes, project, priority, status, due_date, original_input,
                            recurring_pattern, parent_id, is_current, created_at, updated_at, completed_at";

/// [`TaskStore`] over a connection or an open transaction.
pub struct SqliteTaskStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteTaskStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl TaskStore for SqliteTaskStore<'_> {
    fn create_task(&self, task: NewTask) -> Result<Task, StoreError> {
        insert_task(self.conn, task)
    }
}

pub fn insert_task(conn: &Connection, task: NewTask) -> Result<Task, StoreError> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().timestamp();
    let pattern_json = task
        .recurring_pattern
        .as_ref()
        .map(RecurringPattern::to_json)
        .transpose()?;

    conn.execute(
        "INSERT INTO tasks (id, title, notes, project, priority, status, due_date, original_input,
                            recurring_pattern, parent_id, is_current, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 'active', ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
        rusqlite::params![
            &id,
            &task.title,
            &task.notes,
            &task.project,
            task.priority.as_str(),
            task.due_date,
            &task.original_input,
            &pattern_json,
            &task.parent_id,
            task.is_current,
            now,
        ],
    )?;

    get_task(conn, &id)
}

pub fn get_task(conn: &Connection, id: &str) -> Result<Task, StoreError> {
    conn.query_row(
        &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
        [id],
        row_to_task,
    )
    .optional()?
    .ok_or_else(|| StoreError::NotFound(id.to_string()))
}

pub fn get_tasks(
    conn: &Connection,
    status: Option<TaskStatus>,
    limit: Option<i32>,
) -> Result<Vec<Task>, StoreError> {
    let limit_clause = limit.map(|l| format!("LIMIT {}", l)).unwrap_or_default();
    let query = format!(
        "SELECT {}
         FROM tasks
         WHERE (?1 IS NULL OR status = ?1)
         ORDER BY due_date IS NULL, due_date ASC, created_at DESC
         {}",
        TASK_COLUMNS, limit_clause
    );

    let mut stmt = conn.prepare(&query)?;
    let tasks = stmt
        .query_map([status.map(|s| s.as_str())], row_to_task)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(tasks)
}

/// Replace (or clear) the pattern on a task. The stored counter is whatever
/// the given pattern carries.
pub fn update_task_pattern(
    conn: &Connection,
    id: &str,
    pattern: Option<&RecurringPattern>,
) -> Result<Task, StoreError> {
    let pattern_json = pattern.map(RecurringPattern::to_json).transpose()?;
    let now = chrono::Utc::now().timestamp();

    let changed = conn.execute(
        "UPDATE tasks SET recurring_pattern = ?1, updated_at = ?2 WHERE id = ?3",
        rusqlite::params![&pattern_json, now, id],
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound(id.to_string()));
    }

    get_task(conn, id)
}

/// Mark a task completed and, for recurring tasks, create its successor.
///
/// Runs as one IMMEDIATE transaction so two completions of the same task
/// cannot both spawn a successor.
pub fn complete_task(conn: &mut Connection, id: &str) -> Result<CompletionOutcome, StoreError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let task = get_task(&tx, id)?;
    if task.status == TaskStatus::Completed {
        return Err(StoreError::AlreadyCompleted(id.to_string()));
    }

    let now = chrono::Utc::now().timestamp();
    tx.execute(
        "UPDATE tasks SET status = 'completed', completed_at = ?1, updated_at = ?1, is_current = 0
         WHERE id = ?2",
        rusqlite::params![now, id],
    )?;

    let outcome = lifecycle::on_task_completed(&SqliteTaskStore::new(&tx), &task)?;
    tx.commit()?;

    Ok(outcome)
}

pub fn delete_task(conn: &Connection, id: &str) -> Result<(), StoreError> {
    let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(StoreError::NotFound(id.to_string()));
    }
    Ok(())
}

fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    let id: String = row.get(0)?;
    let priority: String = row.get(4)?;
    let status: String = row.get(5)?;
    let pattern_json: Option<String> = row.get(8)?;

    let recurring_pattern = pattern_json.and_then(|raw| match RecurringPattern::from_json(&raw) {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            log::warn!("Undecodable recurring pattern on task {}: {}", id, e);
            None
        }
    });

    Ok(Task {
        id,
        title: row.get(1)?,
        notes: row.get(2)?,
        project: row.get(3)?,
        priority: Priority::from_str(&priority),
        status: TaskStatus::from_str(&status).unwrap_or_default(),
        due_date: row.get(6)?,
        original_input: row.get(7)?,
        recurring_pattern,
        parent_id: row.get(9)?,
        is_current: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
        completed_at: row.get(13)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;
    use crate::models::{EndCondition, WeekOfMonth, SUNDAY};

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::create_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn test_pattern_survives_storage() {
        let conn = memory_db();
        let pattern = RecurringPattern::monthly()
            .with_ordinal_weekday(WeekOfMonth::Second, SUNDAY)
            .with_end_condition(EndCondition::AfterOccurrences { count: 4 })
            .with_incremented_occurrence();

        let task = insert_task(
            &conn,
            NewTask {
                title: "Family call".to_string(),
                recurring_pattern: Some(pattern.clone()),
                ..Default::default()
            },
        )
        .unwrap();

        let loaded = get_task(&conn, &task.id).unwrap();
        assert_eq!(loaded.recurring_pattern, Some(pattern));
        assert_eq!(loaded.status, TaskStatus::Active);
    }

    #[test]
    fn test_undecodable_pattern_reads_as_not_recurring() {
        let conn = memory_db();
        let task = insert_task(&conn, NewTask { title: "Odd".to_string(), ..Default::default() }).unwrap();
        conn.execute(
            "UPDATE tasks SET recurring_pattern = 'not json' WHERE id = ?1",
            [&task.id],
        )
        .unwrap();

        assert_eq!(get_task(&conn, &task.id).unwrap().recurring_pattern, None);
    }

    #[test]
    fn test_missing_task() {
        let mut conn = memory_db();
        assert!(matches!(get_task(&conn, "nope"), Err(StoreError::NotFound(_))));
        assert!(matches!(delete_task(&conn, "nope"), Err(StoreError::NotFound(_))));
        assert!(matches!(complete_task(&mut conn, "nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_update_and_clear_pattern() {
        let conn = memory_db();
        let task = insert_task(&conn, NewTask { title: "Stretch".to_string(), ..Default::default() }).unwrap();

        let updated = update_task_pattern(&conn, &task.id, Some(&RecurringPattern::daily())).unwrap();
        assert!(updated.is_recurring());

        let cleared = update_task_pattern(&conn, &task.id, None).unwrap();
        assert!(!cleared.is_recurring());
    }

    #[test]
    fn test_status_filter() {
        let mut conn = memory_db();
        let done = insert_task(&conn, NewTask { title: "a".to_string(), ..Default::default() }).unwrap();
        insert_task(&conn, NewTask { title: "b".to_string(), ..Default::default() }).unwrap();
        complete_task(&mut conn, &done.id).unwrap();

        assert_eq!(get_tasks(&conn, Some(TaskStatus::Active), None).unwrap().len(), 1);
        assert_eq!(get_tasks(&conn, Some(TaskStatus::Completed), None).unwrap().len(), 1);
        assert_eq!(get_tasks(&conn, None, None).unwrap().len(), 2);
        assert_eq!(get_tasks(&conn, None, Some(1)).unwrap().len(), 1);
    }
}
