pub mod recurrence;
pub mod task;

use std::path::PathBuf;
use std::time::Duration;

use rusqlite::Connection;

use crate::models::Settings;

/// What every command needs: where the database lives and the loaded settings.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db_path: PathBuf,
    pub settings: Settings,
}

impl AppState {
    pub fn open_db(&self) -> Result<Connection, String> {
        let conn = Connection::open(&self.db_path).map_err(|e| e.to_string())?;
        // Completions take a write lock up front; let a second writer wait for it.
        conn.busy_timeout(Duration::from_secs(5)).map_err(|e| e.to_string())?;
        Ok(conn)
    }
}
