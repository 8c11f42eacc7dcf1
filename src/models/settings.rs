use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub version: String,
    #[serde(default)]
    pub recurrence: RecurrenceSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            recurrence: RecurrenceSettings::default(),
            storage: StorageSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceSettings {
    /// Look for phrases like "every Monday" in new task titles.
    #[serde(default = "default_infer_from_text")]
    pub infer_from_text: bool,
    #[serde(default = "default_preview_count")]
    pub preview_count: usize,
}

impl Default for RecurrenceSettings {
    fn default() -> Self {
        Self {
            infer_from_text: true,
            preview_count: 5,
        }
    }
}

fn default_infer_from_text() -> bool {
    true
}

fn default_preview_count() -> usize {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    pub database_file: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_file: "taskpill.db".to_string(),
        }
    }
}
