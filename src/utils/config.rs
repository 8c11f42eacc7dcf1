use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::Settings;

const ENV_DATA_DIR: &str = "TASKPILL_DATA_DIR";
const ENV_DB: &str = "TASKPILL_DB";

pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

pub fn data_dir_from_env() -> Option<PathBuf> {
    std::env::var(ENV_DATA_DIR)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Explicit directory wins, then `TASKPILL_DATA_DIR`, then `./data`.
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(data_dir_from_env)
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Reads `<data_dir>/config/settings.json`, falling back to defaults when
/// the file is absent.
pub fn load_settings(data_dir: &Path) -> Result<Settings> {
    let config_path = data_dir.join("config").join("settings.json");

    let mut settings = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("reading {}", config_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", config_path.display()))?
    } else {
        Settings::default()
    };

    apply_env_defaults(&mut settings);
    Ok(settings)
}

pub fn apply_env_defaults(settings: &mut Settings) {
    if let Some(db) = std::env::var(ENV_DB).ok().filter(|v| !v.trim().is_empty()) {
        settings.storage.database_file = db.trim().to_string();
    }
}

pub fn database_path(data_dir: &Path, settings: &Settings) -> PathBuf {
    let file = Path::new(&settings.storage.database_file);
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        data_dir.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_settings_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(dir.path()).unwrap();
        assert!(settings.recurrence.infer_from_text);
        assert_eq!(settings.recurrence.preview_count, 5);
    }

    #[test]
    fn test_partial_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(
            dir.path().join("config").join("settings.json"),
            r#"{"version":"1.0.0","recurrence":{"infer_from_text":false}}"#,
        )
        .unwrap();

        let settings = load_settings(dir.path()).unwrap();
        assert!(!settings.recurrence.infer_from_text);
        assert_eq!(settings.recurrence.preview_count, 5);
        assert_eq!(settings.storage.database_file, "taskpill.db");
    }

    #[test]
    fn test_relative_database_file_lives_in_data_dir() {
        let settings = Settings::default();
        assert_eq!(
            database_path(Path::new("/tmp/pill"), &settings),
            PathBuf::from("/tmp/pill/taskpill.db")
        );
    }
}
