use crate::error::AppError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Storage key for the task list entry (JSON array of tasks).
pub const TASKS_KEY: &str = "tasks";
/// Storage key for the settings entry (JSON object).
pub const SETTINGS_KEY: &str = "settings";

const STATE_DIR_ENV_VAR: &str = "TODOAPP_STATE_DIR";

/// Minimal key-value persistence contract. Values are JSON strings; the
/// store itself is shape-agnostic so the task logic can run against any
/// backing (files in production, memory in tests).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
}

/// File-backed store keeping one `<key>.json` file per entry.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(Self::default_dir()?))
    }

    pub fn default_dir() -> Result<PathBuf, AppError> {
        if let Ok(dir) = std::env::var(STATE_DIR_ENV_VAR)
            && !dir.trim().is_empty()
        {
            return Ok(PathBuf::from(dir));
        }

        if cfg!(windows) {
            let appdata = std::env::var("APPDATA")
                .map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
            Ok(PathBuf::from(appdata).join("todoapp"))
        } else {
            let home =
                std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
            Ok(PathBuf::from(home).join(".config").join("todoapp"))
        }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        match std::fs::read_to_string(self.key_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(AppError::io(err.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        std::fs::create_dir_all(&self.dir).map_err(|err| AppError::io(err.to_string()))?;
        let path = self.key_path(key);
        std::fs::write(&path, value).map_err(|err| AppError::io(err.to_string()))?;
        set_owner_only(&path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn set_owner_only(path: &Path) -> Result<(), AppError> {
    use std::os::unix::fs::PermissionsExt;
    let permissions = std::fs::Permissions::from_mode(0o600);
    std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))
}

#[cfg(not(unix))]
fn set_owner_only(_path: &Path) -> Result<(), AppError> {
    Ok(())
}

/// In-memory store for tests and ephemeral sessions. Clones share the
/// same underlying map, so a test can keep a handle to inspect what the
/// task store wrote.
#[derive(Default, Clone)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FileStore, KeyValueStore, MemoryStore};
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("todoapp-{nanos}-{name}"))
    }

    #[test]
    fn file_store_round_trips_values() {
        let dir = temp_dir("round-trip");
        let store = FileStore::new(&dir);

        store.set("tasks", "[]").unwrap();
        let loaded = store.get("tasks").unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(loaded.as_deref(), Some("[]"));
    }

    #[test]
    fn file_store_missing_key_is_none() {
        let dir = temp_dir("missing-key");
        let store = FileStore::new(&dir);

        assert_eq!(store.get("settings").unwrap(), None);
    }

    #[test]
    fn file_store_overwrites_existing_value() {
        let dir = temp_dir("overwrite");
        let store = FileStore::new(&dir);

        store.set("settings", "{\"notificationsEnabled\":false}").unwrap();
        store.set("settings", "{\"notificationsEnabled\":true}").unwrap();
        let loaded = store.get("settings").unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(
            loaded.as_deref(),
            Some("{\"notificationsEnabled\":true}")
        );
    }

    #[test]
    fn memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let observer = store.clone();

        store.set("tasks", "[1]").unwrap();

        assert_eq!(observer.get("tasks").unwrap().as_deref(), Some("[1]"));
    }
}
