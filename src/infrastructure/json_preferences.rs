use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::{repository::PreferenceStore, settings::Settings, todo_list::ListId};

const ACTIVE_LIST_KEY: &str = "activeListId";
const SETTINGS_KEY: &str = "appSettings";

/// String key/value pairs kept in memory and mirrored to a JSON file on every
/// write. Without a path it lives only in memory.
pub struct JsonPreferences {
    path: Option<PathBuf>,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonPreferences {
    /// Loads `path` if it exists. An unreadable or malformed file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed preferences file");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read preferences");
                BTreeMap::new()
            }
        };
        Self { path: Some(path), entries: Mutex::new(entries) }
    }

    pub fn in_memory() -> Self { Self { path: None, entries: Mutex::new(BTreeMap::new()) } }

    fn get(&self, key: &str) -> Option<String> {
        match self.entries.lock() {
            Ok(entries) => entries.get(key).cloned(),
            Err(_) => None,
        }
    }

    fn put(&self, key: &str, value: Option<String>) {
        let Ok(mut entries) = self.entries.lock() else {
            tracing::warn!(key, "preferences lock poisoned, write dropped");
            return;
        };
        match value {
            Some(v) => { entries.insert(key.to_string(), v); }
            None => { entries.remove(key); }
        }
        if let Some(path) = &self.path {
            if let Err(e) = write_file(path, &entries) {
                tracing::warn!(path = %path.display(), error = %e, "could not persist preferences");
            }
        }
    }
}

fn write_file(path: &Path, entries: &BTreeMap<String, String>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() { if !parent.as_os_str().is_empty() { fs::create_dir_all(parent)?; } }
    fs::write(path, serde_json::to_string_pretty(entries)?)?;
    Ok(())
}

impl PreferenceStore for JsonPreferences {
    fn active_list_id(&self) -> Option<ListId> {
        self.get(ACTIVE_LIST_KEY)?.trim().parse::<i64>().ok().map(ListId)
    }

    fn set_active_list_id(&self, id: Option<ListId>) {
        self.put(ACTIVE_LIST_KEY, id.map(|id| id.0.to_string()));
    }

    fn settings(&self) -> Settings {
        if let Some(raw) = self.get(SETTINGS_KEY) {
            match serde_json::from_str(&raw) {
                Ok(settings) => return settings,
                Err(e) => tracing::warn!(error = %e, "stored settings unreadable, resetting to defaults"),
            }
        }
        let defaults = Settings::default();
        self.save_settings(&defaults);
        defaults
    }

    fn save_settings(&self, settings: &Settings) {
        match serde_json::to_string(settings) {
            Ok(raw) => self.put(SETTINGS_KEY, Some(raw)),
            Err(e) => tracing::warn!(error = %e, "could not encode settings"),
        }
    }
}
