use crate::types::*;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid config file: {0}")]
    InvalidFormat(String),
}

/// Persistent key-value settings backed by one JSON object on disk.
pub struct ConfigStore {
    path: PathBuf,
    values: RwLock<Map<String, Value>>,
}

impl ConfigStore {
    /// Load the store at `path`, creating it with defaults when missing.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, MemoryError> {
        let path = path.as_ref().to_path_buf();

        let mut values = if fs::try_exists(&path).await? {
            let content = fs::read_to_string(&path).await?;
            match serde_json::from_str::<Value>(&content)? {
                Value::Object(map) => map,
                other => {
                    return Err(MemoryError::InvalidFormat(format!(
                        "expected a JSON object, found {}",
                        kind_of(&other)
                    )))
                }
            }
        } else {
            tracing::info!("Creating config store at {:?}", path);
            Map::new()
        };

        let added = apply_defaults(&mut values);
        let store = Self {
            path,
            values: RwLock::new(values),
        };

        if added {
            store.persist().await?;
        }

        tracing::debug!("Config store loaded from {:?}", store.path);
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.read().get(key).cloned()
    }

    pub fn get_str(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.read().get(key).and_then(Value::as_bool)
    }

    pub fn keys(&self) -> Vec<String> {
        self.values.read().keys().cloned().collect()
    }

    pub async fn set(&self, key: &str, value: Value) -> Result<(), MemoryError> {
        self.values.write().insert(key.to_string(), value);
        self.persist().await?;
        tracing::debug!("Config key set: {}", key);
        Ok(())
    }

    /// Returns whether the key existed.
    pub async fn delete(&self, key: &str) -> Result<bool, MemoryError> {
        let removed = self.values.write().remove(key).is_some();
        if removed {
            self.persist().await?;
            tracing::debug!("Config key deleted: {}", key);
        }
        Ok(removed)
    }

    pub fn api_key(&self) -> Option<String> {
        self.get_str(KEY_GEMINI_API_KEY).filter(|k| !k.is_empty())
    }

    pub fn hotkey(&self) -> String {
        self.get_str(KEY_HOTKEY)
            .unwrap_or_else(|| DEFAULT_HOTKEY.to_string())
    }

    pub fn voice_enabled(&self) -> bool {
        self.get_bool(KEY_VOICE_ENABLED).unwrap_or(true)
    }

    async fn persist(&self) -> Result<(), MemoryError> {
        let content = serde_json::to_string_pretty(&*self.values.read())?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Atomic write: write to temp file, then rename
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, content).await?;
        fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

fn apply_defaults(values: &mut Map<String, Value>) -> bool {
    let mut added = false;
    for (key, default) in [
        (KEY_HOTKEY, Value::from(DEFAULT_HOTKEY)),
        (KEY_VOICE_ENABLED, Value::from(true)),
    ] {
        if !values.contains_key(key) {
            values.insert(key.to_string(), default);
            added = true;
        }
    }
    added
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_defaults_on_first_open() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("genx-config.json");

        let store = ConfigStore::open(&path).await.unwrap();
        assert_eq!(store.hotkey(), DEFAULT_HOTKEY);
        assert!(store.voice_enabled());
        assert!(store.api_key().is_none());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_set_get_delete_persist() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("genx-config.json");

        {
            let store = ConfigStore::open(&path).await.unwrap();
            store
                .set(KEY_GEMINI_API_KEY, json!("AIzaSy-test-key-0123"))
                .await
                .unwrap();
            store.set(KEY_VOICE_ENABLED, json!(false)).await.unwrap();
            store.set("theme", json!("dark")).await.unwrap();
            assert!(store.delete("theme").await.unwrap());
            assert!(!store.delete("theme").await.unwrap());
        }

        let reopened = ConfigStore::open(&path).await.unwrap();
        assert_eq!(reopened.api_key().as_deref(), Some("AIzaSy-test-key-0123"));
        assert!(!reopened.voice_enabled());
        assert!(reopened.get("theme").is_none());
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_existing_values_survive_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("genx-config.json");
        std::fs::write(&path, r#"{"hotkey": "Alt+Space"}"#).unwrap();

        let store = ConfigStore::open(&path).await.unwrap();
        assert_eq!(store.hotkey(), "Alt+Space");
        assert_eq!(store.get(KEY_VOICE_ENABLED), Some(json!(true)));
    }

    #[tokio::test]
    async fn test_rejects_non_object_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("genx-config.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let err = ConfigStore::open(&path).await.err().unwrap();
        assert!(matches!(err, MemoryError::InvalidFormat(_)));
    }
}
