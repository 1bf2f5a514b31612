use crate::error::AppError;
use crate::storage::json_store::write_atomic;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const PREFS_NAMESPACE: &str = "APP_PREFS";

/// Persistent string key-value storage, scoped to one namespace.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    fn put(&mut self, key: &str, value: &str) -> Result<(), AppError>;

    fn remove(&mut self, key: &str) -> Result<(), AppError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.values.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), AppError> {
        self.values.remove(key);
        Ok(())
    }
}

/// JSON object file at `<data_dir>/prefs/<namespace>.json`.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    pub fn open(data_dir: &Path) -> Self {
        Self::with_namespace(data_dir, PREFS_NAMESPACE)
    }

    pub fn with_namespace(data_dir: &Path, namespace: &str) -> Self {
        Self {
            path: data_dir.join("prefs").join(format!("{namespace}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, AppError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|err| AppError::io(format!("{}: {}", self.path.display(), err)))?;
        serde_json::from_str(&content).map_err(|err| {
            AppError::invalid_data(format!("invalid JSON in {}: {}", self.path.display(), err))
        })
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), AppError> {
        let content = serde_json::to_string_pretty(values)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        write_atomic(&self.path, content.as_bytes())
    }
}

impl KeyValueStore for FilePreferences {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.read_all()?.remove(key))
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn remove(&mut self, key: &str) -> Result<(), AppError> {
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FilePreferences, KeyValueStore};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("robonav-{nanos}-{label}"))
    }

    #[test]
    fn values_persist_across_handles() {
        let dir = temp_dir("prefs-persist");
        let mut prefs = FilePreferences::open(&dir);
        prefs.put("JWT_TOKEN", "abc").unwrap();
        prefs.put("other", "1").unwrap();

        let reopened = FilePreferences::open(&dir);
        let token = reopened.get("JWT_TOKEN").unwrap();
        let path = reopened.path().to_path_buf();
        fs::remove_dir_all(&dir).ok();

        assert_eq!(token.as_deref(), Some("abc"));
        assert!(path.ends_with("prefs/APP_PREFS.json"));
    }

    #[test]
    fn remove_keeps_other_keys() {
        let dir = temp_dir("prefs-remove");
        let mut prefs = FilePreferences::open(&dir);
        prefs.put("JWT_TOKEN", "abc").unwrap();
        prefs.put("username", "robotuser1").unwrap();

        prefs.remove("JWT_TOKEN").unwrap();
        let token = prefs.get("JWT_TOKEN").unwrap();
        let username = prefs.get("username").unwrap();
        fs::remove_dir_all(&dir).ok();

        assert_eq!(token, None);
        assert_eq!(username.as_deref(), Some("robotuser1"));
    }

    #[test]
    fn corrupt_file_is_invalid_data() {
        let dir = temp_dir("prefs-corrupt");
        let prefs = FilePreferences::open(&dir);
        fs::create_dir_all(prefs.path().parent().unwrap()).unwrap();
        fs::write(prefs.path(), "not json").unwrap();

        let err = prefs.get("JWT_TOKEN").unwrap_err();
        fs::remove_dir_all(&dir).ok();

        assert_eq!(err.code(), "invalid_data");
    }
}
