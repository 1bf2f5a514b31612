use crate::error::AppError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const ROBOTS_FILE: &str = "robots.json";
pub const LOCATIONS_FILE: &str = "locations.json";
pub const TASKS_FILE: &str = "tasks.json";

/// Backing store a collection is read from. The two are never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionSource {
    /// Read-only bundled files.
    Asset,
    /// Writable per-user files.
    Local,
}

/// Records plus the notice to surface when loading degraded to an empty result.
#[derive(Debug, Clone)]
pub struct CollectionLoad<T> {
    pub records: Vec<T>,
    pub notice: Option<AppError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataStore {
    assets_dir: PathBuf,
    data_dir: PathBuf,
}

impl DataStore {
    pub fn new(assets_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            data_dir: data_dir.into(),
        }
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, source: CollectionSource, name: &str) -> PathBuf {
        match source {
            CollectionSource::Asset => self.assets_dir.join(name),
            CollectionSource::Local => self.data_dir.join(name),
        }
    }

    pub fn local_exists(&self, name: &str) -> bool {
        self.path_for(CollectionSource::Local, name).exists()
    }

    /// Robots are read from the local copy once one has been written.
    pub fn robots_source(&self) -> CollectionSource {
        if self.local_exists(ROBOTS_FILE) {
            CollectionSource::Local
        } else {
            CollectionSource::Asset
        }
    }

    pub fn load_collection<T: DeserializeOwned>(
        &self,
        source: CollectionSource,
        name: &str,
    ) -> Result<Vec<T>, AppError> {
        let path = self.path_for(source, name);
        if !path.exists() {
            return match source {
                CollectionSource::Local => Ok(Vec::new()),
                CollectionSource::Asset => Err(AppError::invalid_data(format!(
                    "asset {name} not found in {}",
                    self.assets_dir.display()
                ))),
            };
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
        let records = serde_json::from_str(&content).map_err(|err| {
            AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
        })?;
        debug!(path = %path.display(), "loaded collection");
        Ok(records)
    }

    pub fn load_collection_or_notice<T: DeserializeOwned>(
        &self,
        source: CollectionSource,
        name: &str,
    ) -> CollectionLoad<T> {
        match self.load_collection(source, name) {
            Ok(records) => CollectionLoad {
                records,
                notice: None,
            },
            Err(err) => {
                warn!(collection = name, error = %err, "falling back to empty collection");
                CollectionLoad {
                    records: Vec::new(),
                    notice: Some(err),
                }
            }
        }
    }

    /// Replaces the named local file with `records`. Assets are never written.
    pub fn save_collection<T: Serialize>(&self, name: &str, records: &[T]) -> Result<(), AppError> {
        let path = self.path_for(CollectionSource::Local, name);
        let content = serde_json::to_string_pretty(records)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        write_atomic(&path, content.as_bytes())?;
        debug!(path = %path.display(), count = records.len(), "saved collection");
        Ok(())
    }
}

/// Writes through a sibling temporary file and renames it over `path`.
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<(), AppError> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| AppError::invalid_input(format!("{} has no file name", path.display())))?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(format!(".tmp-{}", std::process::id()));
    let temp_path = parent.join(temp_name);

    let written = write_and_sync(&temp_path, content).and_then(|()| {
        std::fs::rename(&temp_path, path).map_err(|err| AppError::io(err.to_string()))
    });
    if written.is_err() {
        std::fs::remove_file(&temp_path).ok();
    }
    written
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<(), AppError> {
    let mut file = std::fs::File::create(path).map_err(|err| AppError::io(err.to_string()))?;
    file.write_all(content)
        .map_err(|err| AppError::io(err.to_string()))?;
    file.sync_all().map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}
