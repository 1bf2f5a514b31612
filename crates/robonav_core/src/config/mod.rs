use crate::error::AppError;
use crate::model::TaskStatus;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "ROBONAV_CONFIG_PATH";
const DATA_DIR_ENV_VAR: &str = "ROBONAV_DATA_DIR";
const ASSETS_DIR_ENV_VAR: &str = "ROBONAV_ASSETS_DIR";
const BASE_URL_ENV_VAR: &str = "ROBONAV_BASE_URL";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone)]
pub struct Palette {
    pub active: &'static str,
    pub error: &'static str,
    pub queued: &'static str,
    pub complete: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn status(&self, status: TaskStatus) -> String {
        let color = match status {
            TaskStatus::Active => self.active,
            TaskStatus::Error => self.error,
            TaskStatus::Queued => self.queued,
            TaskStatus::Complete => self.complete,
            TaskStatus::Unknown => "",
        };
        if color.is_empty() {
            status.label().to_string()
        } else {
            format!("{}{}{}", color, status.label(), self.reset)
        }
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.and_then(canonical_theme_name).as_deref() {
        Some("noir") => Palette {
            active: "\x1b[38;5;208m",
            error: "\x1b[38;5;196m",
            queued: "\x1b[38;5;250m",
            complete: "\x1b[38;5;108m",
            reset: "\x1b[0m",
        },
        Some("solarized") => Palette {
            active: "\x1b[38;5;136m",
            error: "\x1b[38;5;160m",
            queued: "\x1b[38;5;245m",
            complete: "\x1b[38;5;64m",
            reset: "\x1b[0m",
        },
        _ => Palette {
            active: "",
            error: "",
            queued: "",
            complete: "",
            reset: "",
        },
    }
}

pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let cleaned = canonicalize_key(raw);
    if cleaned.is_empty() {
        return Some("default".into());
    }

    match cleaned.as_str() {
        "vanilla" | "light" => Some("default".to_string()),
        "dark" | "dark_mode" | "darkmode" => Some("noir".to_string()),
        other => Some(other.to_string()),
    }
}

/// Lowercases and collapses every non-alphanumeric run into one `_`.
pub fn canonicalize_key(raw: &str) -> String {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    cleaned.trim_matches('_').to_string()
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub assets_dir: Option<PathBuf>,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub theme: Option<String>,
}

impl Config {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn data_dir(&self) -> Result<PathBuf, AppError> {
        match self.data_dir.as_ref() {
            Some(dir) => Ok(dir.clone()),
            None => default_app_dir(),
        }
    }

    pub fn assets_dir(&self) -> Result<PathBuf, AppError> {
        match self.assets_dir.as_ref() {
            Some(dir) => Ok(dir.clone()),
            None => Ok(self.data_dir()?.join("assets")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub assets_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub theme: Option<String>,
}

impl ConfigOverrides {
    /// Overrides taken from `ROBONAV_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: non_empty_env(BASE_URL_ENV_VAR),
            assets_dir: non_empty_env(ASSETS_DIR_ENV_VAR).map(PathBuf::from),
            data_dir: non_empty_env(DATA_DIR_ENV_VAR).map(PathBuf::from),
            theme: None,
        }
    }

    /// Applies one `KEY=VALUE` pair; keys are canonicalized first.
    pub fn apply(&mut self, raw: &str) -> Result<(), AppError> {
        let (key, value) = raw
            .trim()
            .split_once('=')
            .ok_or_else(|| AppError::invalid_input("override must be in KEY=VALUE format"))?;
        let value = value.trim().to_string();

        match canonicalize_key(key).as_str() {
            "" => return Err(AppError::invalid_input("override key cannot be empty")),
            "base_url" | "url" => self.base_url = Some(value),
            "assets_dir" | "assets" => self.assets_dir = Some(PathBuf::from(value)),
            "data_dir" | "data" => self.data_dir = Some(PathBuf::from(value)),
            "theme" => self.theme = Some(value),
            other => {
                return Err(AppError::invalid_input(format!(
                    "unknown config field '{other}'"
                )));
            }
        }
        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn default_app_dir() -> Result<PathBuf, AppError> {
    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("robonav"))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join("robonav"))
    }
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Some(path) = non_empty_env(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }
    Ok(default_app_dir()?.join(CONFIG_FILE_NAME))
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let mut config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config.theme = config.theme.and_then(|name| canonical_theme_name(&name));
    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(base_url) = overrides.base_url.as_ref() {
        merged.base_url = Some(base_url.clone());
    }
    if let Some(assets_dir) = overrides.assets_dir.as_ref() {
        merged.assets_dir = Some(assets_dir.clone());
    }
    if let Some(data_dir) = overrides.data_dir.as_ref() {
        merged.data_dir = Some(data_dir.clone());
    }
    if let Some(theme) = overrides.theme.as_deref().and_then(canonical_theme_name) {
        merged.theme = Some(theme);
    }
    merged
}
