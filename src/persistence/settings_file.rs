//! TOML-backed settings document.
//!
//! Keys are dotted paths, `section.key`. Sections this crate never touches
//! survive a load/save cycle unchanged.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use toml::{Table, Value};
use tracing::{debug, info, warn};

use super::SettingsStore;

const APP_DIR: &str = "padbind";
const FILE_NAME: &str = "settings.toml";
const PORTABLE_FILE_NAME: &str = "padbind.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("No configuration directory available on this system")]
    NoConfigDir,
}

/// Window settings kept in the `[ui]` section.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HudConfig {
    pub fps: u32,
    pub show_readout: bool,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            show_readout: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
    document: Table,
}

impl SettingsFile {
    /// Loads `path`, or starts from an empty document if it does not exist yet.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();

        let document = match fs::read_to_string(&path) {
            Ok(content) => content
                .parse::<Table>()
                .map_err(|source| SettingsError::Parse {
                    path: path.clone(),
                    source,
                })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No settings at {}, using defaults", path.display());
                Table::new()
            }
            Err(source) => return Err(SettingsError::Io { path, source }),
        };

        debug!("Loaded settings from {}", path.display());
        Ok(Self { path, document })
    }

    pub fn load_default() -> Result<Self, SettingsError> {
        Self::load(Self::resolve_path()?)
    }

    /// `padbind.toml` beside the executable when it exists (portable mode),
    /// otherwise `<config dir>/padbind/settings.toml`.
    pub fn resolve_path() -> Result<PathBuf, SettingsError> {
        let portable = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(PORTABLE_FILE_NAME)));
        if let Some(portable) = portable.filter(|p| p.exists()) {
            info!("Portable mode, settings at {}", portable.display());
            return Ok(portable);
        }

        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(FILE_NAME))
            .ok_or(SettingsError::NoConfigDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Typed view of a whole section; missing or malformed sections give defaults.
    pub fn section<T>(&self, name: &str) -> T
    where
        T: for<'de> Deserialize<'de> + Default,
    {
        let Some(value) = self.document.get(name) else {
            return T::default();
        };
        value.clone().try_into().unwrap_or_else(|e| {
            warn!("Ignoring malformed [{}] section: {}", name, e);
            T::default()
        })
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        let (section, name) = key.split_once('.')?;
        self.document.get(section)?.as_table()?.get(name)
    }
}

impl SettingsStore for SettingsFile {
    fn get_string(&self, key: &str) -> String {
        self.lookup(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn set_string(&mut self, key: &str, value: &str) {
        let Some((section, name)) = key.split_once('.') else {
            warn!("Settings key '{}' has no section", key);
            return;
        };

        let entry = self
            .document
            .entry(section.to_string())
            .or_insert_with(|| Value::Table(Table::new()));
        if !entry.is_table() {
            warn!("Replacing non-table value at [{}]", section);
            *entry = Value::Table(Table::new());
        }
        if let Value::Table(table) = entry {
            table.insert(name.to_string(), Value::String(value.to_string()));
        }
    }

    fn save(&mut self) -> Result<(), SettingsError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|source| SettingsError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(&self.document)?;
        fs::write(&self.path, content).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}
