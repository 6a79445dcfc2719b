//! Persisted settings.
//!
//! The input layer only needs four string keys, one saved device identity per
//! port. [`SettingsStore`] is that narrow view; [`settings_file::SettingsFile`]
//! backs it with a TOML document on disk.

pub mod settings_file;

pub use settings_file::{HudConfig, SettingsError, SettingsFile};

/// Saved identity for each port, port 1 first. An empty value means "no default".
pub const PORT_SETTINGS_KEYS: [&str; 4] = [
    "input.controller_1_guid",
    "input.controller_2_guid",
    "input.controller_3_guid",
    "input.controller_4_guid",
];

pub trait SettingsStore {
    /// Value stored under a dotted key, empty when unset.
    fn get_string(&self, key: &str) -> String;

    fn set_string(&mut self, key: &str, value: &str);

    /// Writes the current values to durable storage.
    fn save(&mut self) -> Result<(), SettingsError>;
}
