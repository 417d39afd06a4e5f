//! Application settings management
//!
//! Stores non-sensitive configuration in a plain JSON file. No secret material
//! is ever written here.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::codec::PayloadEncoding;
use crate::error::{KeyforgeError, Result};
use crate::generator::GeneratorOptions;

const SETTINGS_VERSION: u32 = 1;

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Settings file version
    pub version: u32,
    /// Defaults for the password generator
    pub generator: GeneratorOptions,
    /// How new payloads are written and existing ones read
    pub payload_encoding: PayloadEncoding,
    /// Directory for the file ledger (defaults to `<data dir>/ledgers`)
    pub ledger_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            generator: GeneratorOptions::default(),
            payload_encoding: PayloadEncoding::Encoded,
            ledger_dir: None,
        }
    }
}

/// Default per-user data directory
pub fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("dev", "keyforge", "keyforge")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| KeyforgeError::SettingsError("Could not determine data directory".to_string()))
}

/// Settings manager
pub struct SettingsManager {
    data_dir: PathBuf,
    settings_file: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Load settings from `data_dir`, falling back to defaults
    pub fn new(data_dir: &Path) -> Self {
        let settings_file = data_dir.join("settings.json");
        let settings = Self::load_from_file(&settings_file).unwrap_or_else(|e| {
            debug!("Ignoring unreadable settings file: {}", e);
            Settings::default()
        });

        Self {
            data_dir: data_dir.to_path_buf(),
            settings_file,
            settings,
        }
    }

    fn load_from_file(path: &Path) -> Result<Settings> {
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        if settings.version > SETTINGS_VERSION {
            return Err(KeyforgeError::SettingsError(format!(
                "settings version {} is newer than supported {}",
                settings.version, SETTINGS_VERSION
            )));
        }

        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub async fn save(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let contents = serde_json::to_string_pretty(&self.settings)?;

        let temp_path = self.settings_file.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.settings_file).await?;

        debug!("Saved settings to {:?}", self.settings_file);
        Ok(())
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Update settings and save
    pub async fn update(&mut self, settings: Settings) -> Result<()> {
        self.settings = settings;
        self.save().await
    }

    /// Directory the file ledger should use
    pub fn ledger_dir(&self) -> PathBuf {
        self.settings
            .ledger_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("ledgers"))
    }

    /// Reset settings to defaults and delete the settings file
    pub async fn reset(&mut self) -> Result<()> {
        self.settings = Settings::default();

        if self.settings_file.exists() {
            tokio::fs::remove_file(&self.settings_file)
                .await
                .map_err(|e| KeyforgeError::SettingsError(e.to_string()))?;
        }

        Ok(())
    }
}
