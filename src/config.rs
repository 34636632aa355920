//! Configuration file handling for verbrauch.
//!
//! The configuration file is stored at `$VERBRAUCH_HOME/config.json` and contains the name of the
//! data file, backup settings and the input step used when entering readings.

use crate::backup::Backup;
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "verbrauch";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const STEP: f64 = 0.1;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";

/// The fixed name of the data file, also used as the file name of exports.
pub const DATA_FILE: &str = "verbrauchsdaten.csv";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$VERBRAUCH_HOME` and from there it loads `$VERBRAUCH_HOME/config.json`. It
/// provides paths to other items that are either configurable or are expected in a certain
/// location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory, its backups subdirectory and an initial `config.json` with
    /// default settings. An existing `config.json` is left alone and loaded instead.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the verbrauch home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;
        utils::make_dir(root.join(BACKUPS)).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.is_file() {
            return Self::load(root).await;
        }
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        Ok(Self {
            backups: root.join(BACKUPS),
            root,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that `home` exists and that the config file exists
    /// - load the config file
    /// - validate that the backups directory exists
    /// - return the loaded configuration object
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The verbrauch home directory is missing, run 'verbrauch init'")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'verbrauch init'",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            backups: root.join(BACKUPS),
            root,
            config_path,
            config_file,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    pub fn step(&self) -> f64 {
        self.config_file.step
    }

    /// The number of decimals shown for readings, taken from the input step (at least one).
    pub fn precision(&self) -> usize {
        precision_of(self.config_file.step)
    }

    /// Returns the stored `data_file` if it is absolute, otherwise resolves it against the home
    /// directory.
    pub fn data_path(&self) -> PathBuf {
        let p = &self.config_file.data_file;
        if p.is_absolute() {
            return p.clone();
        }
        self.root.join(p)
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "verbrauch",
///   "config_version": 1,
///   "data_file": "verbrauchsdaten.csv",
///   "backup_copies": 5,
///   "step": 0.1
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "verbrauch"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Path to the data file, relative to the home directory or absolute
    #[serde(default = "default_data_file")]
    data_file: PathBuf,

    /// Number of backup copies to keep
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,

    /// The increment of the input surface; also determines display precision
    #[serde(default = "default_step")]
    step: f64,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            data_file: default_data_file(),
            backup_copies: BACKUP_COPIES,
            step: STEP,
        }
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from(DATA_FILE)
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

fn default_step() -> f64 {
    STEP
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or holds invalid settings
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path)
            .await
            .context("Failed to read config file")?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        ensure!(
            config.step.is_finite() && config.step > 0.0,
            "Invalid step in config file: must be greater than zero, got {}",
            config.step
        );
        ensure!(
            config.backup_copies >= 1,
            "Invalid backup_copies in config file: must be at least 1, got {}",
            config.backup_copies
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

/// Counts the decimals of `step`, e.g. 0.1 -> 1, 0.25 -> 2, 1.0 -> 1.
fn precision_of(step: f64) -> usize {
    let s = step.to_string();
    match s.split_once('.') {
        Some((_, decimals)) => decimals.trim_end_matches('0').len().max(1),
        None => 1,
    }
}
