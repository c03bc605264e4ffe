//! Configuration file handling for HotelFlow.
//!
//! The configuration file is stored at `$HOTELFLOW_HOME/config.json` and holds the login
//! settings and the location of the storage directory.

use crate::app::{App, AuthSettings};
use crate::model::DEFAULT_PASSWORD;
use crate::store::{FileStorage, Store};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const APP_NAME: &str = "hotelflow";
const CONFIG_VERSION: u8 = 1;
const LOGIN_DELAY_MS: u64 = 1200;
const STORAGE: &str = "storage";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$HOTELFLOW_HOME` and from there it loads `$HOTELFLOW_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    storage_dir: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory, an initial `config.json` with default settings, and the
    /// storage directory.
    ///
    /// # Errors
    /// - Returns an error if `config.json` already exists or if any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the hotelflow home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            );
        }

        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        let storage_dir = resolve(&root, config_file.storage_dir());
        utils::make_dir(&storage_dir).await?;

        Ok(Self {
            root,
            config_path,
            storage_dir,
            config_file,
        })
    }

    /// This will
    /// - validate that `hotelflow_home` exists and that the config file exists
    /// - load and validate the config file
    /// - validate that the storage directory exists
    pub async fn load(hotelflow_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = hotelflow_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("HotelFlow Home is missing, run 'hotelflow init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let storage_dir = resolve(&root, config_file.storage_dir());
        if !storage_dir.is_dir() {
            bail!(
                "The storage directory is missing '{}'",
                storage_dir.display()
            )
        }
        debug!("Loaded config from {}", config_path.display());

        Ok(Self {
            root,
            config_path,
            storage_dir,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn login_delay(&self) -> Duration {
        Duration::from_millis(self.config_file.login_delay_ms)
    }

    pub fn default_password(&self) -> &str {
        self.config_file
            .default_password
            .as_deref()
            .unwrap_or(DEFAULT_PASSWORD)
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            default_password: self.default_password().to_string(),
            login_delay: self.login_delay(),
        }
    }

    /// Opens the application state kept in the storage directory.
    pub fn open(&self) -> Result<App> {
        let storage = FileStorage::new(&self.storage_dir)?;
        Ok(App::open(Store::new(storage), self.auth_settings()))
    }

    /// Replaces the login delay in memory only.
    #[cfg(test)]
    pub(crate) fn with_login_delay(mut self, delay: Duration) -> Self {
        self.config_file.login_delay_ms = delay.as_millis() as u64;
        self
    }
}

/// Returns `p` if it is absolute, otherwise resolves it against `root`.
fn resolve(root: &Path, p: PathBuf) -> PathBuf {
    if p.is_absolute() {
        return p;
    }
    root.join(p)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "hotelflow",
///   "config_version": 1,
///   "login_delay_ms": 1200,
///   "default_password": "password123",
///   "storage_dir": "storage"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "hotelflow"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// How long a login waits before answering, in milliseconds
    #[serde(default = "default_login_delay_ms")]
    login_delay_ms: u64,

    /// Accepted for accounts that have no password of their own. Defaults to `password123`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_password: Option<String>,

    /// Where the persisted records live (relative to config.json or absolute).
    /// Defaults to $HOTELFLOW_HOME/storage if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    storage_dir: Option<PathBuf>,
}

fn default_login_delay_ms() -> u64 {
    LOGIN_DELAY_MS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            login_delay_ms: LOGIN_DELAY_MS,
            default_password: None,
            storage_dir: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or names another app
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: ConfigFile = utils::deserialize(path.as_ref()).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
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

    /// Gets the storage directory.
    ///
    /// If the path is relative, it should be interpreted as relative to the config.json file.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(STORAGE))
    }
}
