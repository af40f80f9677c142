//! Configuration file handling for receipts.
//!
//! The configuration file is stored at `$RECEIPTS_HOME/config.json` and holds the Drive folder
//! that receipts are uploaded to and, optionally, where the secrets file lives. The secrets
//! themselves (OAuth credentials and the sheet name) are kept in a separate file, by default
//! `$RECEIPTS_HOME/.secrets/secrets.json`.

use crate::api::SecretsFile;
use crate::error::{ErrorType, IntoResult, Res};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "receipts";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const SECRETS_JSON: &str = "secrets.json";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$RECEIPTS_HOME` and from there it loads `$RECEIPTS_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory, its secrets subdirectory and:
    /// - Moves `secrets_file` into its default location, readable only by the owner.
    /// - Creates an initial `config.json` that uploads receipts into `drive_folder_id`.
    ///
    /// The secrets file is parsed before anything is moved so that a bad file is reported
    /// immediately rather than at the first `save`.
    pub async fn create(
        dir: impl Into<PathBuf>,
        secrets_file: &Path,
        drive_folder_id: &str,
    ) -> Result<Self> {
        Self::create_inner(dir.into(), secrets_file, drive_folder_id)
            .await
            .pub_result(ErrorType::Config)
    }

    async fn create_inner(
        maybe_relative: PathBuf,
        secrets_file: &Path,
        drive_folder_id: &str,
    ) -> Res<Self> {
        if drive_folder_id.trim().is_empty() {
            bail!("The Drive folder ID cannot be empty");
        }
        let _ = SecretsFile::load(secrets_file).await?;

        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the receipts home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let secrets_dir = root.join(SECRETS);
        utils::make_dir(&secrets_dir).await?;

        let secrets_destination = secrets_dir.join(SECRETS_JSON);
        utils::rename(secrets_file, &secrets_destination).await?;
        utils::set_private(&secrets_destination)?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            drive_folder_id: drive_folder_id.to_string(),
            secrets_path: None,
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            secrets: secrets_dir,
            config_path,
            config_file,
        })
    }

    /// Validates that `receipts_home` and its config file exist, then loads the config file.
    pub async fn load(receipts_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(receipts_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(maybe_relative: PathBuf) -> Res<Self> {
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Receipts home is missing, run 'receipts init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        Ok(Self {
            root: root.clone(),
            secrets: root.join(SECRETS),
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn secrets_dir(&self) -> &Path {
        &self.secrets
    }

    /// The ID of the Drive folder that receipts are uploaded into.
    pub fn drive_folder_id(&self) -> &str {
        &self.config_file.drive_folder_id
    }

    /// Returns the stored `secrets_path` if it is absolute, otherwise resolves it against the
    /// receipts home.
    pub fn secrets_path(&self) -> PathBuf {
        let p = self.config_file.secrets_path();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "receipts",
///   "config_version": 1,
///   "drive_folder_id": "10oc7gQhwLPKCdU7XlxizhzztdY7SoPYi",
///   "secrets_path": ".secrets/secrets.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "receipts"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The Google Drive folder that uploaded receipts are placed in
    drive_folder_id: String,

    /// Path to the secrets file (optional, relative to $RECEIPTS_HOME or absolute)
    /// Defaults to $RECEIPTS_HOME/.secrets/secrets.json if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    secrets_path: Option<PathBuf>,
}

impl ConfigFile {
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version == CONFIG_VERSION,
            "Unsupported config_version {} in {}. Is a newer version of receipts available?",
            config.config_version,
            path.display()
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }

    fn secrets_path(&self) -> PathBuf {
        self.secrets_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(SECRETS_JSON))
    }
}
