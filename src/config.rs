//! Configuration file handling for kakeibo.
//!
//! The configuration file is stored at `$KAKEIBO_HOME/config.json` and names the store document,
//! the currency symbol prepended to amounts and the transaction type the category chart starts on.

use crate::model::TransactionType;
use crate::store::JsonFileStore;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "kakeibo";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const STORE_JSON: &str = "transactions.json";
const CURRENCY_SYMBOL: &str = "¥";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$KAKEIBO_HOME` and from there it loads `$KAKEIBO_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory and:
    /// - writes an initial `config.json` with default settings
    /// - writes an empty store document
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the kakeibo home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        let config = Self {
            root,
            config_path,
            config_file,
        };
        JsonFileStore::init(&config.store_path())
            .await
            .context("Unable to create the store document")?;
        Ok(config)
    }

    /// This will
    /// - validate that `kakeibo_home` exists and that the config file exists
    /// - load and validate the config file
    pub async fn load(kakeibo_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = kakeibo_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Kakeibo home is missing, run 'kakeibo init' first")?;
        let _ = utils::read_dir(&root)
            .await
            .context("Kakeibo home is not a readable directory")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        Ok(Self {
            root,
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

    /// The store document. Relative paths in the config file are resolved against the home
    /// directory.
    pub fn store_path(&self) -> PathBuf {
        let p = &self.config_file.store_file;
        if p.is_absolute() {
            return p.clone();
        }
        self.root.join(p)
    }

    /// Prepended to formatted amounts for display.
    pub fn currency_symbol(&self) -> &str {
        &self.config_file.currency_symbol
    }

    /// The transaction type the category chart starts on.
    pub fn default_chart_type(&self) -> TransactionType {
        self.config_file.default_chart_type
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "kakeibo",
///   "config_version": 1,
///   "store_file": "transactions.json",
///   "currency_symbol": "¥",
///   "default_chart_type": "expense"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "kakeibo"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Path to the store document, relative to the home directory or absolute
    #[serde(default = "default_store_file")]
    store_file: PathBuf,

    #[serde(default = "default_currency_symbol")]
    currency_symbol: String,

    #[serde(default)]
    default_chart_type: TransactionType,
}

fn default_store_file() -> PathBuf {
    PathBuf::from(STORE_JSON)
}

fn default_currency_symbol() -> String {
    CURRENCY_SYMBOL.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            store_file: default_store_file(),
            currency_symbol: default_currency_symbol(),
            default_chart_type: TransactionType::Expense,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from `path` and checks its `app_name`.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .context("Failed to load the config file")?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_then_load() {
        let env = TestEnv::new().await;
        let created = env.config();
        assert!(created.config_path().is_file());
        assert!(created.store_path().is_file());
        assert_eq!(created.store_path(), created.root().join(STORE_JSON));

        let loaded = Config::load(created.root()).await.unwrap();
        assert_eq!(loaded.root(), created.root());
        assert_eq!(loaded.currency_symbol(), "¥");
        assert_eq!(loaded.default_chart_type(), TransactionType::Expense);
    }

    #[tokio::test]
    async fn test_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(dir.path().join("nope")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_missing_config_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("config file is missing"));
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_JSON);
        let json = r#"{
            "app_name": "kakeibo",
            "config_version": 1,
            "default_chart_type": "income"
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.store_file, PathBuf::from(STORE_JSON));
        assert_eq!(config.currency_symbol, CURRENCY_SYMBOL);
        assert_eq!(config.default_chart_type, TransactionType::Income);
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_JSON);
        let json = r#"{ "app_name": "tiller", "config_version": 1 }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_absolute_store_file_is_used_as_is() {
        let env = TestEnv::new().await;
        let elsewhere = TempDir::new().unwrap();
        let store_file = elsewhere.path().join("book.json");
        let config_file = ConfigFile {
            store_file: store_file.clone(),
            ..ConfigFile::default()
        };
        config_file.save(env.config().config_path()).await.unwrap();

        let config = Config::load(env.config().root()).await.unwrap();
        assert_eq!(config.store_path(), store_file);
    }
}
