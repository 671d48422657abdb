use std::{
    fs,
    path::PathBuf,
    sync::{LazyLock, RwLock},
};

use debrepo_utils::path::{resolve_path, xdg_config_home, xdg_data_home};
use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};
use toml_edit::DocumentMut;
use tracing::info;

use crate::{
    annotations::annotate_document,
    error::{ConfigError, Result},
};

pub const DEFAULT_API_ROOT: &str = "/debrepo/api/v3/";

/// Application's configuration
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Config {
    /// Path of the SQLite database holding repositories, versions and content.
    /// Default: $DEBREPO_ROOT/debrepo.db
    pub db_path: Option<String>,

    /// Prefix of every resource href (signing services, repositories, content).
    /// Must start and end with '/'.
    /// Default: "/debrepo/api/v3/"
    pub api_root: Option<String>,
}

pub static CONFIG: LazyLock<RwLock<Option<Config>>> = LazyLock::new(|| RwLock::new(None));

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("DEBREPO_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("debrepo").join("config.toml"),
    })
});

fn config_path() -> PathBuf {
    CONFIG_PATH
        .read()
        .map(|path| path.to_path_buf())
        .unwrap_or_else(|poisoned| poisoned.into_inner().to_path_buf())
}

/// Loads the configuration file and installs it as the global configuration.
pub fn init() -> Result<()> {
    let config = Config::new()?;
    let mut global_config = CONFIG.write().unwrap_or_else(|e| e.into_inner());
    *global_config = Some(config);
    Ok(())
}

/// Returns the global configuration, falling back to defaults when [`init`] was never called.
pub fn get_config() -> Config {
    let guard = CONFIG.read().unwrap_or_else(|e| e.into_inner());
    guard.clone().unwrap_or_else(Config::default_config)
}

fn debrepo_root() -> String {
    std::env::var("DEBREPO_ROOT")
        .unwrap_or_else(|_| format!("{}/debrepo", xdg_data_home().display()))
}

impl Config {
    pub fn default_config() -> Self {
        let root = debrepo_root();

        Self {
            db_path: Some(format!("{root}/debrepo.db")),
            api_root: Some(DEFAULT_API_ROOT.to_string()),
        }
    }

    /// Creates a new configuration by loading it from the configuration file.
    /// If the configuration file is not found, it uses the default configuration.
    pub fn new() -> Result<Self> {
        let config_path = config_path();

        let mut config: Config = match fs::read_to_string(&config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default_config(),
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    pub fn resolve(&mut self) -> Result<()> {
        let api_root = self
            .api_root
            .get_or_insert_with(|| DEFAULT_API_ROOT.to_string());
        if !api_root.starts_with('/') || !api_root.ends_with('/') {
            return Err(ConfigError::InvalidApiRoot(api_root.clone()));
        }

        if self.db_path.is_none() {
            self.db_path = Some(format!("{}/debrepo.db", debrepo_root()));
        }

        Ok(())
    }

    pub fn get_db_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var("DEBREPO_DB") {
            return Ok(resolve_path(&env_path)?);
        }
        match &self.db_path {
            Some(db_path) => Ok(resolve_path(db_path)?),
            None => Ok(resolve_path(&format!("{}/debrepo.db", debrepo_root()))?),
        }
    }

    pub fn api_root(&self) -> &str {
        self.api_root.as_deref().unwrap_or(DEFAULT_API_ROOT)
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;

        annotate_document::<Config>(&mut doc)?;

        Ok(doc)
    }
}

pub fn generate_default_config() -> Result<()> {
    let config_path = config_path();

    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    let def_config = Config::default_config();
    let annotated_doc = def_config.to_annotated_document()?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&config_path, annotated_doc.to_string())?;
    info!(
        "Default configuration file generated with documentation at: {}",
        config_path.display()
    );
    Ok(())
}
