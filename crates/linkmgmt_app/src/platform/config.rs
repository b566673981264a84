//! User configuration stored as TOML under `~/.config/link-mgmt/config.toml`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use linkmgmt_logging::{lm_info, lm_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_DIR: &str = "link-mgmt";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the home directory")]
    NoHome,
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid format `{0}`: expected section.key=value")]
    Malformed(String),
    #[error("unknown setting `{0}`")]
    UnknownKey(String),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cli: CliSettings,
}

/// Settings read by the terminal client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliSettings {
    pub base_url: String,
    /// Empty means no `Authorization` header is sent.
    pub api_key: String,
    pub scraper_url: String,
    /// Seconds.
    pub scrape_timeout: u64,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key: String::new(),
            scraper_url: "http://localhost:3000".to_string(),
            scrape_timeout: 30,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
        Ok(home.join(".config").join(CONFIG_DIR).join(CONFIG_FILENAME))
    }

    /// Reads the config at `path`, writing a default file first when none exists.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let config = Config::default();
                config.save(path)?;
                lm_info!("Created default config at {:?}", path);
                return Ok(config);
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.fill_blanks();
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(write_err)?;
        }
        fs::write(path, self.to_toml()?).map_err(write_err)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Applies one `section.key=value` assignment.
    pub fn set_value(&mut self, assignment: &str) -> Result<(), ConfigError> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| ConfigError::Malformed(assignment.to_string()))?;
        let key = key.trim();
        let value = value.trim();
        if key.split('.').count() != 2 {
            return Err(ConfigError::Malformed(assignment.to_string()));
        }

        match key {
            "cli.base_url" => self.cli.base_url = value.to_string(),
            "cli.api_key" => self.cli.api_key = value.to_string(),
            "cli.scraper_url" => self.cli.scraper_url = value.to_string(),
            "cli.scrape_timeout" => {
                self.cli.scrape_timeout = value
                    .parse()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    })?;
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Stores a freshly issued API key and writes the file.
    pub fn remember_api_key(&mut self, path: &Path, api_key: &str) -> Result<(), ConfigError> {
        self.set_value(&format!("cli.api_key={api_key}"))?;
        self.save(path)
    }

    pub fn scrape_timeout(&self) -> Duration {
        Duration::from_secs(self.cli.scrape_timeout)
    }

    pub fn api_key(&self) -> Option<&str> {
        Some(self.cli.api_key.as_str()).filter(|key| !key.is_empty())
    }

    fn fill_blanks(&mut self) {
        let defaults = CliSettings::default();
        if self.cli.base_url.trim().is_empty() {
            self.cli.base_url = defaults.base_url;
        }
        if self.cli.scraper_url.trim().is_empty() {
            self.cli.scraper_url = defaults.scraper_url;
        }
        if self.cli.scrape_timeout == 0 {
            lm_warn!("scrape_timeout of 0 in config; using {}s", defaults.scrape_timeout);
            self.cli.scrape_timeout = defaults.scrape_timeout;
        }
    }
}
