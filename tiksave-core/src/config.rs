use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

pub const DEFAULT_PROVIDER_URL: &str = "https://www.tikwm.com/api/";
pub const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 15;
pub const DEFAULT_INSIGHTS_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_INSIGHTS_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECONDS: u64 = 300;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "snake_case")]
pub struct TiksaveConfig {
    pub provider: ProviderSection,
    pub insights: InsightsSection,
    pub download: DownloadSection,
}

impl TiksaveConfig {
    /// Checks values that deserialize fine but would make the client unusable.
    pub fn validate(&self) -> Result<()> {
        if self.provider.timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "provider.timeout_seconds",
                reason: "must be greater than zero".into(),
            });
        }
        if let Err(err) = url::Url::parse(&self.provider.base_url) {
            return Err(ConfigError::Invalid {
                field: "provider.base_url",
                reason: err.to_string(),
            });
        }
        if self.insights.enabled && self.insights.timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "insights.timeout_seconds",
                reason: "must be greater than zero".into(),
            });
        }
        if self.download.timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "download.timeout_seconds",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    pub fn resolve_output_dir<P: AsRef<Path>>(&self, candidate: Option<P>) -> PathBuf {
        match candidate {
            Some(path) => path.as_ref().to_path_buf(),
            None => PathBuf::from(&self.download.output_dir),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderSection {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: Option<String>,
}

impl ProviderSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_URL.to_string(),
            timeout_seconds: DEFAULT_FETCH_TIMEOUT_SECONDS,
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InsightsSection {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    /// Inline key; takes precedence over `api_key_env`.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub timeout_seconds: u64,
}

impl InsightsSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

impl Default for InsightsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_INSIGHTS_ENDPOINT.to_string(),
            model: DEFAULT_INSIGHTS_MODEL.to_string(),
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DownloadSection {
    pub output_dir: String,
    /// Upper bound for saving one media file, body included.
    pub timeout_seconds: u64,
}

impl DownloadSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for DownloadSection {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            timeout_seconds: DEFAULT_DOWNLOAD_TIMEOUT_SECONDS,
        }
    }
}

pub fn load_tiksave_config<P: AsRef<Path>>(path: P) -> Result<TiksaveConfig> {
    let config: TiksaveConfig = load_toml(path)?;
    config.validate()?;
    Ok(config)
}

/// Loads the config at `path` when it exists, defaults otherwise.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<TiksaveConfig> {
    let path = path.as_ref();
    if path.exists() {
        load_tiksave_config(path)
    } else {
        Ok(TiksaveConfig::default())
    }
}

fn load_toml<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        source,
        path: path.to_path_buf(),
    })
}
