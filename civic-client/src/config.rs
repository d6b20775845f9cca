use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_ANALYSIS_URL: &str = "http://127.0.0.1:8000";

pub const API_URL_ENV: &str = "CIVIC_API_URL";
pub const ANALYSIS_URL_ENV: &str = "CIVIC_ANALYSIS_URL";

/// Endpoints saved in `~/.civic/config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub analysis_url: Option<String>,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

/// Endpoints the client will talk to
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    pub api_url: String,
    pub analysis_url: String,
}

/// Configuration manager for the `.civic` directory
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Could not determine home directory")?;
        Ok(Self::at(home_dir.join(".civic")))
    }

    pub fn at(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }

    fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    /// Load saved configuration; a missing file is not an error
    pub fn load(&self) -> Result<Option<ClientConfig>> {
        let path = self.config_file();
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path).context("Failed to read client config")?;
        let config = serde_json::from_str(&json).context("Failed to parse client config")?;
        Ok(Some(config))
    }

    pub fn save(&self, config: &ClientConfig) -> Result<()> {
        fs::create_dir_all(&self.config_dir).context("Failed to create .civic directory")?;
        let json = serde_json::to_string_pretty(config).context("Failed to serialize client config")?;
        fs::write(self.config_file(), json).context("Failed to write client config")?;
        Ok(())
    }

    /// Determine the endpoints to use based on priority:
    /// 1. CLI argument (highest priority)
    /// 2. Environment variable
    /// 3. Saved configuration file
    /// 4. Built-in default
    pub fn resolve(
        &self,
        api_override: Option<String>,
        analysis_override: Option<String>,
    ) -> Result<Endpoints> {
        let saved = self.load()?;
        let api_url = pick(
            api_override,
            std::env::var(API_URL_ENV).ok(),
            saved.as_ref().and_then(|c| c.api_url.clone()),
            DEFAULT_API_URL,
        );
        let analysis_url = pick(
            analysis_override,
            std::env::var(ANALYSIS_URL_ENV).ok(),
            saved.as_ref().and_then(|c| c.analysis_url.clone()),
            DEFAULT_ANALYSIS_URL,
        );
        Ok(Endpoints {
            api_url,
            analysis_url,
        })
    }
}

fn pick(cli: Option<String>, env: Option<String>, saved: Option<String>, default: &str) -> String {
    [cli, env, saved]
        .into_iter()
        .flatten()
        .find(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
