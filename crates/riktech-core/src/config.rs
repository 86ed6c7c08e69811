use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::gateway::DEFAULT_BASE_URL;
use crate::orchestrator::CODE_LANGUAGES;
use crate::provider::Provider;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: Option<String>,
    pub provider: Option<String>,
    pub code_language: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            provider: Some(Provider::default().as_str().to_string()),
            code_language: None,
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    pub fn save_provider(provider: Provider) -> Result<()> {
        let mut config = Self::load().unwrap_or_else(|_| Self::new());
        config.provider = Some(provider.as_str().to_string());
        config.save()
    }

    /// Configured base URL, or the local default.
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Configured provider; unknown names fall back to the default.
    pub fn provider(&self) -> Provider {
        self.provider
            .as_deref()
            .and_then(Provider::from_str)
            .unwrap_or_default()
    }

    /// Index into the code language list, matched case-insensitively.
    pub fn code_language_index(&self) -> usize {
        self.code_language
            .as_deref()
            .and_then(|lang| {
                CODE_LANGUAGES
                    .iter()
                    .position(|l| l.eq_ignore_ascii_case(lang.trim()))
            })
            .unwrap_or(0)
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("riktech").join("config.json"))
    }
}
