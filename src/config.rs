use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::CliError;
use crate::gateway::Platform;

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_FAST_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_PRO_MODEL: &str = "gemini-3-pro-preview";

const API_URL_ENV: &str = "STUDIO_API_URL";
const API_KEY_ENVS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_fast_model")]
    pub fast_model: String,
    #[serde(default = "default_pro_model")]
    pub pro_model: String,
    #[serde(default)]
    pub default_platform: Platform,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            fast_model: default_fast_model(),
            pro_model: default_pro_model(),
            default_platform: Platform::default(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_fast_model() -> String {
    DEFAULT_FAST_MODEL.to_string()
}

fn default_pro_model() -> String {
    DEFAULT_PRO_MODEL.to_string()
}

/// Which model each gateway operation runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSet {
    pub fast: String,
    pub pro: String,
}

impl Default for ModelSet {
    fn default() -> Self {
        Self {
            fast: default_fast_model(),
            pro: default_pro_model(),
        }
    }
}

impl StudioConfig {
    pub fn models(&self) -> ModelSet {
        ModelSet {
            fast: self.fast_model.clone(),
            pro: self.pro_model.clone(),
        }
    }
}

pub fn config_dir() -> Result<PathBuf, CliError> {
    let base = dirs::config_dir().ok_or_else(|| {
        CliError::Generic("Could not resolve config directory for this OS.".to_string())
    })?;
    Ok(base.join("creator-studio"))
}

pub fn config_path() -> Result<PathBuf, CliError> {
    Ok(config_dir()?.join("config.json"))
}

pub fn load_config() -> Result<StudioConfig, CliError> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(StudioConfig::default());
    }

    let text = fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&text)?)
}

pub fn save_config(config: &StudioConfig) -> Result<PathBuf, CliError> {
    let path = config_path()?;
    let parent = path
        .parent()
        .ok_or_else(|| CliError::Generic("Invalid config path.".to_string()))?;
    fs::create_dir_all(parent)?;
    fs::write(&path, serde_json::to_string_pretty(config)?)?;
    Ok(path)
}

pub fn resolve_api_url(config: &StudioConfig, api_override: Option<&str>) -> Result<String, CliError> {
    let env_url = std::env::var(API_URL_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let url = api_override
        .map(str::to_string)
        .or(env_url)
        .unwrap_or_else(|| config.api_url.clone());
    validate_url(&url)?;
    Ok(url.trim_end_matches('/').to_string())
}

/// The credential comes only from the environment. A missing or empty key is
/// not an error here; provider calls fail later and fall back.
pub fn resolve_api_key() -> String {
    API_KEY_ENVS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .unwrap_or_default()
}

pub fn validate_url(value: &str) -> Result<(), CliError> {
    let parsed = Url::parse(value)?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(CliError::Usage(
            "API URL must use http:// or https://.".to_string(),
        ));
    }
    Ok(())
}
