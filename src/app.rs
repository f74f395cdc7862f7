use std::path::PathBuf;
use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::{StudioConfig, resolve_api_key, resolve_api_url};
use crate::errors::CliError;
use crate::gateway::Gateway;
use crate::output::OutputMode;

#[derive(Debug, Clone)]
pub struct Runtime {
    pub output: OutputMode,
    pub config: StudioConfig,
    pub config_path: PathBuf,
    pub api_url_override: Option<String>,
    pub timeout_ms: u64,
    pub retries: u32,
}

impl Runtime {
    pub fn resolved_api_url(&self) -> Result<String, CliError> {
        resolve_api_url(&self.config, self.api_url_override.as_deref())
    }

    pub fn api_client(&self) -> Result<ApiClient, CliError> {
        let api_key = resolve_api_key();
        if api_key.is_empty() {
            tracing::warn!("no API key in API_KEY or GEMINI_API_KEY; provider calls will fall back");
        }
        ApiClient::new(
            self.resolved_api_url()?,
            api_key,
            self.timeout_ms,
            self.retries,
            self.output.debug,
        )
    }

    pub fn gateway(&self) -> Result<Gateway, CliError> {
        Ok(Gateway::new(Arc::new(self.api_client()?), self.config.models()))
    }
}
