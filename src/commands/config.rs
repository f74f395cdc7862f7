use clap::{Subcommand, ValueEnum};
use serde_json::json;

use crate::app::Runtime;
use crate::commands::optimize::parse_platform;
use crate::config::{StudioConfig, resolve_api_key, save_config, validate_url};
use crate::errors::{CliError, redact_secret};

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Read one config key
    Get { key: ConfigKey },
    /// Write one config key
    Set { key: ConfigKey, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    #[value(name = "apiUrl")]
    ApiUrl,
    #[value(name = "fastModel")]
    FastModel,
    #[value(name = "proModel")]
    ProModel,
    #[value(name = "platform")]
    Platform,
}

impl ConfigKey {
    fn name(self) -> &'static str {
        match self {
            ConfigKey::ApiUrl => "apiUrl",
            ConfigKey::FastModel => "fastModel",
            ConfigKey::ProModel => "proModel",
            ConfigKey::Platform => "platform",
        }
    }

    fn read(self, config: &StudioConfig) -> String {
        match self {
            ConfigKey::ApiUrl => config.api_url.clone(),
            ConfigKey::FastModel => config.fast_model.clone(),
            ConfigKey::ProModel => config.pro_model.clone(),
            ConfigKey::Platform => config.default_platform.to_string(),
        }
    }
}

pub async fn handle(runtime: &mut Runtime, command: ConfigCommand) -> Result<(), CliError> {
    match command {
        ConfigCommand::Show => show(runtime),
        ConfigCommand::Path => path(runtime),
        ConfigCommand::Get { key } => get(runtime, key),
        ConfigCommand::Set { key, value } => set(runtime, key, value),
    }
}

fn show(runtime: &Runtime) -> Result<(), CliError> {
    let api_url = runtime.resolved_api_url()?;
    let key = resolve_api_key();
    let key_display = (!key.is_empty()).then(|| redact_secret(&key));

    if runtime.output.json {
        return runtime.output.print_json(&json!({
            "path": runtime.config_path,
            "apiUrl": api_url,
            "fastModel": runtime.config.fast_model,
            "proModel": runtime.config.pro_model,
            "platform": runtime.config.default_platform,
            "apiKey": key_display,
        }));
    }

    runtime.output.print_human(&format!("apiUrl: {api_url}"));
    runtime
        .output
        .print_human(&format!("fastModel: {}", runtime.config.fast_model));
    runtime
        .output
        .print_human(&format!("proModel: {}", runtime.config.pro_model));
    runtime
        .output
        .print_human(&format!("platform: {}", runtime.config.default_platform));
    runtime.output.print_human(&format!(
        "apiKey: {}",
        key_display.as_deref().unwrap_or("(not set)")
    ));
    Ok(())
}

fn path(runtime: &Runtime) -> Result<(), CliError> {
    if runtime.output.json {
        return runtime
            .output
            .print_json(&json!({ "path": runtime.config_path }));
    }
    runtime
        .output
        .print_human(&runtime.config_path.display().to_string());
    Ok(())
}

fn get(runtime: &Runtime, key: ConfigKey) -> Result<(), CliError> {
    let value = key.read(&runtime.config);
    if runtime.output.json {
        return runtime
            .output
            .print_json(&json!({ "key": key.name(), "value": value }));
    }
    runtime.output.print_human(&value);
    Ok(())
}

fn set(runtime: &mut Runtime, key: ConfigKey, value: String) -> Result<(), CliError> {
    apply(&mut runtime.config, key, value)?;
    let path = save_config(&runtime.config)?;
    runtime.config_path = path;
    tracing::info!(key = key.name(), "config updated");

    if runtime.output.json {
        runtime.output.print_json(&json!({ "ok": true }))?;
    } else {
        runtime.output.print_human("Config updated.");
    }
    Ok(())
}

fn apply(config: &mut StudioConfig, key: ConfigKey, value: String) -> Result<(), CliError> {
    let value = value.trim().to_string();
    match key {
        ConfigKey::ApiUrl => {
            validate_url(&value)?;
            config.api_url = value.trim_end_matches('/').to_string();
        }
        ConfigKey::FastModel | ConfigKey::ProModel => {
            if value.is_empty() {
                return Err(CliError::Usage("Model name cannot be empty.".to_string()));
            }
            if key == ConfigKey::FastModel {
                config.fast_model = value;
            } else {
                config.pro_model = value;
            }
        }
        ConfigKey::Platform => config.default_platform = parse_platform(&value)?,
    }
    Ok(())
}
