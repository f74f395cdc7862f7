use std::io::{self, Read};

use clap::Args;

use crate::app::Runtime;
use crate::errors::CliError;
use crate::gateway::{Completion, Platform};
use crate::output::completion_json;
use crate::studio::ContentEngine;

#[derive(Debug, Args)]
pub struct OptimizeArgs {
    /// Draft caption, description or script
    pub text: Option<String>,
    /// Target platform: YouTube, Instagram or TikTok
    #[arg(short = 'p', long = "platform")]
    pub platform: Option<String>,
    /// Read the draft from stdin
    #[arg(long)]
    pub stdin: bool,
}

pub async fn handle(runtime: &Runtime, args: OptimizeArgs) -> Result<(), CliError> {
    let text = resolve_input(args.text.as_deref(), args.stdin, "draft")?;
    let platform = match args.platform.as_deref() {
        Some(value) => parse_platform(value)?,
        None => runtime.config.default_platform,
    };

    let gateway = runtime.gateway()?;
    let mut engine = ContentEngine::new(platform);
    engine.input = text;
    runtime
        .output
        .print_verbose(&format!("Optimizing for {platform}..."));
    engine.optimize(&gateway).await;

    let result = engine
        .optimized()
        .ok_or_else(|| CliError::Generic("Optimization did not settle.".to_string()))?;
    print_text_completion(runtime, result)
}

pub(crate) fn print_text_completion(
    runtime: &Runtime,
    result: &Completion<String>,
) -> Result<(), CliError> {
    if runtime.output.json {
        return runtime.output.print_json(&completion_json(result));
    }
    if let Some(text) = result.value() {
        runtime.output.print_human(text);
    }
    if let Some(failure) = result.failure() {
        runtime.output.print_stderr(&format!("({failure})"));
    }
    Ok(())
}

pub(crate) fn parse_platform(value: &str) -> Result<Platform, CliError> {
    Platform::parse(value).ok_or_else(|| {
        let known = Platform::ALL.map(Platform::as_str).join(", ");
        CliError::Usage(format!("Unknown platform '{value}'. Use one of: {known}."))
    })
}

pub(crate) fn resolve_input(arg: Option<&str>, stdin: bool, what: &str) -> Result<String, CliError> {
    if stdin {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .map_err(|e| CliError::Generic(format!("Failed reading stdin: {e}")))?;
        let trimmed = input.trim().to_string();
        if trimmed.is_empty() {
            return Err(CliError::Usage(format!(
                "No {what} provided via stdin. Pipe text or pass it as an argument."
            )));
        }
        return Ok(trimmed);
    }

    match arg {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(CliError::Usage(format!(
            "Missing {what}. Pass it as an argument or use `--stdin`."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_argument_is_a_usage_error() {
        assert!(matches!(resolve_input(Some("  "), false, "draft"), Err(CliError::Usage(_))));
        assert!(matches!(resolve_input(None, false, "topic"), Err(CliError::Usage(_))));
        assert_eq!(resolve_input(Some(" vlog "), false, "draft").unwrap(), "vlog");
    }

    #[test]
    fn platform_names_are_checked() {
        assert_eq!(parse_platform("instagram").unwrap(), Platform::Instagram);
        match parse_platform("vine") {
            Err(CliError::Usage(message)) => {
                assert!(message.ends_with("Use one of: YouTube, Instagram, TikTok."));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
