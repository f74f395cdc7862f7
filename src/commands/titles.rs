use clap::Args;

use crate::app::Runtime;
use crate::commands::optimize::resolve_input;
use crate::errors::CliError;
use crate::output::completion_json;
use crate::studio::ContentEngine;

#[derive(Debug, Args)]
pub struct TitlesArgs {
    /// What the video is about
    pub topic: Option<String>,
    /// Read the topic from stdin
    #[arg(long)]
    pub stdin: bool,
}

pub async fn handle(runtime: &Runtime, args: TitlesArgs) -> Result<(), CliError> {
    let topic = resolve_input(args.topic.as_deref(), args.stdin, "topic")?;
    let gateway = runtime.gateway()?;

    let mut engine = ContentEngine::new(runtime.config.default_platform);
    engine.input = topic;
    engine.suggest_titles(&gateway).await;

    let result = engine
        .titles()
        .ok_or_else(|| CliError::Generic("Title suggestion did not settle.".to_string()))?;

    if runtime.output.json {
        return runtime.output.print_json(&completion_json(result));
    }

    if let Some(titles) = result.value() {
        for (idx, title) in titles.iter().enumerate() {
            runtime.output.print_human(&format!("{}. {title}", idx + 1));
        }
    }
    if let Some(failure) = result.failure() {
        runtime.output.print_stderr(&format!("({failure})"));
    }
    Ok(())
}
