use std::path::PathBuf;

use clap::Args;

use crate::app::Runtime;
use crate::commands::optimize::print_text_completion;
use crate::errors::CliError;
use crate::studio::{MediaAttachment, MediaLab};

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Image or video file to analyze
    pub path: PathBuf,
    /// Media type, when the extension is not enough (e.g. "video/mp4")
    #[arg(long)]
    pub mime: Option<String>,
}

pub async fn handle(runtime: &Runtime, args: AnalyzeArgs) -> Result<(), CliError> {
    let attachment = MediaAttachment::from_path(&args.path, args.mime.as_deref())?;
    runtime.output.print_verbose(&format!(
        "Analyzing {} ({}, {} bytes)...",
        attachment.name(),
        attachment.mime_type(),
        attachment.bytes().len()
    ));

    let gateway = runtime.gateway()?;
    let mut lab = MediaLab::default();
    lab.attach(attachment);
    lab.analyze(&gateway).await;

    let result = lab
        .analysis()
        .ok_or_else(|| CliError::Generic("Analysis did not settle.".to_string()))?;
    print_text_completion(runtime, result)
}
