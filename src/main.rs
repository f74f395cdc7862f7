mod api;
mod app;
mod commands;
mod config;
mod errors;
mod gateway;
mod output;
mod parse;
mod studio;
mod tui;

use std::fs::{self, File};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::app::Runtime;
use crate::commands::analyze::AnalyzeArgs;
use crate::commands::chat::ChatArgs;
use crate::commands::config::ConfigCommand;
use crate::commands::optimize::OptimizeArgs;
use crate::commands::titles::TitlesArgs;
use crate::commands::tui::TuiArgs;
use crate::errors::CliError;
use crate::output::{OutputMode, print_error};

const LOG_ENV: &str = "STUDIO_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "studio",
    version,
    about = "AI assistant for video creators: optimize copy, brainstorm titles, analyze media, chat."
)]
struct Cli {
    #[arg(long = "api-url", global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, global = true)]
    quiet: bool,
    #[arg(long, global = true, default_value_t = 60_000)]
    timeout: u64,
    #[arg(long, global = true, default_value_t = 2)]
    retries: u32,
    #[arg(long, global = true)]
    verbose: bool,
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rewrite a draft for a platform
    Optimize(OptimizeArgs),
    /// Suggest five video titles for a topic
    Titles(TitlesArgs),
    /// Analyze an image or video
    Analyze(AnalyzeArgs),
    /// Talk to the creator assistant
    Chat(ChatArgs),
    /// Open the interactive studio
    Tui(TuiArgs),
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Check the API key and configured models
    Health,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let output = OutputMode {
        json: cli.json,
        quiet: cli.quiet,
        verbose: cli.verbose,
        debug: cli.debug,
    };

    init_logging(&output, matches!(cli.command, Commands::Tui(_)));

    let result = run(cli, output.clone()).await;
    if let Err(err) = result {
        tracing::debug!(code = err.exit_code(), "command failed");
        print_error(&err, &output);
        std::process::exit(err.exit_code());
    }
}

/// The TUI owns the terminal, so its logs go to a file next to the config.
fn init_logging(output: &OutputMode, to_file: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(output.log_directive()));

    if to_file {
        let log_file = config::config_dir().ok().and_then(|dir| {
            fs::create_dir_all(&dir).ok()?;
            File::create(dir.join("studio.log")).ok()
        });
        if let Some(file) = log_file {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli, output: OutputMode) -> Result<(), CliError> {
    let config = config::load_config()?;
    let config_path = config::config_path()?;

    let mut runtime = Runtime {
        output,
        config,
        config_path,
        api_url_override: cli.api_url,
        timeout_ms: cli.timeout,
        retries: cli.retries,
    };

    match cli.command {
        Commands::Optimize(args) => commands::optimize::handle(&runtime, args).await,
        Commands::Titles(args) => commands::titles::handle(&runtime, args).await,
        Commands::Analyze(args) => commands::analyze::handle(&runtime, args).await,
        Commands::Chat(args) => commands::chat::handle(&runtime, args).await,
        Commands::Tui(args) => commands::tui::handle(&runtime, args).await,
        Commands::Config { command } => commands::config::handle(&mut runtime, command).await,
        Commands::Health => commands::health::handle(&runtime).await,
    }
}
