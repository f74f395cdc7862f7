use clap::Args;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::Runtime;
use crate::errors::CliError;
use crate::gateway::ChatRole;
use crate::output::completion_json;
use crate::studio::ChatManager;

#[derive(Debug, Args)]
pub struct ChatArgs {
    /// Send one message and exit instead of starting a conversation
    pub message: Option<String>,
}

pub async fn handle(runtime: &Runtime, args: ChatArgs) -> Result<(), CliError> {
    let gateway = runtime.gateway()?;
    let mut chat = ChatManager::default();
    chat.activate(&gateway);

    if let Some(message) = args.message {
        if !chat.submit_turn(&gateway, &message).await {
            return Err(CliError::Usage(
                "Missing message. Use `studio chat \"...\"` or run `studio chat` for a conversation."
                    .to_string(),
            ));
        }
        return print_last_reply(runtime, &chat);
    }

    if runtime.output.json {
        return Err(CliError::Usage(
            "`--json` needs a single message: `studio chat --json \"...\"`.".to_string(),
        ));
    }

    runtime
        .output
        .print_stderr("Chatting with CreatorAssistant. /reset starts over, /quit leaves.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if !runtime.output.quiet {
            eprint!("> ");
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/reset" => {
                chat.reset();
                chat.activate(&gateway);
                runtime.output.print_stderr("Started a new conversation.");
                continue;
            }
            _ => {}
        }

        if chat.submit_turn(&gateway, &line).await {
            print_last_reply(runtime, &chat)?;
        }
    }

    tracing::info!(
        exchanges = chat.session().map_or(0, |s| s.exchanges()),
        "chat ended"
    );
    Ok(())
}

fn print_last_reply(runtime: &Runtime, chat: &ChatManager) -> Result<(), CliError> {
    let Some(result) = chat.last_reply() else {
        return Ok(());
    };

    if runtime.output.json {
        let mut payload = completion_json(result);
        payload["session"] = json!(chat.session().map(|s| s.id().to_string()));
        return runtime.output.print_json(&payload);
    }
    if let Some(reply) = chat.transcript().last().filter(|m| m.role == ChatRole::Model) {
        runtime.output.print_human(&reply.text);
    }
    if let Some(failure) = result.failure() {
        runtime.output.print_stderr(&format!("({failure})"));
    }
    Ok(())
}
