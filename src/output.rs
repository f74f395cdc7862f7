use serde::Serialize;
use serde_json::{Value, json};

use crate::errors::CliError;
use crate::gateway::Completion;

#[derive(Debug, Clone)]
pub struct OutputMode {
    pub json: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub debug: bool,
}

impl OutputMode {
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<(), CliError> {
        let text = serde_json::to_string(value)?;
        println!("{text}");
        Ok(())
    }

    pub fn print_human(&self, message: &str) {
        if self.json || self.quiet {
            return;
        }
        println!("{message}");
    }

    pub fn print_stderr(&self, message: &str) {
        if self.json || self.quiet {
            return;
        }
        eprintln!("{message}");
    }

    pub fn print_verbose(&self, message: &str) {
        if !self.verbose || self.json || self.quiet {
            return;
        }
        eprintln!("{message}");
    }

    /// Default tracing directive for this output mode.
    pub fn log_directive(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        }
    }
}

pub fn print_error(error: &CliError, mode: &OutputMode) {
    if mode.json {
        let payload = serde_json::json!({
            "error": error.to_string(),
            "code": error.exit_code()
        });
        println!(
            "{}",
            serde_json::to_string(&payload)
                .unwrap_or_else(|_| "{\"error\":\"unknown\"}".to_string())
        );
        return;
    }

    eprintln!("Error: {error}");
}

/// Machine-readable form of a gateway result.
pub fn completion_json<T: Serialize>(completion: &Completion<T>) -> Value {
    json!({
        "status": completion.status(),
        "value": completion.value(),
        "failure": completion.failure().map(|f| json!({
            "kind": f.kind(),
            "reason": f.to_string(),
        })),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Failure, TitleList};

    #[test]
    fn completion_json_tags_fallbacks() {
        let value = completion_json(&Completion::Fallback {
            reason: Failure::Shape("not JSON".into()),
            value: TitleList::fallback(),
        });
        assert_eq!(value["status"], "fallback");
        assert_eq!(value["value"].as_array().map(Vec::len), Some(5));
        assert_eq!(value["failure"]["kind"], "shape");

        let ok = completion_json(&Completion::Ok("fine".to_string()));
        assert_eq!(ok, json!({ "status": "ok", "value": "fine", "failure": null }));
    }

    #[test]
    fn log_directive_follows_flags() {
        let mut mode = OutputMode { json: false, quiet: false, verbose: false, debug: false };
        assert_eq!(mode.log_directive(), "warn");
        mode.verbose = true;
        assert_eq!(mode.log_directive(), "info");
        mode.debug = true;
        assert_eq!(mode.log_directive(), "debug");
    }
}
