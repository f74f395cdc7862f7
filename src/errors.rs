use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy)]
pub enum ExitCode {
    Generic = 1,
    Auth = 2,
    Usage = 3,
    Network = 4,
    RateLimited = 5,
    Server = 6,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    Network(String),
    #[error("{0}")]
    RateLimited(String),
    #[error("{0}")]
    Server(String),
    #[error("{0}")]
    Generic(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => ExitCode::Usage as i32,
            CliError::Auth(_) => ExitCode::Auth as i32,
            CliError::Network(_) => ExitCode::Network as i32,
            CliError::RateLimited(_) => ExitCode::RateLimited as i32,
            CliError::Server(_) => ExitCode::Server as i32,
            CliError::Generic(_) => ExitCode::Generic as i32,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        CliError::Generic(format!("I/O error: {value}"))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        CliError::Generic(format!("JSON error: {value}"))
    }
}

impl From<url::ParseError> for CliError {
    fn from(value: url::ParseError) -> Self {
        CliError::Usage(format!("Invalid URL: {value}"))
    }
}

impl From<reqwest::Error> for CliError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            return CliError::Network("Request timed out.".to_string());
        }
        CliError::Network(format!("Provider request failed: {value}"))
    }
}

pub fn with_debug_hint(message: &str, debug: bool) -> String {
    if debug {
        return message.to_string();
    }
    format!("{message} (try --debug for details)")
}

/// Keeps the first and last three characters of a secret and masks the rest.
/// Secrets of up to eight characters are masked completely.
pub fn redact_secret(input: &str) -> String {
    const SHOWN: usize = 3;
    let len = input.chars().count();
    if len <= SHOWN * 2 + 2 {
        return "*".repeat(len);
    }
    input
        .chars()
        .enumerate()
        .map(|(idx, c)| if idx < SHOWN || idx + SHOWN >= len { c } else { '*' })
        .collect()
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_secret_masks_the_middle() {
        assert_eq!(redact_secret("abcdefghij"), "abc****hij");
        assert_eq!(redact_secret(""), "");
    }

    #[test]
    fn short_secrets_are_fully_masked() {
        assert_eq!(redact_secret("abc"), "***");
        assert_eq!(redact_secret("abcdef"), "******");
        assert_eq!(redact_secret("abcdefgh"), "********");
        assert_eq!(redact_secret("abcdefghi"), "abc***ghi");
    }

    #[test]
    fn exit_codes_follow_error_kind() {
        assert_eq!(CliError::Usage(String::new()).exit_code(), 3);
        assert_eq!(CliError::Auth(String::new()).exit_code(), 2);
        assert_eq!(CliError::RateLimited(String::new()).exit_code(), 5);
        assert_eq!(ExitCode::Server.to_string(), "6");
    }

    #[test]
    fn debug_hint_only_when_not_debugging() {
        assert_eq!(with_debug_hint("boom", true), "boom");
        assert_eq!(with_debug_hint("boom", false), "boom (try --debug for details)");
    }
}
