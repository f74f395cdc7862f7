use std::time::{Duration, Instant};

use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};
use tokio::time::sleep;

use crate::errors::{CliError, redact_secret, with_debug_hint};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: String,
    retries: u32,
    debug: bool,
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub request_id: Option<String>,
    pub elapsed_ms: u128,
    pub json: Value,
}

impl ApiClient {
    pub fn new(
        base_url: String,
        api_key: String,
        timeout_ms: u64,
        retries: u32,
        debug: bool,
    ) -> Result<Self, CliError> {
        let timeout = Duration::from_millis(timeout_ms.max(1));
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
            retries,
            debug,
        })
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub async fn get_json(
        &self,
        path: &str,
        query: Option<&[(String, String)]>,
    ) -> Result<ApiResponse, CliError> {
        self.request_json(Method::GET, path, query, None, true).await
    }

    /// Completion calls are never retried; the caller re-submits by hand.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<ApiResponse, CliError> {
        self.request_json(Method::POST, path, None, Some(body), false)
            .await
    }

    pub async fn generate_content(&self, model: &str, body: &Value) -> Result<ApiResponse, CliError> {
        self.post_json(&model_path(model, "generateContent"), body).await
    }

    pub async fn request_json(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(String, String)]>,
        body: Option<&Value>,
        idempotent: bool,
    ) -> Result<ApiResponse, CliError> {
        let url = join_url(&self.base_url, path);
        let max_attempts = if idempotent {
            self.retries.saturating_add(1)
        } else {
            1
        };

        for attempt in 0..max_attempts {
            let started = Instant::now();
            let mut request = self.client.request(method.clone(), url.clone());

            if let Some(query_items) = query {
                request = request.query(query_items);
            }

            if self.has_key() {
                request = request.header(API_KEY_HEADER, &self.api_key);
            }

            if let Some(payload) = body {
                request = request.json(payload);
            }

            tracing::debug!(%method, path, attempt, "provider request");
            let response = request.send().await;
            match response {
                Ok(resp) => {
                    let status = resp.status();
                    let request_id = resp
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .map(|s| s.to_string());

                    let text = resp.text().await.unwrap_or_default();
                    if is_retryable_status(status) && idempotent && attempt + 1 < max_attempts {
                        tracing::info!(status = status.as_u16(), attempt, "retrying provider request");
                        sleep(backoff_delay_ms(attempt)).await;
                        continue;
                    }

                    let parsed = if text.trim().is_empty() {
                        json!({})
                    } else {
                        serde_json::from_str::<Value>(&text)
                            .unwrap_or_else(|_| json!({ "raw": text }))
                    };

                    if status.is_success() {
                        return Ok(ApiResponse {
                            request_id,
                            elapsed_ms: started.elapsed().as_millis(),
                            json: parsed,
                        });
                    }

                    return Err(self.http_error(status, request_id, parsed));
                }
                Err(err) => {
                    let transient = err.is_timeout() || err.is_connect() || err.is_request();
                    if transient && idempotent && attempt + 1 < max_attempts {
                        sleep(backoff_delay_ms(attempt)).await;
                        continue;
                    }

                    let message = if err.is_timeout() {
                        "Request timed out.".to_string()
                    } else {
                        format!("Provider request failed: {}", self.scrub(&err.to_string()))
                    };
                    return Err(CliError::Network(with_debug_hint(&message, self.debug)));
                }
            }
        }

        Err(CliError::Network(with_debug_hint(
            "Request failed after retries.",
            self.debug,
        )))
    }

    fn http_error(
        &self,
        status: StatusCode,
        request_id: Option<String>,
        payload: Value,
    ) -> CliError {
        let message = error_message(&payload)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

        let mut details = self.scrub(&message);
        if let Some(id) = request_id {
            details.push_str(&format!(" (request_id: {id})"));
        }
        if self.debug {
            details.push_str(&format!(" payload={}", self.scrub(&payload.to_string())));
        } else {
            details = with_debug_hint(&details, false);
        }

        match status.as_u16() {
            400 => CliError::Usage(details),
            401 | 403 => CliError::Auth(details),
            429 => CliError::RateLimited(details),
            500..=599 => CliError::Server(details),
            _ => CliError::Generic(details),
        }
    }

    fn scrub(&self, text: &str) -> String {
        if self.api_key.is_empty() {
            return text.to_string();
        }
        text.replace(&self.api_key, &redact_secret(&self.api_key))
    }
}

fn error_message(payload: &Value) -> Option<String> {
    let error = payload.get("error");
    error
        .and_then(|e| e.get("message"))
        .and_then(|v| v.as_str())
        .or_else(|| error.and_then(|v| v.as_str()))
        .or_else(|| payload.get("message").and_then(|v| v.as_str()))
        .map(|s| s.to_string())
}

fn model_path(model: &str, action: &str) -> String {
    let trimmed = model.trim();
    if trimmed.starts_with("models/") {
        format!("{trimmed}:{action}")
    } else {
        format!("models/{trimmed}:{action}")
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

fn backoff_delay_ms(attempt: u32) -> Duration {
    let pow = attempt.min(6);
    let factor = 1u64 << pow;
    Duration::from_millis(200 * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_path_accepts_prefixed_names() {
        assert_eq!(
            model_path("gemini-3-flash-preview", "generateContent"),
            "models/gemini-3-flash-preview:generateContent"
        );
        assert_eq!(
            model_path("models/gemini-3-pro-preview", "generateContent"),
            "models/gemini-3-pro-preview:generateContent"
        );
    }

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(join_url("http://h/v1beta/", "/models"), "http://h/v1beta/models");
        assert_eq!(join_url("http://h", "https://other/x"), "https://other/x");
    }

    #[test]
    fn error_message_reads_provider_error_shape() {
        let payload = json!({ "error": { "code": 400, "message": "API key not valid" } });
        assert_eq!(error_message(&payload).as_deref(), Some("API key not valid"));
        assert_eq!(error_message(&json!({ "error": "nope" })).as_deref(), Some("nope"));
        assert_eq!(error_message(&json!({})), None);
    }

    #[test]
    fn http_error_maps_status_and_redacts_key() {
        let api = ApiClient::new("http://h".into(), "secret-key-123".into(), 1000, 0, true).unwrap();
        let err = api.http_error(
            StatusCode::FORBIDDEN,
            None,
            json!({ "error": { "message": "bad key secret-key-123" } }),
        );
        match err {
            CliError::Auth(details) => {
                assert!(!details.contains("secret-key-123"));
                assert!(details.contains("sec********123"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            api.http_error(StatusCode::TOO_MANY_REQUESTS, None, json!({})),
            CliError::RateLimited(_)
        ));
        assert!(matches!(
            api.http_error(StatusCode::BAD_GATEWAY, None, json!({})),
            CliError::Server(_)
        ));
    }

    #[test]
    fn backoff_doubles_and_caps() {
        assert_eq!(backoff_delay_ms(0), Duration::from_millis(200));
        assert_eq!(backoff_delay_ms(2), Duration::from_millis(800));
        assert_eq!(backoff_delay_ms(10), backoff_delay_ms(6));
    }
}
