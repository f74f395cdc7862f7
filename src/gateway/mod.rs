// Completion gateway: turns logical requests into generateContent calls and
// folds every failure into a tagged `Completion`.

pub mod outcome;
pub mod prompts;
pub mod request;
pub mod session;
#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::future::BoxFuture;
use serde_json::{Value, json};

use crate::api::ApiClient;
use crate::config::ModelSet;
use crate::errors::CliError;
use crate::parse::response::{extract_block_reason, extract_text, extract_usage_line};

pub use outcome::{Completion, Failure, TitleList};
pub use request::{ChatRole, Content, GenerateRequest, InlineData, Part, Platform, Request};
pub use session::ChatSession;

use prompts::*;

/// Transport seam between the gateway and the hosted model.
pub trait Provider: Send + Sync {
    fn generate<'a>(&'a self, model: &'a str, body: Value) -> BoxFuture<'a, Result<Value, CliError>>;
}

impl Provider for ApiClient {
    fn generate<'a>(&'a self, model: &'a str, body: Value) -> BoxFuture<'a, Result<Value, CliError>> {
        Box::pin(async move {
            let res = self.generate_content(model, &body).await?;
            tracing::debug!(
                model,
                request_id = ?res.request_id,
                elapsed_ms = res.elapsed_ms as u64,
                usage = %extract_usage_line(&res.json),
                "generateContent settled"
            );
            Ok(res.json)
        })
    }
}

/// Stateless mediator between the studio controllers and the provider.
#[derive(Clone)]
pub struct Gateway {
    provider: Arc<dyn Provider>,
    models: ModelSet,
}

impl Gateway {
    pub fn new(provider: Arc<dyn Provider>, models: ModelSet) -> Self {
        Self { provider, models }
    }

    pub async fn optimize(&self, text: &str, platform: Platform) -> Completion<String> {
        let request = Request::OptimizeText { text, platform };
        let result = self
            .complete(request, &self.models.fast, || {
                GenerateRequest::new(vec![Content::text(
                    Some(ChatRole::User),
                    optimize_prompt(text, platform),
                )])
                .with_system(STRATEGIST_PERSONA)
                .with_temperature(OPTIMIZE_TEMPERATURE)
            })
            .await;

        finish(request, result, |reason| match reason {
            Failure::Shape(_) => OPTIMIZE_EMPTY.to_string(),
            _ => OPTIMIZE_FAILED.to_string(),
        })
    }

    /// `prompt` is picked by the caller, usually via [`prompts::analysis_prompt`].
    pub async fn analyze_media(&self, bytes: &[u8], mime_type: &str, prompt: &str) -> Completion<String> {
        let request = Request::AnalyzeMedia { bytes, mime_type, prompt };
        let result = self
            .complete(request, &self.models.pro, || {
                GenerateRequest::new(vec![Content {
                    role: Some(ChatRole::User),
                    parts: vec![
                        Part::Inline {
                            inline_data: InlineData {
                                mime_type: mime_type.trim().to_string(),
                                data: BASE64.encode(bytes),
                            },
                        },
                        Part::Text { text: prompt.to_string() },
                    ],
                }])
                .with_system(ANALYST_PERSONA)
            })
            .await;

        finish(request, result, |reason| match reason {
            Failure::Shape(_) => ANALYZE_EMPTY.to_string(),
            _ => ANALYZE_FAILED.to_string(),
        })
    }

    pub async fn suggest_titles(&self, topic: &str) -> Completion<TitleList> {
        let request = Request::SuggestTitles { topic };
        let result = self
            .complete(request, &self.models.fast, || {
                GenerateRequest::new(vec![Content::text(Some(ChatRole::User), titles_prompt(topic))])
                    .with_json_schema(json!({
                        "type": "ARRAY",
                        "items": { "type": "STRING" }
                    }))
            })
            .await
            .and_then(|text| TitleList::parse(&text));

        finish(request, result, |_| TitleList::fallback())
    }

    pub fn create_chat_session(&self) -> ChatSession {
        let session = ChatSession::new(&self.models.pro, ASSISTANT_PERSONA);
        tracing::debug!(session = %session.id(), model = session.model(), "chat session created");
        session
    }

    /// Sends one turn. The session history is not touched here; the caller
    /// records the exchange once it knows the turn succeeded.
    pub async fn send_turn(&self, session: &ChatSession, message: &str) -> Completion<String> {
        let request = Request::ChatTurn {
            session_id: session.id(),
            message,
        };
        let result = self
            .complete(request, session.model(), || session.turn_request(message))
            .await;

        finish(request, result, |_| CHAT_FAILED.to_string())
    }

    async fn complete(
        &self,
        request: Request<'_>,
        model: &str,
        build: impl FnOnce() -> GenerateRequest,
    ) -> Result<String, Failure> {
        request.validate()?;
        let body = build()
            .to_body()
            .map_err(|e| Failure::Provider(format!("could not encode request: {e}")))?;

        tracing::debug!(
            kind = request.kind(),
            detail = %request.detail(),
            model,
            "dispatching completion"
        );
        let payload = self
            .provider
            .generate(model, body)
            .await
            .map_err(|e| Failure::Provider(e.to_string()))?;

        extract_text(&payload).ok_or_else(|| {
            Failure::Shape(match extract_block_reason(&payload) {
                Some(reason) => format!("prompt blocked ({reason})"),
                None => "no text in answer".to_string(),
            })
        })
    }
}

fn finish<T>(
    request: Request<'_>,
    result: Result<T, Failure>,
    fallback: impl FnOnce(&Failure) -> T,
) -> Completion<T> {
    match &result {
        Ok(_) => {}
        Err(Failure::Validation(reason)) => {
            tracing::debug!(
                kind = request.kind(),
                detail = %request.detail(),
                %reason,
                "request rejected before dispatch"
            );
        }
        Err(failure) => {
            tracing::warn!(
                kind = request.kind(),
                detail = %request.detail(),
                %failure,
                "falling back to canned answer"
            );
        }
    }
    Completion::recover(result, fallback)
}

#[cfg(test)]
mod tests {
    use super::testing::{ScriptedProvider, gateway_with};
    use super::*;

    #[tokio::test]
    async fn optimize_sends_persona_prompt_to_fast_model() {
        let provider = ScriptedProvider::new();
        provider.reply_text("Sharper hook!");
        let gateway = gateway_with(&provider);

        let out = gateway.optimize("check out my new vlog", Platform::YouTube).await;
        assert_eq!(out, Completion::Ok("Sharper hook!".to_string()));

        let (model, body) = provider.last_request().unwrap();
        assert_eq!(model, "fast-model");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], STRATEGIST_PERSONA);
        assert_eq!(body["generationConfig"]["temperature"], 0.7);
        assert_eq!(
            body["contents"][0]["parts"][0]["text"],
            optimize_prompt("check out my new vlog", Platform::YouTube)
        );
    }

    #[tokio::test]
    async fn optimize_falls_back_on_provider_failure() {
        let provider = ScriptedProvider::new();
        provider.fail(CliError::Network("connection refused".into()));
        let gateway = gateway_with(&provider);

        let out = gateway.optimize("check out my new vlog", Platform::YouTube).await;
        assert!(out.is_fallback());
        assert_eq!(out.value().map(String::as_str), Some(OPTIMIZE_FAILED));
        assert_eq!(out.failure().map(Failure::kind), Some("provider"));
    }

    #[tokio::test]
    async fn empty_answer_is_a_shape_failure() {
        let provider = ScriptedProvider::new();
        provider.reply_raw(json!({ "candidates": [] }));
        provider.reply_raw(json!({ "promptFeedback": { "blockReason": "SAFETY" } }));
        let gateway = gateway_with(&provider);

        let out = gateway.optimize("draft", Platform::TikTok).await;
        assert_eq!(out.value().map(String::as_str), Some(OPTIMIZE_EMPTY));

        let out = gateway.analyze_media(b"img", "image/png", IMAGE_ANALYSIS_PROMPT).await;
        assert_eq!(out.value().map(String::as_str), Some(ANALYZE_EMPTY));
        match out.failure() {
            Some(Failure::Shape(reason)) => assert!(reason.contains("SAFETY")),
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_requests_never_reach_the_provider() {
        let provider = ScriptedProvider::new();
        let gateway = gateway_with(&provider);

        assert!(matches!(
            gateway.optimize("   ", Platform::YouTube).await,
            Completion::Error(Failure::Validation(_))
        ));
        assert!(matches!(gateway.suggest_titles("").await, Completion::Error(_)));
        assert!(matches!(
            gateway.analyze_media(&[], "image/png", IMAGE_ANALYSIS_PROMPT).await,
            Completion::Error(_)
        ));
        let session = gateway.create_chat_session();
        assert!(matches!(gateway.send_turn(&session, "\n").await, Completion::Error(_)));

        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn analyze_media_inlines_base64_payload() {
        let provider = ScriptedProvider::new();
        provider.reply_text("Strong hook.");
        let gateway = gateway_with(&provider);

        let out = gateway
            .analyze_media(&[0, 1, 2], "video/mp4", VIDEO_ANALYSIS_PROMPT)
            .await;
        assert_eq!(out.into_value().as_deref(), Some("Strong hook."));

        let (model, body) = provider.last_request().unwrap();
        assert_eq!(model, "pro-model");
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "video/mp4");
        assert_eq!(parts[0]["inlineData"]["data"], "AAEC");
        assert_eq!(parts[1]["text"], VIDEO_ANALYSIS_PROMPT);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], ANALYST_PERSONA);
    }

    #[tokio::test]
    async fn analyze_media_falls_back_on_failure() {
        let provider = ScriptedProvider::new();
        provider.fail(CliError::Usage("Request payload size exceeds the limit".into()));
        let gateway = gateway_with(&provider);

        let out = gateway.analyze_media(b"big", "video/mp4", VIDEO_ANALYSIS_PROMPT).await;
        assert_eq!(out.value().map(String::as_str), Some(ANALYZE_FAILED));
    }

    #[tokio::test]
    async fn titles_keep_provider_order() {
        let provider = ScriptedProvider::new();
        provider.reply_text(r#"["Zeta", "Alpha", "Mu", "Beta", "Omega"]"#);
        let gateway = gateway_with(&provider);

        let out = gateway.suggest_titles("home workouts").await;
        let titles = out.into_value().unwrap();
        assert_eq!(titles.as_slice(), ["Zeta", "Alpha", "Mu", "Beta", "Omega"]);

        let (_, body) = provider.last_request().unwrap();
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["items"]["type"], "STRING");
    }

    #[tokio::test]
    async fn malformed_titles_degrade_to_default_list() {
        let provider = ScriptedProvider::new();
        provider.reply_text("1. Home workouts that work\n2. No gym needed");
        provider.fail(CliError::Server("overloaded".into()));
        let gateway = gateway_with(&provider);

        for _ in 0..2 {
            let out = gateway.suggest_titles("home workouts").await;
            assert!(out.is_fallback());
            let titles = out.into_value().unwrap();
            assert_eq!(titles.as_slice().len(), outcome::TITLE_COUNT);
            assert_eq!(titles, TitleList::fallback());
        }
    }

    #[tokio::test]
    async fn send_turn_replays_history_without_recording() {
        let provider = ScriptedProvider::new();
        provider.reply_text("Hi! What are you filming?");
        let gateway = gateway_with(&provider);
        let session = gateway.create_chat_session();

        let out = gateway.send_turn(&session, "hello").await;
        assert_eq!(out.value().map(String::as_str), Some("Hi! What are you filming?"));
        assert_eq!(session.exchanges(), 0);

        let (model, body) = provider.last_request().unwrap();
        assert_eq!(model, "pro-model");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], ASSISTANT_PERSONA);
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
    }

    #[tokio::test]
    async fn send_turn_falls_back_to_apology() {
        let provider = ScriptedProvider::new();
        provider.fail(CliError::Auth("API key not valid".into()));
        let gateway = gateway_with(&provider);
        let session = gateway.create_chat_session();

        let out = gateway.send_turn(&session, "hello").await;
        assert_eq!(out.value().map(String::as_str), Some(CHAT_FAILED));
        assert!(out.is_fallback());
    }
}
