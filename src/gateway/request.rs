use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::outcome::Failure;

// ============================================================================
// Platforms
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    #[default]
    YouTube,
    Instagram,
    TikTok,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::YouTube, Platform::Instagram, Platform::TikTok];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "youtube" | "yt" => Some(Self::YouTube),
            "instagram" | "ig" => Some(Self::Instagram),
            "tiktok" | "tt" => Some(Self::TikTok),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::YouTube => "YouTube",
            Platform::Instagram => "Instagram",
            Platform::TikTok => "TikTok",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Platform::YouTube => Platform::Instagram,
            Platform::Instagram => Platform::TikTok,
            Platform::TikTok => Platform::YouTube,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Logical requests
// ============================================================================

/// What a caller asks the gateway for, checked before anything is dispatched.
#[derive(Debug, Clone, Copy)]
pub enum Request<'a> {
    OptimizeText { text: &'a str, platform: Platform },
    AnalyzeMedia { bytes: &'a [u8], mime_type: &'a str, prompt: &'a str },
    SuggestTitles { topic: &'a str },
    ChatTurn { session_id: uuid::Uuid, message: &'a str },
}

impl Request<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Request::OptimizeText { .. } => "optimize",
            Request::AnalyzeMedia { .. } => "analyze_media",
            Request::SuggestTitles { .. } => "suggest_titles",
            Request::ChatTurn { .. } => "chat_turn",
        }
    }

    /// Short key=value summary for log lines. Never includes user text.
    pub fn detail(&self) -> String {
        match self {
            Request::OptimizeText { platform, .. } => format!("platform={platform}"),
            Request::AnalyzeMedia { bytes, mime_type, .. } => {
                format!("mime={mime_type} bytes={}", bytes.len())
            }
            Request::SuggestTitles { .. } => String::new(),
            Request::ChatTurn { session_id, .. } => format!("session={session_id}"),
        }
    }

    pub fn validate(&self) -> Result<(), Failure> {
        match self {
            Request::OptimizeText { text, .. } => require_text("text", text),
            Request::SuggestTitles { topic } => require_text("topic", topic),
            Request::ChatTurn { message, .. } => require_text("message", message),
            Request::AnalyzeMedia { bytes, mime_type, prompt } => {
                if bytes.is_empty() {
                    return Err(Failure::Validation("no media attached".to_string()));
                }
                require_text("mime type", mime_type)?;
                require_text("prompt", prompt)
            }
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<(), Failure> {
    if value.trim().is_empty() {
        return Err(Failure::Validation(format!("{field} is empty")));
    }
    Ok(())
}

// ============================================================================
// Wire shapes for generateContent
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64 payload.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<ChatRole>,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: Option<ChatRole>, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part::Text { text: text.into() }],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateRequest {
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            contents,
            system_instruction: None,
            generation_config: None,
        }
    }

    pub fn with_system(mut self, instruction: &str) -> Self {
        self.system_instruction = Some(Content::text(None, instruction));
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.generation_config
            .get_or_insert_with(GenerationConfig::default)
            .temperature = Some(temperature);
        self
    }

    /// Constrains the answer to JSON matching `schema`.
    pub fn with_json_schema(mut self, schema: Value) -> Self {
        let config = self
            .generation_config
            .get_or_insert_with(GenerationConfig::default);
        config.response_mime_type = Some("application/json".to_string());
        config.response_schema = Some(schema);
        self
    }

    pub fn to_body(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn platform_parses_loosely() {
        assert_eq!(Platform::parse(" TikTok "), Some(Platform::TikTok));
        assert_eq!(Platform::parse("yt"), Some(Platform::YouTube));
        assert_eq!(Platform::parse("myspace"), None);
        assert_eq!(Platform::TikTok.next(), Platform::YouTube);
    }

    #[test]
    fn blank_inputs_are_rejected() {
        let blank = [
            Request::OptimizeText { text: "  \n", platform: Platform::YouTube },
            Request::SuggestTitles { topic: "" },
            Request::ChatTurn { session_id: uuid::Uuid::nil(), message: "\t" },
            Request::AnalyzeMedia { bytes: &[], mime_type: "image/png", prompt: "look" },
            Request::AnalyzeMedia { bytes: &[1], mime_type: " ", prompt: "look" },
        ];
        for request in blank {
            assert!(
                matches!(request.validate(), Err(Failure::Validation(_))),
                "{} should be rejected",
                request.kind()
            );
        }
        assert!(Request::SuggestTitles { topic: "home workouts" }.validate().is_ok());
    }

    #[test]
    fn detail_names_the_target_without_user_text() {
        let optimize = Request::OptimizeText { text: "my secret draft", platform: Platform::TikTok };
        assert_eq!(optimize.detail(), "platform=TikTok");

        let media = Request::AnalyzeMedia { bytes: &[1, 2, 3], mime_type: "image/png", prompt: "look" };
        assert_eq!(media.detail(), "mime=image/png bytes=3");

        let turn = Request::ChatTurn { session_id: uuid::Uuid::nil(), message: "hi there" };
        assert_eq!(turn.detail(), "session=00000000-0000-0000-0000-000000000000");
        assert!(!turn.detail().contains("hi there"));
    }

    #[test]
    fn body_uses_provider_field_names() {
        let body = GenerateRequest::new(vec![Content {
            role: Some(ChatRole::User),
            parts: vec![
                Part::Inline {
                    inline_data: InlineData {
                        mime_type: "image/png".to_string(),
                        data: "AAEC".to_string(),
                    },
                },
                Part::Text { text: "describe".to_string() },
            ],
        }])
        .with_system("be brief")
        .with_temperature(0.5)
        .to_body()
        .unwrap();

        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "inlineData": { "mimeType": "image/png", "data": "AAEC" } },
                        { "text": "describe" }
                    ]
                }],
                "systemInstruction": { "parts": [{ "text": "be brief" }] },
                "generationConfig": { "temperature": 0.5 }
            })
        );
    }

    #[test]
    fn json_schema_sets_mime_type() {
        let body = GenerateRequest::new(vec![Content::text(None, "x")])
            .with_json_schema(json!({ "type": "ARRAY" }))
            .to_body()
            .unwrap();
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "ARRAY");
        assert!(body.get("systemInstruction").is_none());
    }
}
