// Helpers for reading generateContent and model-listing payloads.

use serde_json::Value;

/// Joins the text parts of the first candidate. Thought parts are skipped.
/// Returns `None` when there is no non-blank text.
pub fn extract_text(payload: &Value) -> Option<String> {
    let parts = payload
        .get("candidates")
        .and_then(|v| v.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())?;

    let text: String = parts
        .iter()
        .filter(|p| !p.get("thought").and_then(|v| v.as_bool()).unwrap_or(false))
        .filter_map(|p| p.get("text").and_then(|v| v.as_str()))
        .collect();

    if text.trim().is_empty() {
        return None;
    }
    Some(text)
}

pub fn extract_block_reason(payload: &Value) -> Option<String> {
    payload
        .get("promptFeedback")
        .and_then(|v| v.get("blockReason"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .or_else(|| {
            payload
                .get("candidates")
                .and_then(|v| v.as_array())
                .and_then(|c| c.first())
                .and_then(|c| c.get("finishReason"))
                .and_then(|v| v.as_str())
                .filter(|r| *r != "STOP")
                .map(|s| s.to_string())
        })
}

/// Extract usage statistics and format as a display string
pub fn extract_usage_line(payload: &Value) -> String {
    if let Some(usage) = payload.get("usageMetadata") {
        let input = usage
            .get("promptTokenCount")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        let output = usage
            .get("candidatesTokenCount")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        let total = usage
            .get("totalTokenCount")
            .and_then(|v| v.as_u64())
            .unwrap_or(input + output);
        return format!("usage(input={input}, output={output}, total={total})");
    }
    "usage(unknown)".to_string()
}

/// Model ids from a `GET models` listing, without the `models/` prefix.
pub fn extract_model_names(payload: &Value) -> Vec<String> {
    payload
        .get("models")
        .and_then(|v| v.as_array())
        .map(|models| {
            models
                .iter()
                .filter_map(|m| m.get("name").and_then(|v| v.as_str()))
                .map(|name| name.trim_start_matches("models/").to_string())
                .collect()
        })
        .unwrap_or_default()
}
