// Personas, instructions and canned answers for each gateway operation.

use super::request::Platform;

pub const STRATEGIST_PERSONA: &str = "You are a world-class social media strategist who specializes in viral content for YouTube, Instagram, and TikTok.";

pub const ANALYST_PERSONA: &str = "You are an expert content analyst. You analyze videos and images to provide creators with actionable insights, hook improvements, and quality assessments.";

pub const ASSISTANT_PERSONA: &str = "You are CreatorAssistant, an AI helper for CreatorOS. You help creators with video ideas, sponsorship negotiation tips, analytics interpretation, and platform growth strategies. Be concise, encouraging, and data-driven.";

pub const OPTIMIZE_TEMPERATURE: f64 = 0.7;

pub const VIDEO_ANALYSIS_PROMPT: &str =
    "Analyze this video. Provide key takeaways, hook strength, and suggestions for improvement.";

pub const IMAGE_ANALYSIS_PROMPT: &str = "Analyze this image. What is the composition? How could it be better for a social media thumbnail or post?";

pub const OPTIMIZE_FAILED: &str = "An error occurred while communicating with the AI.";
pub const OPTIMIZE_EMPTY: &str = "Failed to generate optimization suggestions.";
pub const ANALYZE_FAILED: &str =
    "Failed to analyze media. Please ensure the file size is within limits.";
pub const ANALYZE_EMPTY: &str = "Analysis failed.";
pub const CHAT_FAILED: &str = "Sorry, I encountered an error. Please try again.";

pub fn optimize_prompt(text: &str, platform: Platform) -> String {
    format!(
        "Optimize this content for {platform}. Make it highly engaging for the target audience: \"{text}\""
    )
}

pub fn titles_prompt(topic: &str) -> String {
    format!("Generate 5 click-worthy video titles for a YouTube video about: {topic}")
}

/// Video uploads get the hook-focused prompt; everything else is treated as
/// an image.
pub fn analysis_prompt(mime_type: &str) -> &'static str {
    if mime_type.trim().to_ascii_lowercase().starts_with("video/") {
        VIDEO_ANALYSIS_PROMPT
    } else {
        IMAGE_ANALYSIS_PROMPT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_prompt_follows_mime_prefix() {
        assert_eq!(analysis_prompt("video/mp4"), VIDEO_ANALYSIS_PROMPT);
        assert_eq!(analysis_prompt("Video/QuickTime"), VIDEO_ANALYSIS_PROMPT);
        assert_eq!(analysis_prompt("image/png"), IMAGE_ANALYSIS_PROMPT);
        assert_eq!(analysis_prompt("application/octet-stream"), IMAGE_ANALYSIS_PROMPT);
    }

    #[test]
    fn optimize_prompt_quotes_the_draft() {
        assert_eq!(
            optimize_prompt("check out my new vlog", Platform::TikTok),
            "Optimize this content for TikTok. Make it highly engaging for the target audience: \"check out my new vlog\""
        );
    }
}
