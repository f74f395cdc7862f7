use std::fs;
use std::path::Path;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::errors::CliError;
use crate::gateway::prompts::analysis_prompt;
use crate::gateway::{Completion, Gateway};

use super::state::{Lifecycle, Phase, Ticket};

/// A selected file waiting to be analyzed.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaAttachment {
    name: String,
    bytes: Arc<[u8]>,
    mime_type: String,
}

impl MediaAttachment {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, mime_type: &str) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            mime_type: mime_type.trim().to_ascii_lowercase(),
        }
    }

    /// Reads `path`, taking the mime type from `mime_override` or the file
    /// extension.
    pub fn from_path(path: &Path, mime_override: Option<&str>) -> Result<Self, CliError> {
        let mime = match mime_override.map(str::trim).filter(|m| !m.is_empty()) {
            Some(mime) => mime.to_string(),
            None => mime_for_path(path)
                .ok_or_else(|| {
                    CliError::Usage(format!(
                        "Cannot tell the media type of {}. Pass --mime.",
                        path.display()
                    ))
                })?
                .to_string(),
        };
        let bytes = fs::read(path)
            .map_err(|e| CliError::Usage(format!("Failed reading {}: {e}", path.display())))?;
        if bytes.is_empty() {
            return Err(CliError::Usage(format!("{} is empty.", path.display())));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes, &mime))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The file as a `data:` URI, cut to at most `max_chars`. Only the bytes
    /// behind the visible prefix get encoded.
    pub fn preview_uri(&self, max_chars: usize) -> String {
        let mut uri = format!("data:{};base64,", self.mime_type);
        let room = max_chars.saturating_sub(uri.len());
        let take = room.div_ceil(4).saturating_mul(3).min(self.bytes.len());
        uri.push_str(&BASE64.encode(&self.bytes[..take]));
        uri.chars().take(max_chars).collect()
    }

    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video/")
    }
}

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "mp4" => Some("video/mp4"),
        "mov" => Some("video/quicktime"),
        "webm" => Some("video/webm"),
        "mpeg" | "mpg" => Some("video/mpeg"),
        "avi" => Some("video/x-msvideo"),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct AnalyzeJob {
    pub ticket: Ticket,
    pub bytes: Arc<[u8]>,
    pub mime_type: String,
    pub prompt: &'static str,
}

#[derive(Debug, Default)]
pub struct MediaLab {
    attachment: Option<MediaAttachment>,
    attachment_id: u64,
    analyzing: Option<u64>,
    life: Lifecycle,
    analysis: Option<Completion<String>>,
}

impl MediaLab {
    pub fn phase(&self) -> Phase {
        self.life.phase()
    }

    pub fn is_pending(&self) -> bool {
        self.life.is_pending()
    }

    pub fn attachment(&self) -> Option<&MediaAttachment> {
        self.attachment.as_ref()
    }

    pub fn analysis(&self) -> Option<&Completion<String>> {
        self.analysis.as_ref()
    }

    /// Replaces any previous selection, even mid-analysis.
    pub fn attach(&mut self, attachment: MediaAttachment) {
        self.attachment_id = self.attachment_id.wrapping_add(1);
        self.attachment = Some(attachment);
    }

    pub fn can_analyze(&self) -> bool {
        self.attachment.is_some() && !self.is_pending()
    }

    /// The prompt is chosen here, from the attachment's mime type.
    pub fn begin_analyze(&mut self) -> Option<AnalyzeJob> {
        let attachment = self.attachment.as_ref()?;
        let bytes = attachment.bytes.clone();
        let mime_type = attachment.mime_type.clone();
        let ticket = self.life.begin()?;
        self.analyzing = Some(self.attachment_id);
        Some(AnalyzeJob {
            ticket,
            bytes,
            prompt: analysis_prompt(&mime_type),
            mime_type,
        })
    }

    /// Drops the analyzed attachment unless it was replaced meanwhile.
    pub fn settle_analyze(&mut self, ticket: Ticket, result: Completion<String>) -> bool {
        if !self.life.settle(ticket) {
            return false;
        }
        if self.analyzing.take() == Some(self.attachment_id) {
            self.attachment = None;
        }
        self.analysis = Some(result);
        true
    }

    pub async fn analyze(&mut self, gateway: &Gateway) -> bool {
        let Some(job) = self.begin_analyze() else {
            return false;
        };
        let result = gateway
            .analyze_media(&job.bytes, &job.mime_type, job.prompt)
            .await;
        self.settle_analyze(job.ticket, result)
    }

    pub fn teardown(&mut self) {
        self.life.teardown();
        self.analyzing = None;
    }
}
