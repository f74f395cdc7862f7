use uuid::Uuid;

use super::request::{ChatRole, Content, GenerateRequest};

/// A multi-turn conversation with the provider.
///
/// `generateContent` is stateless, so the session carries the provider-facing
/// history and replays it on every turn. Only completed exchanges are kept;
/// a failed turn leaves the history untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    id: Uuid,
    model: String,
    system_instruction: String,
    history: Vec<Content>,
}

impl ChatSession {
    pub(crate) fn new(model: &str, system_instruction: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            model: model.to_string(),
            system_instruction: system_instruction.to_string(),
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Completed user/model exchanges.
    pub fn exchanges(&self) -> usize {
        self.history.len() / 2
    }

    pub fn record_exchange(&mut self, message: &str, reply: &str) {
        self.history.push(Content::text(Some(ChatRole::User), message));
        self.history.push(Content::text(Some(ChatRole::Model), reply));
    }

    pub(crate) fn turn_request(&self, message: &str) -> GenerateRequest {
        let mut contents = self.history.clone();
        contents.push(Content::text(Some(ChatRole::User), message));
        GenerateRequest::new(contents).with_system(&self.system_instruction)
    }
}
