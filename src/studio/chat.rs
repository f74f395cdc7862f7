use crate::gateway::prompts::CHAT_FAILED;
use crate::gateway::{ChatRole, ChatSession, Completion, Gateway};

use super::state::{Lifecycle, Phase, Ticket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TurnJob {
    pub ticket: Ticket,
    pub session: ChatSession,
    pub message: String,
}

/// Owns the transcript and the provider session of the chat mode.
#[derive(Debug, Default)]
pub struct ChatManager {
    transcript: Vec<ChatMessage>,
    session: Option<ChatSession>,
    life: Lifecycle,
    in_flight: Option<String>,
    last_reply: Option<Completion<String>>,
}

impl ChatManager {
    pub fn phase(&self) -> Phase {
        self.life.phase()
    }

    pub fn is_pending(&self) -> bool {
        self.life.is_pending()
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    /// Tagged result of the most recent settled turn.
    pub fn last_reply(&self) -> Option<&Completion<String>> {
        self.last_reply.as_ref()
    }

    /// Creates the session on first activation and reuses it afterwards.
    /// Returns true when a new session was created.
    pub fn activate(&mut self, gateway: &Gateway) -> bool {
        if self.session.is_some() {
            return false;
        }
        self.session = Some(gateway.create_chat_session());
        true
    }

    /// Appends the user's message right away and hands back the work to do.
    /// Blank messages and submits while a turn is pending are ignored.
    pub fn begin_turn(&mut self, gateway: &Gateway, message: &str) -> Option<TurnJob> {
        if message.trim().is_empty() || self.is_pending() {
            return None;
        }
        self.activate(gateway);
        let session = self.session.clone()?;
        let ticket = self.life.begin()?;

        self.transcript.push(ChatMessage::user(message));
        self.in_flight = Some(message.to_string());
        Some(TurnJob {
            ticket,
            session,
            message: message.to_string(),
        })
    }

    pub fn settle_turn(&mut self, ticket: Ticket, result: Completion<String>) -> bool {
        if !self.life.settle(ticket) {
            return false;
        }
        let message = self.in_flight.take();
        let reply = result
            .value()
            .cloned()
            .unwrap_or_else(|| CHAT_FAILED.to_string());

        if result.is_ok() {
            if let (Some(session), Some(message)) = (self.session.as_mut(), message.as_deref()) {
                session.record_exchange(message, &reply);
            }
        }
        self.transcript.push(ChatMessage::model(reply));
        self.last_reply = Some(result);
        true
    }

    pub async fn submit_turn(&mut self, gateway: &Gateway, message: &str) -> bool {
        let Some(job) = self.begin_turn(gateway, message) else {
            return false;
        };
        let result = gateway.send_turn(&job.session, &job.message).await;
        self.settle_turn(job.ticket, result)
    }

    /// Starts a fresh conversation. Any turn still in flight is discarded.
    pub fn reset(&mut self) {
        self.teardown();
        self.transcript.clear();
        self.last_reply = None;
    }

    /// Releases the session; the next activation creates a new one.
    pub fn teardown(&mut self) {
        self.life.teardown();
        self.session = None;
        self.in_flight = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CliError;
    use crate::gateway::testing::{ScriptedProvider, gateway_with};

    #[test]
    fn session_is_created_once_per_activation_lifetime() {
        let provider = ScriptedProvider::new();
        let gateway = gateway_with(&provider);
        let mut chat = ChatManager::default();

        assert!(chat.activate(&gateway));
        let id = chat.session().unwrap().id();
        assert!(!chat.activate(&gateway));
        assert_eq!(chat.session().unwrap().id(), id);
    }

    #[tokio::test]
    async fn two_turns_alternate_roles_in_order() {
        let provider = ScriptedProvider::new();
        provider.reply_text("R1");
        provider.reply_text("R2");
        let gateway = gateway_with(&provider);
        let mut chat = ChatManager::default();
        chat.activate(&gateway);

        assert!(chat.submit_turn(&gateway, "hello").await);
        assert!(chat.submit_turn(&gateway, "tell me more").await);

        assert_eq!(
            chat.transcript(),
            [
                ChatMessage::user("hello"),
                ChatMessage::model("R1"),
                ChatMessage::user("tell me more"),
                ChatMessage::model("R2"),
            ]
        );
        assert_eq!(chat.session().unwrap().exchanges(), 2);

        let (_, body) = provider.last_request().unwrap();
        assert_eq!(body["contents"].as_array().unwrap().len(), 3);
        assert_eq!(body["contents"][1]["parts"][0]["text"], "R1");
    }

    #[tokio::test]
    async fn n_turns_give_two_n_entries() {
        let provider = ScriptedProvider::new();
        let gateway = gateway_with(&provider);
        let mut chat = ChatManager::default();

        for i in 0..4 {
            if i == 2 {
                provider.fail(CliError::Server("busy".into()));
            } else {
                provider.reply_text(&format!("answer {i}"));
            }
            assert!(chat.submit_turn(&gateway, &format!("question {i}")).await);
        }

        let roles: Vec<_> = chat.transcript().iter().map(|m| m.role).collect();
        assert_eq!(roles.len(), 8);
        for pair in roles.chunks(2) {
            assert_eq!(pair, [ChatRole::User, ChatRole::Model]);
        }
        assert_eq!(chat.session().unwrap().exchanges(), 3);
        assert!(chat.last_reply().is_some_and(Completion::is_ok));
    }

    #[tokio::test]
    async fn failed_turn_is_tagged_apart_from_a_matching_reply() {
        let provider = ScriptedProvider::new();
        provider.fail(CliError::Server("busy".into()));
        provider.reply_text(CHAT_FAILED);
        let gateway = gateway_with(&provider);
        let mut chat = ChatManager::default();

        assert!(chat.submit_turn(&gateway, "first").await);
        let failed = chat.last_reply().cloned().unwrap();
        assert!(failed.is_fallback());
        assert_eq!(failed.failure().map(|f| f.kind()), Some("provider"));

        assert!(chat.submit_turn(&gateway, "second").await);
        let genuine = chat.last_reply().unwrap();
        assert!(genuine.is_ok());
        assert_eq!(genuine.value().map(String::as_str), Some(CHAT_FAILED));

        // Same text on screen, different tags.
        assert_eq!(chat.transcript()[1].text, chat.transcript()[3].text);
        assert_eq!(chat.session().unwrap().exchanges(), 1);

        chat.reset();
        assert!(chat.last_reply().is_none());
    }

    #[tokio::test]
    async fn blank_messages_are_dropped() {
        let provider = ScriptedProvider::new();
        let gateway = gateway_with(&provider);
        let mut chat = ChatManager::default();

        assert!(!chat.submit_turn(&gateway, "   ").await);
        assert!(chat.transcript().is_empty());
        assert_eq!(chat.phase(), Phase::Idle);
        assert_eq!(provider.calls(), 0);
    }

    #[test]
    fn user_message_shows_before_the_reply() {
        let provider = ScriptedProvider::new();
        let gateway = gateway_with(&provider);
        let mut chat = ChatManager::default();

        let job = chat.begin_turn(&gateway, "hello").unwrap();
        assert_eq!(chat.transcript(), [ChatMessage::user("hello")]);
        assert!(chat.begin_turn(&gateway, "again").is_none());
        assert_eq!(chat.transcript().len(), 1);

        assert!(chat.settle_turn(job.ticket, Completion::Ok("hi".into())));
        assert_eq!(chat.transcript().len(), 2);
        assert_eq!(chat.phase(), Phase::Settled);
    }

    #[test]
    fn reset_discards_in_flight_turn_and_session() {
        let provider = ScriptedProvider::new();
        let gateway = gateway_with(&provider);
        let mut chat = ChatManager::default();

        let job = chat.begin_turn(&gateway, "hello").unwrap();
        let old_id = job.session.id();
        chat.reset();

        assert!(!chat.settle_turn(job.ticket, Completion::Ok("late".into())));
        assert!(chat.transcript().is_empty());
        assert!(chat.session().is_none());

        chat.activate(&gateway);
        assert_ne!(chat.session().unwrap().id(), old_id);
    }
}
