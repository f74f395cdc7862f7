// View state for the three assistant modes. Each mode owns its own state;
// nothing here talks to the network except through the gateway.

pub mod chat;
pub mod content;
pub mod media;
pub mod state;

use crate::gateway::{Gateway, Platform};

pub use chat::{ChatManager, TurnJob};
pub use content::{ContentEngine, OptimizeJob, TitlesJob};
pub use media::{AnalyzeJob, MediaAttachment, MediaLab};
pub use state::{Phase, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    ContentEngine,
    MediaLab,
    Chat,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::ContentEngine, Mode::MediaLab, Mode::Chat];

    pub fn label(self) -> &'static str {
        match self {
            Mode::ContentEngine => "Content Engine",
            Mode::MediaLab => "Media Lab",
            Mode::Chat => "Chat Assistant",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Mode::ContentEngine => 0,
            Mode::MediaLab => 1,
            Mode::Chat => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug)]
pub struct Studio {
    active: Mode,
    pub content: ContentEngine,
    pub media: MediaLab,
    pub chat: ChatManager,
}

impl Studio {
    pub fn new(platform: Platform) -> Self {
        Self {
            active: Mode::ContentEngine,
            content: ContentEngine::new(platform),
            media: MediaLab::default(),
            chat: ChatManager::default(),
        }
    }

    pub fn active(&self) -> Mode {
        self.active
    }

    /// Switching modes keeps every other mode's results and in-flight work.
    pub fn activate(&mut self, mode: Mode, gateway: &Gateway) {
        self.active = mode;
        if mode == Mode::Chat && self.chat.activate(gateway) {
            tracing::info!("chat session started");
        }
    }

    pub fn is_pending(&self, mode: Mode) -> bool {
        match mode {
            Mode::ContentEngine => self.content.is_pending(),
            Mode::MediaLab => self.media.is_pending(),
            Mode::Chat => self.chat.is_pending(),
        }
    }

    pub fn phase(&self, mode: Mode) -> Phase {
        match mode {
            Mode::ContentEngine => self.content.phase(),
            Mode::MediaLab => self.media.phase(),
            Mode::Chat => self.chat.phase(),
        }
    }

    /// Called when the view goes away; later settles become no-ops.
    pub fn teardown(&mut self) {
        self.content.teardown();
        self.media.teardown();
        self.chat.teardown();
    }
}
