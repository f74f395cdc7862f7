use std::time::Instant;

use crate::gateway::{Completion, Gateway, TitleList};
use crate::studio::{Mode, Studio, Ticket};

/// Results coming back from spawned gateway calls.
#[derive(Debug)]
pub enum TuiMsg {
    Optimized(Ticket, Completion<String>),
    Titles(Ticket, Completion<TitleList>),
    Analyzed(Ticket, Completion<String>),
    ChatReply(Ticket, Completion<String>),
}

/// Single-line editor. The cursor counts chars, not bytes.
#[derive(Debug, Clone, Default)]
pub struct InputLine {
    chars: Vec<char>,
    cursor: usize,
}

impl InputLine {
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.chars.iter().all(|c| c.is_whitespace())
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, ch: char) {
        if self.cursor > self.chars.len() {
            self.cursor = self.chars.len();
        }
        self.chars.insert(self.cursor, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 && self.cursor <= self.chars.len() {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.chars.len());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.chars.len();
    }
}

pub struct App {
    pub studio: Studio,
    pub gateway: Gateway,
    /// One input line per mode, indexed by `Mode::index`.
    pub inputs: [InputLine; 3],
    pub status: String,
    pub should_quit: bool,
    pub show_help: bool,
    pub spinner_step: u64,
    pub spinner_last: Instant,
    pub chat_scroll: u16,
}

impl App {
    pub fn new(studio: Studio, gateway: Gateway) -> Self {
        Self {
            studio,
            gateway,
            inputs: Default::default(),
            status: "Ready. Tab switches mode, F1 help, Esc quits.".to_string(),
            should_quit: false,
            show_help: false,
            spinner_step: 0,
            spinner_last: Instant::now(),
            chat_scroll: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.studio.active()
    }

    pub fn input(&self) -> &InputLine {
        &self.inputs[self.mode().index()]
    }

    pub fn input_mut(&mut self) -> &mut InputLine {
        let idx = self.mode().index();
        &mut self.inputs[idx]
    }

    pub fn any_pending(&self) -> bool {
        Mode::ALL.iter().any(|mode| self.studio.is_pending(*mode))
    }

    pub fn switch_to(&mut self, mode: Mode) {
        let gateway = self.gateway.clone();
        self.studio.activate(mode, &gateway);
        self.status = format!("{} ready.", mode.label());
    }
}
