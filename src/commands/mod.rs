pub mod analyze;
pub mod chat;
pub mod config;
pub mod health;
pub mod optimize;
pub mod titles;
pub mod tui;
