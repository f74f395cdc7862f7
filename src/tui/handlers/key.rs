use std::path::Path;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::errors::CliError;
use crate::studio::{MediaAttachment, Mode};
use crate::tui::types::{App, TuiMsg};

use super::async_ops::{spawn_analyze, spawn_optimize, spawn_titles, spawn_turn};

pub fn handle_event(
    tx: &mpsc::UnboundedSender<TuiMsg>,
    app: &mut App,
    event: Event,
) -> Result<(), CliError> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            handle_key(tx, app, key)?;
        }
        _ => {}
    }
    Ok(())
}

pub fn handle_key(
    tx: &mpsc::UnboundedSender<TuiMsg>,
    app: &mut App,
    key: KeyEvent,
) -> Result<(), CliError> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::F(1)) {
            app.show_help = false;
        }
        return Ok(());
    }

    match key.code {
        KeyCode::Esc => {
            app.should_quit = true;
            return Ok(());
        }
        KeyCode::Char('c') if ctrl => {
            app.should_quit = true;
            return Ok(());
        }
        KeyCode::F(1) => {
            app.show_help = true;
            return Ok(());
        }
        KeyCode::Tab => {
            app.switch_to(app.mode().next());
            return Ok(());
        }
        KeyCode::BackTab => {
            app.switch_to(app.mode().prev());
            return Ok(());
        }
        _ => {}
    }

    match app.mode() {
        Mode::ContentEngine => match key.code {
            KeyCode::Enter => {
                submit_optimize(tx, app);
                return Ok(());
            }
            KeyCode::Char('t') if ctrl => {
                submit_titles(tx, app);
                return Ok(());
            }
            KeyCode::F(2) => {
                let content = &mut app.studio.content;
                content.platform = content.platform.next();
                app.status = format!("Platform: {}", content.platform);
                return Ok(());
            }
            _ => {}
        },
        Mode::MediaLab => match key.code {
            KeyCode::Enter => {
                attach_from_input(app);
                return Ok(());
            }
            KeyCode::Char('a') if ctrl => {
                submit_analyze(tx, app);
                return Ok(());
            }
            _ => {}
        },
        Mode::Chat => match key.code {
            KeyCode::Enter => {
                submit_turn(tx, app);
                return Ok(());
            }
            KeyCode::Char('r') if ctrl => {
                app.studio.chat.reset();
                let gateway = app.gateway.clone();
                app.studio.chat.activate(&gateway);
                app.chat_scroll = 0;
                app.status = "Started a new conversation.".to_string();
                return Ok(());
            }
            KeyCode::PageUp => {
                app.chat_scroll = app.chat_scroll.saturating_add(5);
                return Ok(());
            }
            KeyCode::PageDown => {
                app.chat_scroll = app.chat_scroll.saturating_sub(5);
                return Ok(());
            }
            _ => {}
        },
    }

    edit_input(app, key.code, ctrl);
    Ok(())
}

fn edit_input(app: &mut App, code: KeyCode, ctrl: bool) {
    let input = app.input_mut();
    match code {
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.left(),
        KeyCode::Right => input.right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        KeyCode::Char('u') if ctrl => input.clear(),
        KeyCode::Char(ch) if !ctrl => input.insert(ch),
        _ => {}
    }
}

fn submit_optimize(tx: &mpsc::UnboundedSender<TuiMsg>, app: &mut App) {
    app.studio.content.input = app.input().text();
    match app.studio.content.begin_optimize() {
        Some(job) => {
            app.status = format!("Optimizing for {}...", job.platform);
            spawn_optimize(app.gateway.clone(), tx.clone(), job);
        }
        None => app.status = busy_or_blank(app, "Type a draft first."),
    }
}

fn submit_titles(tx: &mpsc::UnboundedSender<TuiMsg>, app: &mut App) {
    app.studio.content.input = app.input().text();
    match app.studio.content.begin_titles() {
        Some(job) => {
            app.status = "Brainstorming titles...".to_string();
            spawn_titles(app.gateway.clone(), tx.clone(), job);
        }
        None => app.status = busy_or_blank(app, "Type a topic first."),
    }
}

fn attach_from_input(app: &mut App) {
    if app.input().is_blank() {
        app.status = "Type the path of an image or video, then Enter.".to_string();
        return;
    }
    let path = app.input().text();
    match MediaAttachment::from_path(Path::new(path.trim()), None) {
        Ok(attachment) => {
            app.status = format!(
                "Attached {} ({}). Ctrl+A analyzes.",
                attachment.name(),
                attachment.mime_type()
            );
            app.studio.media.attach(attachment);
            app.input_mut().clear();
        }
        Err(err) => app.status = err.to_string(),
    }
}

fn submit_analyze(tx: &mpsc::UnboundedSender<TuiMsg>, app: &mut App) {
    if !app.studio.media.can_analyze() {
        app.status = busy_or_blank(app, "Attach an image or video first.");
        return;
    }
    if let Some(job) = app.studio.media.begin_analyze() {
        app.status = format!("Analyzing {}...", job.mime_type);
        spawn_analyze(app.gateway.clone(), tx.clone(), job);
    }
}

fn submit_turn(tx: &mpsc::UnboundedSender<TuiMsg>, app: &mut App) {
    let message = app.input().text();
    let gateway = app.gateway.clone();
    match app.studio.chat.begin_turn(&gateway, &message) {
        Some(job) => {
            app.input_mut().clear();
            app.chat_scroll = 0;
            app.status = "Thinking...".to_string();
            spawn_turn(gateway, tx.clone(), job);
        }
        None => app.status = busy_or_blank(app, "Type a message first."),
    }
}

fn busy_or_blank(app: &App, blank: &str) -> String {
    if app.studio.is_pending(app.mode()) {
        "Still working on the last request.".to_string()
    } else {
        blank.to_string()
    }
}
