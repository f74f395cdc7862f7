use std::io;
use std::time::{Duration, Instant};

use clap::Args;
use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap};
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::Runtime;
use crate::commands::optimize::parse_platform;
use crate::errors::CliError;
use crate::gateway::{ChatRole, Completion};
use crate::studio::{Mode, Phase, Studio};
use crate::tui::{App, TuiMsg, handle_event, handle_tui_msg};

#[derive(Debug, Args)]
pub struct TuiArgs {
    /// Platform the content engine starts on
    #[arg(short = 'p', long = "platform")]
    pub platform: Option<String>,
}

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self, CliError> {
        enable_raw_mode()
            .map_err(|e| CliError::Generic(format!("Failed to enable raw mode: {e}")))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| CliError::Generic(format!("Failed to enter alternate screen: {e}")))?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, Show, LeaveAlternateScreen);
    }
}

pub async fn handle(runtime: &Runtime, args: TuiArgs) -> Result<(), CliError> {
    if runtime.output.json {
        return Err(CliError::Usage(
            "`--json` is not supported for `studio tui`.".to_string(),
        ));
    }

    let platform = match args.platform.as_deref() {
        Some(value) => parse_platform(value)?,
        None => runtime.config.default_platform,
    };
    let gateway = runtime.gateway()?;
    let mut app = App::new(Studio::new(platform), gateway);

    let guard = TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| CliError::Generic(format!("Failed to init terminal: {e}")))?;
    terminal
        .clear()
        .map_err(|e| CliError::Generic(format!("Failed to clear terminal: {e}")))?;

    let (tx, mut rx) = mpsc::unbounded_channel::<TuiMsg>();
    tracing::info!(%platform, "studio opened");

    loop {
        update_spinner(&mut app);
        terminal
            .draw(|f| ui(f, &app))
            .map_err(|e| CliError::Generic(format!("Failed to draw: {e}")))?;

        if app.should_quit {
            break;
        }

        while let Ok(msg) = rx.try_recv() {
            handle_tui_msg(&mut app, msg);
        }

        let poll_ms = if app.any_pending() { 50 } else { 120 };
        if crossterm::event::poll(Duration::from_millis(poll_ms))
            .map_err(|e| CliError::Generic(format!("Event poll failed: {e}")))?
        {
            let event = crossterm::event::read()
                .map_err(|e| CliError::Generic(format!("Event read failed: {e}")))?;
            if let Err(err) = handle_event(&tx, &mut app, event) {
                app.status = format!("Error: {err}");
            }
        }
    }

    // Replies still in flight land in a closed view and are dropped.
    app.studio.teardown();
    tracing::info!("studio closed");

    terminal
        .show_cursor()
        .map_err(|e| CliError::Generic(format!("Failed to restore cursor: {e}")))?;
    drop(guard);
    Ok(())
}

const SPINNER_INTERVAL_MS: u64 = 120;
const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

fn update_spinner(app: &mut App) {
    if !app.any_pending() {
        return;
    }
    let now = Instant::now();
    if now.duration_since(app.spinner_last) >= Duration::from_millis(SPINNER_INTERVAL_MS) {
        app.spinner_last = now;
        app.spinner_step = app.spinner_step.wrapping_add(1);
    }
}

fn c_brand() -> Color {
    Color::Rgb(131, 56, 236)
}

fn c_warn() -> Color {
    Color::Rgb(245, 158, 11)
}

fn c_muted() -> Color {
    Color::Rgb(100, 116, 139)
}

fn ui(f: &mut Frame<'_>, app: &App) {
    let size = f.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(size);

    f.render_widget(render_tabs(app), layout[0]);

    match app.mode() {
        Mode::ContentEngine => render_content(f, app, layout[1]),
        Mode::MediaLab => render_media(f, app, layout[1]),
        Mode::Chat => f.render_widget(render_chat(app, layout[1]), layout[1]),
    }

    f.render_widget(render_input(app), layout[2]);
    let x = layout[2]
        .x
        .saturating_add(1)
        .saturating_add(app.input().cursor() as u16);
    let y = layout[2].y.saturating_add(1);
    f.set_cursor_position((x.min(layout[2].x + layout[2].width.saturating_sub(2)), y));

    f.render_widget(render_status(app), layout[3]);

    if app.show_help {
        let area = centered_rect(70, 60, size);
        f.render_widget(Clear, area);
        f.render_widget(render_help(), area);
    }
}

fn render_tabs(app: &App) -> Tabs<'static> {
    let titles = Mode::ALL
        .iter()
        .map(|mode| {
            let marker = if app.studio.is_pending(*mode) { " *" } else { "" };
            Line::from(format!("{}{marker}", mode.label()))
        })
        .collect::<Vec<_>>();

    Tabs::new(titles)
        .select(app.mode().index())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Creator Studio "),
        )
        .highlight_style(
            Style::default()
                .fg(c_brand())
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
}

fn panel(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
}

fn render_content(f: &mut Frame<'_>, app: &App, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    let content = &app.studio.content;

    let mut optimized = completion_lines(content.optimized(), |text| {
        text.lines().map(|l| Line::from(l.to_string())).collect()
    });
    if optimized.is_empty() {
        optimized.push(muted_line("Type a draft below and press Enter."));
    }
    let left = Paragraph::new(optimized)
        .block(panel(format!(" Optimized for {} ", content.platform)))
        .wrap(Wrap { trim: false });
    f.render_widget(left, cols[0]);

    let mut titles = completion_lines(content.titles(), |list| {
        list.iter()
            .enumerate()
            .map(|(idx, title)| Line::from(format!("{}. {title}", idx + 1)))
            .collect()
    });
    if titles.is_empty() {
        titles.push(muted_line("Ctrl+T suggests five titles."));
    }
    let right = Paragraph::new(titles)
        .block(panel(" Title ideas ".to_string()))
        .wrap(Wrap { trim: false });
    f.render_widget(right, cols[1]);
}

fn render_media(f: &mut Frame<'_>, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(1)])
        .split(area);
    let media = &app.studio.media;
    let width = rows[0].width.saturating_sub(2) as usize;

    let attachment = match media.attachment() {
        Some(a) => vec![
            Line::from(format!(
                "{} {} ({})",
                if a.is_video() { "Video" } else { "Image" },
                a.name(),
                a.mime_type()
            )),
            Line::from(format_bytes(a.bytes().len() as u64)),
            muted_line(&truncate_to_width(&a.preview_uri(width + 1), width)),
        ],
        None => vec![muted_line("No file attached. Type a path below and press Enter.")],
    };
    f.render_widget(
        Paragraph::new(attachment).block(panel(" Attachment ".to_string())),
        rows[0],
    );

    let mut analysis = completion_lines(media.analysis(), |text| {
        text.lines().map(|l| Line::from(l.to_string())).collect()
    });
    if analysis.is_empty() {
        analysis.push(muted_line("Ctrl+A analyzes the attachment."));
    }
    f.render_widget(
        Paragraph::new(analysis)
            .block(panel(" Analysis ".to_string()))
            .wrap(Wrap { trim: false }),
        rows[1],
    );
}

fn render_chat(app: &App, area: Rect) -> Paragraph<'static> {
    let width = area.width.saturating_sub(2).max(1) as usize;
    let height = area.height.saturating_sub(2).max(1) as usize;

    let chat = &app.studio.chat;
    let transcript = chat.transcript();
    let last_failed = chat.last_reply().is_some_and(Completion::is_fallback);

    let mut lines = Vec::new();
    for (idx, message) in transcript.iter().enumerate() {
        let (prefix, style) = match message.role {
            ChatRole::User => ("you", Style::default().fg(c_brand()).add_modifier(Modifier::BOLD)),
            ChatRole::Model if last_failed && idx + 1 == transcript.len() => (
                "assistant (failed)",
                Style::default().fg(c_warn()).add_modifier(Modifier::BOLD),
            ),
            ChatRole::Model => ("assistant", Style::default().add_modifier(Modifier::BOLD)),
        };
        lines.push(Line::from(Span::styled(prefix, style)));
        for raw in message.text.lines() {
            for piece in wrap_line(raw, width) {
                lines.push(Line::from(piece));
            }
        }
        lines.push(Line::from(""));
    }
    if chat.is_pending() {
        let frame = SPINNER_FRAMES[(app.spinner_step as usize) % SPINNER_FRAMES.len()];
        lines.push(muted_line(&format!("assistant is typing {frame}")));
    }
    if lines.is_empty() {
        lines.push(muted_line("Ask anything about growing your channel."));
    }

    let max_scroll = lines.len().saturating_sub(height);
    let from_bottom = (app.chat_scroll as usize).min(max_scroll);
    let offset = (max_scroll - from_bottom) as u16;

    let title = match chat.session() {
        Some(session) => format!(" Chat {} ", &session.id().to_string()[..8]),
        None => " Chat ".to_string(),
    };
    Paragraph::new(lines)
        .block(panel(title))
        .scroll((offset, 0))
}

fn render_input(app: &App) -> Paragraph<'static> {
    let hint = match app.mode() {
        Mode::ContentEngine => " Draft  Enter optimize  Ctrl+T titles  F2 platform ",
        Mode::MediaLab => " File path  Enter attach  Ctrl+A analyze ",
        Mode::Chat => " Message  Enter send  Ctrl+R new chat ",
    };
    let border = if app.studio.is_pending(app.mode()) {
        c_warn()
    } else {
        c_muted()
    };
    Paragraph::new(app.input().text()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(hint),
    )
}

fn render_status(app: &App) -> Paragraph<'static> {
    let mut spans = Vec::new();
    if app.studio.phase(app.mode()) == Phase::Pending {
        let frame = SPINNER_FRAMES[(app.spinner_step as usize) % SPINNER_FRAMES.len()];
        spans.push(Span::styled(
            format!("{frame} "),
            Style::default().fg(c_warn()),
        ));
    }
    spans.push(Span::raw(app.status.clone()));
    Paragraph::new(Line::from(spans)).style(Style::default().fg(c_muted()))
}

fn render_help() -> Paragraph<'static> {
    let lines = vec![
        Line::from(Span::styled("Keys", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("Tab / Shift+Tab   switch mode"),
        Line::from("Esc / Ctrl+C      quit"),
        Line::from("Ctrl+U            clear input"),
        Line::from(""),
        Line::from("Content Engine    Enter optimize, Ctrl+T titles, F2 platform"),
        Line::from("Media Lab         Enter attach path, Ctrl+A analyze"),
        Line::from("Chat Assistant    Enter send, Ctrl+R new chat, PgUp/PgDn scroll"),
    ];
    Paragraph::new(lines).block(panel(" Help ".to_string()))
}

/// Lines for a settled result. A fallback gets a warning line on top.
fn completion_lines<T>(
    result: Option<&Completion<T>>,
    render: impl Fn(&T) -> Vec<Line<'static>>,
) -> Vec<Line<'static>> {
    let Some(result) = result else {
        return Vec::new();
    };
    let mut lines = Vec::new();
    if let Some(reason) = result.failure() {
        lines.push(Line::from(Span::styled(
            format!("! {reason}"),
            Style::default().fg(c_warn()),
        )));
    }
    if let Some(value) = result.value() {
        lines.extend(render(value));
    }
    lines
}

fn muted_line(text: &str) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), Style::default().fg(c_muted())))
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(rows[1])[1]
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let kb = bytes as f64 / 1024.0;
    if kb < 1024.0 {
        return format!("{kb:.1} KB");
    }
    format!("{:.1} MB", kb / 1024.0)
}

fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if width <= 1 {
        return vec![line.to_string()];
    }
    let mut out = Vec::new();
    let mut cur = String::new();

    for word in line.split_whitespace() {
        if !cur.is_empty() && cur.as_str().width() + 1 + word.width() <= width {
            cur.push(' ');
            cur.push_str(word);
            continue;
        }
        if !cur.is_empty() {
            out.push(std::mem::take(&mut cur));
        }
        if word.width() <= width {
            cur.push_str(word);
            continue;
        }

        // Wider than the panel: cut by display width.
        let mut w = 0usize;
        for ch in word.chars() {
            let cw = ch.width().unwrap_or(0);
            if w + cw > width && !cur.is_empty() {
                out.push(std::mem::take(&mut cur));
                w = 0;
            }
            cur.push(ch);
            w += cw;
        }
    }

    if !cur.is_empty() {
        out.push(cur);
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

fn truncate_to_width(input: &str, max_width: usize) -> String {
    if input.width() <= max_width {
        return input.to_string();
    }
    const ELLIPSIS: char = '…';
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut w = 0usize;
    for ch in input.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if w + cw + 1 > max_width {
            break;
        }
        out.push(ch);
        w += cw;
    }
    out.push(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_line_breaks_on_words() {
        assert_eq!(
            wrap_line("hook strength is high", 10),
            vec!["hook", "strength", "is high"]
        );
        assert_eq!(wrap_line("", 10), vec![String::new()]);
    }

    #[test]
    fn wrap_line_splits_words_wider_than_the_panel() {
        let url = "https://example.com/watch?v=abcdefghij";
        let out = wrap_line(&format!("see {url} now"), 12);
        assert!(out.iter().all(|piece| piece.width() <= 12));
        assert_eq!(
            out,
            vec!["see", "https://exam", "ple.com/watc", "h?v=abcdefgh", "ij now"]
        );

        let wide = wrap_line("表表表表表", 4);
        assert_eq!(wide, vec!["表表", "表表", "表"]);
    }

    #[test]
    fn truncate_keeps_within_width() {
        let out = truncate_to_width("data:image/png;base64,AAAAAAAA", 12);
        assert_eq!(out.width(), 12);
        assert!(out.ends_with('…'));
        assert_eq!(truncate_to_width("short", 12), "short");
    }

    #[test]
    fn format_bytes_picks_unit() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
