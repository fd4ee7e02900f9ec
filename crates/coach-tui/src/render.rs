//! Rendering for the coach TUI.

use std::sync::{Arc, Mutex};

use coach_rs::ui::{LogLevel, LogLine, UiState};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::{App, FormField, InputMode};

/// Map a log level to a ratatui [`Style`].
pub fn log_level_style(level: LogLevel) -> Style {
    match level {
        LogLevel::Trace => Style::default().fg(Color::DarkGray),
        LogLevel::Debug => Style::default().fg(Color::Cyan),
        LogLevel::Info => Style::default().fg(Color::Green),
        LogLevel::Warn => Style::default().fg(Color::Yellow),
        LogLevel::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}

/// Fields copied out of `UiState` so the lock is not held while drawing.
struct RenderSnapshot {
    phase: String,
    model: String,
    plan: Option<String>,
    awaiting_feedback: bool,
    busy: bool,
    warning: Option<String>,
    history_len: usize,
    logs: Vec<LogLine>,
}

impl RenderSnapshot {
    fn take(state: &Arc<Mutex<UiState>>, with_logs: bool) -> Self {
        let s = state.lock().unwrap_or_else(|e| e.into_inner());
        Self {
            phase: s.phase.clone(),
            model: s.model.clone(),
            plan: s.plan.clone(),
            awaiting_feedback: s.awaiting_feedback,
            busy: s.busy,
            warning: s.warning.clone(),
            history_len: s.history_len,
            logs: if with_logs { s.logs.clone() } else { Vec::new() },
        }
    }
}

pub(crate) fn render(frame: &mut Frame, state: &Arc<Mutex<UiState>>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let snap = RenderSnapshot::take(state, app.show_logs);

    render_status(frame, chunks[0], &snap);
    render_input(frame, chunks[2], app, &snap);

    let main_area = if app.show_logs {
        let mid = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);
        render_logs(frame, mid[1], &snap.logs, app);
        mid[0]
    } else {
        chunks[1]
    };

    match app.input_mode {
        InputMode::Form => render_form(frame, main_area, app),
        InputMode::Plan | InputMode::Feedback => render_plan(frame, main_area, &snap, app),
    }
}

// ── Status Pane ───────────────────────────────────────────────────────

fn render_status(frame: &mut Frame, area: Rect, snap: &RenderSnapshot) {
    let dim = Style::default().fg(Color::DarkGray);

    let state_label = match (snap.busy, snap.awaiting_feedback) {
        (true, _) => Span::styled("working", Style::default().fg(Color::Yellow)),
        (false, true) => Span::styled("plan ready", Style::default().fg(Color::Green)),
        (false, false) => Span::styled("idle", Style::default().fg(Color::Cyan)),
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Phase: ", dim),
            Span::styled(
                snap.phase.clone(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            state_label,
        ]),
        Line::from(vec![
            Span::styled("Model: ", dim),
            Span::raw(snap.model.clone()),
            Span::styled("   History: ", dim),
            Span::raw(format!("{} entries", snap.history_len)),
        ]),
    ];

    if let Some(ref warning) = snap.warning {
        lines.push(Line::from(Span::styled(
            format!("! {warning}"),
            Style::default().fg(Color::Red),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(" Hybrid Coach ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ── Program Form ──────────────────────────────────────────────────────

fn render_form(frame: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = FormField::ALL
        .iter()
        .map(|&field| {
            let focused = field == app.focused;
            let marker = if focused { "> " } else { "  " };
            let value_style = if focused {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let mut value = app.field_value(field);
            if focused && field == FormField::Goals {
                value.push('\u{2588}');
            }
            Line::from(vec![
                Span::raw(marker),
                Span::styled(
                    format!("{:<16}", field.label()),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(value, value_style),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Program ");
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

// ── Plan Pane ─────────────────────────────────────────────────────────

fn render_plan(frame: &mut Frame, area: Rect, snap: &RenderSnapshot, app: &App) {
    let text = match (&snap.plan, snap.busy) {
        (Some(plan), _) => Text::raw(plan.clone()),
        (None, true) => Text::styled("Generating...", Style::default().fg(Color::Yellow)),
        (None, false) => Text::styled(
            "No plan yet. Press [e] to edit the program form.",
            Style::default().fg(Color::DarkGray),
        ),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Weekly Plan ");
    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(app.plan_scroll).unwrap_or(u16::MAX), 0));
    frame.render_widget(paragraph, area);
}

// ── Log Pane ──────────────────────────────────────────────────────────

fn render_logs(frame: &mut Frame, area: Rect, logs: &[LogLine], app: &App) {
    let inner_height = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line> = logs
        .iter()
        .map(|log| {
            Line::from(vec![
                Span::styled(format!("{} ", log.time), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{} ", log.level.label()), log_level_style(log.level)),
                Span::raw(log.message.as_str()),
            ])
        })
        .collect();

    let scroll = lines
        .len()
        .saturating_sub(inner_height)
        .saturating_sub(app.log_scroll);

    let title = if app.log_scroll > 0 {
        " Log (scrolled, [End] follow) "
    } else {
        " Log ([ / ] scroll) "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

// ── Input Bar ─────────────────────────────────────────────────────────

fn render_input(frame: &mut Frame, area: Rect, app: &App, snap: &RenderSnapshot) {
    let hint = match app.input_mode {
        InputMode::Form => {
            "[Up/Down] field  [Left/Right] adjust  [Enter] generate  [,] logs  [q] quit"
        }
        InputMode::Plan if snap.awaiting_feedback => {
            "[f] feedback  [r] regenerate  [e] edit form  [Up/Down] scroll  [q] quit"
        }
        InputMode::Plan => "[r] regenerate  [e] edit form  [q] quit",
        InputMode::Feedback => "[Enter] submit feedback  [Esc] cancel",
    };
    let title = match app.status_message {
        Some(ref msg) => format!(" {msg} "),
        None => format!(" {hint} "),
    };

    let (body, color) = match app.input_mode {
        InputMode::Feedback => (format!("> {}\u{2588}", app.input_buffer), Color::Green),
        _ => (String::new(), Color::DarkGray),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title);
    frame.render_widget(Paragraph::new(body).block(block), area);
}
