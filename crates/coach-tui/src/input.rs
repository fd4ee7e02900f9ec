//! Keyboard handling.
//!
//! Keys only touch [`App`]; anything that needs the model is sent to the
//! session loop as a [`TuiCommand`].

use coach_rs::profile::{CYCLES_RANGE, WEEKLY_SESSIONS_RANGE};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;

use crate::TuiCommand;
use crate::app::{App, FormField, InputMode};

/// Lines moved per `[` / `]` press in the log pane.
const LOG_PAGE: isize = 10;

pub(crate) fn handle_key_event(
    key: KeyEvent,
    app: &mut App,
    commands: &UnboundedSender<TuiCommand>,
) {
    // Ctrl+C always quits.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    app.status_message = None;
    match app.input_mode {
        InputMode::Form => handle_form_key(key, app, commands),
        InputMode::Plan => handle_plan_key(key, app, commands),
        InputMode::Feedback => handle_feedback_key(key, app, commands),
    }
}

fn handle_form_key(key: KeyEvent, app: &mut App, commands: &UnboundedSender<TuiCommand>) {
    let typing_goals = app.focused == FormField::Goals;
    match key.code {
        KeyCode::Enter => send_generate(app, commands),
        KeyCode::Esc if app.has_plan => app.input_mode = InputMode::Plan,
        KeyCode::Down | KeyCode::Tab => app.focused = app.focused.next(),
        KeyCode::Up | KeyCode::BackTab => app.focused = app.focused.prev(),
        KeyCode::Left => step_field(app, -1),
        KeyCode::Right => step_field(app, 1),
        KeyCode::Backspace => match app.focused {
            FormField::WeeklySessions => app.form.weekly_sessions /= 10,
            FormField::Cycles => app.form.cycles /= 10,
            FormField::Goals => {
                app.form.goals.pop();
            }
            FormField::Experience => {}
        },
        KeyCode::Char('q') if !typing_goals => app.should_quit = true,
        KeyCode::Char(',') if !typing_goals => app.show_logs = !app.show_logs,
        KeyCode::Char('[') if !typing_goals && app.show_logs => scroll_log(app, LOG_PAGE),
        KeyCode::Char(']') if !typing_goals && app.show_logs => scroll_log(app, -LOG_PAGE),
        KeyCode::End if app.show_logs => app.log_scroll = 0,
        KeyCode::Char(c) => match app.focused {
            FormField::Goals => app.form.goals.push(c),
            FormField::WeeklySessions => push_digit(&mut app.form.weekly_sessions, c),
            FormField::Cycles => push_digit(&mut app.form.cycles, c),
            FormField::Experience => {}
        },
        _ => {}
    }
}

fn handle_plan_key(key: KeyEvent, app: &mut App, commands: &UnboundedSender<TuiCommand>) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('f') => {
            if app.request_pending {
                app.status_message = Some("Wait for the current request to finish.".into());
            } else {
                app.input_buffer.clear();
                app.input_mode = InputMode::Feedback;
            }
        }
        KeyCode::Char('r') => send_generate(app, commands),
        KeyCode::Char('e') => app.input_mode = InputMode::Form,
        KeyCode::Char(',') => app.show_logs = !app.show_logs,
        KeyCode::Char('[') if app.show_logs => scroll_log(app, LOG_PAGE),
        KeyCode::Char(']') if app.show_logs => scroll_log(app, -LOG_PAGE),
        KeyCode::End if app.show_logs => app.log_scroll = 0,
        KeyCode::Up | KeyCode::Char('k') => app.plan_scroll = app.plan_scroll.saturating_sub(3),
        KeyCode::Down | KeyCode::Char('j') => {
            app.plan_scroll = app.plan_scroll.saturating_add(3);
        }
        KeyCode::PageUp => app.plan_scroll = app.plan_scroll.saturating_sub(20),
        KeyCode::PageDown => app.plan_scroll = app.plan_scroll.saturating_add(20),
        KeyCode::Home => app.plan_scroll = 0,
        _ => {}
    }
}

fn handle_feedback_key(key: KeyEvent, app: &mut App, commands: &UnboundedSender<TuiCommand>) {
    match key.code {
        KeyCode::Esc => {
            app.input_buffer.clear();
            app.input_mode = InputMode::Plan;
        }
        KeyCode::Enter => {
            if app.input_buffer.trim().is_empty() {
                app.status_message = Some("Feedback is empty. Type something or press Esc.".into());
                return;
            }
            let text = std::mem::take(&mut app.input_buffer);
            let sent = commands.send(TuiCommand::Feedback {
                profile: app.form.to_profile(),
                text,
            });
            app.input_mode = InputMode::Plan;
            if sent.is_ok() {
                app.request_pending = true;
                app.plan_scroll = 0;
                app.status_message = Some("Feedback sent. Generating the next plan...".into());
            } else {
                app.status_message = Some("Session loop has stopped.".into());
            }
        }
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(c) => app.input_buffer.push(c),
        _ => {}
    }
}

fn send_generate(app: &mut App, commands: &UnboundedSender<TuiCommand>) {
    if app.request_pending {
        app.status_message = Some("Wait for the current request to finish.".into());
        return;
    }
    app.form = app.form.clamped();
    if commands
        .send(TuiCommand::Generate(app.form.to_profile()))
        .is_ok()
    {
        app.request_pending = true;
        app.plan_scroll = 0;
        app.status_message = Some("Generating plan...".into());
    } else {
        app.status_message = Some("Session loop has stopped.".into());
    }
}

/// Left/Right on a form field: nudge numbers within range, cycle the tier.
fn step_field(app: &mut App, delta: i64) {
    match app.focused {
        FormField::WeeklySessions => {
            let next = app.form.weekly_sessions.saturating_add(delta);
            app.form.weekly_sessions =
                next.clamp(*WEEKLY_SESSIONS_RANGE.start(), *WEEKLY_SESSIONS_RANGE.end());
        }
        FormField::Cycles => {
            let next = app.form.cycles.saturating_add(delta);
            app.form.cycles = next.clamp(*CYCLES_RANGE.start(), *CYCLES_RANGE.end());
        }
        FormField::Experience => {
            app.form.experience = if delta > 0 {
                app.form.experience.next()
            } else {
                app.form.experience.prev()
            };
        }
        FormField::Goals => {}
    }
}

/// Positive scrolls back into older lines; 0 follows the tail.
fn scroll_log(app: &mut App, delta: isize) {
    app.log_scroll = app.log_scroll.saturating_add_signed(delta);
}

/// Append a typed digit. Out-of-range values are clamped on submit.
fn push_digit(value: &mut i64, c: char) {
    if let Some(d) = c.to_digit(10) {
        *value = value.saturating_mul(10).saturating_add(i64::from(d));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_rs::profile::ExperienceTier;
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn setup() -> (
        App,
        UnboundedSender<TuiCommand>,
        UnboundedReceiver<TuiCommand>,
    ) {
        let (tx, rx) = unbounded_channel();
        (App::new(), tx, rx)
    }

    fn type_str(app: &mut App, tx: &UnboundedSender<TuiCommand>, s: &str) {
        for c in s.chars() {
            handle_key_event(key(KeyCode::Char(c)), app, tx);
        }
    }

    #[test]
    fn enter_sends_clamped_profile() {
        let (mut app, tx, mut rx) = setup();
        // Default 3 becomes 314, clamped to 10 on submit.
        type_str(&mut app, &tx, "14");
        handle_key_event(key(KeyCode::Down), &mut app, &tx);
        handle_key_event(key(KeyCode::Right), &mut app, &tx);
        handle_key_event(key(KeyCode::Down), &mut app, &tx);
        handle_key_event(key(KeyCode::Backspace), &mut app, &tx);
        handle_key_event(key(KeyCode::Down), &mut app, &tx);
        type_str(&mut app, &tx, "run a sub-20 5k");
        handle_key_event(key(KeyCode::Enter), &mut app, &tx);

        match rx.try_recv().unwrap() {
            TuiCommand::Generate(profile) => {
                assert_eq!(profile.weekly_sessions, Some(10));
                assert_eq!(profile.experience, Some(ExperienceTier::Intermediate));
                assert_eq!(profile.cycles, Some(1));
                assert_eq!(profile.goals, "run a sub-20 5k");
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(app.request_pending);
        assert_eq!(app.form.weekly_sessions, 10);
    }

    #[test]
    fn arrows_stay_within_range() {
        let (mut app, tx, _rx) = setup();
        for _ in 0..20 {
            handle_key_event(key(KeyCode::Right), &mut app, &tx);
        }
        assert_eq!(app.form.weekly_sessions, 10);
        for _ in 0..20 {
            handle_key_event(key(KeyCode::Left), &mut app, &tx);
        }
        assert_eq!(app.form.weekly_sessions, 1);
    }

    #[test]
    fn second_generate_while_pending_is_refused() {
        let (mut app, tx, mut rx) = setup();
        handle_key_event(key(KeyCode::Enter), &mut app, &tx);
        handle_key_event(key(KeyCode::Enter), &mut app, &tx);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
        assert!(app.status_message.is_some());
    }

    #[test]
    fn empty_feedback_is_not_sent() {
        let (mut app, tx, mut rx) = setup();
        app.input_mode = InputMode::Plan;
        handle_key_event(key(KeyCode::Char('f')), &mut app, &tx);
        assert_eq!(app.input_mode, InputMode::Feedback);

        type_str(&mut app, &tx, "   ");
        handle_key_event(key(KeyCode::Enter), &mut app, &tx);

        assert!(rx.try_recv().is_err());
        assert_eq!(app.input_mode, InputMode::Feedback);
        assert!(app.status_message.as_deref().unwrap().contains("empty"));
    }

    #[test]
    fn feedback_is_sent_with_form_profile() {
        let (mut app, tx, mut rx) = setup();
        app.input_mode = InputMode::Plan;
        handle_key_event(key(KeyCode::Char('f')), &mut app, &tx);
        type_str(&mut app, &tx, "too hard");
        handle_key_event(key(KeyCode::Enter), &mut app, &tx);

        match rx.try_recv().unwrap() {
            TuiCommand::Feedback { profile, text } => {
                assert_eq!(text, "too hard");
                assert_eq!(profile.weekly_sessions, Some(3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(app.input_mode, InputMode::Plan);
        assert!(app.request_pending);
        assert!(app.input_buffer.is_empty());
    }

    #[test]
    fn q_types_into_goals_but_quits_elsewhere() {
        let (mut app, tx, _rx) = setup();
        app.focused = FormField::Goals;
        handle_key_event(key(KeyCode::Char('q')), &mut app, &tx);
        assert!(!app.should_quit);
        assert_eq!(app.form.goals, "q");

        app.focused = FormField::Cycles;
        handle_key_event(key(KeyCode::Char('q')), &mut app, &tx);
        assert!(app.should_quit);
    }

    #[test]
    fn brackets_scroll_log_only_when_visible() {
        let (mut app, tx, _rx) = setup();
        handle_key_event(key(KeyCode::Char('[')), &mut app, &tx);
        assert_eq!(app.log_scroll, 0);

        handle_key_event(key(KeyCode::Char(',')), &mut app, &tx);
        handle_key_event(key(KeyCode::Char('[')), &mut app, &tx);
        handle_key_event(key(KeyCode::Char('[')), &mut app, &tx);
        assert_eq!(app.log_scroll, 20);
        handle_key_event(key(KeyCode::Char(']')), &mut app, &tx);
        assert_eq!(app.log_scroll, 10);
        for _ in 0..5 {
            handle_key_event(key(KeyCode::Char(']')), &mut app, &tx);
        }
        assert_eq!(app.log_scroll, 0);

        app.input_mode = InputMode::Plan;
        handle_key_event(key(KeyCode::Char('[')), &mut app, &tx);
        assert_eq!(app.log_scroll, 10);
        handle_key_event(key(KeyCode::End), &mut app, &tx);
        assert_eq!(app.log_scroll, 0);
    }

    #[test]
    fn brackets_type_into_goals() {
        let (mut app, tx, _rx) = setup();
        app.show_logs = true;
        app.focused = FormField::Goals;
        type_str(&mut app, &tx, "[x]");
        assert_eq!(app.form.goals, "[x]");
        assert_eq!(app.log_scroll, 0);
    }
}
