//! Terminal UI for the hybrid coach.
//!
//! The TUI runs on its own OS thread and never talks to the model directly.
//! Key presses that need the model become [`TuiCommand`]s on a channel; the
//! session loop (on the Tokio runtime) runs them through
//! [`Coach`](coach_rs::session::Coach) and mirrors the outcome into the
//! shared [`UiState`].
//!
//! ```text
//!  TUI thread ──TuiCommand──▶ session loop ──apply_step──▶ Arc<Mutex<UiState>>
//!      ▲                                                          │
//!      └────────────────────────── render ◀───────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```ignore
//! use coach_tui::{TuiConfig, spawn_tui};
//! use coach_rs::ui::UiState;
//! use std::sync::{Arc, Mutex};
//!
//! let ui_state = Arc::new(Mutex::new(UiState::default()));
//! let (commands, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let handle = spawn_tui(ui_state.clone(), TuiConfig { commands, log_buffer: None });
//! while let Some(command) = rx.recv().await {
//!     // ... run the command, update ui_state ...
//! }
//! handle.join().unwrap();
//! ```

use std::io;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use coach_rs::profile::AthleteProfile;
use coach_rs::ui::UiState;
use coach_rs::ui::tracing::LogBuffer;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{cursor, execute};
use ratatui::prelude::*;
use tokio::sync::mpsc::UnboundedSender;

mod app;
mod input;
mod render;

pub use render::log_level_style;

use app::{App, InputMode};
use input::handle_key_event;
use render::render;

/// Work the TUI asks the session loop to do.
#[derive(Debug, Clone, PartialEq)]
pub enum TuiCommand {
    /// Generate a plan for the form's profile.
    Generate(AthleteProfile),
    /// Feedback on the plan on screen; the loop stores it and regenerates.
    Feedback {
        profile: AthleteProfile,
        text: String,
    },
}

pub struct TuiConfig {
    /// Where key presses send work. Dropped when the TUI exits, which ends
    /// the receiving loop.
    pub commands: UnboundedSender<TuiCommand>,
    /// Log buffer from the tracing layer, drained into `UiState::logs` once
    /// per frame.
    pub log_buffer: Option<LogBuffer>,
}

/// Spawn the TUI on a dedicated OS thread.
pub fn spawn_tui(state: Arc<Mutex<UiState>>, config: TuiConfig) -> JoinHandle<()> {
    std::thread::spawn(move || {
        if let Err(e) = run_tui(state, &config) {
            eprintln!("TUI error: {e}");
        }
    })
}

/// Run the TUI event loop (blocking). Returns when the user quits or the
/// session loop stops running.
pub fn run_tui(state: Arc<Mutex<UiState>>, config: &TuiConfig) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut app = App::new();

    let result = event_loop(&mut terminal, &mut app, &state, config);

    if let Ok(mut s) = state.lock() {
        s.quit_requested = true;
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;
    terminal.show_cursor()?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    state: &Arc<Mutex<UiState>>,
    config: &TuiConfig,
) -> io::Result<()> {
    loop {
        let (running, quit) = sync_from_state(app, state);
        if app.should_quit || quit || !running {
            return Ok(());
        }

        if let Some(ref log_buf) = config.log_buffer {
            log_buf.flush_into(state);
        }

        terminal.draw(|frame| render(frame, state, app))?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            handle_key_event(key, app, &config.commands);
        }
    }
}

/// Pull session progress into the local app state. Returns
/// `(running, quit_requested)`.
fn sync_from_state(app: &mut App, state: &Arc<Mutex<UiState>>) -> (bool, bool) {
    let (running, quit, completed, has_plan) = match state.lock() {
        Ok(s) => (
            s.running,
            s.quit_requested,
            s.completed_requests,
            s.plan.is_some(),
        ),
        Err(_) => return (false, true),
    };

    app.has_plan = has_plan;
    // A request finished: show the plan if there is one, otherwise return to
    // the form so the athlete can adjust and retry.
    if app.request_pending && completed > app.completed_seen {
        app.request_pending = false;
        if app.input_mode != InputMode::Feedback {
            app.input_mode = if has_plan {
                InputMode::Plan
            } else {
                InputMode::Form
            };
        }
    }
    app.completed_seen = completed;
    (running, quit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_rs::api::{FnOracle, GenerationParams};
    use coach_rs::history::InMemoryHistory;
    use coach_rs::session::{Coach, CoachSession};
    use coach_rs::ui::{apply_step, begin_request};

    fn shared() -> Arc<Mutex<UiState>> {
        Arc::new(Mutex::new(UiState::default()))
    }

    #[test]
    fn pending_request_waits_for_completion() {
        let state = shared();
        let mut app = App::new();
        app.request_pending = true;

        // Session loop has not picked the command up yet.
        sync_from_state(&mut app, &state);
        assert!(app.request_pending);
        assert_eq!(app.input_mode, InputMode::Form);

        begin_request(&state, "Generating plan");
        sync_from_state(&mut app, &state);
        assert!(app.request_pending);
    }

    #[tokio::test]
    async fn finished_generation_switches_to_plan() {
        let oracle = FnOracle::new(|_, _| Ok("PLAN".into()));
        let history = InMemoryHistory::new();
        let coach = Coach::new(&oracle, &history, GenerationParams::new("m", 10, 0.7));

        let state = shared();
        let mut app = App::new();
        sync_from_state(&mut app, &state);
        app.request_pending = true;

        let step = coach
            .generate(CoachSession::new(), &AthleteProfile::default())
            .await;
        apply_step(&state, &step);
        sync_from_state(&mut app, &state);

        assert!(!app.request_pending);
        assert!(app.has_plan);
        assert_eq!(app.input_mode, InputMode::Plan);
    }

    #[test]
    fn quit_flag_is_reported() {
        let state = shared();
        state.lock().unwrap().quit_requested = true;
        let mut app = App::new();
        assert_eq!(sync_from_state(&mut app, &state), (true, true));
    }
}
