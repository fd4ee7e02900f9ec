//! Frontend-agnostic state for the interactive coach.
//!
//! ```text
//! session loop ──writes──▶ Arc<Mutex<UiState>> ◀──reads── terminal UI
//! ```
//!
//! The session loop owns the [`CoachSession`](crate::session::CoachSession)
//! and mirrors what the athlete should see into [`UiState`]: the current plan,
//! whether feedback is expected, the last warning, and captured log lines.
//! No rendering dependencies live here.

pub mod tracing;

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::session::{Step, StepOutcome};

/// Maximum log lines kept in memory.
pub const MAX_LOG_LINES: usize = 2000;
/// Trim to this many when the cap is exceeded.
pub const LOG_TRIM_TO: usize = 1200;

// ── Log Types ─────────────────────────────────────────────────────────

/// A single log line captured from tracing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogLine {
    pub time: String,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Short fixed-width label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO ",
            Self::Warn => "WARN ",
            Self::Error => "ERROR",
        }
    }
}

impl From<&::tracing::Level> for LogLevel {
    fn from(level: &::tracing::Level) -> Self {
        match *level {
            ::tracing::Level::TRACE => Self::Trace,
            ::tracing::Level::DEBUG => Self::Debug,
            ::tracing::Level::INFO => Self::Info,
            ::tracing::Level::WARN => Self::Warn,
            ::tracing::Level::ERROR => Self::Error,
        }
    }
}

// ── UiState ───────────────────────────────────────────────────────────

/// What the interactive frontend renders.
pub struct UiState {
    /// One-line status, e.g. "Generating plan…".
    pub phase: String,
    pub model: String,

    /// Plan currently on screen.
    pub plan: Option<String>,
    /// True while the session is in `PlanGenerated`.
    pub awaiting_feedback: bool,
    /// True while a completion request is in flight.
    pub busy: bool,
    /// Last failure or rejection, shown until the next successful step.
    pub warning: Option<String>,
    /// Entries in the plan/feedback history.
    pub history_len: usize,
    /// Number of session steps applied so far.
    pub completed_requests: u64,

    pub logs: Vec<LogLine>,

    /// Set to `false` when the session loop exits.
    pub running: bool,
    /// The frontend sets this to `true` when the user requests quit.
    pub quit_requested: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            phase: "Fill in the program form".into(),
            model: String::new(),
            plan: None,
            awaiting_feedback: false,
            busy: false,
            warning: None,
            history_len: 0,
            completed_requests: 0,
            logs: Vec::new(),
            running: true,
            quit_requested: false,
        }
    }
}

// ── Convenience Updaters ──────────────────────────────────────────────

/// Lock the shared state mutex and run a closure on the guard.
/// Poisoned locks are skipped.
macro_rules! with_state {
    ($state:expr, |$s:ident| $body:block) => {
        if let Ok(mut $s) = $state.lock() {
            $body
        }
    };
}

/// Mark a completion request as started.
pub fn begin_request(state: &Arc<Mutex<UiState>>, phase: &str) {
    with_state!(state, |s| {
        s.busy = true;
        s.warning = None;
        s.phase = phase.to_string();
    });
}

/// Show a warning without touching the plan or session flags.
pub fn show_warning(state: &Arc<Mutex<UiState>>, warning: &str) {
    with_state!(state, |s| { s.warning = Some(warning.to_string()) });
}

pub fn set_history_len(state: &Arc<Mutex<UiState>>, len: usize) {
    with_state!(state, |s| { s.history_len = len });
}

/// Mirror the result of a session transition.
pub fn apply_step(state: &Arc<Mutex<UiState>>, step: &Step) {
    with_state!(state, |s| {
        s.busy = false;
        s.completed_requests += 1;
        s.plan = step.session.plan().map(str::to_owned);
        s.awaiting_feedback = step.session.is_awaiting_feedback();
        match &step.outcome {
            StepOutcome::PlanGenerated(_) => {
                s.warning = None;
                s.phase = "Plan ready. Press f to give feedback".into();
            }
            StepOutcome::FeedbackRejected => {
                s.warning = Some("Feedback is empty; nothing was saved".into());
            }
            StepOutcome::Failed(e) => {
                s.warning = Some(e.to_string());
                s.phase = if s.awaiting_feedback {
                    "Plan kept. Feedback was not saved".into()
                } else {
                    "Generation failed. Adjust the form and try again".into()
                };
            }
        }
    });
}
