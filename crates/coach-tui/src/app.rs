//! TUI-local state (not shared with the session loop).

use coach_rs::profile::ProgramForm;

/// What the keyboard currently drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InputMode {
    /// Editing the program form. Enter generates.
    Form,
    /// Reading a generated plan.
    Plan,
    /// Typing feedback on the shown plan. Enter submits, Esc cancels.
    Feedback,
}

/// Focusable fields of the program form, top to bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FormField {
    WeeklySessions,
    Experience,
    Cycles,
    Goals,
}

impl FormField {
    pub(crate) const ALL: [FormField; 4] = [
        Self::WeeklySessions,
        Self::Experience,
        Self::Cycles,
        Self::Goals,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::WeeklySessions => "Weekly sessions",
            Self::Experience => "Experience",
            Self::Cycles => "Cycles",
            Self::Goals => "Goals",
        }
    }

    pub(crate) fn next(self) -> Self {
        match self {
            Self::WeeklySessions => Self::Experience,
            Self::Experience => Self::Cycles,
            Self::Cycles => Self::Goals,
            Self::Goals => Self::WeeklySessions,
        }
    }

    pub(crate) fn prev(self) -> Self {
        match self {
            Self::WeeklySessions => Self::Goals,
            Self::Experience => Self::WeeklySessions,
            Self::Cycles => Self::Experience,
            Self::Goals => Self::Cycles,
        }
    }
}

pub(crate) struct App {
    pub(crate) input_mode: InputMode,
    pub(crate) form: ProgramForm,
    pub(crate) focused: FormField,
    /// Feedback being typed.
    pub(crate) input_buffer: String,
    /// Mirrors `UiState::plan.is_some()`.
    pub(crate) has_plan: bool,
    /// True from sending a generate/feedback command until the session loop
    /// reports back.
    pub(crate) request_pending: bool,
    /// `UiState::completed_requests` as of the last frame.
    pub(crate) completed_seen: u64,
    /// Whether the logs pane is visible (toggled with `,`).
    pub(crate) show_logs: bool,
    /// Lines scrolled down from the top of the plan.
    pub(crate) plan_scroll: usize,
    /// Offset from the bottom of the log (0 = follow tail).
    pub(crate) log_scroll: usize,
    /// Status message shown in the input bar until the next key.
    pub(crate) status_message: Option<String>,
    pub(crate) should_quit: bool,
}

impl App {
    pub(crate) fn new() -> Self {
        Self {
            input_mode: InputMode::Form,
            form: ProgramForm::default(),
            focused: FormField::WeeklySessions,
            input_buffer: String::new(),
            has_plan: false,
            request_pending: false,
            completed_seen: 0,
            show_logs: false,
            plan_scroll: 0,
            log_scroll: 0,
            status_message: None,
            should_quit: false,
        }
    }

    /// Display value of a form field, as typed (before clamping).
    pub(crate) fn field_value(&self, field: FormField) -> String {
        match field {
            FormField::WeeklySessions => self.form.weekly_sessions.to_string(),
            FormField::Experience => self.form.experience.to_string(),
            FormField::Cycles => self.form.cycles.to_string(),
            FormField::Goals => self.form.goals.clone(),
        }
    }
}
