//! The generate → feedback → regenerate loop.
//!
//! A [`CoachSession`] is an explicit two-state machine:
//!
//! ```text
//!            generate ok
//!   Idle ─────────────────▶ PlanGenerated { plan }
//!    ▲                          │
//!    │ generate failed          │ non-empty feedback:
//!    └──────────────────────────┤   append (plan, feedback), then generate
//!                               │
//!                               └─ empty feedback: rejected, no change
//! ```
//!
//! [`Coach`] drives the transitions. Each call consumes the session and
//! hands back a [`Step`] with the next session and what happened; failures
//! are values in [`StepOutcome::Failed`], never panics.

use tracing::{debug, info, warn};

use crate::api::{CompletionOracle, GenerationParams};
use crate::error::SessionError;
use crate::history::{HistoryEntry, HistoryLog, RECENT_HISTORY_LEN};
use crate::profile::AthleteProfile;
use crate::prompt::build_prompt;

// ── State ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    /// A plan is shown and waiting for the athlete's feedback.
    PlanGenerated { plan: String },
}

/// Session context threaded through [`Coach`] calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoachSession {
    state: SessionState,
}

impl CoachSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The plan awaiting feedback, if any.
    pub fn plan(&self) -> Option<&str> {
        match &self.state {
            SessionState::PlanGenerated { plan } => Some(plan),
            SessionState::Idle => None,
        }
    }

    pub fn is_awaiting_feedback(&self) -> bool {
        matches!(self.state, SessionState::PlanGenerated { .. })
    }

    fn idle() -> Self {
        Self {
            state: SessionState::Idle,
        }
    }

    fn with_plan(plan: String) -> Self {
        Self {
            state: SessionState::PlanGenerated { plan },
        }
    }
}

/// What a transition did.
#[derive(Debug)]
pub enum StepOutcome {
    /// A new plan was generated (also held by the returned session).
    PlanGenerated(String),
    /// Feedback was empty or whitespace-only; nothing changed.
    FeedbackRejected,
    Failed(SessionError),
}

/// Result of one [`Coach`] transition.
#[derive(Debug)]
pub struct Step {
    pub session: CoachSession,
    pub outcome: StepOutcome,
}

impl Step {
    fn new(session: CoachSession, outcome: StepOutcome) -> Self {
        Self { session, outcome }
    }

    pub fn error(&self) -> Option<&SessionError> {
        match &self.outcome {
            StepOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

// ── Coach ──────────────────────────────────────────────────────────

/// Runs prompt building, completion, and history bookkeeping.
pub struct Coach<'a> {
    oracle: &'a dyn CompletionOracle,
    history: &'a dyn HistoryLog,
    params: GenerationParams,
}

impl<'a> Coach<'a> {
    pub fn new(
        oracle: &'a dyn CompletionOracle,
        history: &'a dyn HistoryLog,
        params: GenerationParams,
    ) -> Self {
        Self {
            oracle,
            history,
            params,
        }
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// One stateless generation: read recent history, render, complete.
    pub async fn generate_plan(&self, profile: &AthleteProfile) -> Result<String, SessionError> {
        let recent = self.history.recent(RECENT_HISTORY_LEN)?;
        self.generate_plan_with(profile, &recent).await
    }

    /// Render and complete with history the caller already loaded.
    pub async fn generate_plan_with(
        &self,
        profile: &AthleteProfile,
        recent: &[HistoryEntry],
    ) -> Result<String, SessionError> {
        let prompt = build_prompt(profile, recent);
        info!(
            "Generating plan: {} history entries, {} prompt chars",
            recent.len(),
            prompt.len()
        );
        Ok(self.oracle.complete(&prompt, &self.params).await?)
    }

    /// Store `(plan, feedback)` verbatim.
    pub fn record_feedback(&self, plan: &str, feedback: &str) -> Result<(), SessionError> {
        self.history.append(HistoryEntry::new(plan, feedback))?;
        info!("Recorded feedback ({} chars)", feedback.len());
        Ok(())
    }

    /// Generate a plan from any state, discarding any plan still pending.
    /// Success moves to `PlanGenerated`, failure returns to `Idle`.
    pub async fn generate(&self, previous: CoachSession, profile: &AthleteProfile) -> Step {
        if let Some(plan) = previous.plan() {
            debug!("Discarding pending plan ({} chars)", plan.len());
        }
        match self.generate_plan(profile).await {
            Ok(plan) => Step::new(
                CoachSession::with_plan(plan.clone()),
                StepOutcome::PlanGenerated(plan),
            ),
            Err(e) => {
                warn!("Plan generation failed: {e}");
                Step::new(CoachSession::idle(), StepOutcome::Failed(e))
            }
        }
    }

    /// Submit feedback on the pending plan, then regenerate with it in
    /// history.
    pub async fn submit_feedback(
        &self,
        session: CoachSession,
        profile: &AthleteProfile,
        feedback: &str,
    ) -> Step {
        let Some(plan) = session.plan().map(str::to_owned) else {
            return Step::new(session, StepOutcome::Failed(SessionError::NoPlanPending));
        };

        if feedback.trim().is_empty() {
            return Step::new(session, StepOutcome::FeedbackRejected);
        }

        if let Err(e) = self.record_feedback(&plan, feedback) {
            warn!("Failed to store feedback: {e}");
            return Step::new(session, StepOutcome::Failed(e));
        }

        self.generate(session, profile).await
    }
}
