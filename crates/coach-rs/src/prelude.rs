//! Convenience re-exports for common `coach-rs` types.
//!
//! ```ignore
//! use coach_rs::prelude::*;
//! ```

pub use crate::api::{CompletionOracle, FnOracle, GenerationParams};
pub use crate::config::CoachConfig;
pub use crate::error::{CompletionError, HistoryError, SessionError};
pub use crate::history::{HistoryEntry, HistoryLog, InMemoryHistory, JsonFileHistory};
pub use crate::profile::{
    AthleteProfile, Availability, AvailabilityStatus, ExperienceTier, ProgramForm,
};
pub use crate::prompt::build_prompt;
pub use crate::session::{Coach, CoachSession, SessionState, Step, StepOutcome};
pub use crate::{OpenRouterClient, UsageInfo};
