//! Coaching prompt rendering.
//!
//! [`build_prompt`] is a pure function of the profile and the recent history:
//! no I/O, no clock, no randomness. The same inputs always render the same
//! bytes.
//!
//! The fixed template never names a weekday on its own. The only day names in
//! the output are the athlete's available days (plus whatever free text the
//! caller supplied in goals, feedback, or earlier plans).

use crate::history::{HistoryEntry, RECENT_HISTORY_LEN};
use crate::profile::AthleteProfile;

/// Opening line that sets the coach persona.
pub const COACH_PERSONA: &str = "You are a hybrid strength, gymnastics, and running coach \
blending Max El-Hag, Nick Dimarco, and elite running coaching.";

const TASK: &str = "Create a detailed weekly training plan with exercises, sets, reps, \
intensities, and progression notes. Lay it out as a weekly schedule that maps each \
training day of the week to its focus (strength, gymnastics skill, conditioning, running, \
or recovery). Schedule training only on the days listed under weekly availability when \
any are given, and respect the weekly session count and program length when they are \
given. Use the previous plans and the athlete's feedback on them to adjust volume, \
intensity, and exercise selection.";

/// Render the coaching prompt.
///
/// Only the last [`RECENT_HISTORY_LEN`] entries of `recent_history` are
/// rendered, oldest first.
pub fn build_prompt(profile: &AthleteProfile, recent_history: &[HistoryEntry]) -> String {
    let skip = recent_history.len().saturating_sub(RECENT_HISTORY_LEN);
    let history = &recent_history[skip..];

    PromptBuilder::new(COACH_PERSONA)
        .section("Athlete Profile", render_profile(profile))
        .section("Feedback (last week)", render_last_week_feedback(profile))
        .section_if(!history.is_empty(), "Recent Plans and Feedback", || {
            render_history(history)
        })
        .section("Task", TASK)
        .build()
}

/// Comma-joined names of the days marked exactly `available`.
pub fn render_availability(profile: &AthleteProfile) -> String {
    profile
        .availability
        .available_days()
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_profile(profile: &AthleteProfile) -> String {
    let mut lines = Vec::new();
    let mut push = |label: &str, value: Option<String>| {
        if let Some(value) = value {
            lines.push(format!("- {label}: {value}"));
        }
    };

    push("Age", profile.age.map(|v| v.to_string()));
    push("Training Age", profile.training_age.map(|v| v.to_string()));
    push("Experience", profile.experience.map(|v| v.to_string()));
    push("Goals", Some(profile.goals.clone()));
    push(
        "Weekly Availability",
        (!profile.availability.is_empty()).then(|| render_availability(profile)),
    );
    push(
        "Weekly Sessions",
        profile.weekly_sessions.map(|v| v.to_string()),
    );
    push("Equipment", profile.equipment.clone());
    push("Max Pull-Ups", profile.max_pullup.map(|v| v.to_string()));
    push("Max HSPU", profile.max_hspu.map(|v| v.to_string()));
    push("Current Week", profile.week.map(|v| v.to_string()));
    push("Program Cycles", profile.cycles.map(|v| v.to_string()));

    lines.join("\n")
}

fn render_last_week_feedback(profile: &AthleteProfile) -> String {
    if profile.last_week_feedback.is_empty() {
        return "None".to_string();
    }
    profile
        .last_week_feedback
        .iter()
        .map(|(topic, note)| match note {
            serde_json::Value::String(text) => format!("{topic}: {text}"),
            other => format!("{topic}: {other}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_history(history: &[HistoryEntry]) -> String {
    history
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                "### Previous plan {}\n\n{}\n\nAthlete feedback on this plan: {}",
                i + 1,
                entry.plan,
                entry.feedback
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ── PromptBuilder ─────────────────────────────────────────────────

/// Builder for multi-section prompts.
///
/// Sections are joined with blank lines and get `## ` headings. Sections with
/// empty content are skipped.
///
/// ```
/// use coach_rs::prompt::PromptBuilder;
///
/// let prompt = PromptBuilder::new("You are a coach.")
///     .section("Athlete", "- Age: 30")
///     .section_if(false, "Feedback", || "unused".into())
///     .build();
///
/// assert_eq!(prompt, "You are a coach.\n\n## Athlete\n\n- Age: 30");
/// ```
pub struct PromptBuilder {
    sections: Vec<String>,
}

impl PromptBuilder {
    /// Start with a preamble, included as-is without a heading.
    pub fn new(preamble: impl Into<String>) -> Self {
        Self {
            sections: vec![preamble.into()],
        }
    }

    /// Append a `## heading` section. Skipped if `content` is empty.
    pub fn section(mut self, heading: &str, content: impl Into<String>) -> Self {
        let content = content.into();
        if !content.is_empty() {
            self.sections.push(format!("## {heading}\n\n{content}"));
        }
        self
    }

    /// Conditionally append a section; `content_fn` runs only when
    /// `condition` holds.
    pub fn section_if(
        self,
        condition: bool,
        heading: &str,
        content_fn: impl FnOnce() -> String,
    ) -> Self {
        if condition {
            self.section(heading, content_fn())
        } else {
            self
        }
    }

    pub fn build(self) -> String {
        self.sections.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Availability, ExperienceTier, ProgramForm};

    const WEEKDAYS: [&str; 7] = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ];

    fn http_profile() -> AthleteProfile {
        AthleteProfile {
            age: Some(30),
            training_age: Some(5),
            goals: "build strength".into(),
            availability: Availability::new()
                .with("Monday", "available")
                .with("Tuesday", "unavailable"),
            equipment: Some("barbell".into()),
            max_pullup: Some(10),
            max_hspu: Some(5),
            week: Some(1),
            ..Default::default()
        }
    }

    #[test]
    fn template_mentions_no_weekday_by_itself() {
        let prompt = build_prompt(&AthleteProfile::default(), &[]);
        for day in WEEKDAYS {
            assert!(!prompt.contains(day), "template leaked {day}");
        }
    }

    #[test]
    fn available_days_included_others_excluded() {
        let mut profile = http_profile();
        profile.availability.insert("Thursday", "available");
        profile.availability.insert("Friday", "Available");
        profile.availability.insert("Sunday", "tentative");

        let prompt = build_prompt(&profile, &[]);
        assert!(prompt.contains("- Weekly Availability: Monday, Thursday\n"));
        for day in ["Tuesday", "Friday", "Sunday", "Wednesday"] {
            assert!(!prompt.contains(day), "{day} should be filtered out");
        }
    }

    #[test]
    fn profile_fields_are_interpolated() {
        let prompt = build_prompt(&http_profile(), &[]);
        assert!(prompt.starts_with(COACH_PERSONA));
        assert!(prompt.contains("- Age: 30\n"));
        assert!(prompt.contains("- Training Age: 5\n"));
        assert!(prompt.contains("- Goals: build strength\n"));
        assert!(prompt.contains("- Equipment: barbell\n"));
        assert!(prompt.contains("- Max Pull-Ups: 10\n"));
        assert!(prompt.contains("- Max HSPU: 5\n"));
        assert!(prompt.contains("- Current Week: 1"));
        assert!(!prompt.contains("Weekly Sessions"));
        assert!(prompt.contains("## Feedback (last week)\n\nNone\n"));
    }

    #[test]
    fn program_form_profile_renders_program_fields() {
        let profile = ProgramForm {
            weekly_sessions: 5,
            experience: ExperienceTier::Advanced,
            cycles: 3,
            goals: "press handstand".into(),
        }
        .to_profile();

        let prompt = build_prompt(&profile, &[]);
        assert!(prompt.contains("- Experience: Advanced\n"));
        assert!(prompt.contains("- Weekly Sessions: 5\n"));
        assert!(prompt.contains("- Program Cycles: 3"));
        assert!(!prompt.contains("Weekly Availability"));
        assert!(!prompt.contains("Max HSPU"));
    }

    #[test]
    fn empty_text_is_embedded_verbatim() {
        let profile = AthleteProfile {
            equipment: Some(String::new()),
            ..Default::default()
        };
        let prompt = build_prompt(&profile, &[]);
        assert!(prompt.contains("- Goals: \n"));
        assert!(prompt.contains("- Equipment: "));
    }

    #[test]
    fn last_week_feedback_rendered_in_key_order() {
        let mut profile = http_profile();
        profile
            .last_week_feedback
            .insert("sleep".into(), "poor".into());
        profile
            .last_week_feedback
            .insert("energy".into(), "low".into());

        let prompt = build_prompt(&profile, &[]);
        assert!(prompt.contains("## Feedback (last week)\n\nenergy: low\nsleep: poor"));
    }

    #[test]
    fn non_string_feedback_values_render_as_json() {
        let mut profile = http_profile();
        profile
            .last_week_feedback
            .insert("rpe".into(), serde_json::json!(8));
        profile
            .last_week_feedback
            .insert("notes".into(), serde_json::json!("knees sore"));
        profile
            .last_week_feedback
            .insert("sessions".into(), serde_json::json!([1, 2]));

        let prompt = build_prompt(&profile, &[]);
        assert!(prompt.contains("notes: knees sore\nrpe: 8\nsessions: [1,2]"));
    }

    #[test]
    fn history_rendered_oldest_first() {
        let history = vec![
            HistoryEntry::new("PLAN_A", "too easy"),
            HistoryEntry::new("PLAN_B", "too hard"),
        ];
        let prompt = build_prompt(&http_profile(), &history);

        let a = prompt.find("PLAN_A").unwrap();
        let b = prompt.find("PLAN_B").unwrap();
        assert!(a < b);
        assert!(prompt.contains("### Previous plan 1\n\nPLAN_A"));
        assert!(prompt.contains("Athlete feedback on this plan: too hard"));
    }

    #[test]
    fn only_the_last_two_entries_are_rendered() {
        let history = vec![
            HistoryEntry::new("PLAN_1", "f1"),
            HistoryEntry::new("PLAN_2", "f2"),
            HistoryEntry::new("PLAN_3", "f3"),
        ];
        let prompt = build_prompt(&http_profile(), &history);
        assert!(!prompt.contains("PLAN_1"));
        assert!(prompt.contains("PLAN_2"));
        assert!(prompt.contains("PLAN_3"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let history = vec![HistoryEntry::new("P", "F")];
        let first = build_prompt(&http_profile(), &history);
        let second = build_prompt(&http_profile(), &history);
        assert_eq!(first, second);
    }

    #[test]
    fn builder_skips_empty_sections() {
        let prompt = PromptBuilder::new("P")
            .section("Empty", "")
            .section_if(true, "Present", || "x".into())
            .build();
        assert_eq!(prompt, "P\n\n## Present\n\nx");
    }
}
