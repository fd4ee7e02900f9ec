//! Athlete profile input.
//!
//! [`AthleteProfile`] is the single input shape for both frontends. The HTTP
//! endpoint fills the strength/skill fields, the terminal UI fills the
//! program fields ([`ProgramForm`]); whatever is `None` is left out of the
//! prompt.
//!
//! Nothing here validates ranges. Numbers are accepted as given, except that
//! [`ProgramForm::clamped`] coerces the form's bounded fields into range.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Allowed weekly session count in the program form.
pub const WEEKLY_SESSIONS_RANGE: RangeInclusive<i64> = 1..=10;
/// Allowed cycle count in the program form.
pub const CYCLES_RANGE: RangeInclusive<i64> = 1..=6;

// ── Availability ──────────────────────────────────────────────────

/// Availability status for one day.
///
/// Only the exact string `"available"` counts as available. Any other value
/// is kept as [`Other`](Self::Other) and treated as not available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AvailabilityStatus {
    Available,
    Unavailable,
    Other(String),
}

impl AvailabilityStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Available => "available",
            Self::Unavailable => "unavailable",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl From<&str> for AvailabilityStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "available" => Self::Available,
            "unavailable" => Self::Unavailable,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for AvailabilityStatus {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<AvailabilityStatus> for String {
    fn from(status: AvailabilityStatus) -> Self {
        match status {
            AvailabilityStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Day-name → status mapping that keeps the order the days were given in.
///
/// Deserializes from a JSON object. A repeated key overwrites the earlier
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Availability(Vec<(String, AvailabilityStatus)>);

impl Availability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, day: impl Into<String>, status: impl Into<AvailabilityStatus>) -> Self {
        self.insert(day, status);
        self
    }

    /// Set a day's status, keeping its original position if already present.
    pub fn insert(&mut self, day: impl Into<String>, status: impl Into<AvailabilityStatus>) {
        let day = day.into();
        let status = status.into();
        match self.0.iter_mut().find(|(d, _)| *d == day) {
            Some(slot) => slot.1 = status,
            None => self.0.push((day, status)),
        }
    }

    /// Status for `day`, if the mapping mentions it.
    pub fn get(&self, day: &str) -> Option<&AvailabilityStatus> {
        self.0.iter().find(|(d, _)| d == day).map(|(_, s)| s)
    }

    /// Day names whose status is exactly `available`, in mapping order.
    pub fn available_days(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, status)| status.is_available())
            .map(|(day, _)| day.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Serialize for Availability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (day, status) in &self.0 {
            map.serialize_entry(day, status.as_str())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Availability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AvailabilityVisitor;

        impl<'de> Visitor<'de> for AvailabilityVisitor {
            type Value = Availability;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of day name to availability status")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut availability = Availability::new();
                // Non-string statuses are kept verbatim and never count as available.
                while let Some((day, status)) =
                    access.next_entry::<String, serde_json::Value>()?
                {
                    match status {
                        serde_json::Value::String(status) => availability.insert(day, status),
                        other => availability.insert(day, other.to_string()),
                    }
                }
                Ok(availability)
            }
        }

        deserializer.deserialize_map(AvailabilityVisitor)
    }
}

// ── Experience ────────────────────────────────────────────────────

/// Self-reported training experience.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceTier {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceTier {
    pub const ALL: [ExperienceTier; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    /// The next tier, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Self::Beginner => Self::Intermediate,
            Self::Intermediate => Self::Advanced,
            Self::Advanced => Self::Beginner,
        }
    }

    /// The previous tier, wrapping around.
    pub fn prev(self) -> Self {
        match self {
            Self::Beginner => Self::Advanced,
            Self::Intermediate => Self::Beginner,
            Self::Advanced => Self::Intermediate,
        }
    }
}

impl fmt::Display for ExperienceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        };
        f.write_str(label)
    }
}

// ── AthleteProfile ────────────────────────────────────────────────

/// Everything known about the athlete for one plan request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AthleteProfile {
    pub goals: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    /// Years of structured training.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_age: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pullup: Option<i64>,
    /// Max strict handstand push-ups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_hspu: Option<i64>,
    /// Current week number within the block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_sessions: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<ExperienceTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycles: Option<i64>,
    #[serde(skip_serializing_if = "Availability::is_empty")]
    pub availability: Availability,
    /// Free-form notes about last week, keyed by topic. Values may be any
    /// JSON (`"poor"`, `8`, `true`).
    #[serde(rename = "feedback", skip_serializing_if = "BTreeMap::is_empty")]
    pub last_week_feedback: BTreeMap<String, serde_json::Value>,
}

// ── ProgramForm ───────────────────────────────────────────────────

/// The terminal UI's program form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramForm {
    pub weekly_sessions: i64,
    pub experience: ExperienceTier,
    pub cycles: i64,
    pub goals: String,
}

impl Default for ProgramForm {
    fn default() -> Self {
        Self {
            weekly_sessions: 3,
            experience: ExperienceTier::Beginner,
            cycles: 1,
            goals: String::new(),
        }
    }
}

impl ProgramForm {
    /// Copy with the bounded numeric fields coerced into their ranges.
    pub fn clamped(&self) -> Self {
        Self {
            weekly_sessions: clamp_to(self.weekly_sessions, &WEEKLY_SESSIONS_RANGE),
            cycles: clamp_to(self.cycles, &CYCLES_RANGE),
            ..self.clone()
        }
    }

    /// The profile this form describes, after clamping.
    pub fn to_profile(&self) -> AthleteProfile {
        let form = self.clamped();
        AthleteProfile {
            goals: form.goals,
            weekly_sessions: Some(form.weekly_sessions),
            experience: Some(form.experience),
            cycles: Some(form.cycles),
            ..Default::default()
        }
    }
}

fn clamp_to(value: i64, range: &RangeInclusive<i64>) -> i64 {
    value.clamp(*range.start(), *range.end())
}
