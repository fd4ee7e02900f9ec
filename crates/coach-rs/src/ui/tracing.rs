//! Tracing layer that feeds the terminal UI's log pane.
//!
//! Events land in a [`LogBuffer`] guarded by its own mutex, separate from
//! [`UiState`](super::UiState). The frontend drains it once per frame.

use std::sync::{Arc, Mutex};

use chrono::Local;
use tracing::Subscriber;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use super::{LOG_TRIM_TO, LogLevel, LogLine, MAX_LOG_LINES, UiState};

/// Pending log lines not yet merged into `UiState::logs`.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<LogLine>>>);

impl LogBuffer {
    pub fn drain(&self) -> Vec<LogLine> {
        let mut pending = self.0.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *pending)
    }

    /// Move pending lines into `UiState::logs`, trimming the oldest when the
    /// cap is exceeded. Takes the state lock only if there is something new.
    pub fn flush_into(&self, state: &Arc<Mutex<UiState>>) {
        let lines = self.drain();
        if lines.is_empty() {
            return;
        }
        if let Ok(mut s) = state.lock() {
            s.logs.extend(lines);
            trim_front(&mut s.logs);
        }
    }

    fn push(&self, line: LogLine) {
        if let Ok(mut pending) = self.0.lock() {
            pending.push(line);
            trim_front(&mut pending);
        }
    }
}

fn trim_front(lines: &mut Vec<LogLine>) {
    if lines.len() > MAX_LOG_LINES {
        let excess = lines.len() - LOG_TRIM_TO;
        lines.drain(..excess);
    }
}

/// Captures events at or above `min_level` into a [`LogBuffer`].
pub struct UiTracingLayer {
    buffer: LogBuffer,
    min_level: LogLevel,
}

impl UiTracingLayer {
    /// A layer keeping `Info` and above, plus the buffer it writes to.
    pub fn new() -> (Self, LogBuffer) {
        Self::with_min_level(LogLevel::Info)
    }

    pub fn with_min_level(min_level: LogLevel) -> (Self, LogBuffer) {
        let buffer = LogBuffer::default();
        (
            Self {
                buffer: buffer.clone(),
                min_level,
            },
            buffer,
        )
    }
}

impl<S: Subscriber + for<'a> LookupSpan<'a>> Layer<S> for UiTracingLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let level = LogLevel::from(event.metadata().level());
        if level < self.min_level {
            return;
        }

        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        self.buffer.push(LogLine {
            time: Local::now().format("%H:%M:%S").to_string(),
            level,
            message: fields.into_message(),
        });
    }
}

#[derive(Default)]
struct FieldCollector {
    message: String,
    extras: Vec<String>,
}

impl FieldCollector {
    fn into_message(self) -> String {
        match (self.message.is_empty(), self.extras.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.extras.join(" "),
            (false, false) => format!("{} {{{}}}", self.message, self.extras.join(", ")),
        }
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.extras.push(format!("{}={value:?}", field.name()));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.extras.push(format!("{}={value}", field.name()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    fn capture(min_level: LogLevel, emit: impl FnOnce()) -> Vec<LogLine> {
        let (layer, buffer) = UiTracingLayer::with_min_level(min_level);
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, emit);
        buffer.drain()
    }

    #[test]
    fn captures_message_and_fields() {
        let lines = capture(LogLevel::Info, || {
            tracing::info!(entries = 2, "Generating plan");
        });
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].level, LogLevel::Info);
        assert_eq!(lines[0].message, "Generating plan {entries=2}");
    }

    #[test]
    fn drops_events_below_min_level() {
        let lines = capture(LogLevel::Warn, || {
            tracing::info!("ignored");
            tracing::warn!("kept");
        });
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].message, "kept");
    }

    #[test]
    fn flush_moves_lines_into_state() {
        let (_layer, buffer) = UiTracingLayer::new();
        buffer.push(LogLine {
            time: "00:00:00".into(),
            level: LogLevel::Info,
            message: "hello".into(),
        });
        let state = Arc::new(Mutex::new(UiState::default()));
        buffer.flush_into(&state);
        assert_eq!(state.lock().unwrap().logs.len(), 1);
        assert!(buffer.drain().is_empty());
    }
}
