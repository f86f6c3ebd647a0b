//! In-memory capture of tracing events for tests.
//!
//! The session engine never fails loudly: unreadable turns and abandoned
//! layout adjustments only surface as `warn!` events. [`capture_logs`]
//! records every event on the current thread so tests can assert on them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// One recorded event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedEvent {
    /// Event level.
    pub level: Level,
    /// Module path the event came from.
    pub target: String,
    /// The `message` field.
    pub message: String,
    /// Remaining fields, rendered with `Debug` (strings unquoted).
    pub fields: BTreeMap<String, String>,
}

/// Shared handle to the recorded events.
#[derive(Clone, Debug, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<CapturedEvent>>>);

impl CapturedLogs {
    fn with<R>(&self, f: impl FnOnce(&mut Vec<CapturedEvent>) -> R) -> R {
        let mut events = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut events)
    }

    /// Copy of everything recorded so far.
    pub fn snapshot(&self) -> Vec<CapturedEvent> {
        self.with(|events| events.clone())
    }

    /// Whether an event at `level` has a message containing `needle`.
    pub fn has_event(&self, level: Level, needle: &str) -> bool {
        self.with(|events| {
            events
                .iter()
                .any(|e| e.level == level && e.message.contains(needle))
        })
    }

    /// Number of events at `level`.
    pub fn count_at_level(&self, level: Level) -> usize {
        self.with(|events| events.iter().filter(|e| e.level == level).count())
    }

    /// Field `key` of the first event whose message contains `needle`.
    pub fn field(&self, needle: &str, key: &str) -> Option<String> {
        self.with(|events| {
            events
                .iter()
                .find(|e| e.message.contains(needle))
                .and_then(|e| e.fields.get(key).cloned())
        })
    }
}

#[derive(Default)]
struct Recorder {
    message: String,
    fields: BTreeMap<String, String>,
}

impl Recorder {
    fn put(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            let _ = self.fields.insert(field.name().to_owned(), value);
        }
    }
}

impl Visit for Recorder {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{value:?}"));
    }
}

impl<S: Subscriber> Layer<S> for CapturedLogs {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut recorder = Recorder::default();
        event.record(&mut recorder);
        let meta = event.metadata();
        let captured = CapturedEvent {
            level: *meta.level(),
            target: meta.target().to_owned(),
            message: recorder.message,
            fields: recorder.fields,
        };
        self.with(|events| events.push(captured));
    }
}

/// Record every event emitted on this thread until the guard drops.
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::registry().with(logs.clone());
    (logs, tracing::subscriber::set_default(subscriber))
}
