//! In-process log buffer attached to crash reports
//!
//! [`LogBuffer`] is a `tracing_subscriber` layer that keeps every event
//! it sees. Timestamps are milliseconds since a resettable origin, so a
//! report shows how far into a generation each line was logged.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Entries kept before the oldest are dropped
pub const DEFAULT_CAPACITY: usize = 2000;

/// One recorded event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: String,
    pub target: String,
    pub message: String,
    pub elapsed_ms: f64,
}

struct Inner {
    entries: VecDeque<LogEntry>,
    origin: Instant,
    capacity: usize,
}

/// Shared, cloneable log buffer. Clones record into the same entries.
#[derive(Clone)]
pub struct LogBuffer {
    inner: Arc<Mutex<Inner>>,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: VecDeque::new(),
                origin: Instant::now(),
                capacity: capacity.max(1),
            })),
        }
    }

    // Poisoned entries are still usable
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Restart the clock used for subsequent entries
    pub fn set_origin_time(&self) {
        self.lock().origin = Instant::now();
    }

    pub fn push(&self, level: impl Into<String>, target: impl Into<String>, message: impl Into<String>) {
        let mut inner = self.lock();
        let elapsed_ms = inner.origin.elapsed().as_secs_f64() * 1000.0;
        if inner.entries.len() >= inner.capacity {
            inner.entries.pop_front();
        }
        inner.entries.push_back(LogEntry {
            level: level.into(),
            target: target.into(),
            message: message.into(),
            elapsed_ms,
        });
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    /// JSON array of all entries, `[]` when empty
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.entries()).unwrap_or_else(|_| "[]".to_string())
    }
}

impl fmt::Debug for LogBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogBuffer({} entries)", self.len())
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.join(" ")
        } else {
            format!("{} {}", self.message, self.fields.join(" "))
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

impl<S: Subscriber> Layer<S> for LogBuffer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let metadata = event.metadata();
        self.push(metadata.level().as_str(), metadata.target(), visitor.finish());
    }
}
