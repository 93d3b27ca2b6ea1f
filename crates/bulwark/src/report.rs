//! Fire-and-forget notifications about recoveries.

use tracing::info;

/// A named occurrence worth reporting to analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Event {
    pub namespace: &'static str,
    pub name:      &'static str,
}

impl Event {
    /// A native copy failed and the manual byte copy succeeded.
    pub const COPY_FALLBACK: Event = Event {
        namespace: "error-handling",
        name:      "copy-fallback",
    };
}

pub trait Reporter: Send + Sync {
    fn send(&self, event: Event);
}

/// Reporter that logs every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn send(&self, event: Event) {
        info!(namespace = event.namespace, name = event.name, "reported event");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn send(&self, _event: Event) {}
}
