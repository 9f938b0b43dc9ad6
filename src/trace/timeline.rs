//! Frozen event sequence produced by one run

use super::event::{EventKind, TraceEvent};
use serde::{Serialize, Serializer};
use std::ops::Deref;
use std::sync::Arc;

/// Ordered, immutable event sequence for one run.
///
/// Cloning is cheap (shared storage) and the timeline can be read from any
/// number of threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    events: Arc<[TraceEvent]>,
}

impl Timeline {
    pub fn new(events: Vec<TraceEvent>) -> Self {
        Timeline {
            events: Arc::from(events),
        }
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Number of events of the given kind
    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    /// Return value of the last root frame (depth 0) to return, if any
    pub fn root_result(&self) -> Option<&crate::trace::RecordedValue> {
        self.events
            .iter()
            .rev()
            .find(|e| e.is_return() && e.frame().is_some_and(|f| f.depth == 0))
            .and_then(TraceEvent::return_value)
    }

    /// Text of every log event, in order
    pub fn output(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match &e.payload {
                crate::trace::EventPayload::Log { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Timeline::new(Vec::new())
    }
}

impl Deref for Timeline {
    type Target = [TraceEvent];

    fn deref(&self) -> &[TraceEvent] {
        &self.events
    }
}

impl Serialize for Timeline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.events.iter())
    }
}
