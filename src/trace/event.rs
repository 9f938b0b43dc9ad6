//! Timeline events

use super::frame::{FrameId, StackFrame};
use super::value::{Bindings, RecordedValue};
use serde::Serialize;
use std::fmt;

/// Event discriminant, for filtering and display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Call,
    Return,
    Line,
    VariableSet,
    Log,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Call => "CALL",
            EventKind::Return => "RETURN",
            EventKind::Line => "LINE",
            EventKind::VariableSet => "VAR",
            EventKind::Log => "LOG",
        };
        f.pad(s)
    }
}

/// Kind-specific event data. Every field is a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    Call {
        frame: StackFrame,
        /// Active stack length after the push
        stack_depth: usize,
    },
    Return {
        frame: StackFrame,
        value: RecordedValue,
        /// Active stack length after the pop
        stack_depth: usize,
    },
    Line,
    VariableSet {
        name: String,
        value: RecordedValue,
        locals: Bindings,
    },
    Log {
        text: String,
    },
}

/// Immutable timeline record. Its position in the timeline is its identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEvent {
    #[serde(flatten)]
    pub payload: EventPayload,
    pub message: String,
    pub line: Option<usize>,
    pub frame_id: Option<FrameId>,
}

impl TraceEvent {
    pub fn kind(&self) -> EventKind {
        match self.payload {
            EventPayload::Call { .. } => EventKind::Call,
            EventPayload::Return { .. } => EventKind::Return,
            EventPayload::Line => EventKind::Line,
            EventPayload::VariableSet { .. } => EventKind::VariableSet,
            EventPayload::Log { .. } => EventKind::Log,
        }
    }

    pub fn is_call(&self) -> bool {
        self.kind() == EventKind::Call
    }

    pub fn is_return(&self) -> bool {
        self.kind() == EventKind::Return
    }

    /// The frame snapshot carried by call and return events
    pub fn frame(&self) -> Option<&StackFrame> {
        match &self.payload {
            EventPayload::Call { frame, .. } | EventPayload::Return { frame, .. } => Some(frame),
            _ => None,
        }
    }

    /// The value carried by return events
    pub fn return_value(&self) -> Option<&RecordedValue> {
        match &self.payload {
            EventPayload::Return { value, .. } => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{:<6} L{:<4} {}", self.kind(), line, self.message),
            None => write!(f, "{:<6} {:<5} {}", self.kind(), "", self.message),
        }
    }
}
