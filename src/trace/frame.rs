//! Function activation records kept by the tracer

use super::value::{Bindings, RecordedValue};
use serde::Serialize;
use std::fmt;

/// Run-unique frame identifier, assigned in call order starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FrameId(pub u32);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame_{}", self.0)
    }
}

/// Lifecycle of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameState {
    Active,
    Returned,
}

/// One function activation, tracked from call to return
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackFrame {
    pub id: FrameId,
    pub name: String,
    /// Argument bindings, deep-copied at call time
    pub args: Bindings,
    pub parent: Option<FrameId>,
    /// Number of active ancestors when the call happened
    pub depth: usize,
    pub locals: Bindings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_value: Option<RecordedValue>,
    pub state: FrameState,
}

impl StackFrame {
    pub fn new(
        id: FrameId,
        name: String,
        args: Bindings,
        parent: Option<FrameId>,
        depth: usize,
    ) -> Self {
        StackFrame {
            id,
            name,
            args,
            parent,
            depth,
            locals: Bindings::new(),
            return_value: None,
            state: FrameState::Active,
        }
    }

    pub fn set_local(&mut self, name: &str, value: RecordedValue) {
        self.locals.insert(name, value);
    }

    pub fn set_return(&mut self, value: RecordedValue) {
        self.return_value = Some(value);
        self.state = FrameState::Returned;
    }

    pub fn is_active(&self) -> bool {
        self.state == FrameState::Active
    }

    /// `name(a, b)` with the recorded argument values
    pub fn signature(&self) -> String {
        let args: Vec<String> = self.args.iter().map(|(_, v)| v.to_string()).collect();
        format!("{}({})", self.name, args.join(", "))
    }
}
