//! Recording session that turns probe calls into a timeline
//!
//! The interpreter holds a `&mut Tracer` for the duration of one run and calls
//! [`Tracer::call`], [`Tracer::ret`], [`Tracer::set`], [`Tracer::log`] and
//! [`Tracer::step`] as the program executes. Nothing here can fail: probes that
//! need an active frame are silently ignored when the stack is empty.

use super::event::{EventPayload, TraceEvent};
use super::frame::{FrameId, StackFrame};
use super::timeline::Timeline;
use super::value::{Bindings, Record};
use rustc_hash::FxHashMap;
use tracing::trace;

/// Per-run recording session
#[derive(Debug, Default)]
pub struct Tracer {
    events: Vec<TraceEvent>,
    /// Active frames, bottom of the stack first
    stack: Vec<FrameId>,
    /// Every frame created during the run, active or returned
    frames: FxHashMap<FrameId, StackFrame>,
    next_frame_id: u32,
}

impl Tracer {
    pub fn new() -> Self {
        Tracer::default()
    }

    /// Record a function entry and push its frame. Returns the new frame's id.
    pub fn call<V: Record>(
        &mut self,
        name: &str,
        args: &[(String, V)],
        line: Option<usize>,
    ) -> FrameId {
        let id = FrameId(self.next_frame_id);
        self.next_frame_id += 1;

        let parent = self.stack.last().copied();
        let depth = self.stack.len();
        let args: Bindings = args.iter().map(|(n, v)| (n.as_str(), v.record())).collect();

        let frame = StackFrame::new(id, name.to_string(), args, parent, depth);
        let snapshot = frame.clone();
        self.frames.insert(id, frame);
        self.stack.push(id);

        trace!(frame = %id, name, depth, "call");
        self.push_event(
            EventPayload::Call {
                frame: snapshot,
                stack_depth: self.stack.len(),
            },
            format!("Called function {}", name),
            line,
            Some(id),
        );
        id
    }

    /// Record a function exit. Pops whatever frame is on top; no-op on an
    /// empty stack.
    pub fn ret<V: Record>(&mut self, value: &V, line: Option<usize>) {
        let Some(id) = self.stack.pop() else {
            return;
        };
        let value = value.record();
        let Some(frame) = self.frames.get_mut(&id) else {
            return;
        };
        frame.set_return(value.clone());
        let snapshot = frame.clone();

        trace!(frame = %id, name = %snapshot.name, %value, "return");
        let message = format!("Returning from {}", snapshot.name);
        self.push_event(
            EventPayload::Return {
                frame: snapshot,
                value,
                stack_depth: self.stack.len(),
            },
            message,
            line,
            Some(id),
        );
    }

    /// Record a local variable update in the top frame; no-op on an empty stack.
    pub fn set<V: Record>(&mut self, name: &str, value: &V, line: Option<usize>) {
        let Some(id) = self.stack.last().copied() else {
            return;
        };
        let Some(frame) = self.frames.get_mut(&id) else {
            return;
        };
        let value = value.record();
        frame.set_local(name, value.clone());
        let locals = frame.locals.clone();

        self.push_event(
            EventPayload::VariableSet {
                name: name.to_string(),
                value,
                locals,
            },
            format!("Updated {}", name),
            line,
            Some(id),
        );
    }

    /// Record a line of program output
    pub fn log(&mut self, text: impl Into<String>, line: Option<usize>) {
        let text = text.into();
        let frame_id = self.stack.last().copied();
        let message = format!("Console: {}", text);
        self.push_event(EventPayload::Log { text }, message, line, frame_id);
    }

    /// Record that a source line is about to run; no-op outside any function.
    pub fn step(&mut self, message: impl Into<String>, line: Option<usize>) {
        let Some(id) = self.stack.last().copied() else {
            return;
        };
        self.push_event(EventPayload::Line, message.into(), line, Some(id));
    }

    /// Events recorded so far
    pub fn timeline(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Immutable copy of the events recorded so far
    pub fn freeze(&self) -> Timeline {
        Timeline::new(self.events.clone())
    }

    pub fn into_timeline(self) -> Timeline {
        Timeline::new(self.events)
    }

    /// Clear all state. Must run before every fresh execution.
    pub fn reset(&mut self) {
        self.events.clear();
        self.stack.clear();
        self.frames.clear();
        self.next_frame_id = 0;
    }

    /// Look up any frame created during this run
    pub fn frame(&self, id: FrameId) -> Option<&StackFrame> {
        self.frames.get(&id)
    }

    /// Active frame ids, bottom of the stack first
    pub fn active_stack(&self) -> &[FrameId] {
        &self.stack
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn push_event(
        &mut self,
        payload: EventPayload,
        message: String,
        line: Option<usize>,
        frame_id: Option<FrameId>,
    ) {
        self.events.push(TraceEvent {
            payload,
            message,
            line,
            frame_id,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{EventKind, FrameState, RecordedValue};
    use pretty_assertions::assert_eq;

    fn int_args(pairs: &[(&str, i64)]) -> Vec<(String, RecordedValue)> {
        pairs
            .iter()
            .map(|(n, v)| (n.to_string(), RecordedValue::Int(*v)))
            .collect()
    }

    #[test]
    fn test_call_assigns_depth_and_parent() {
        let mut tracer = Tracer::new();
        let root = tracer.call("f", &int_args(&[("n", 2)]), Some(1));
        let child = tracer.call("f", &int_args(&[("n", 1)]), Some(1));

        let root_frame = tracer.frame(root).unwrap();
        let child_frame = tracer.frame(child).unwrap();
        assert_eq!(root_frame.depth, 0);
        assert_eq!(root_frame.parent, None);
        assert_eq!(child_frame.depth, 1);
        assert_eq!(child_frame.parent, Some(root));
        assert_eq!(tracer.active_stack(), &[root, child]);
    }

    #[test]
    fn test_return_pops_lifo_and_marks_returned() {
        let mut tracer = Tracer::new();
        let root = tracer.call("f", &int_args(&[]), None);
        let child = tracer.call("g", &int_args(&[]), None);

        tracer.ret(&RecordedValue::Int(7), Some(3));
        assert_eq!(tracer.active_stack(), &[root]);
        let child_frame = tracer.frame(child).unwrap();
        assert_eq!(child_frame.state, FrameState::Returned);
        assert_eq!(child_frame.return_value, Some(RecordedValue::Int(7)));

        let last = tracer.timeline().last().unwrap();
        assert_eq!(last.kind(), EventKind::Return);
        assert_eq!(last.frame_id, Some(child));
        assert_eq!(last.message, "Returning from g");
    }

    #[test]
    fn test_frame_dependent_probes_ignore_empty_stack() {
        let mut tracer = Tracer::new();
        tracer.ret(&RecordedValue::Int(1), None);
        tracer.set("x", &RecordedValue::Int(1), None);
        tracer.step("Executing line 1", Some(1));
        assert!(tracer.is_empty());

        tracer.log("hello", Some(1));
        assert_eq!(tracer.len(), 1);
        assert_eq!(tracer.timeline()[0].frame_id, None);
    }

    #[test]
    fn test_set_carries_full_locals_snapshot() {
        let mut tracer = Tracer::new();
        tracer.call("f", &int_args(&[]), None);
        tracer.set("a", &RecordedValue::Int(1), Some(2));
        tracer.set("b", &RecordedValue::Int(2), Some(3));

        match &tracer.timeline()[2].payload {
            EventPayload::VariableSet { name, locals, .. } => {
                assert_eq!(name, "b");
                assert_eq!(locals.len(), 2);
                assert_eq!(locals.get("a"), Some(&RecordedValue::Int(1)));
            }
            other => panic!("Expected variable-set, got {:?}", other),
        }
        // the earlier event still shows only `a`
        match &tracer.timeline()[1].payload {
            EventPayload::VariableSet { locals, .. } => assert_eq!(locals.len(), 1),
            other => panic!("Expected variable-set, got {:?}", other),
        }
    }

    #[test]
    fn test_reset_restarts_ids() {
        let mut tracer = Tracer::new();
        tracer.call("f", &int_args(&[]), None);
        tracer.call("f", &int_args(&[]), None);
        tracer.reset();

        assert!(tracer.is_empty());
        assert_eq!(tracer.depth(), 0);
        let id = tracer.call("f", &int_args(&[]), None);
        assert_eq!(id, FrameId(0));
    }
}
