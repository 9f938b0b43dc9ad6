//! Stateless state reconstruction over a timeline
//!
//! Viewers never keep incremental state: the state at position `i` is always
//! recomputed by scanning events `0..=i`. The same `(timeline, index)` pair
//! yields the same [`ReplayState`] every time.
//!
//! Frame status at position `i`:
//! - `Active`: call seen, no return yet
//! - `Returning`: the return event is exactly at `i`
//! - `Returned`: the return event is before `i`

use crate::trace::{
    Bindings, EventPayload, FrameId, RecordedValue, StackFrame, TraceEvent,
};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameStatus {
    Active,
    Returning,
    Returned,
}

/// One frame as seen at the replay position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameView {
    pub id: FrameId,
    pub name: String,
    pub args: Bindings,
    pub parent: Option<FrameId>,
    pub depth: usize,
    pub status: FrameStatus,
    /// Latest locals snapshot recorded for this frame
    pub locals: Bindings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_value: Option<RecordedValue>,
}

impl FrameView {
    fn from_call(frame: &StackFrame) -> Self {
        FrameView {
            id: frame.id,
            name: frame.name.clone(),
            args: frame.args.clone(),
            parent: frame.parent,
            depth: frame.depth,
            status: FrameStatus::Active,
            locals: Bindings::new(),
            return_value: None,
        }
    }
}

/// Everything a viewer needs to draw position `index`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ReplayState {
    /// Position after clamping
    pub index: usize,
    pub event: Option<TraceEvent>,
    /// Every frame called so far, in call order
    pub frames: Vec<FrameView>,
    /// Frames on the stack, oldest first; includes a returning frame
    pub active_stack: Vec<FrameId>,
    /// Printed lines so far
    pub output: Vec<String>,
    /// Most recent source line seen
    pub current_line: Option<usize>,
}

impl ReplayState {
    pub fn frame(&self, id: FrameId) -> Option<&FrameView> {
        self.frames.iter().find(|f| f.id == id)
    }

    /// Frames on the stack in order, oldest first
    pub fn stack(&self) -> impl Iterator<Item = &FrameView> {
        self.active_stack.iter().filter_map(|id| self.frame(*id))
    }

    /// Calls minus returns in the prefix (a returning frame is not counted)
    pub fn active_depth(&self) -> usize {
        self.stack()
            .filter(|f| f.status == FrameStatus::Active)
            .count()
    }

    /// Return values of every frame that has returned, in call order
    pub fn returned_values(&self) -> impl Iterator<Item = (FrameId, &RecordedValue)> {
        self.frames
            .iter()
            .filter_map(|f| f.return_value.as_ref().map(|v| (f.id, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.event.is_none()
    }
}

/// Rebuild the state at `index`. Indices past the end clamp to the last
/// event; an empty timeline gives an empty state.
pub fn reconstruct(timeline: &[TraceEvent], index: usize) -> ReplayState {
    let Some(last) = timeline.len().checked_sub(1) else {
        return ReplayState::default();
    };
    let index = index.min(last);

    let mut state = ReplayState {
        index,
        ..ReplayState::default()
    };
    let mut positions: FxHashMap<FrameId, usize> = FxHashMap::default();

    for (pos, event) in timeline[..=index].iter().enumerate() {
        if event.line.is_some() {
            state.current_line = event.line;
        }

        match &event.payload {
            EventPayload::Call { frame, .. } => {
                positions.insert(frame.id, state.frames.len());
                state.frames.push(FrameView::from_call(frame));
                state.active_stack.push(frame.id);
            }
            EventPayload::Return { frame, value, .. } => {
                let Some(view) = positions.get(&frame.id).and_then(|&i| state.frames.get_mut(i))
                else {
                    continue;
                };
                view.return_value = Some(value.clone());
                if pos == index {
                    view.status = FrameStatus::Returning;
                } else {
                    view.status = FrameStatus::Returned;
                    if let Some(at) = state.active_stack.iter().rposition(|id| *id == frame.id) {
                        state.active_stack.remove(at);
                    }
                }
            }
            EventPayload::VariableSet { locals, .. } => {
                let view = event
                    .frame_id
                    .and_then(|id| positions.get(&id))
                    .and_then(|&i| state.frames.get_mut(i));
                if let Some(view) = view {
                    view.locals = locals.clone();
                }
            }
            EventPayload::Log { text } => state.output.push(text.clone()),
            EventPayload::Line => {}
        }
    }

    state.event = timeline.get(index).cloned();
    state
}

/// Node of the recursion tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallNode {
    pub id: FrameId,
    pub name: String,
    pub args: Bindings,
    pub depth: usize,
    pub parent: Option<FrameId>,
    pub children: Vec<FrameId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_value: Option<RecordedValue>,
}

/// The whole recursion tree of a run
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CallTree {
    /// Nodes in call order
    pub nodes: Vec<CallNode>,
    pub roots: Vec<FrameId>,
}

impl CallTree {
    pub fn node(&self, id: FrameId) -> Option<&CallNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deepest call depth + 1, or 0 for an empty tree
    pub fn height(&self) -> usize {
        self.nodes.iter().map(|n| n.depth + 1).max().unwrap_or(0)
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, id: FrameId) -> fmt::Result {
        let Some(node) = self.node(id) else {
            return Ok(());
        };
        let args: Vec<String> = node.args.iter().map(|(_, v)| v.to_string()).collect();
        write!(f, "{:indent$}{}({})", "", node.name, args.join(", "), indent = node.depth * 2)?;
        match &node.return_value {
            Some(value) => writeln!(f, " => {}", value)?,
            None => writeln!(f)?,
        }
        for child in &node.children {
            self.write_node(f, *child)?;
        }
        Ok(())
    }
}

impl fmt::Display for CallTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for root in &self.roots {
            self.write_node(f, *root)?;
        }
        Ok(())
    }
}

/// Build the recursion tree from call and return events
pub fn call_tree(timeline: &[TraceEvent]) -> CallTree {
    let mut tree = CallTree::default();
    let mut positions: FxHashMap<FrameId, usize> = FxHashMap::default();

    for event in timeline {
        match &event.payload {
            EventPayload::Call { frame, .. } => {
                positions.insert(frame.id, tree.nodes.len());
                tree.nodes.push(CallNode {
                    id: frame.id,
                    name: frame.name.clone(),
                    args: frame.args.clone(),
                    depth: frame.depth,
                    parent: frame.parent,
                    children: Vec::new(),
                    return_value: None,
                });
                match frame.parent.and_then(|p| positions.get(&p)) {
                    Some(&parent) => tree.nodes[parent].children.push(frame.id),
                    None => tree.roots.push(frame.id),
                }
            }
            EventPayload::Return { frame, value, .. } => {
                if let Some(&i) = positions.get(&frame.id) {
                    tree.nodes[i].return_value = Some(value.clone());
                }
            }
            _ => {}
        }
    }
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::Tracer;
    use pretty_assertions::assert_eq;

    /// f(2) -> f(1), with one local set and one log line
    fn sample() -> Vec<TraceEvent> {
        let mut tracer = Tracer::new();
        tracer.call("f", &[("n".to_string(), 2i64)], Some(1));
        tracer.set("x", &5i64, Some(2));
        tracer.call("f", &[("n".to_string(), 1i64)], Some(1));
        tracer.log("base", Some(3));
        tracer.ret(&1i64, Some(4));
        tracer.ret(&2i64, Some(5));
        tracer.timeline().to_vec()
    }

    #[test]
    fn test_returning_frame_stays_on_stack_for_one_step() {
        let timeline = sample();

        let at_return = reconstruct(&timeline, 4);
        assert_eq!(at_return.active_stack, vec![FrameId(0), FrameId(1)]);
        assert_eq!(
            at_return.frame(FrameId(1)).map(|f| f.status),
            Some(FrameStatus::Returning)
        );
        assert_eq!(at_return.active_depth(), 1);

        let after = reconstruct(&timeline, 5);
        assert_eq!(after.active_stack, vec![FrameId(0)]);
        assert_eq!(
            after.frame(FrameId(1)).map(|f| f.status),
            Some(FrameStatus::Returned)
        );
    }

    #[test]
    fn test_locals_output_and_line() {
        let state = reconstruct(&sample(), 3);

        assert_eq!(
            state.frame(FrameId(0)).and_then(|f| f.locals.get("x")),
            Some(&RecordedValue::Int(5))
        );
        assert_eq!(state.output, vec!["base".to_string()]);
        assert_eq!(state.current_line, Some(3));
    }

    #[test]
    fn test_index_clamps_and_empty_timeline() {
        let timeline = sample();
        assert_eq!(reconstruct(&timeline, 999), reconstruct(&timeline, 5));
        assert!(reconstruct(&[], 3).is_empty());
    }

    #[test]
    fn test_call_tree_links_children() {
        let tree = call_tree(&sample());

        assert_eq!(tree.roots, vec![FrameId(0)]);
        assert_eq!(tree.node(FrameId(0)).map(|n| n.children.clone()), Some(vec![FrameId(1)]));
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.to_string(), "f(2) => 2\n  f(1) => 1\n");
    }
}
