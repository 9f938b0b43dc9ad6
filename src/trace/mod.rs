//! Execution trace data model and the recording session
//!
//! - [`value`]: deep snapshots of runtime values ([`RecordedValue`], [`Bindings`])
//! - [`frame`]: function activations ([`StackFrame`], [`FrameId`])
//! - [`event`]: timeline records ([`TraceEvent`])
//! - [`timeline`]: the frozen, shareable event sequence ([`Timeline`])
//! - [`tracer`]: the per-run session that builds a timeline ([`Tracer`])
//!
//! # Invariants
//!
//! - A return event always closes the most recent unreturned call.
//! - At any prefix, unreturned call ids equal the tracer's active stack.
//! - A frame's depth is the number of active frames when it was called.
//! - Recorded values are copies; mutating the live value later changes nothing.

pub mod event;
pub mod frame;
pub mod timeline;
pub mod tracer;
pub mod value;

pub use event::{EventKind, EventPayload, TraceEvent};
pub use frame::{FrameId, FrameState, StackFrame};
pub use timeline::Timeline;
pub use tracer::Tracer;
pub use value::{Bindings, Record, RecordedValue};
