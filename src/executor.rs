//! Run orchestration
//!
//! [`Executor::run`] gives every run its own [`Tracer`], resets it before the
//! first probe, and injects it into the interpreter. The run happens on a
//! scoped worker thread with a configurable stack size, so deep recursion in
//! the traced program does not exhaust the caller's stack, and a panic in the
//! evaluator comes back as an [`ExecutionError`] instead of unwinding into
//! the caller.
//!
//! A failed run still returns everything recorded before the failure.

use crate::config::ExecutorConfig;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::trace::{Timeline, Tracer};
use crate::translator::{self, InstrumentedProgram};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a run stopped early
#[derive(Debug, Error)]
pub enum FailureCause {
    #[error(transparent)]
    Runtime(RuntimeError),

    #[error("evaluator panicked: {0}")]
    Panic(String),

    #[error("failed to start execution thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// A failed run, with the partial timeline recorded before the failure
#[derive(Debug, Error)]
#[error("{cause}")]
pub struct ExecutionError {
    pub cause: FailureCause,
    pub timeline: Timeline,
}

impl ExecutionError {
    pub fn runtime_error(&self) -> Option<&RuntimeError> {
        match &self.cause {
            FailureCause::Runtime(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the run reached a construct the translator could not express
    pub fn is_degradation(&self) -> bool {
        self.runtime_error().is_some_and(RuntimeError::is_degradation)
    }

    /// Events recorded up to the failure; still valid for replay
    pub fn partial_timeline(&self) -> &Timeline {
        &self.timeline
    }
}

#[derive(Debug, Clone, Default)]
pub struct Executor {
    config: ExecutorConfig,
}

impl Executor {
    pub fn new(config: ExecutorConfig) -> Self {
        Executor { config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Translate `source` and run it
    pub fn run_source(&self, source: &str) -> Result<Timeline, ExecutionError> {
        let program = translator::translate(source);
        self.run(&program)
    }

    /// Execute `program` once against a fresh tracer
    pub fn run(&self, program: &InstrumentedProgram) -> Result<Timeline, ExecutionError> {
        let delay = self.config.presentation_delay();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        debug!(
            functions = program.functions.len(),
            entry = %self.config.entry_point,
            "starting run"
        );

        let config = &self.config;
        let outcome = std::thread::scope(|scope| {
            let worker = std::thread::Builder::new()
                .name("recurtrace-run".to_string())
                .stack_size(config.stack_size)
                .spawn_scoped(scope, move || {
                    let mut tracer = Tracer::new();
                    tracer.reset();
                    let result = panic::catch_unwind(AssertUnwindSafe(|| {
                        Interpreter::new(program, &mut tracer, config).run()
                    }));
                    (result, tracer.into_timeline())
                });

            match worker {
                Ok(handle) => handle
                    .join()
                    .map_err(|payload| FailureCause::Panic(panic_message(payload.as_ref()))),
                Err(err) => Err(FailureCause::Spawn(err)),
            }
        });

        let (result, timeline) = match outcome {
            Ok(pair) => pair,
            Err(cause) => {
                warn!(%cause, "run aborted");
                return Err(ExecutionError {
                    cause,
                    timeline: Timeline::default(),
                });
            }
        };

        let cause = match result {
            Ok(Ok(())) => {
                debug!(events = timeline.len(), "run completed");
                return Ok(timeline);
            }
            Ok(Err(err)) => FailureCause::Runtime(err),
            Err(payload) => FailureCause::Panic(panic_message(payload.as_ref())),
        };

        warn!(%cause, events = timeline.len(), "run failed");
        Err(ExecutionError { cause, timeline })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::EventKind;
    use pretty_assertions::assert_eq;

    fn small_stack() -> Executor {
        Executor::new(ExecutorConfig {
            stack_size: 16 * 1024 * 1024,
            ..ExecutorConfig::default()
        })
    }

    #[test]
    fn test_each_run_starts_from_frame_zero() {
        let executor = small_stack();
        let source = "int id(int x) { return x; }\nid(1);\nid(2);";

        let first = executor.run_source(source).unwrap();
        let second = executor.run_source(source).unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].frame_id.map(|id| id.0), Some(0));
        assert_eq!(first.count(EventKind::Call), 2);
    }

    #[test]
    fn test_runtime_error_keeps_partial_timeline() {
        let source = "int boom(int x) {\n    return x / 0;\n}\nboom(4);";
        let err = small_stack().run_source(source).unwrap_err();

        assert!(matches!(
            err.runtime_error(),
            Some(RuntimeError::DivisionByZero { line: 2, .. })
        ));
        assert_eq!(err.partial_timeline().count(EventKind::Call), 1);
        assert_eq!(err.partial_timeline().count(EventKind::Return), 0);
    }

    #[test]
    fn test_call_depth_limit_stops_runaway_recursion() {
        let executor = Executor::new(ExecutorConfig {
            max_call_depth: 50,
            stack_size: 16 * 1024 * 1024,
            ..ExecutorConfig::default()
        });
        let err = executor
            .run_source("int down(int n) { return down(n + 1); }\ndown(0);")
            .unwrap_err();

        assert!(matches!(
            err.runtime_error(),
            Some(RuntimeError::CallDepthExceeded { limit: 50, .. })
        ));
        assert_eq!(err.timeline.count(EventKind::Call), 50);
    }

    #[test]
    fn test_event_limit_stops_runaway_loops() {
        let executor = Executor::new(ExecutorConfig {
            max_events: 100,
            stack_size: 16 * 1024 * 1024,
            ..ExecutorConfig::default()
        });
        let source = "void spin() {\n    int i = 0;\n    while (true) {\n        i++;\n    }\n}\nspin();";
        let err = executor.run_source(source).unwrap_err();

        assert!(matches!(
            err.runtime_error(),
            Some(RuntimeError::EventLimitExceeded { limit: 100, .. })
        ));
    }
}
