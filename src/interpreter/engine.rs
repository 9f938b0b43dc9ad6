// Execution engine for instrumented programs

use crate::config::ExecutorConfig;
use crate::interpreter::errors::RuntimeError;
use crate::memory::{stack::Stack, value::Value};
use crate::trace::Tracer;
use crate::translator::{Function, InstrumentedProgram};
use rustc_hash::FxHashMap;
use tracing::debug;

/// How the most recent statement ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ControlFlow {
    Normal,
    Break,
    Continue,
    Return,
}

/// Tree-walking interpreter bound to one tracer for one run
pub struct Interpreter<'p, 't> {
    /// Top-level statements run before the entry routine
    driver: &'p [crate::translator::Stmt],

    /// Function definitions (name -> Function)
    functions: FxHashMap<&'p str, &'p Function>,

    /// Recording session, injected by the caller
    pub(crate) tracer: &'t mut Tracer,

    /// Global frame and call stack
    pub(crate) stack: Stack,

    /// Line of the statement being executed
    pub(crate) current_line: usize,

    pub(crate) control_flow: ControlFlow,

    /// Return value from the last function call
    pub(crate) return_value: Value,

    entry_point: String,
    /// Whether the entry routine already ran from the driver
    entry_called: bool,
    max_call_depth: usize,
    max_events: usize,
}

impl<'p, 't> Interpreter<'p, 't> {
    pub fn new(
        program: &'p InstrumentedProgram,
        tracer: &'t mut Tracer,
        config: &ExecutorConfig,
    ) -> Self {
        // Index functions for fast lookup
        let functions = program
            .functions
            .iter()
            .map(|f| (f.name.as_str(), f))
            .collect();

        Interpreter {
            driver: &program.driver,
            functions,
            tracer,
            stack: Stack::new(),
            current_line: 1,
            control_flow: ControlFlow::Normal,
            return_value: Value::Undefined,
            entry_point: config.entry_point.clone(),
            entry_called: false,
            max_call_depth: config.max_call_depth,
            max_events: config.max_events,
        }
    }

    /// Run the driver statements, then the entry routine if the program has one
    /// and the driver did not already call it.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        for stmt in self.driver {
            self.execute_statement(stmt)?;
            if self.control_flow != ControlFlow::Normal {
                // `return` at top level ends the driver
                break;
            }
        }
        self.control_flow = ControlFlow::Normal;

        if self.entry_called {
            return Ok(());
        }
        if let Some(entry) = self.functions.get(self.entry_point.as_str()).copied() {
            if entry.params.is_empty() {
                debug!(entry = %entry.name, "invoking entry routine");
                self.current_line = entry.line;
                self.call_function(&entry.name, Vec::new())?;
            } else {
                debug!(entry = %entry.name, "entry routine takes parameters, not invoking");
            }
        }
        Ok(())
    }

    /// Call a user-defined function (or a builtin when no definition exists)
    pub(crate) fn call_function(
        &mut self,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let call_line = self.current_line;
        let Some(function) = self.functions.get(name).copied() else {
            return match self.call_builtin(name, &args)? {
                Some(value) => Ok(value),
                None => Err(RuntimeError::UndefinedFunction {
                    name: name.to_string(),
                    line: call_line,
                }),
            };
        };

        if args.len() != function.params.len() {
            return Err(RuntimeError::ArgumentCountMismatch {
                function: name.to_string(),
                expected: function.params.len(),
                got: args.len(),
                line: call_line,
            });
        }

        if self.stack.depth() >= self.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                limit: self.max_call_depth,
                line: call_line,
            });
        }

        if self.stack.is_empty() && name == self.entry_point {
            self.entry_called = true;
        }

        // By-value parameters get their own copy of list arguments
        let bindings: Vec<(String, Value)> = function
            .params
            .iter()
            .zip(args)
            .map(|(param, value)| {
                let value = if param.by_ref { value } else { value.deep_copy() };
                (param.name.clone(), value)
            })
            .collect();

        self.tracer.call(name, &bindings, Some(function.line));
        self.check_event_budget()?;

        self.stack.push_frame(name);
        for (param, value) in bindings {
            self.stack.declare(param, value);
        }

        let saved_line = self.current_line;
        self.current_line = function.line;

        for stmt in &function.body {
            self.execute_statement(stmt)?;
            if self.control_flow != ControlFlow::Normal {
                break;
            }
        }

        let result = if self.control_flow == ControlFlow::Return {
            std::mem::take(&mut self.return_value)
        } else {
            // Fell off the end of the body
            self.execute_implicit_return(function.end_line);
            Value::Undefined
        };
        self.control_flow = ControlFlow::Normal;

        self.stack.pop_frame();
        self.current_line = saved_line;

        Ok(result)
    }

    /// Record the current value of `name` in the top trace frame. Writes to
    /// driver globals from inside a function are not locals of that frame.
    pub(crate) fn record_set(&mut self, name: &str) {
        if !self.stack.is_local(name) {
            return;
        }
        if let Some(value) = self.stack.lookup(name) {
            self.tracer.set(name, value, Some(self.current_line));
        }
    }

    pub(crate) fn check_event_budget(&self) -> Result<(), RuntimeError> {
        if self.tracer.len() > self.max_events {
            return Err(RuntimeError::EventLimitExceeded {
                limit: self.max_events,
                line: self.current_line,
            });
        }
        Ok(())
    }
}
