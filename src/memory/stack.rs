//! Call stack implementation
//!
//! This module provides variable storage for function execution:
//! - [`Stack`]: the global frame plus the call stack of function frames
//! - [`Frame`]: a single function's activation record with nested block scopes
//!
//! # Name Resolution
//!
//! A name is looked up in the innermost function frame first and then in the
//! global frame, which holds the variables declared by top-level driver
//! statements. Frames never see their callers' locals.

use super::value::Value;
use rustc_hash::FxHashMap;

/// Variables of one activation
#[derive(Debug, Clone)]
pub struct Frame {
    pub function_name: String,
    vars: FxHashMap<String, Value>,
    insertion_order: Vec<String>, // Track order of variable declarations
    scope_stack: Vec<ScopeData>,
}

#[derive(Debug, Clone, Default)]
struct ScopeData {
    shadowed: Vec<(String, Value)>,
    declared: Vec<String>,
}

impl Frame {
    pub fn new(function_name: impl Into<String>) -> Self {
        Frame {
            function_name: function_name.into(),
            vars: FxHashMap::default(),
            insertion_order: Vec::new(),
            scope_stack: Vec::new(),
        }
    }

    /// Enter a new scope
    pub fn push_scope(&mut self) {
        self.scope_stack.push(ScopeData::default());
    }

    /// Exit the current scope
    pub fn pop_scope(&mut self) {
        if let Some(scope) = self.scope_stack.pop() {
            // Remove variables declared in this scope
            for name in scope.declared {
                self.vars.remove(&name);
                if let Some(pos) = self.insertion_order.iter().rposition(|x| x == &name) {
                    self.insertion_order.remove(pos);
                }
            }

            // Restore shadowed variables
            for (name, value) in scope.shadowed {
                self.vars.insert(name, value);
            }
        }
    }

    /// Declare a variable in the innermost scope
    pub fn declare_var(&mut self, name: String, value: Value) {
        // Handle scoping if we are in a nested scope
        if let Some(scope) = self.scope_stack.last_mut() {
            if let Some(old) = self.vars.insert(name.clone(), value) {
                // If the name already existed, restore it when the scope ends.
                // A redeclaration in the same scope keeps the outer value.
                if !scope.declared.contains(&name) {
                    scope.shadowed.push((name, old));
                }
            } else {
                scope.declared.push(name.clone());
                self.insertion_order.push(name);
            }
        } else {
            // Top-level function scope
            if !self.vars.contains_key(&name) {
                self.insertion_order.push(name.clone());
            }
            self.vars.insert(name, value);
        }
    }

    pub fn get_var(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn get_var_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.vars.get_mut(name)
    }

    /// Visible variables in declaration order
    pub fn locals(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.insertion_order
            .iter()
            .filter_map(|name| self.vars.get(name).map(|v| (name.as_str(), v)))
    }
}

/// The global frame plus the call stack
#[derive(Debug, Clone)]
pub struct Stack {
    globals: Frame,
    frames: Vec<Frame>,
}

impl Stack {
    pub fn new() -> Self {
        Stack {
            globals: Frame::new("<global>"),
            frames: Vec::new(),
        }
    }

    /// Push a new stack frame
    pub fn push_frame(&mut self, function_name: &str) {
        self.frames.push(Frame::new(function_name));
    }

    /// Pop the top stack frame
    pub fn pop_frame(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// The innermost frame, or the global frame outside any call
    pub fn current_frame(&self) -> &Frame {
        self.frames.last().unwrap_or(&self.globals)
    }

    pub fn current_frame_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().unwrap_or(&mut self.globals)
    }

    pub fn globals(&self) -> &Frame {
        &self.globals
    }

    /// Resolve a name: innermost frame, then globals
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.frames
            .last()
            .and_then(|frame| frame.get_var(name))
            .or_else(|| self.globals.get_var(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Value> {
        let in_frame = self
            .frames
            .last()
            .is_some_and(|frame| frame.get_var(name).is_some());
        if in_frame {
            self.frames.last_mut().and_then(|frame| frame.get_var_mut(name))
        } else {
            self.globals.get_var_mut(name)
        }
    }

    /// Whether `name` resolves inside the innermost function frame
    /// (false outside any call)
    pub fn is_local(&self, name: &str) -> bool {
        self.frames
            .last()
            .is_some_and(|frame| frame.get_var(name).is_some())
    }

    pub fn declare(&mut self, name: String, value: Value) {
        self.current_frame_mut().declare_var(name, value);
    }

    pub fn push_scope(&mut self) {
        self.current_frame_mut().push_scope();
    }

    pub fn pop_scope(&mut self) {
        self.current_frame_mut().pop_scope();
    }

    /// Number of function frames (the global frame is not counted)
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_shadowing_restores_outer_value() {
        let mut frame = Frame::new("f");
        frame.declare_var("x".to_string(), Value::Int(1));
        frame.push_scope();
        frame.declare_var("x".to_string(), Value::Int(2));
        frame.declare_var("y".to_string(), Value::Int(3));
        assert_eq!(frame.get_var("x"), Some(&Value::Int(2)));

        frame.pop_scope();
        assert_eq!(frame.get_var("x"), Some(&Value::Int(1)));
        assert_eq!(frame.get_var("y"), None);
        let names: Vec<&str> = frame.locals().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["x"]);
    }

    #[test]
    fn test_lookup_falls_back_to_globals() {
        let mut stack = Stack::new();
        stack.declare("n".to_string(), Value::Int(5));
        stack.push_frame("f");
        stack.declare("m".to_string(), Value::Int(1));

        assert_eq!(stack.lookup("n"), Some(&Value::Int(5)));
        assert_eq!(stack.lookup("m"), Some(&Value::Int(1)));
        assert!(stack.is_local("m"));
        assert!(!stack.is_local("n"));
        assert_eq!(stack.depth(), 1);

        stack.pop_frame();
        assert_eq!(stack.lookup("m"), None);
    }

    #[test]
    fn test_frames_do_not_see_caller_locals() {
        let mut stack = Stack::new();
        stack.push_frame("outer");
        stack.declare("secret".to_string(), Value::Int(1));
        stack.push_frame("inner");

        assert_eq!(stack.lookup("secret"), None);
    }
}
