//! Loop statement execution (`while`, `do-while`, `for`).
//!
//! Adds `impl Interpreter` methods for the three loop forms supported by the
//! subset. `break` and `continue` are propagated via `LoopBodyResult` so
//! the loop driver can react without inspecting `control_flow` directly.
//!
//! `return` inside a loop body is handled by returning
//! `LoopBodyResult::Exit`, which causes the loop to unwind immediately and
//! let the enclosing function see the return signal.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::translator::{Expr, Stmt};

/// Result returned by [`Interpreter::execute_loop_body`] to signal how the body ended.
pub(crate) enum LoopBodyResult {
    /// Body completed normally or via `continue`; the loop iterates again.
    Continue,
    /// `break` was encountered; the loop exits.
    Break,
    /// `return` was triggered; the loop unwinds and leaves
    /// `self.control_flow` for the caller.
    Exit,
}

impl Interpreter<'_, '_> {
    /// Executes all statements in `body` inside a fresh scope.
    pub(crate) fn execute_loop_body(
        &mut self,
        body: &[Stmt],
    ) -> Result<LoopBodyResult, RuntimeError> {
        self.execute_block(body)?;
        match self.control_flow {
            ControlFlow::Normal => Ok(LoopBodyResult::Continue),
            ControlFlow::Continue => {
                self.control_flow = ControlFlow::Normal;
                Ok(LoopBodyResult::Continue)
            }
            ControlFlow::Break => {
                self.control_flow = ControlFlow::Normal;
                Ok(LoopBodyResult::Break)
            }
            ControlFlow::Return => Ok(LoopBodyResult::Exit),
        }
    }

    /// Executes a `while (condition) { body }` loop.
    pub(crate) fn execute_while(&mut self, condition: &Expr, body: &[Stmt]) -> Result<(), RuntimeError> {
        loop {
            if !self.evaluate_expr(condition)?.is_truthy() {
                break;
            }

            match self.execute_loop_body(body)? {
                LoopBodyResult::Exit | LoopBodyResult::Break => break,
                LoopBodyResult::Continue => {}
            }
            self.check_event_budget()?;
        }
        Ok(())
    }

    /// Executes a `do { body } while (condition)` loop.
    ///
    /// The body always runs at least once; the condition is checked after each
    /// iteration.
    pub(crate) fn execute_do_while(
        &mut self,
        body: &[Stmt],
        condition: &Expr,
    ) -> Result<(), RuntimeError> {
        loop {
            match self.execute_loop_body(body)? {
                LoopBodyResult::Exit | LoopBodyResult::Break => break,
                LoopBodyResult::Continue => {}
            }
            self.check_event_budget()?;

            if !self.evaluate_expr(condition)?.is_truthy() {
                break;
            }
        }
        Ok(())
    }

    /// Executes a `for (init; condition; update) { body }` loop.
    ///
    /// The init clause is scoped to the loop. A missing condition loops until
    /// `break` or `return`.
    pub(crate) fn execute_for(
        &mut self,
        init: Option<&Stmt>,
        condition: Option<&Expr>,
        update: Option<&Expr>,
        body: &[Stmt],
    ) -> Result<(), RuntimeError> {
        self.stack.push_scope();
        let result = self.run_for(init, condition, update, body);
        self.stack.pop_scope();
        result
    }

    fn run_for(
        &mut self,
        init: Option<&Stmt>,
        condition: Option<&Expr>,
        update: Option<&Expr>,
        body: &[Stmt],
    ) -> Result<(), RuntimeError> {
        if let Some(init) = init {
            self.execute_statement(init)?;
        }
        let header_line = self.current_line;

        loop {
            self.current_line = header_line;
            if let Some(cond) = condition {
                if !self.evaluate_expr(cond)?.is_truthy() {
                    break;
                }
            }

            match self.execute_loop_body(body)? {
                LoopBodyResult::Exit | LoopBodyResult::Break => break,
                LoopBodyResult::Continue => {}
            }

            self.current_line = header_line;
            if let Some(update) = update {
                self.evaluate_expr(update)?;
            }
            self.check_event_budget()?;
        }
        Ok(())
    }
}
