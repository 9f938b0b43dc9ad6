//! Statement execution implementation
//!
//! This module handles the execution of all lowered statement kinds, including:
//!
//! - Declarations (with their variable-set probe)
//! - Output (`cout` chains and `printf`)
//! - `if`/`else` and plain blocks
//! - Unsupported fragments, which fail the run when reached
//!
//! Loops live in [`loops`](super::loops) and `return` in [`jumps`](super::jumps).
//!
//! # Probes
//!
//! Every statement flagged with `step` records a line event before it runs.
//! The event budget is checked once per statement.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::translator::{Stmt, StmtKind};

impl Interpreter<'_, '_> {
    pub(crate) fn execute_statement(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        self.current_line = stmt.line;
        if stmt.step {
            self.tracer
                .step(format!("Executing line {}", stmt.line), Some(stmt.line));
        }
        self.check_event_budget()?;

        match &stmt.kind {
            StmtKind::Let { name, init, by_ref } => {
                let value = self.evaluate_expr(init)?;
                let value = if *by_ref { value } else { value.deep_copy() };
                self.stack.declare(name.clone(), value);
                self.record_set(name);
                Ok(())
            }

            StmtKind::Expr(expr) => {
                self.evaluate_expr(expr)?;
                Ok(())
            }

            StmtKind::Log(parts) => {
                let mut text = String::new();
                for part in parts {
                    let value = self.evaluate_expr(part)?;
                    text.push_str(&value.to_string());
                }
                self.tracer.log(text, Some(stmt.line));
                Ok(())
            }

            StmtKind::Printf { format, args } => self.execute_printf(format, args),

            StmtKind::If {
                cond,
                then_body,
                else_body,
            } => {
                let cond_val = self.evaluate_expr(cond)?;
                if cond_val.is_truthy() {
                    self.execute_block(then_body)
                } else {
                    self.execute_block(else_body)
                }
            }

            StmtKind::While { cond, body } => self.execute_while(cond, body),

            StmtKind::DoWhile { body, cond } => self.execute_do_while(body, cond),

            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => self.execute_for(init.as_deref(), cond.as_ref(), update.as_ref(), body),

            StmtKind::Block(body) => self.execute_block(body),

            StmtKind::Break => {
                self.control_flow = ControlFlow::Break;
                Ok(())
            }

            StmtKind::Continue => {
                self.control_flow = ControlFlow::Continue;
                Ok(())
            }

            StmtKind::Return(value) => self.execute_return(value.as_ref()),

            StmtKind::Unsupported { text, reason } => Err(RuntimeError::Unsupported {
                text: text.clone(),
                reason: reason.clone(),
                line: stmt.line,
            }),
        }
    }

    /// Execute statements in a fresh block scope, stopping at the first
    /// non-normal control flow.
    pub(crate) fn execute_block(&mut self, body: &[Stmt]) -> Result<(), RuntimeError> {
        self.stack.push_scope();
        for stmt in body {
            if let Err(err) = self.execute_statement(stmt) {
                self.stack.pop_scope();
                return Err(err);
            }
            if self.control_flow != ControlFlow::Normal {
                break;
            }
        }
        self.stack.pop_scope();
        Ok(())
    }
}
