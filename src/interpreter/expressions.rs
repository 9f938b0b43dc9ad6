//! Expression evaluation implementation
//!
//! This module handles evaluation of all lowered expression kinds, including:
//!
//! - Literals (numbers, booleans, strings, brace lists, fill constructors)
//! - Variables
//! - Binary, unary and ternary operators (`&&`/`||` short-circuit)
//! - Assignment and increment/decrement, with their variable-set probes
//! - Indexing, function calls and container operations
//!
//! Operator details live in [`ops`](super::ops); container methods and the
//! library functions in [`builtins`](super::builtins).
//!
//! # Safety
//!
//! All integer arithmetic uses checked math and reports overflow as a
//! runtime error rather than wrapping.

use crate::interpreter::constants::MAX_CONTAINER_SIZE;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::BinOp;
use crate::translator::Expr;

impl Interpreter<'_, '_> {
    /// Evaluate an expression and return its value
    pub(crate) fn evaluate_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Float(x) => Ok(Value::Float(*x)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Undefined => Ok(Value::Undefined),

            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.evaluate_expr(item)?.deep_copy());
                }
                Ok(Value::list(values))
            }

            Expr::Fill { size, fill } => self.evaluate_fill(size, fill),

            Expr::Var(name) => {
                self.stack
                    .lookup(name)
                    .cloned()
                    .ok_or_else(|| RuntimeError::UndefinedVariable {
                        name: name.clone(),
                        line: self.current_line,
                    })
            }

            Expr::Binary { op, left, right } => match op {
                BinOp::And => {
                    let l = self.evaluate_expr(left)?;
                    if !l.is_truthy() {
                        return Ok(Value::Bool(false));
                    }
                    Ok(Value::Bool(self.evaluate_expr(right)?.is_truthy()))
                }
                BinOp::Or => {
                    let l = self.evaluate_expr(left)?;
                    if l.is_truthy() {
                        return Ok(Value::Bool(true));
                    }
                    Ok(Value::Bool(self.evaluate_expr(right)?.is_truthy()))
                }
                _ => {
                    let l = self.evaluate_expr(left)?;
                    let r = self.evaluate_expr(right)?;
                    self.binary_op(*op, &l, &r)
                }
            },

            Expr::Unary { op, operand } => self.evaluate_unary_op(*op, operand),

            Expr::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                if self.evaluate_expr(cond)?.is_truthy() {
                    self.evaluate_expr(then_expr)
                } else {
                    self.evaluate_expr(else_expr)
                }
            }

            Expr::Assign {
                target,
                op,
                value,
                probe,
            } => self.evaluate_assignment(target, *op, value, probe.as_deref()),

            Expr::Update {
                target,
                delta,
                prefix,
                probe,
            } => self.evaluate_update(target, *delta, *prefix, probe.as_deref()),

            Expr::Index { base, index } => self.evaluate_array_access(base, index),

            Expr::Call { name, args } => {
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.evaluate_expr(arg)?);
                }
                let call_line = self.current_line;
                let result = self.call_function(name, arg_values);
                self.current_line = call_line;
                result
            }

            Expr::Container {
                op,
                target,
                args,
                probe,
            } => self.evaluate_container_op(*op, target, args, probe.as_deref()),
        }
    }

    /// `vector<T>(n, fill)`: `n` independent copies of `fill`
    fn evaluate_fill(&mut self, size: &Expr, fill: &Expr) -> Result<Value, RuntimeError> {
        let size_val = self.evaluate_expr(size)?;
        let n = size_val.expect_int().map_err(|_| RuntimeError::TypeError {
            expected: "int size".to_string(),
            got: size_val.type_name().to_string(),
            line: self.current_line,
        })?;
        if !(0..=MAX_CONTAINER_SIZE).contains(&n) {
            return Err(RuntimeError::InvalidSize {
                size: n,
                line: self.current_line,
            });
        }

        let fill_val = self.evaluate_expr(fill)?;
        let items = (0..n).map(|_| fill_val.deep_copy()).collect();
        Ok(Value::list(items))
    }
}
