//! Assignment and in-place updates
//!
//! Assignable places are resolved once into a [`Slot`] so that index
//! expressions run exactly once, even for compound assignment and `++`/`--`.
//!
//! - Variables are written through the stack.
//! - List elements are written through the shared list handle, so writes
//!   like `grid[i][j] = x` reach every alias of `grid`.
//! - String characters are written by rebuilding the owning string and
//!   storing it back into its parent slot.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::{ListRef, Value};
use crate::parser::ast::BinOp;
use crate::translator::{Expr, Place};

/// A resolved assignable location
pub(crate) enum Slot {
    Var(String),
    Element(ListRef, i64),
    Char(Box<Slot>, i64),
}

impl Interpreter<'_, '_> {
    /// `target = value` or `target op= value`. Returns the stored value.
    pub(crate) fn evaluate_assignment(
        &mut self,
        target: &Place,
        op: Option<BinOp>,
        value: &Expr,
        probe: Option<&str>,
    ) -> Result<Value, RuntimeError> {
        let slot = self.resolve_place(target)?;
        let rhs = self.evaluate_expr(value)?;

        let new_value = match op {
            Some(op) => {
                let current = self.read_slot(&slot)?;
                self.binary_op(op, &current, &rhs)?
            }
            None => rhs.deep_copy(),
        };

        self.write_slot(&slot, new_value.clone())?;
        if let Some(name) = probe {
            self.record_set(name);
        }
        Ok(new_value)
    }

    /// `++x`, `x++`, `--x`, `x--`
    pub(crate) fn evaluate_update(
        &mut self,
        target: &Place,
        delta: i64,
        prefix: bool,
        probe: Option<&str>,
    ) -> Result<Value, RuntimeError> {
        let slot = self.resolve_place(target)?;
        let old = self.read_slot(&slot)?;
        let new = match &old {
            Value::Float(x) => Value::Float(x + delta as f64),
            other => {
                let n = other.as_int().ok_or_else(|| RuntimeError::TypeError {
                    expected: "number".to_string(),
                    got: other.type_name().to_string(),
                    line: self.current_line,
                })?;
                let next = n.checked_add(delta).ok_or_else(|| RuntimeError::IntegerOverflow {
                    operation: format!("{} {} 1", n, if delta > 0 { "+" } else { "-" }),
                    line: self.current_line,
                })?;
                Value::Int(next)
            }
        };

        self.write_slot(&slot, new.clone())?;
        if let Some(name) = probe {
            self.record_set(name);
        }
        Ok(if prefix { new } else { old })
    }

    pub(crate) fn resolve_place(&mut self, place: &Place) -> Result<Slot, RuntimeError> {
        match place {
            Place::Var(name) => Ok(Slot::Var(name.clone())),
            Place::Index { base, index } => self.resolve_element(base, index),
        }
    }

    /// Resolve an expression that names storage (`x`, `x[i]`, `x[i][j]`)
    pub(crate) fn resolve_expr_slot(&mut self, expr: &Expr) -> Result<Slot, RuntimeError> {
        match expr {
            Expr::Var(name) => Ok(Slot::Var(name.clone())),
            Expr::Index { base, index } => self.resolve_element(base, index),
            _ => Err(RuntimeError::TypeError {
                expected: "assignable expression".to_string(),
                got: "temporary value".to_string(),
                line: self.current_line,
            }),
        }
    }

    fn resolve_element(&mut self, base: &Expr, index: &Expr) -> Result<Slot, RuntimeError> {
        let parent = self.resolve_expr_slot(base)?;
        let idx = self.evaluate_index(index)?;
        match self.read_slot(&parent)? {
            Value::List(items) => Ok(Slot::Element(items, idx)),
            Value::Str(_) => Ok(Slot::Char(Box::new(parent), idx)),
            other => Err(RuntimeError::TypeError {
                expected: "vector or string".to_string(),
                got: other.type_name().to_string(),
                line: self.current_line,
            }),
        }
    }

    pub(crate) fn read_slot(&self, slot: &Slot) -> Result<Value, RuntimeError> {
        match slot {
            Slot::Var(name) => self.stack.lookup(name).cloned().ok_or_else(|| {
                RuntimeError::UndefinedVariable {
                    name: name.clone(),
                    line: self.current_line,
                }
            }),
            Slot::Element(items, idx) => self.element_of(&Value::List(items.clone()), *idx),
            Slot::Char(parent, idx) => {
                let owner = self.read_slot(parent)?;
                self.element_of(&owner, *idx)
            }
        }
    }

    pub(crate) fn write_slot(&mut self, slot: &Slot, value: Value) -> Result<(), RuntimeError> {
        match slot {
            Slot::Var(name) => {
                let line = self.current_line;
                let var = self.stack.lookup_mut(name).ok_or_else(|| {
                    RuntimeError::UndefinedVariable {
                        name: name.clone(),
                        line,
                    }
                })?;
                *var = value;
                Ok(())
            }
            Slot::Element(items, idx) => {
                let len = items.borrow().len();
                let i = self.check_bounds(*idx, len)?;
                items.borrow_mut()[i] = value;
                Ok(())
            }
            Slot::Char(parent, idx) => {
                let Value::Str(owner) = self.read_slot(parent)? else {
                    return Err(RuntimeError::TypeError {
                        expected: "string".to_string(),
                        got: "non-string".to_string(),
                        line: self.current_line,
                    });
                };
                let ch = self.char_of(&value)?;
                let mut chars: Vec<char> = owner.chars().collect();
                let i = self.check_bounds(*idx, chars.len())?;
                chars[i] = ch;
                self.write_slot(parent, Value::Str(chars.into_iter().collect()))
            }
        }
    }

    /// Interpret a value stored into a `char` position
    pub(crate) fn char_of(&self, value: &Value) -> Result<char, RuntimeError> {
        let ch = match value {
            Value::Str(s) if s.chars().count() == 1 => s.chars().next(),
            Value::Int(n) => u32::try_from(*n).ok().and_then(char::from_u32),
            _ => None,
        };
        ch.ok_or_else(|| RuntimeError::TypeError {
            expected: "char".to_string(),
            got: value.type_name().to_string(),
            line: self.current_line,
        })
    }
}
