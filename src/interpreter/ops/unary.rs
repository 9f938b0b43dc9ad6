//! Unary operator evaluation

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::translator::{Expr, UnaryOp};

impl Interpreter<'_, '_> {
    pub(crate) fn evaluate_unary_op(
        &mut self,
        op: UnaryOp,
        operand: &Expr,
    ) -> Result<Value, RuntimeError> {
        let val = self.evaluate_expr(operand)?;
        match op {
            UnaryOp::Neg => self.evaluate_neg_op(val),
            UnaryOp::Not => Ok(Value::Bool(!val.is_truthy())),
        }
    }

    fn evaluate_neg_op(&self, val: Value) -> Result<Value, RuntimeError> {
        match val {
            Value::Float(x) => Ok(Value::Float(-x)),
            other => match other.as_int() {
                Some(n) => n
                    .checked_neg()
                    .ok_or(RuntimeError::IntegerOverflow {
                        operation: format!("-{}", n),
                        line: self.current_line,
                    })
                    .map(Value::Int),
                None => Err(RuntimeError::TypeError {
                    expected: "number".to_string(),
                    got: other.type_name().to_string(),
                    line: self.current_line,
                }),
            },
        }
    }
}
