use crate::interpreter::constants::{DIVISION_BY_ZERO, MODULO_BY_ZERO};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::BinOp;
use std::cmp::Ordering;

impl Interpreter<'_, '_> {
    /// Apply a non-short-circuit binary operator to two evaluated operands
    pub(crate) fn binary_op(
        &self,
        op: BinOp,
        left: &Value,
        right: &Value,
    ) -> Result<Value, RuntimeError> {
        match op {
            BinOp::Add => self.checked_add_values(left, right),
            BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                self.checked_arith(op, left, right)
            }
            BinOp::Eq => Ok(Value::Bool(values_equal(left, right))),
            BinOp::Ne => Ok(Value::Bool(!values_equal(left, right))),
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                let ordering = self.compare_values(left, right, op)?;
                Ok(Value::Bool(match op {
                    BinOp::Lt => ordering == Ordering::Less,
                    BinOp::Le => ordering != Ordering::Greater,
                    BinOp::Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                }))
            }
            BinOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
            BinOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
        }
    }

    #[inline]
    pub(crate) fn checked_add_values(
        &self,
        left: &Value,
        right: &Value,
    ) -> Result<Value, RuntimeError> {
        // String concatenation wins over arithmetic
        if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
            if matches!(left, Value::List(_)) || matches!(right, Value::List(_)) {
                return Err(self.operand_error("string or number", left, right, "+"));
            }
            return Ok(Value::Str(format!("{}{}", left, right)));
        }
        self.checked_arith(BinOp::Add, left, right)
    }

    /// Integer arithmetic with overflow checks; any float operand switches
    /// to IEEE float arithmetic.
    pub(crate) fn checked_arith(
        &self,
        op: BinOp,
        left: &Value,
        right: &Value,
    ) -> Result<Value, RuntimeError> {
        let line = self.current_line;
        if let (Some(a), Some(b)) = (left.as_int(), right.as_int()) {
            let overflow = || RuntimeError::IntegerOverflow {
                operation: format!("{} {} {}", a, op.symbol(), b),
                line,
            };
            let result = match op {
                BinOp::Add => a.checked_add(b).ok_or_else(overflow)?,
                BinOp::Sub => a.checked_sub(b).ok_or_else(overflow)?,
                BinOp::Mul => a.checked_mul(b).ok_or_else(overflow)?,
                BinOp::Div => {
                    if b == 0 {
                        return Err(RuntimeError::DivisionByZero {
                            operation: DIVISION_BY_ZERO.to_string(),
                            line,
                        });
                    }
                    a.checked_div(b).ok_or_else(overflow)?
                }
                BinOp::Mod => {
                    if b == 0 {
                        return Err(RuntimeError::DivisionByZero {
                            operation: MODULO_BY_ZERO.to_string(),
                            line,
                        });
                    }
                    a.checked_rem(b).ok_or_else(overflow)?
                }
                _ => return Err(self.operand_error("arithmetic operator", left, right, op.symbol())),
            };
            return Ok(Value::Int(result));
        }

        match (left.as_float(), right.as_float()) {
            (Some(a), Some(b)) => Ok(Value::Float(match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => a / b,
                BinOp::Mod => a % b,
                _ => return Err(self.operand_error("arithmetic operator", left, right, op.symbol())),
            })),
            _ => Err(self.operand_error("number", left, right, op.symbol())),
        }
    }

    /// Ordering for `<`, `<=`, `>`, `>=`
    pub(crate) fn compare_values(
        &self,
        left: &Value,
        right: &Value,
        op: BinOp,
    ) -> Result<Ordering, RuntimeError> {
        if let (Some(a), Some(b)) = (left.as_int(), right.as_int()) {
            return Ok(a.cmp(&b));
        }
        if let (Some(a), Some(b)) = (left.as_float(), right.as_float()) {
            // NaN compares false for every relational operator
            return Ok(a.partial_cmp(&b).unwrap_or(match op {
                BinOp::Lt | BinOp::Le => Ordering::Greater,
                _ => Ordering::Less,
            }));
        }
        match (left, right) {
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            _ => Err(self.operand_error("comparable values", left, right, op.symbol())),
        }
    }

    fn operand_error(&self, expected: &str, left: &Value, right: &Value, symbol: &str) -> RuntimeError {
        RuntimeError::TypeError {
            expected: expected.to_string(),
            got: format!("{} {} {}", left.type_name(), symbol, right.type_name()),
            line: self.current_line,
        }
    }
}

/// `==` on values: numbers by value, strings and lists by content
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::List(x), Value::List(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(l, r)| values_equal(l, r))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_equality_is_structural() {
        let a = Value::list(vec![Value::Int(1), Value::list(vec![Value::Int(2)])]);
        let b = a.deep_copy();
        assert!(values_equal(&a, &b));

        if let Some(items) = b.as_list() {
            items.borrow_mut().push(Value::Int(3));
        }
        assert!(!values_equal(&a, &b));
    }

    #[test]
    fn test_mixed_numbers_compare_by_value() {
        assert!(values_equal(&Value::Int(1), &Value::Float(1.0)));
        assert!(values_equal(&Value::Bool(true), &Value::Bool(true)));
        assert!(!values_equal(&Value::Str("1".into()), &Value::Int(1)));
    }
}
