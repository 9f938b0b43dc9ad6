use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::translator::Expr;

impl Interpreter<'_, '_> {
    /// `base[index]` as an rvalue. List elements share storage with the
    /// list; string indexing yields a one-character string.
    pub(crate) fn evaluate_array_access(
        &mut self,
        base: &Expr,
        index: &Expr,
    ) -> Result<Value, RuntimeError> {
        let base_val = self.evaluate_expr(base)?;
        let idx = self.evaluate_index(index)?;
        self.element_of(&base_val, idx)
    }

    /// Read element `idx` of a list or string value
    pub(crate) fn element_of(&self, container: &Value, idx: i64) -> Result<Value, RuntimeError> {
        match container {
            Value::List(items) => {
                let items = items.borrow();
                let i = self.check_bounds(idx, items.len())?;
                Ok(items[i].clone())
            }
            Value::Str(s) => {
                let len = s.chars().count();
                let i = self.check_bounds(idx, len)?;
                Ok(Value::Str(s.chars().nth(i).map(String::from).unwrap_or_default()))
            }
            other => Err(RuntimeError::TypeError {
                expected: "vector or string".to_string(),
                got: other.type_name().to_string(),
                line: self.current_line,
            }),
        }
    }

    pub(crate) fn evaluate_index(&mut self, index: &Expr) -> Result<i64, RuntimeError> {
        let value = self.evaluate_expr(index)?;
        value.expect_int().map_err(|_| RuntimeError::TypeError {
            expected: "int index".to_string(),
            got: value.type_name().to_string(),
            line: self.current_line,
        })
    }

    /// Validate `idx` against `len`, returning it as a usize
    #[inline]
    pub(crate) fn check_bounds(&self, idx: i64, len: usize) -> Result<usize, RuntimeError> {
        match usize::try_from(idx) {
            Ok(i) if i < len => Ok(i),
            _ => Err(RuntimeError::IndexOutOfBounds {
                index: idx,
                size: len,
                line: self.current_line,
            }),
        }
    }
}
