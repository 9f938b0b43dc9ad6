//! Built-in function implementations
//!
//! This module provides the parts of the standard library surface that the
//! interpreter handles directly rather than through user code.
//!
//! # Supported Built-ins
//!
//! - `max(a, b)`, `min(a, b)`, `abs(x)`, `to_string(x)`: library calls, used
//!   only when the program defines no function of the same name
//! - Container operations (`push_back`, `pop_back`, `size`/`length`,
//!   `substr`, `back`, `empty`) on lists and strings
//! - `printf(format, ...)`: formatted output recorded as a log event
//!
//! # Implementation Notes
//!
//! - `printf` supports format specifiers: `%d`, `%i`, `%s`, `%c`, `%f` (with
//!   optional precision such as `%.2f`), `%%`
//! - One trailing newline is stripped from `printf` output, since each log
//!   event already stands for a line
//! - Mutating container operations on strings rebuild the string and store it
//!   back into the variable (or element) that owns it

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::translator::{ContainerOp, Expr};
use std::cmp::Ordering;

impl Interpreter<'_, '_> {
    /// Library calls. `Ok(None)` means `name` is not a builtin.
    pub(crate) fn call_builtin(
        &mut self,
        name: &str,
        args: &[Value],
    ) -> Result<Option<Value>, RuntimeError> {
        let value = match name {
            "max" | "min" => {
                let [a, b] = self.expect_args::<2>(name, args)?;
                let ordering = self.compare_values(a, b, crate::parser::ast::BinOp::Lt)?;
                let pick_a = match name {
                    "max" => ordering != Ordering::Less,
                    _ => ordering != Ordering::Greater,
                };
                if pick_a {
                    a.clone()
                } else {
                    b.clone()
                }
            }
            "abs" => {
                let [x] = self.expect_args::<1>(name, args)?;
                match x {
                    Value::Float(f) => Value::Float(f.abs()),
                    other => {
                        let n = other.as_int().ok_or_else(|| RuntimeError::TypeError {
                            expected: "number".to_string(),
                            got: other.type_name().to_string(),
                            line: self.current_line,
                        })?;
                        Value::Int(n.checked_abs().ok_or_else(|| {
                            RuntimeError::IntegerOverflow {
                                operation: format!("abs({})", n),
                                line: self.current_line,
                            }
                        })?)
                    }
                }
            }
            "to_string" => {
                let [x] = self.expect_args::<1>(name, args)?;
                Value::Str(x.to_string())
            }
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    fn expect_args<'a, const N: usize>(
        &self,
        name: &str,
        args: &'a [Value],
    ) -> Result<&'a [Value; N], RuntimeError> {
        args.try_into()
            .map_err(|_| RuntimeError::ArgumentCountMismatch {
                function: name.to_string(),
                expected: N,
                got: args.len(),
                line: self.current_line,
            })
    }

    /// Run a normalized container operation on `target`
    pub(crate) fn evaluate_container_op(
        &mut self,
        op: ContainerOp,
        target: &Expr,
        args: &[Expr],
        probe: Option<&str>,
    ) -> Result<Value, RuntimeError> {
        let container = self.evaluate_expr(target)?;
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.evaluate_expr(arg)?);
        }

        let result = match (&container, op) {
            (Value::List(items), ContainerOp::Append) => {
                let item = arg_values.first().map(Value::deep_copy).unwrap_or_default();
                items.borrow_mut().push(item);
                Value::Undefined
            }
            (Value::List(items), ContainerOp::RemoveLast) => {
                if items.borrow_mut().pop().is_none() {
                    return Err(self.empty_container("pop_back"));
                }
                Value::Undefined
            }
            (Value::List(items), ContainerOp::Length) => Value::Int(items.borrow().len() as i64),
            (Value::List(items), ContainerOp::Back) => match items.borrow().last() {
                Some(item) => item.clone(),
                None => return Err(self.empty_container("back")),
            },
            (Value::List(items), ContainerOp::IsEmpty) => Value::Bool(items.borrow().is_empty()),

            (Value::Str(s), ContainerOp::Append) => {
                let ch = match arg_values.first() {
                    Some(value) => self.char_of(value)?,
                    None => return Err(self.empty_container("push_back")),
                };
                let mut updated = s.clone();
                updated.push(ch);
                self.store_back(target, Value::Str(updated))?;
                Value::Undefined
            }
            (Value::Str(s), ContainerOp::RemoveLast) => {
                let mut updated = s.clone();
                if updated.pop().is_none() {
                    return Err(self.empty_container("pop_back"));
                }
                self.store_back(target, Value::Str(updated))?;
                Value::Undefined
            }
            (Value::Str(s), ContainerOp::Length) => Value::Int(s.chars().count() as i64),
            (Value::Str(s), ContainerOp::Back) => match s.chars().last() {
                Some(ch) => Value::Str(ch.to_string()),
                None => return Err(self.empty_container("back")),
            },
            (Value::Str(s), ContainerOp::IsEmpty) => Value::Bool(s.is_empty()),
            (Value::Str(s), ContainerOp::Substr) => self.substr(s, &arg_values)?,

            (other, op) => {
                return Err(RuntimeError::TypeError {
                    expected: format!("container supporting {}", op.name()),
                    got: other.type_name().to_string(),
                    line: self.current_line,
                });
            }
        };

        if let Some(name) = probe {
            self.record_set(name);
        }
        Ok(result)
    }

    /// Write a rebuilt string back into the storage `target` names
    fn store_back(&mut self, target: &Expr, value: Value) -> Result<(), RuntimeError> {
        let slot = self.resolve_expr_slot(target)?;
        self.write_slot(&slot, value)
    }

    /// `s.substr(pos[, len])`: `pos` may equal the length; `len` clamps.
    fn substr(&self, s: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        let chars: Vec<char> = s.chars().collect();
        let pos = self.int_arg(args.first())?;
        let start = match usize::try_from(pos) {
            Ok(p) if p <= chars.len() => p,
            _ => {
                return Err(RuntimeError::IndexOutOfBounds {
                    index: pos,
                    size: chars.len(),
                    line: self.current_line,
                });
            }
        };
        let end = match args.get(1) {
            Some(len) => {
                let len = self.int_arg(Some(len))?;
                let len = usize::try_from(len).unwrap_or(usize::MAX);
                start.saturating_add(len).min(chars.len())
            }
            None => chars.len(),
        };
        Ok(Value::Str(chars[start..end].iter().collect()))
    }

    fn int_arg(&self, value: Option<&Value>) -> Result<i64, RuntimeError> {
        let value = value.unwrap_or(&Value::Undefined);
        value.as_int().ok_or_else(|| RuntimeError::TypeError {
            expected: "int".to_string(),
            got: value.type_name().to_string(),
            line: self.current_line,
        })
    }

    fn empty_container(&self, operation: &str) -> RuntimeError {
        RuntimeError::EmptyContainer {
            operation: operation.to_string(),
            line: self.current_line,
        }
    }

    /// `printf(format, args...)`
    pub(crate) fn execute_printf(&mut self, format: &Expr, args: &[Expr]) -> Result<(), RuntimeError> {
        let format_str = match self.evaluate_expr(format)? {
            Value::Str(s) => s,
            other => {
                return Err(RuntimeError::InvalidPrintfFormat {
                    message: format!("format must be a string, got {}", other.type_name()),
                    line: self.current_line,
                });
            }
        };

        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.evaluate_expr(arg)?);
        }

        let mut output = self.format_printf(&format_str, &arg_values)?;
        if output.ends_with('\n') {
            output.pop();
        }
        self.tracer.log(output, Some(self.current_line));
        Ok(())
    }

    fn format_printf(&self, format: &str, args: &[Value]) -> Result<String, RuntimeError> {
        let mut output = String::new();
        let mut chars = format.chars().peekable();
        let mut args = args.iter();

        while let Some(ch) = chars.next() {
            if ch != '%' {
                output.push(ch);
                continue;
            }

            // Optional precision, as in `%.2f`
            let mut precision = None;
            if chars.peek() == Some(&'.') {
                chars.next();
                let mut digits = String::new();
                while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                    digits.push(d);
                    chars.next();
                }
                precision = Some(digits.parse::<usize>().unwrap_or(0));
            }

            let Some(spec) = chars.next() else {
                return Err(self.printf_error("format string ends with '%'".to_string()));
            };
            if spec == '%' {
                output.push('%');
                continue;
            }

            let arg = args.next().ok_or_else(|| {
                self.printf_error("Not enough arguments for format string".to_string())
            })?;
            match spec {
                'd' | 'i' => match arg {
                    Value::Float(x) => output.push_str(&(x.trunc() as i64).to_string()),
                    other => {
                        let n = other.as_int().ok_or_else(|| {
                            self.printf_error(format!("%{} expects int, got {}", spec, other.type_name()))
                        })?;
                        output.push_str(&n.to_string());
                    }
                },
                'f' => {
                    let x = arg.as_float().ok_or_else(|| {
                        self.printf_error(format!("%f expects double, got {}", arg.type_name()))
                    })?;
                    output.push_str(&format!("{:.*}", precision.unwrap_or(6), x));
                }
                'c' => match arg {
                    Value::Int(n) => {
                        let ch = u32::try_from(*n).ok().and_then(char::from_u32).ok_or_else(|| {
                            self.printf_error(format!("%c got invalid character code {}", n))
                        })?;
                        output.push(ch);
                    }
                    other => output.push_str(&other.to_string()),
                },
                's' => output.push_str(&arg.to_string()),
                other => {
                    return Err(self.printf_error(format!("Unsupported format specifier %{}", other)));
                }
            }
        }

        Ok(output)
    }

    fn printf_error(&self, message: String) -> RuntimeError {
        RuntimeError::InvalidPrintfFormat {
            message,
            line: self.current_line,
        }
    }
}
