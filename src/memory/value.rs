//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents all possible runtime
//! values of the subset once declaration types have been erased.
//!
//! # Value Types
//!
//! - [`Value::Int`]: 64-bit signed integer (`int`, `long`)
//! - [`Value::Float`]: 64-bit float (`double`, `float`)
//! - [`Value::Bool`]: boolean
//! - [`Value::Str`]: string; `char` values are one-character strings
//! - [`Value::List`]: `vector<T>` and brace lists
//! - [`Value::Undefined`]: result of a function that returns nothing
//!
//! # Lists
//!
//! Lists live behind a shared handle so that `vector<T>&` parameters and
//! element writes like `grid[i][j] = x` reach the same storage. Value
//! semantics (by-value parameters, plain declarations, `push_back` of a list)
//! are implemented with [`Value::deep_copy`] at the points where the language
//! copies.

use crate::trace::{Record, RecordedValue};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared, mutable list storage
pub type ListRef = Rc<RefCell<Vec<Value>>>;

/// Runtime values in the interpreter
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(ListRef),
}

impl Value {
    /// Build a fresh list value
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    /// Copy with no storage shared with `self`
    pub fn deep_copy(&self) -> Self {
        match self {
            Value::List(items) => {
                Value::list(items.borrow().iter().map(Value::deep_copy).collect())
            }
            other => other.clone(),
        }
    }

    /// Name used in type error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "void",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "double",
            Value::Str(_) => "string",
            Value::List(_) => "vector",
        }
    }

    /// Get the integer value, returns None if not an Int or Bool
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Numeric view used by mixed int/float arithmetic
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            other => other.as_int().map(|n| n as f64),
        }
    }

    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Expect an integer value, returns error message if not an Int
    pub fn expect_int(&self) -> Result<i64, String> {
        self.as_int()
            .ok_or_else(|| format!("expected int, got {}", self.type_name()))
    }

    /// Truthiness used by conditions and `!`, `&&`, `||`
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(_) => true,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }
}

/// Numbers compare by value across int/float; lists compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (a, b) => match (a.as_float(), b.as_float()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => {
                if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e15 {
                    write!(f, "{}", *x as i64)
                } else {
                    write!(f, "{}", x)
                }
            }
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl Record for Value {
    fn record(&self) -> RecordedValue {
        match self {
            Value::Undefined => RecordedValue::Undefined,
            Value::Bool(b) => RecordedValue::Bool(*b),
            Value::Int(n) => RecordedValue::Int(*n),
            Value::Float(x) => RecordedValue::Float(*x),
            Value::Str(s) => RecordedValue::Str(s.clone()),
            Value::List(items) => {
                RecordedValue::List(items.borrow().iter().map(Record::record).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clone_shares_list_but_deep_copy_does_not() {
        let original = Value::list(vec![Value::Int(1)]);
        let shared = original.clone();
        let copied = original.deep_copy();

        if let Some(items) = shared.as_list() {
            items.borrow_mut().push(Value::Int(2));
        }

        assert_eq!(original.to_string(), "[1, 2]");
        assert_eq!(copied.to_string(), "[1]");
        assert!(original == shared);
        assert!(original != copied);
    }

    #[test]
    fn test_record_is_a_snapshot() {
        let live = Value::list(vec![Value::Int(1), Value::Int(2)]);
        let recorded = live.record();

        if let Some(items) = live.as_list() {
            items.borrow_mut().pop();
        }

        assert_eq!(
            recorded,
            RecordedValue::List(vec![RecordedValue::Int(1), RecordedValue::Int(2)])
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Int(3).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(!Value::Undefined.is_truthy());
        assert!(Value::list(Vec::new()).is_truthy());
    }

    #[test]
    fn test_numeric_equality_across_kinds() {
        assert!(Value::Int(2) == Value::Float(2.0));
        assert!(Value::Str("a".into()) != Value::Int(1));
    }

    #[test]
    fn test_float_display_drops_integral_fraction() {
        assert_eq!(Value::Float(3.0).to_string(), "3");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
    }
}
