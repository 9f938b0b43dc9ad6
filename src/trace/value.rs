//! Recorded (snapshot) values
//!
//! Everything the tracer stores is a [`RecordedValue`]: a deep, immutable copy of
//! a live runtime value taken at the moment of recording. Live lists are shared
//! and mutated in place by the running program; recorded lists never are.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Deep snapshot of a runtime value
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
#[serde(untagged)]
pub enum RecordedValue {
    /// Result of a function that returns nothing (`void`, fall-through)
    #[default]
    Undefined,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<RecordedValue>),
}

impl RecordedValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            RecordedValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RecordedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RecordedValue]> {
        match self {
            RecordedValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, RecordedValue::Undefined)
    }
}

impl fmt::Display for RecordedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordedValue::Undefined => write!(f, "undefined"),
            RecordedValue::Bool(b) => write!(f, "{}", b),
            RecordedValue::Int(n) => write!(f, "{}", n),
            RecordedValue::Float(x) => write!(f, "{}", x),
            RecordedValue::Str(s) => write!(f, "{}", s),
            RecordedValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match item {
                        RecordedValue::Str(s) => write!(f, "\"{}\"", s)?,
                        other => write!(f, "{}", other)?,
                    }
                }
                write!(f, "]")
            }
        }
    }
}

/// Anything the tracer can snapshot.
///
/// Implementors must return a deep copy: the result may not share storage with
/// `self`.
pub trait Record {
    fn record(&self) -> RecordedValue;
}

impl Record for RecordedValue {
    fn record(&self) -> RecordedValue {
        self.clone()
    }
}

impl Record for i64 {
    fn record(&self) -> RecordedValue {
        RecordedValue::Int(*self)
    }
}

impl Record for bool {
    fn record(&self) -> RecordedValue {
        RecordedValue::Bool(*self)
    }
}

impl Record for &str {
    fn record(&self) -> RecordedValue {
        RecordedValue::Str((*self).to_string())
    }
}

/// Insertion-ordered name → value map used for arguments and locals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bindings {
    entries: Vec<(String, RecordedValue)>,
}

impl Bindings {
    pub fn new() -> Self {
        Bindings::default()
    }

    /// Insert or overwrite `name`. Overwriting keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, value: RecordedValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&RecordedValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecordedValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, RecordedValue)> for Bindings {
    fn from_iter<T: IntoIterator<Item = (S, RecordedValue)>>(iter: T) -> Self {
        let mut bindings = Bindings::new();
        for (name, value) in iter {
            bindings.insert(name, value);
        }
        bindings
    }
}

impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}

impl Serialize for Bindings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_keep_insertion_order() {
        let mut b = Bindings::new();
        b.insert("n", RecordedValue::Int(3));
        b.insert("acc", RecordedValue::Int(1));
        b.insert("n", RecordedValue::Int(2));

        let names: Vec<_> = b.names().collect();
        assert_eq!(names, vec!["n", "acc"]);
        assert_eq!(b.get("n"), Some(&RecordedValue::Int(2)));
    }

    #[test]
    fn test_display_list() {
        let v = RecordedValue::List(vec![
            RecordedValue::Int(1),
            RecordedValue::Str("a".to_string()),
            RecordedValue::Bool(false),
        ]);
        assert_eq!(v.to_string(), "[1, \"a\", false]");
    }

    #[test]
    fn test_serializes_as_plain_json() {
        let mut b = Bindings::new();
        b.insert("xs", RecordedValue::List(vec![RecordedValue::Int(1)]));
        b.insert("r", RecordedValue::Undefined);
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, r#"{"xs":[1],"r":null}"#);
    }
}
