//! Memory model for the interpreter
//!
//! This module provides the core runtime storage abstractions:
//! - [`value`]: Runtime value representation (Int, Float, Bool, Str, List)
//! - [`stack`]: Global frame and call stack with block-scoped variables
//!
//! There is no heap or address space: lists are reference-counted handles and
//! every variable lives in exactly one [`stack::Frame`].

pub mod stack;
pub mod value;
