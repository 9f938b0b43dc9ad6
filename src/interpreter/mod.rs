//! Tree-walking interpreter for instrumented programs
//!
//! This module provides the core execution logic:
//! - [`engine`]: the [`Interpreter`](engine::Interpreter), function calls and the entry routine
//! - [`errors`]: Runtime error types
//!
//! The remaining submodules add `impl Interpreter` blocks for statements,
//! loops, returns, expressions, operators and built-ins.
//!
//! # Execution Model
//!
//! The interpreter walks the IR and executes statements one at a time. It
//! never records anything on its own initiative: every event comes from a
//! probe the translator put into the IR, delivered to the tracer the caller
//! injected.
//!
//! # Built-in Functions
//!
//! `printf`, container methods and a few library calls (`max`, `min`, `abs`,
//! `to_string`) are implemented directly in [`builtins`] rather than as user
//! functions.

pub mod builtins;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod expressions;
pub mod jumps;
pub mod loops;
pub mod ops;
pub mod statements;
