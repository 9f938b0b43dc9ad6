//! Source parser for the C++-like teaching subset
//!
//! This module transforms source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parser`]: Parsing (tokens → AST)
//! - [`ast`]: AST node definitions
//!
//! # Supported Subset
//!
//! - Types: `int`, `long`, `bool`, `char`, `double`, `float`, `string`, `auto`,
//!   `vector<T>` (nested), with `const`, `&` and an optional `std::` prefix
//! - Statements: declarations, assignments, `if`/`else`, `while`, `do`/`while`,
//!   `for`, `break`, `continue`, `return`, `cout << …;`
//! - Expressions: arithmetic, comparison, logical, ternary, `++`/`--`, calls,
//!   indexing, brace lists, container methods
//! - `#include` lines, `using namespace …;` and prototypes are accepted and
//!   carry no meaning
//!
//! # Error Recovery
//!
//! Parsing never aborts. Anything outside the subset is skipped up to the next
//! statement boundary and kept as an [`ast::AstNode::Unsupported`] node holding
//! the original source text.

pub mod ast;
pub mod lexer;
pub mod parser;
