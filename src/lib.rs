//! # Introduction
//!
//! recurtrace runs small C++-style recursive programs and records every
//! function call, return, variable update and printed line as an ordered,
//! replayable timeline. Viewers step through the timeline forward and
//! backward by reconstructing the state at any position.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Lowering → IR → Interpreter + Tracer → Timeline → Replay
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds an AST, recovering from
//!    constructs outside the supported subset.
//! 2. [`translator`]: lowers the AST into an [`InstrumentedProgram`] whose
//!    statements carry explicit call, return, line and variable-set probes.
//! 3. [`interpreter`]: walks the IR over the [`memory`] model and feeds each
//!    probe to an injected [`Tracer`].
//! 4. [`executor`]: gives every run a fresh tracer on an isolated worker
//!    thread and returns the frozen [`Timeline`].
//! 5. [`replay`]: rebuilds the call stack, locals and output at any
//!    timeline position.
//! 6. [`presets`]: built-in example programs and driver synthesis.
//!
//! ## Supported subset
//!
//! Types: `int`, `long`, `bool`, `char`, `double`, `float`, `string`, `auto`,
//! `vector<T>` (with `const` and `&`).
//! Control flow: `if/else`, `while`, `do-while`, `for`, `break`, `continue`,
//! `return`, ternary.
//! Containers: `push_back`, `pop_back`, `size`/`length`, `substr`, `back`,
//! `empty`, indexing.
//! Output: `cout << … << endl;` and `printf`.
//!
//! ## Example
//!
//! ```
//! use recurtrace::{Executor, EventKind};
//!
//! let source = "int fact(int n) {\n    if (n <= 1) return 1;\n    return n * fact(n - 1);\n}\nfact(3);";
//! let timeline = Executor::default().run_source(source).unwrap();
//!
//! assert_eq!(timeline.count(EventKind::Call), 3);
//! assert_eq!(timeline.root_result().and_then(|v| v.as_int()), Some(6));
//! ```

pub mod config;
pub mod executor;
pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod presets;
pub mod replay;
pub mod trace;
pub mod translator;

pub use config::{ConfigError, ExecutorConfig};
pub use executor::{ExecutionError, Executor, FailureCause};
pub use replay::{call_tree, reconstruct, CallTree, FrameStatus, ReplayState};
pub use trace::{EventKind, RecordedValue, Timeline, TraceEvent, Tracer};
pub use translator::{translate, InstrumentedProgram};
