//! Instrumented intermediate representation
//!
//! The IR is what actually runs. Types are gone, container methods are
//! normalized into [`ContainerOp`]s, and every probe the tracer needs is
//! explicit: functions carry their call-begin and implicit-return lines,
//! statements carry a `step` flag, and mutations name the variable whose new
//! value gets recorded.

use crate::parser::ast::{BinOp, SourceLocation};

/// A fully lowered program, ready for the interpreter
#[derive(Debug, Clone, Default)]
pub struct InstrumentedProgram {
    pub functions: Vec<Function>,
    /// Top-level statements, run in order before the entry routine
    pub driver: Vec<Stmt>,
    pub(crate) degradations: Vec<Degradation>,
}

impl InstrumentedProgram {
    /// Source fragments that fell outside the subset
    pub fn degradations(&self) -> &[Degradation] {
        &self.degradations
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Whether translation kept every construct
    pub fn is_complete(&self) -> bool {
        self.degradations.is_empty()
    }
}

/// An out-of-subset fragment kept verbatim
#[derive(Debug, Clone, PartialEq)]
pub struct Degradation {
    pub text: String,
    pub reason: String,
    pub location: SourceLocation,
}

/// Instrumented function. Entering it records a call; falling off its end
/// records a return of `undefined` at `end_line`.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    /// Line of the header (call probe)
    pub line: usize,
    /// Line of the closing brace (implicit-return probe)
    pub end_line: usize,
}

/// Parameter binding. Lists passed by value are copied at call time.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub by_ref: bool,
}

/// One statement with its probe data
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: usize,
    /// Emit a line step before running this statement
    pub step: bool,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    /// Declaration with erased type; always records the new binding.
    /// Non-reference declarations copy list initializers.
    Let {
        name: String,
        init: Expr,
        by_ref: bool,
    },
    Expr(Expr),
    /// Concatenated output line (`cout << …`)
    Log(Vec<Expr>),
    /// `printf(fmt, args…)`
    Printf { format: Expr, args: Vec<Expr> },
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        else_body: Vec<Stmt>,
    },
    While { cond: Expr, body: Vec<Stmt> },
    DoWhile { body: Vec<Stmt>, cond: Expr },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        update: Option<Expr>,
        body: Vec<Stmt>,
    },
    Block(Vec<Stmt>),
    Break,
    Continue,
    /// Evaluates the value once, records the return, then returns it
    Return(Option<Expr>),
    /// Raises an error when reached
    Unsupported { text: String, reason: String },
}

/// Assignable location
#[derive(Debug, Clone)]
pub enum Place {
    Var(String),
    Index { base: Box<Expr>, index: Box<Expr> },
}

impl Place {
    /// The named variable that owns this place, if any (`grid` in `grid[i][j]`)
    pub fn root(&self) -> Option<&str> {
        match self {
            Place::Var(name) => Some(name),
            Place::Index { base, .. } => base.root(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Normalized container vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerOp {
    /// `push_back`
    Append,
    /// `pop_back`
    RemoveLast,
    /// `size()` / `length()`
    Length,
    /// `substr(pos[, len])`
    Substr,
    /// `back()`
    Back,
    /// `empty()`
    IsEmpty,
}

impl ContainerOp {
    pub fn from_method(method: &str) -> Option<Self> {
        match method {
            "push_back" => Some(ContainerOp::Append),
            "pop_back" => Some(ContainerOp::RemoveLast),
            "size" | "length" => Some(ContainerOp::Length),
            "substr" => Some(ContainerOp::Substr),
            "back" => Some(ContainerOp::Back),
            "empty" => Some(ContainerOp::IsEmpty),
            _ => None,
        }
    }

    pub fn is_mutating(&self) -> bool {
        matches!(self, ContainerOp::Append | ContainerOp::RemoveLast)
    }

    /// Accepted argument counts (inclusive)
    pub fn arity(&self) -> (usize, usize) {
        match self {
            ContainerOp::Append => (1, 1),
            ContainerOp::Substr => (1, 2),
            _ => (0, 0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ContainerOp::Append => "append",
            ContainerOp::RemoveLast => "remove_last",
            ContainerOp::Length => "length",
            ContainerOp::Substr => "substr",
            ContainerOp::Back => "back",
            ContainerOp::IsEmpty => "is_empty",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Undefined,
    List(Vec<Expr>),
    /// `n` copies of `fill`
    Fill { size: Box<Expr>, fill: Box<Expr> },
    Var(String),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary { op: UnaryOp, operand: Box<Expr> },
    Ternary {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    /// `=` or a compound assignment (`op` is the arithmetic part)
    Assign {
        target: Place,
        op: Option<BinOp>,
        value: Box<Expr>,
        probe: Option<String>,
    },
    /// `++`/`--`, prefix or postfix
    Update {
        target: Place,
        delta: i64,
        prefix: bool,
        probe: Option<String>,
    },
    Index { base: Box<Expr>, index: Box<Expr> },
    Call { name: String, args: Vec<Expr> },
    Container {
        op: ContainerOp,
        target: Box<Expr>,
        args: Vec<Expr>,
        probe: Option<String>,
    },
}

impl Expr {
    /// The named variable this expression reads through, if any
    pub fn root(&self) -> Option<&str> {
        match self {
            Expr::Var(name) => Some(name),
            Expr::Index { base, .. } => base.root(),
            _ => None,
        }
    }
}
