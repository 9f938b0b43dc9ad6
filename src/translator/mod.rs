//! Source → instrumented program translation
//!
//! [`translate`] parses subset source and lowers the AST into an
//! [`InstrumentedProgram`]. The lowering performs, in order:
//!
//! 1. drops prototypes, `#include` lines and `using` directives,
//! 2. turns `cout << … << endl;` into a single log statement,
//! 3. turns function headers into functions whose first probe is the call,
//! 4. turns each `return` into "evaluate once, record, return",
//! 5. erases declaration types (missing initializers get the type's zero value),
//! 6. normalizes container methods and brace lists,
//! 7. marks line steps and variable-set probes.
//!
//! Translation never fails. Out-of-subset constructs become
//! [`StmtKind::Unsupported`] statements and are listed in
//! [`InstrumentedProgram::degradations`]; they only fail the run if reached.

mod emit;
pub mod ir;

pub use ir::{
    ContainerOp, Degradation, Expr, Function, InstrumentedProgram, Param, Place, Stmt, StmtKind,
    UnaryOp,
};

use crate::parser::ast::{self, AstNode, BaseType, SourceLocation, Type, UnOp};
use crate::parser::parser::Parser;
use tracing::{debug, warn};

/// Translate subset source into an instrumented program. Never fails.
pub fn translate(source: &str) -> InstrumentedProgram {
    let program = Parser::new(source).parse_program();
    let mut lowering = Lowering::new(source);
    let mut out = InstrumentedProgram::default();

    for node in &program.nodes {
        match node {
            AstNode::FunctionDef {
                name,
                params,
                body,
                location,
                end_location,
                ..
            } => {
                let function = lowering.lower_function(name, params, body, *location, *end_location);
                match out.functions.iter_mut().find(|f| f.name == *name) {
                    // a later definition replaces an earlier one
                    Some(existing) => *existing = function,
                    None => out.functions.push(function),
                }
            }
            AstNode::FunctionDecl { .. } | AstNode::UsingDirective { .. } => {}
            AstNode::Unsupported {
                text,
                reason,
                location,
            } => {
                lowering.degrade(text, reason, *location);
                // an unparseable block at top level is a declaration nobody can call
                if !is_block_fragment(text) {
                    out.driver.push(Stmt {
                        kind: StmtKind::Unsupported {
                            text: text.clone(),
                            reason: reason.clone(),
                        },
                        line: location.line,
                        step: false,
                    });
                }
            }
            other => {
                if let Some(stmt) = lowering.lower_stmt(other) {
                    out.driver.push(stmt);
                }
            }
        }
    }

    out.degradations = lowering.degradations;
    debug!(
        functions = out.functions.len(),
        driver = out.driver.len(),
        degradations = out.degradations.len(),
        "translated program"
    );
    out
}

fn is_block_fragment(text: &str) -> bool {
    let trimmed = text.trim_end();
    trimmed.ends_with('}') || trimmed.ends_with("};")
}

/// AST → IR lowering state
struct Lowering<'a> {
    lines: Vec<&'a str>,
    /// Line of the most recent step probe, in lexical order
    last_step_line: Option<usize>,
    degradations: Vec<Degradation>,
}

impl<'a> Lowering<'a> {
    fn new(source: &'a str) -> Self {
        Lowering {
            lines: source.lines().collect(),
            last_step_line: None,
            degradations: Vec::new(),
        }
    }

    fn lower_function(
        &mut self,
        name: &str,
        params: &[ast::Param],
        body: &[AstNode],
        location: SourceLocation,
        end_location: SourceLocation,
    ) -> Function {
        // the header line itself is never stepped
        self.last_step_line = Some(location.line);

        let params = params
            .iter()
            .enumerate()
            .map(|(i, p)| Param {
                name: if p.name.is_empty() {
                    format!("_arg{}", i)
                } else {
                    p.name.clone()
                },
                by_ref: p.param_type.is_reference,
            })
            .collect();

        Function {
            name: name.to_string(),
            params,
            body: self.lower_body(body),
            line: location.line,
            end_line: end_location.line,
        }
    }

    fn lower_body(&mut self, nodes: &[AstNode]) -> Vec<Stmt> {
        nodes.iter().filter_map(|n| self.lower_stmt(n)).collect()
    }

    /// Lower one statement. `None` for constructs that vanish (prototypes, `using`).
    fn lower_stmt(&mut self, node: &AstNode) -> Option<Stmt> {
        let line = node.location().line;

        match node {
            AstNode::FunctionDecl { .. } | AstNode::UsingDirective { .. } => None,
            // braces alone are never stepped
            AstNode::Block { statements, .. } => Some(Stmt {
                kind: StmtKind::Block(self.lower_body(statements)),
                line,
                step: false,
            }),
            AstNode::Unsupported {
                text,
                reason,
                location,
            } => {
                self.degrade(text, reason, *location);
                Some(Stmt {
                    kind: StmtKind::Unsupported {
                        text: text.clone(),
                        reason: reason.clone(),
                    },
                    line,
                    step: self.step_at(line),
                })
            }
            _ => {
                let step = self.step_at(line);
                let kind = self.lower_stmt_kind(node).unwrap_or_else(|reason| {
                    let text = self.line_text(line);
                    self.degrade(&text, &reason, *node.location());
                    StmtKind::Unsupported { text, reason }
                });
                Some(Stmt { kind, line, step })
            }
        }
    }

    fn lower_stmt_kind(&mut self, node: &AstNode) -> Result<StmtKind, String> {
        match node {
            AstNode::VarDecl {
                name,
                var_type,
                init,
                ..
            } => {
                let init = match init.as_deref() {
                    None => zero_value(var_type),
                    Some(expr) => self.lower_expr(expr)?,
                };
                Ok(StmtKind::Let {
                    name: name.clone(),
                    init,
                    by_ref: var_type.is_reference,
                })
            }
            AstNode::ExpressionStatement { expr, .. } => match expr.as_ref() {
                AstNode::FunctionCall { name, args, .. } if name == "printf" => {
                    let (format, rest) = args
                        .split_first()
                        .ok_or_else(|| "printf needs a format string".to_string())?;
                    Ok(StmtKind::Printf {
                        format: self.lower_expr(format)?,
                        args: self.lower_exprs(rest)?,
                    })
                }
                other => Ok(StmtKind::Expr(self.lower_expr(other)?)),
            },
            AstNode::Assignment { .. }
            | AstNode::CompoundAssignment { .. }
            | AstNode::UnaryOp { .. }
            | AstNode::FunctionCall { .. }
            | AstNode::MethodCall { .. } => Ok(StmtKind::Expr(self.lower_expr(node)?)),
            AstNode::StreamOutput { items, .. } => {
                let parts = items
                    .iter()
                    .filter(|item| !matches!(item, AstNode::Variable(name, _) if name == "endl"))
                    .map(|item| self.lower_expr(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(StmtKind::Log(parts))
            }
            AstNode::Return { expr, .. } => {
                let value = expr.as_deref().map(|e| self.lower_expr(e)).transpose()?;
                Ok(StmtKind::Return(value))
            }
            AstNode::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let cond = self.lower_expr(condition)?;
                let then_body = self.lower_body(then_branch);
                let else_body = else_branch
                    .as_deref()
                    .map(|b| self.lower_body(b))
                    .unwrap_or_default();
                Ok(StmtKind::If {
                    cond,
                    then_body,
                    else_body,
                })
            }
            AstNode::While {
                condition, body, ..
            } => {
                let cond = self.lower_expr(condition)?;
                Ok(StmtKind::While {
                    cond,
                    body: self.lower_body(body),
                })
            }
            AstNode::DoWhile {
                body, condition, ..
            } => {
                let body = self.lower_body(body);
                Ok(StmtKind::DoWhile {
                    body,
                    cond: self.lower_expr(condition)?,
                })
            }
            AstNode::For {
                init,
                condition,
                increment,
                body,
                ..
            } => {
                let init = match init.as_deref() {
                    Some(node) => self.lower_stmt(node).map(|mut stmt| {
                        // part of the loop header
                        stmt.step = false;
                        Box::new(stmt)
                    }),
                    None => None,
                };
                let cond = condition.as_deref().map(|c| self.lower_expr(c)).transpose()?;
                let update = increment.as_deref().map(|u| self.lower_expr(u)).transpose()?;
                Ok(StmtKind::For {
                    init,
                    cond,
                    update,
                    body: self.lower_body(body),
                })
            }
            AstNode::Break { .. } => Ok(StmtKind::Break),
            AstNode::Continue { .. } => Ok(StmtKind::Continue),
            AstNode::FunctionDef { name, .. } => {
                Err(format!("nested definition of '{}' is not supported", name))
            }
            other => Ok(StmtKind::Expr(self.lower_expr(other)?)),
        }
    }

    fn lower_exprs(&mut self, nodes: &[AstNode]) -> Result<Vec<Expr>, String> {
        nodes.iter().map(|n| self.lower_expr(n)).collect()
    }

    fn lower_expr(&mut self, node: &AstNode) -> Result<Expr, String> {
        let expr = match node {
            AstNode::IntLiteral(n, _) => Expr::Int(*n),
            AstNode::FloatLiteral(x, _) => Expr::Float(*x),
            AstNode::BoolLiteral(b, _) => Expr::Bool(*b),
            AstNode::CharLiteral(c, _) => Expr::Str(c.to_string()),
            AstNode::StringLiteral(s, _) => Expr::Str(s.clone()),
            AstNode::ListLiteral { items, .. } => Expr::List(self.lower_exprs(items)?),
            AstNode::Variable(name, _) => Expr::Var(name.clone()),
            AstNode::BinaryOp {
                op, left, right, ..
            } => Expr::Binary {
                op: *op,
                left: Box::new(self.lower_expr(left)?),
                right: Box::new(self.lower_expr(right)?),
            },
            AstNode::UnaryOp { op, operand, .. } => match op {
                UnOp::Neg => Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(self.lower_expr(operand)?),
                },
                UnOp::Not => Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(self.lower_expr(operand)?),
                },
                UnOp::PreInc | UnOp::PreDec | UnOp::PostInc | UnOp::PostDec => {
                    let target = self.lower_place(operand)?;
                    let probe = target.root().map(str::to_string);
                    Expr::Update {
                        target,
                        delta: if matches!(op, UnOp::PreInc | UnOp::PostInc) { 1 } else { -1 },
                        prefix: matches!(op, UnOp::PreInc | UnOp::PreDec),
                        probe,
                    }
                }
            },
            AstNode::TernaryOp {
                condition,
                true_expr,
                false_expr,
                ..
            } => Expr::Ternary {
                cond: Box::new(self.lower_expr(condition)?),
                then_expr: Box::new(self.lower_expr(true_expr)?),
                else_expr: Box::new(self.lower_expr(false_expr)?),
            },
            AstNode::Assignment { lhs, rhs, .. } => {
                let target = self.lower_place(lhs)?;
                let probe = target.root().map(str::to_string);
                Expr::Assign {
                    target,
                    op: None,
                    value: Box::new(self.lower_expr(rhs)?),
                    probe,
                }
            }
            AstNode::CompoundAssignment { lhs, op, rhs, .. } => {
                let target = self.lower_place(lhs)?;
                let probe = target.root().map(str::to_string);
                Expr::Assign {
                    target,
                    op: Some(*op),
                    value: Box::new(self.lower_expr(rhs)?),
                    probe,
                }
            }
            AstNode::ArrayAccess { array, index, .. } => Expr::Index {
                base: Box::new(self.lower_expr(array)?),
                index: Box::new(self.lower_expr(index)?),
            },
            AstNode::FunctionCall { name, args, .. } => {
                if name == "printf" {
                    return Err("printf can only be used as a statement".to_string());
                }
                Expr::Call {
                    name: name.clone(),
                    args: self.lower_exprs(args)?,
                }
            }
            AstNode::MethodCall {
                object,
                method,
                args,
                ..
            } => {
                let op = ContainerOp::from_method(method)
                    .ok_or_else(|| format!("unsupported method '{}'", method))?;
                let (min, max) = op.arity();
                if args.len() < min || args.len() > max {
                    return Err(format!(
                        "'{}' takes {} argument(s), got {}",
                        method,
                        if min == max { min.to_string() } else { format!("{}-{}", min, max) },
                        args.len()
                    ));
                }
                let target = self.lower_expr(object)?;
                let probe = if op.is_mutating() {
                    target.root().map(str::to_string)
                } else {
                    None
                };
                Expr::Container {
                    op,
                    target: Box::new(target),
                    args: self.lower_exprs(args)?,
                    probe,
                }
            }
            AstNode::VectorInit {
                size,
                fill,
                element,
                ..
            } => {
                let fill = match fill {
                    Some(fill) => self.lower_expr(fill)?,
                    None => zero_value(element),
                };
                Expr::Fill {
                    size: Box::new(self.lower_expr(size)?),
                    fill: Box::new(fill),
                }
            }
            _ => return Err("statement used where a value is expected".to_string()),
        };
        Ok(expr)
    }

    fn lower_place(&mut self, node: &AstNode) -> Result<Place, String> {
        match node {
            AstNode::Variable(name, _) => Ok(Place::Var(name.clone())),
            AstNode::ArrayAccess { array, index, .. } => Ok(Place::Index {
                base: Box::new(self.lower_expr(array)?),
                index: Box::new(self.lower_expr(index)?),
            }),
            _ => Err("left side of assignment is not assignable".to_string()),
        }
    }

    /// Whether a statement starting at `line` gets a step probe
    fn step_at(&mut self, line: usize) -> bool {
        if self.last_step_line == Some(line) {
            false
        } else {
            self.last_step_line = Some(line);
            true
        }
    }

    fn degrade(&mut self, text: &str, reason: &str, location: SourceLocation) {
        warn!(line = location.line, %reason, "unsupported construct: {}", text);
        self.degradations.push(Degradation {
            text: text.to_string(),
            reason: reason.to_string(),
            location,
        });
    }

    fn line_text(&self, line: usize) -> String {
        self.lines
            .get(line.saturating_sub(1))
            .map(|l| l.trim().to_string())
            .unwrap_or_default()
    }
}

/// Value an uninitialized declaration starts with
fn zero_value(ty: &Type) -> Expr {
    match &ty.base {
        BaseType::Int | BaseType::Long => Expr::Int(0),
        BaseType::Double | BaseType::Float => Expr::Float(0.0),
        BaseType::Bool => Expr::Bool(false),
        BaseType::Char | BaseType::Str => Expr::Str(String::new()),
        BaseType::Vector(_) => Expr::List(Vec::new()),
        BaseType::Void | BaseType::Auto => Expr::Undefined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FACTORIAL: &str = "int factorial(int n) {\n    if (n <= 1) return 1;\n    return n * factorial(n - 1);\n}\n\n// Driver\nint n = 5;\nfactorial(n);";

    #[test]
    fn test_functions_and_driver_are_split() {
        let program = translate(FACTORIAL);

        assert_eq!(program.functions.len(), 1);
        let f = &program.functions[0];
        assert_eq!(f.name, "factorial");
        assert_eq!(
            f.params,
            vec![Param {
                name: "n".to_string(),
                by_ref: false
            }]
        );
        assert_eq!(f.line, 1);
        assert_eq!(f.end_line, 4);
        assert_eq!(program.driver.len(), 2);
        assert!(program.is_complete());
    }

    #[test]
    fn test_prototypes_and_using_are_dropped() {
        let program = translate("using namespace std;\nbool isOdd(int n);\nbool isOdd(int n) { return n % 2 == 1; }");
        assert_eq!(program.functions.len(), 1);
        assert!(program.driver.is_empty());
    }

    #[test]
    fn test_one_step_per_source_line() {
        let program = translate("int f(int n) {\n    int a = 1; int b = 2;\n    return a + b;\n}");
        let body = &program.functions[0].body;

        let steps: Vec<(usize, bool)> = body.iter().map(|s| (s.line, s.step)).collect();
        assert_eq!(steps, vec![(2, true), (2, false), (3, true)]);
    }

    #[test]
    fn test_cout_drops_endl() {
        let program = translate("void f() {\n  cout << \"x = \" << 1 << endl;\n}");
        match &program.functions[0].body[0].kind {
            StmtKind::Log(parts) => assert_eq!(parts.len(), 2),
            other => panic!("Expected log, got {:?}", other),
        }
    }

    #[test]
    fn test_declarations_get_zero_values() {
        let program = translate("int a;\nstring s;\nvector<int> v;\nvector<bool> seen(3);");
        let inits: Vec<String> = program
            .driver
            .iter()
            .map(|s| match &s.kind {
                StmtKind::Let { init, .. } => format!("{:?}", init),
                other => panic!("Expected declaration, got {:?}", other),
            })
            .collect();
        assert_eq!(inits[0], "Int(0)");
        assert_eq!(inits[1], "Str(\"\")");
        assert_eq!(inits[2], "List([])");
        assert!(inits[3].starts_with("Fill"));
        assert!(inits[3].contains("Bool(false)"));
    }

    #[test]
    fn test_mutations_name_their_variable() {
        let program = translate("void f(vector<int> v, int i) {\n  v[i] = 3;\n  v.push_back(i);\n  i++;\n}");
        let body = &program.functions[0].body;

        let probes: Vec<Option<String>> = body
            .iter()
            .map(|s| match &s.kind {
                StmtKind::Expr(Expr::Assign { probe, .. })
                | StmtKind::Expr(Expr::Update { probe, .. })
                | StmtKind::Expr(Expr::Container { probe, .. }) => probe.clone(),
                other => panic!("Expected mutation, got {:?}", other),
            })
            .collect();
        assert_eq!(
            probes,
            vec![Some("v".to_string()), Some("v".to_string()), Some("i".to_string())]
        );
    }

    #[test]
    fn test_unknown_method_degrades() {
        let program = translate("void f(string s) {\n  s.find(\"a\");\n}");

        assert_eq!(program.degradations().len(), 1);
        assert_eq!(program.degradations()[0].location.line, 2);
        assert!(matches!(
            program.functions[0].body[0].kind,
            StmtKind::Unsupported { .. }
        ));
    }

    #[test]
    fn test_top_level_block_fragment_is_inert() {
        let program = translate("struct P {\n  int x;\n};\nint n = 1;");

        assert_eq!(program.degradations().len(), 1);
        assert_eq!(program.driver.len(), 1);
        assert!(matches!(program.driver[0].kind, StmtKind::Let { .. }));
    }
    #[test]
    fn test_nested_vectors_translate_in_every_position() {
        let source = "vector<vector<int>> make(int n) {\n    vector<vector<int>> g = {{1}, {2}};\n    return g;\n}\nvector<vector<int>> top = make(2);";
        let program = translate(source);

        assert!(program.is_complete(), "{:?}", program.degradations());
        let make = program.function("make").unwrap();
        assert!(matches!(make.body[0].kind, StmtKind::Let { ref name, .. } if name == "g"));
        assert!(matches!(program.driver[0].kind, StmtKind::Let { ref name, .. } if name == "top"));
    }

    #[test]
    fn test_vector_temporary_as_fill_value() {
        let program = translate("vector<vector<int>> g(2, vector<int>(3, 0));\nvector<vector<bool>> seen(2, vector<bool>(2));");
        assert!(program.is_complete(), "{:?}", program.degradations());

        match &program.driver[0].kind {
            StmtKind::Let {
                init: Expr::Fill { fill, .. },
                ..
            } => match fill.as_ref() {
                Expr::Fill { size, fill } => {
                    assert!(matches!(**size, Expr::Int(3)));
                    assert!(matches!(**fill, Expr::Int(0)));
                }
                other => panic!("Expected inner fill, got {:?}", other),
            },
            other => panic!("Expected fill declaration, got {:?}", other),
        }
        match &program.driver[1].kind {
            StmtKind::Let {
                init: Expr::Fill { fill, .. },
                ..
            } => assert!(format!("{:?}", fill).contains("Bool(false)")),
            other => panic!("Expected fill declaration, got {:?}", other),
        }
    }
}
