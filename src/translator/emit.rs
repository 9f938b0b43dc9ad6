//! Instrumented text rendering
//!
//! `Display` for [`InstrumentedProgram`] prints the lowered program as
//! script-like pseudo code with every tracer probe spelled out. The text is for
//! inspection only; nothing parses it back.

use super::ir::*;
use std::fmt::{self, Write};

const INDENT: usize = 4;

impl fmt::Display for InstrumentedProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for function in &self.functions {
            write_function(f, function)?;
            writeln!(f)?;
        }
        if !self.driver.is_empty() {
            writeln!(f, "// Driver")?;
            write_block(f, &self.driver, 0)?;
        }
        Ok(())
    }
}

fn write_function(f: &mut fmt::Formatter<'_>, function: &Function) -> fmt::Result {
    let params = function
        .params
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(f, "function {}({}) {{", function.name, params)?;
    writeln!(
        f,
        "{:indent$}tracer.call({:?}, {{ {} }}, {});",
        "",
        function.name,
        params,
        function.line,
        indent = INDENT
    )?;
    write_block(f, &function.body, INDENT)?;
    writeln!(
        f,
        "{:indent$}tracer.ret(undefined, {});",
        "",
        function.end_line,
        indent = INDENT
    )?;
    writeln!(f, "}}")
}

fn write_block(f: &mut fmt::Formatter<'_>, stmts: &[Stmt], indent: usize) -> fmt::Result {
    for stmt in stmts {
        write_stmt(f, stmt, indent)?;
    }
    Ok(())
}

fn write_stmt(f: &mut fmt::Formatter<'_>, stmt: &Stmt, indent: usize) -> fmt::Result {
    let pad = "";
    let line = stmt.line;
    if stmt.step {
        writeln!(
            f,
            "{pad:indent$}tracer.step(\"Executing line {line}\", {line});"
        )?;
    }

    match &stmt.kind {
        StmtKind::Let { name, init, .. } => {
            writeln!(f, "{pad:indent$}let {name} = {init};")?;
            writeln!(f, "{pad:indent$}tracer.set({name:?}, {name}, {line});")
        }
        StmtKind::Expr(expr) => {
            writeln!(f, "{pad:indent$}{expr};")?;
            write_probes(f, expr, line, indent)
        }
        StmtKind::Log(parts) => {
            writeln!(
                f,
                "{pad:indent$}tracer.log([{}].join(\"\"), {line});",
                join(parts)
            )
        }
        StmtKind::Printf { format, args } => {
            let mut all = vec![format.to_string()];
            all.extend(args.iter().map(Expr::to_string));
            writeln!(
                f,
                "{pad:indent$}tracer.log(sprintf({}), {line});",
                all.join(", ")
            )
        }
        StmtKind::If {
            cond,
            then_body,
            else_body,
        } => {
            writeln!(f, "{pad:indent$}if ({cond}) {{")?;
            write_block(f, then_body, indent + INDENT)?;
            if !else_body.is_empty() {
                writeln!(f, "{pad:indent$}}} else {{")?;
                write_block(f, else_body, indent + INDENT)?;
            }
            writeln!(f, "{pad:indent$}}}")
        }
        StmtKind::While { cond, body } => {
            writeln!(f, "{pad:indent$}while ({cond}) {{")?;
            write_block(f, body, indent + INDENT)?;
            writeln!(f, "{pad:indent$}}}")
        }
        StmtKind::DoWhile { body, cond } => {
            writeln!(f, "{pad:indent$}do {{")?;
            write_block(f, body, indent + INDENT)?;
            writeln!(f, "{pad:indent$}}} while ({cond});")
        }
        StmtKind::For {
            init,
            cond,
            update,
            body,
        } => {
            if let Some(init) = init {
                writeln!(f, "{pad:indent$}{{")?;
                write_stmt(f, init, indent + INDENT)?;
                write_for(f, cond.as_ref(), update.as_ref(), body, line, indent + INDENT)?;
                writeln!(f, "{pad:indent$}}}")
            } else {
                write_for(f, cond.as_ref(), update.as_ref(), body, line, indent)
            }
        }
        StmtKind::Block(body) => {
            writeln!(f, "{pad:indent$}{{")?;
            write_block(f, body, indent + INDENT)?;
            writeln!(f, "{pad:indent$}}}")
        }
        StmtKind::Break => writeln!(f, "{pad:indent$}break;"),
        StmtKind::Continue => writeln!(f, "{pad:indent$}continue;"),
        StmtKind::Return(Some(value)) => writeln!(
            f,
            "{pad:indent$}{{ const __ret = {value}; tracer.ret(__ret, {line}); return __ret; }}"
        ),
        StmtKind::Return(None) => writeln!(
            f,
            "{pad:indent$}{{ tracer.ret(undefined, {line}); return; }}"
        ),
        StmtKind::Unsupported { text, .. } => {
            writeln!(f, "{pad:indent$}unsupported({text:?}, {line});")
        }
    }
}

fn write_for(
    f: &mut fmt::Formatter<'_>,
    cond: Option<&Expr>,
    update: Option<&Expr>,
    body: &[Stmt],
    line: usize,
    indent: usize,
) -> fmt::Result {
    let pad = "";
    let cond = cond.map(Expr::to_string).unwrap_or_default();
    let mut update_text = update.map(Expr::to_string).unwrap_or_default();
    if let Some(update) = update {
        for name in probe_names(update) {
            let _ = write!(update_text, ", tracer.set({name:?}, {name}, {line})");
        }
    }
    writeln!(f, "{pad:indent$}for (; {cond}; {update_text}) {{")?;
    write_block(f, body, indent + INDENT)?;
    writeln!(f, "{pad:indent$}}}")
}

fn write_probes(f: &mut fmt::Formatter<'_>, expr: &Expr, line: usize, indent: usize) -> fmt::Result {
    let pad = "";
    for name in probe_names(expr) {
        writeln!(f, "{pad:indent$}tracer.set({name:?}, {name}, {line});")?;
    }
    Ok(())
}

/// Variables recorded after `expr` runs, in evaluation order
fn probe_names(expr: &Expr) -> Vec<&str> {
    let mut names = Vec::new();
    collect_probes(expr, &mut names);
    names
}

fn collect_probes<'a>(expr: &'a Expr, names: &mut Vec<&'a str>) {
    match expr {
        Expr::Assign {
            target,
            value,
            probe,
            ..
        } => {
            collect_place_probes(target, names);
            collect_probes(value, names);
            names.extend(probe.as_deref());
        }
        Expr::Update { target, probe, .. } => {
            collect_place_probes(target, names);
            names.extend(probe.as_deref());
        }
        Expr::Container {
            target,
            args,
            probe,
            ..
        } => {
            collect_probes(target, names);
            args.iter().for_each(|a| collect_probes(a, names));
            names.extend(probe.as_deref());
        }
        Expr::List(items) => items.iter().for_each(|i| collect_probes(i, names)),
        Expr::Fill { size, fill } => {
            collect_probes(size, names);
            collect_probes(fill, names);
        }
        Expr::Binary { left, right, .. } => {
            collect_probes(left, names);
            collect_probes(right, names);
        }
        Expr::Unary { operand, .. } => collect_probes(operand, names),
        Expr::Ternary {
            cond,
            then_expr,
            else_expr,
        } => {
            collect_probes(cond, names);
            collect_probes(then_expr, names);
            collect_probes(else_expr, names);
        }
        Expr::Index { base, index } => {
            collect_probes(base, names);
            collect_probes(index, names);
        }
        Expr::Call { args, .. } => args.iter().for_each(|a| collect_probes(a, names)),
        Expr::Int(_)
        | Expr::Float(_)
        | Expr::Bool(_)
        | Expr::Str(_)
        | Expr::Undefined
        | Expr::Var(_) => {}
    }
}

fn collect_place_probes<'a>(place: &'a Place, names: &mut Vec<&'a str>) {
    if let Place::Index { base, index } = place {
        collect_probes(base, names);
        collect_probes(index, names);
    }
}

fn join(exprs: &[Expr]) -> String {
    exprs
        .iter()
        .map(Expr::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Place::Var(name) => write!(f, "{}", name),
            Place::Index { base, index } => write!(f, "{}[{}]", base, index),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Int(n) => write!(f, "{}", n),
            Expr::Float(x) => write!(f, "{:?}", x),
            Expr::Bool(b) => write!(f, "{}", b),
            Expr::Str(s) => write!(f, "{:?}", s),
            Expr::Undefined => write!(f, "undefined"),
            Expr::List(items) => write!(f, "[{}]", join(items)),
            Expr::Fill { size, fill } => {
                write!(f, "Array.from({{ length: {} }}, () => {})", size, fill)
            }
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::Unary { op, operand } => match op {
                UnaryOp::Neg => write!(f, "-{}", operand),
                UnaryOp::Not => write!(f, "!{}", operand),
            },
            Expr::Ternary {
                cond,
                then_expr,
                else_expr,
            } => write!(f, "({} ? {} : {})", cond, then_expr, else_expr),
            Expr::Assign {
                target, op, value, ..
            } => match op {
                Some(op) => write!(f, "{} {}= {}", target, op.symbol(), value),
                None => write!(f, "{} = {}", target, value),
            },
            Expr::Update {
                target,
                delta,
                prefix,
                ..
            } => {
                let symbol = if *delta > 0 { "++" } else { "--" };
                if *prefix {
                    write!(f, "{}{}", symbol, target)
                } else {
                    write!(f, "{}{}", target, symbol)
                }
            }
            Expr::Index { base, index } => write!(f, "{}[{}]", base, index),
            Expr::Call { name, args } => write!(f, "{}({})", name, join(args)),
            Expr::Container {
                op, target, args, ..
            } => match op {
                ContainerOp::Append => write!(f, "{}.push({})", target, join(args)),
                ContainerOp::RemoveLast => write!(f, "{}.pop()", target),
                ContainerOp::Length => write!(f, "{}.length", target),
                ContainerOp::Substr => write!(f, "{}.substr({})", target, join(args)),
                ContainerOp::Back => write!(f, "{}.at(-1)", target),
                ContainerOp::IsEmpty => write!(f, "({}.length === 0)", target),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::translator::translate;

    #[test]
    fn test_renders_call_and_return_probes() {
        let text = translate("int id(int x) {\n  return x;\n}\nid(4);").to_string();

        assert!(text.contains("function id(x) {"));
        assert!(text.contains("tracer.call(\"id\", { x }, 1);"));
        assert!(text.contains("tracer.step(\"Executing line 2\", 2);"));
        assert!(text.contains("const __ret = x; tracer.ret(__ret, 2); return __ret;"));
        assert!(text.contains("tracer.ret(undefined, 3);"));
        assert!(text.contains("// Driver"));
        assert!(text.contains("id(4);"));
    }

    #[test]
    fn test_renders_normalized_containers_and_sets() {
        let text = translate("void f(vector<int> v) {\n  v.push_back(v.size());\n  cout << v.back() << endl;\n}")
            .to_string();

        assert!(text.contains("v.push(v.length);"));
        assert!(text.contains("tracer.set(\"v\", v, 2);"));
        assert!(text.contains("tracer.log([v.at(-1)].join(\"\"), 3);"));
    }
}
