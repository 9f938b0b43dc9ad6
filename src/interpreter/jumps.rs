use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::translator::Expr;

impl Interpreter<'_, '_> {
    /// `return [expr];` evaluates the value once, records it, then unwinds.
    pub(crate) fn execute_return(&mut self, expr: Option<&Expr>) -> Result<(), RuntimeError> {
        let return_val = match expr {
            Some(ret_expr) => self.evaluate_expr(ret_expr)?,
            None => Value::Undefined,
        };

        self.tracer.ret(&return_val, Some(self.current_line));
        self.check_event_budget()?;

        self.return_value = return_val;
        self.control_flow = ControlFlow::Return;
        Ok(())
    }

    /// Control fell off the end of a function body
    pub(crate) fn execute_implicit_return(&mut self, end_line: usize) {
        self.tracer.ret(&Value::Undefined, Some(end_line));
    }
}
