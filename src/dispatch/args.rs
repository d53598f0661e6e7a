//! Dispatch arguments.

use super::DispatchHandle;
use crate::error::{PlyrError, Result};
use crate::expr::Expr;
use crate::value::Value;
use indexmap::IndexMap;

/// Argument to a verb call: either already concrete or still deferred.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Passed to the backend unchanged.
    Value(Value),
    /// Evaluated against the subject before the backend sees it.
    Expr(Expr),
}

impl Arg {
    pub fn is_expr(&self) -> bool {
        matches!(self, Arg::Expr(_))
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

impl From<Expr> for Arg {
    fn from(expr: Expr) -> Self {
        Arg::Expr(expr)
    }
}

impl From<&Expr> for Arg {
    fn from(expr: &Expr) -> Self {
        Arg::Expr(expr.clone())
    }
}

impl From<i64> for Arg {
    fn from(i: i64) -> Self {
        Arg::Value(Value::Int(i))
    }
}

impl From<i32> for Arg {
    fn from(i: i32) -> Self {
        Arg::Value(Value::Int(i as i64))
    }
}

impl From<f64> for Arg {
    fn from(x: f64) -> Self {
        Arg::Value(Value::Float(x))
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Arg::Value(Value::Bool(b))
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Value(Value::from(s))
    }
}

/// Evaluated arguments handed to a backend's verb implementation.
#[derive(Debug, Clone)]
pub struct VerbArgs {
    /// Verb being invoked.
    pub verb: String,
    /// First positional argument; its type selected the backend.
    pub subject: Value,
    /// Remaining positional arguments, evaluated.
    pub args: Vec<Value>,
    /// Keyword arguments, evaluated, in call order.
    pub kwargs: IndexMap<String, Value>,
    handle: DispatchHandle,
}

impl VerbArgs {
    pub(crate) fn new(
        verb: impl Into<String>,
        subject: Value,
        args: Vec<Value>,
        kwargs: IndexMap<String, Value>,
        handle: DispatchHandle,
    ) -> Self {
        Self {
            verb: verb.into(),
            subject,
            args,
            kwargs,
            handle,
        }
    }

    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    pub fn kwarg(&self, name: &str) -> Option<&Value> {
        self.kwargs.get(name)
    }

    /// Positional argument that must be present.
    pub fn require_arg(&self, index: usize, what: &str) -> Result<&Value> {
        self.args.get(index).ok_or_else(|| {
            PlyrError::MalformedCall(format!(
                "{}() expects {} as argument {}",
                self.verb,
                what,
                index + 1
            ))
        })
    }

    /// Handle for calling other verbs from inside this implementation.
    pub fn handle(&self) -> &DispatchHandle {
        &self.handle
    }

    /// Re-enter the dispatcher one level deeper.
    pub fn dispatch(
        &self,
        verb: &str,
        args: Vec<Arg>,
        kwargs: IndexMap<String, Arg>,
    ) -> Result<Value> {
        self.handle.dispatch(verb, args, kwargs)
    }

    /// Re-enter the dispatcher with positional arguments only.
    pub fn call(&self, verb: &str, args: Vec<Arg>) -> Result<Value> {
        self.handle.dispatch(verb, args, IndexMap::new())
    }
}
