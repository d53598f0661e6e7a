//! Callable values: plain functions and verb references.

use crate::error::Result;
use crate::value::Value;
use indexmap::IndexMap;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Signature of a plain function callable from an expression.
pub type NativeFn = dyn Fn(&[Value], &IndexMap<String, Value>) -> Result<Value> + Send + Sync;

/// A plain function. Its arguments are evaluated eagerly, left to right,
/// before it is invoked.
#[derive(Clone)]
pub struct Function {
    name: Arc<str>,
    func: Arc<NativeFn>,
}

impl Function {
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(&[Value], &IndexMap<String, Value>) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value], kwargs: &IndexMap<String, Value>) -> Result<Value> {
        (self.func)(args, kwargs)
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({})", self.name)
    }
}

/// Reference to a verb by name.
///
/// Calling a verb reference inside an expression re-enters the dispatcher.
/// With `inject_subject` set, the dataset currently in scope becomes the
/// verb's subject and every written argument follows it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VerbRef {
    pub name: Cow<'static, str>,
    pub inject_subject: bool,
}

impl VerbRef {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            inject_subject: false,
        }
    }

    /// A verb that receives the current dataset as its subject.
    pub const fn data_fn(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            inject_subject: true,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            inject_subject: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for VerbRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
