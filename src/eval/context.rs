//! Evaluation contexts.
//!
//! A context binds symbolic placeholders to concrete values for the duration
//! of one dispatch. It is owned by that dispatch and dropped when evaluation
//! of the verb's arguments completes.

use crate::dispatch::DispatchHandle;
use crate::error::{PlyrError, Result};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Well-known symbol names.
pub mod symbols {
    /// The dataset in scope (the current group under grouped evaluation).
    pub const DATASET: &str = "dataset";
    /// The piped-in value.
    pub const PIPED: &str = ".";
    /// Zero-based index of the group being evaluated.
    pub const GROUP_INDEX: &str = "group_index";
    /// Number of groups in the grouped subject.
    pub const GROUP_COUNT: &str = "group_count";
}

/// How references to the dataset are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    /// `dataset.x` evaluates to the data stored under `x`.
    #[default]
    Eval,
    /// `dataset.x` evaluates to the name `"x"`.
    Select,
    /// Expressions are passed through unevaluated.
    Pending,
}

type LazyFn = dyn Fn() -> Result<Value> + Send + Sync;

/// Value bound to a symbol.
#[derive(Clone)]
pub enum Binding {
    Value(Value),
    /// Computed each time the symbol is resolved.
    Lazy(Arc<LazyFn>),
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Value(v) => write!(f, "Binding::Value({})", v),
            Binding::Lazy(_) => f.write_str("Binding::Lazy"),
        }
    }
}

/// Per-dispatch binding of placeholders to concrete data.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    subject: Value,
    kind: ContextKind,
    symbols: HashMap<String, Binding>,
    dispatch: Option<DispatchHandle>,
}

impl EvaluationContext {
    /// Context rooted at `subject`, which is bound to the dataset and piped symbols.
    pub fn new(subject: Value) -> Self {
        let mut symbols = HashMap::new();
        symbols.insert(symbols::DATASET.to_string(), Binding::Value(subject.clone()));
        symbols.insert(symbols::PIPED.to_string(), Binding::Value(subject.clone()));
        Self {
            subject,
            kind: ContextKind::Eval,
            symbols,
            dispatch: None,
        }
    }

    /// Context with no subject and no bindings.
    pub fn empty() -> Self {
        Self {
            subject: Value::Null,
            kind: ContextKind::Eval,
            symbols: HashMap::new(),
            dispatch: None,
        }
    }

    pub fn with_kind(mut self, kind: ContextKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_dispatch(mut self, handle: DispatchHandle) -> Self {
        self.dispatch = Some(handle);
        self
    }

    pub fn set_kind(&mut self, kind: ContextKind) {
        self.kind = kind;
    }

    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    pub fn subject(&self) -> &Value {
        &self.subject
    }

    pub fn dispatch(&self) -> Option<&DispatchHandle> {
        self.dispatch.as_ref()
    }

    pub fn bind(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.symbols.insert(name.into(), Binding::Value(value));
        self
    }

    /// Bind a symbol whose value is computed on every resolution.
    pub fn bind_lazy<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn() -> Result<Value> + Send + Sync + 'static,
    {
        self.symbols.insert(name.into(), Binding::Lazy(Arc::new(f)));
        self
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Resolve a symbol. Fails with `UnresolvedSymbol`.
    pub fn resolve(&self, name: &str) -> Result<Value> {
        match self.symbols.get(name) {
            Some(Binding::Value(v)) => Ok(v.clone()),
            Some(Binding::Lazy(f)) => f(),
            None => Err(PlyrError::UnresolvedSymbol(name.to_string())),
        }
    }

    /// Ordered group sub-datasets of the subject, if it is grouped.
    pub fn groups(&self) -> Option<Vec<Value>> {
        match &self.subject {
            Value::Data(d) => d.groups(),
            _ => None,
        }
    }

    /// Sub-context for one group: same bindings and kind, with the dataset
    /// symbols rebound to the group.
    pub fn group_context(&self, index: usize, group: Value, count: usize) -> Self {
        let mut sub = self.clone();
        sub.subject = group.clone();
        sub.bind(symbols::DATASET, group.clone());
        sub.bind(symbols::PIPED, group);
        sub.bind(symbols::GROUP_INDEX, Value::Int(index as i64));
        sub.bind(symbols::GROUP_COUNT, Value::Int(count as i64));
        sub
    }
}
