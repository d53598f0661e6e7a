//! Pipe composition.
//!
//! `x |> f(a) |> g(b, k = c)` becomes `g(f(x, a), b, k = c)`: each stage's
//! result is inserted as the first positional argument of the next stage,
//! and every other argument keeps its position. Composition is purely
//! structural and does not depend on any backend.

use crate::dispatch::{Arg, Dispatcher};
use crate::error::{PlyrError, Result};
use crate::expr::{Expr, ExprNode};
use crate::value::{Value, VerbRef};
use indexmap::IndexMap;

/// One pipe stage: a verb and the arguments that follow the piped value.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeExpr {
    verb: VerbRef,
    args: Vec<Expr>,
    kwargs: IndexMap<String, Expr>,
}

impl PipeExpr {
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: VerbRef::named(verb),
            args: Vec::new(),
            kwargs: IndexMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<Expr>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, arg: impl Into<Expr>) -> Self {
        self.kwargs.insert(name.into(), arg.into());
        self
    }

    /// Read a stage from a verb-call expression such as `filter(dataset.x > 1)`,
    /// or a bare verb reference.
    ///
    /// Fails with `MalformedPipeTarget` for anything else.
    pub fn from_target(target: &Expr) -> Result<Self> {
        if let Some((verb, args, kwargs)) = target.as_verb_call() {
            return Ok(Self {
                verb: piped(verb),
                args: args.to_vec(),
                kwargs: kwargs.clone(),
            });
        }
        if let ExprNode::Literal(Value::Verb(verb)) = target.node() {
            return Ok(Self {
                verb: piped(verb),
                args: Vec::new(),
                kwargs: IndexMap::new(),
            });
        }
        Err(PlyrError::MalformedPipeTarget(format!(
            "expected a verb call, found '{}'",
            target
        )))
    }

    pub fn verb(&self) -> &VerbRef {
        &self.verb
    }

    pub fn args(&self) -> &[Expr] {
        &self.args
    }

    pub fn kwargs(&self) -> &IndexMap<String, Expr> {
        &self.kwargs
    }

    /// The call this stage makes with `input` piped in.
    pub fn apply(&self, input: Expr) -> Expr {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(input);
        args.extend(self.args.iter().cloned());
        Expr::call_node(
            Expr::lit(Value::Verb(self.verb.clone())),
            args,
            self.kwargs.clone(),
        )
    }
}

/// The piped value is the subject, so a stage never injects one.
fn piped(verb: &VerbRef) -> VerbRef {
    VerbRef {
        name: verb.name.clone(),
        inject_subject: false,
    }
}

/// Rewrite `lhs |> rhs` into a nested call.
pub fn pipe(lhs: impl Into<Expr>, rhs: &Expr) -> Result<Expr> {
    Ok(PipeExpr::from_target(rhs)?.apply(lhs.into()))
}

/// A left-to-right chain of verb calls starting from a source value.
#[derive(Debug, Clone)]
pub struct Pipe {
    source: Arg,
    stages: Vec<PipeExpr>,
}

impl Pipe {
    pub fn new(source: impl Into<Arg>) -> Self {
        Self {
            source: source.into(),
            stages: Vec::new(),
        }
    }

    pub fn then(mut self, stage: PipeExpr) -> Self {
        self.stages.push(stage);
        self
    }

    /// Append a stage given as a verb-call expression.
    pub fn then_expr(mut self, target: &Expr) -> Result<Self> {
        self.stages.push(PipeExpr::from_target(target)?);
        Ok(self)
    }

    pub fn stages(&self) -> &[PipeExpr] {
        &self.stages
    }

    /// Fold the chain into a single nested call expression.
    pub fn compose(&self) -> Expr {
        let source = match &self.source {
            Arg::Value(value) => Expr::lit(value.clone()),
            Arg::Expr(expr) => expr.clone(),
        };
        self.stages
            .iter()
            .fold(source, |input, stage| stage.apply(input))
    }

    /// Run each stage in order, feeding every result into the next stage.
    ///
    /// The source is evaluated exactly once. A failing stage aborts the chain;
    /// earlier stages are not undone.
    pub fn run(&self, dispatcher: &Dispatcher) -> Result<Value> {
        let mut current = match &self.source {
            Arg::Value(value) => value.clone(),
            Arg::Expr(expr) => dispatcher.evaluate(expr)?,
        };

        for stage in &self.stages {
            let mut args = Vec::with_capacity(stage.args.len() + 1);
            args.push(Arg::Value(current));
            args.extend(stage.args.iter().cloned().map(Arg::Expr));
            let kwargs = stage
                .kwargs
                .iter()
                .map(|(name, arg)| (name.clone(), Arg::Expr(arg.clone())))
                .collect();
            current = dispatcher.dispatch(stage.verb.name(), args, kwargs)?;
        }
        Ok(current)
    }
}
