//! Recursive expression evaluation.

use crate::dispatch::Arg;
use crate::error::{PlyrError, Result};
use crate::eval::context::{ContextKind, EvaluationContext};
use crate::expr::{Expr, ExprNode};
use crate::value::{self, Value, VerbRef};
use indexmap::IndexMap;

/// Resolve `expr` to a concrete value against `ctx`.
///
/// Sub-expressions are evaluated depth first, left before right, and every
/// error is returned unchanged.
pub fn evaluate(expr: &Expr, ctx: &EvaluationContext) -> Result<Value> {
    if ctx.kind() == ContextKind::Pending {
        return Ok(Value::Expr(expr.clone()));
    }

    match expr.node() {
        ExprNode::Symbol(name) => ctx.resolve(name),
        ExprNode::Literal(value) => Ok(value.clone()),
        ExprNode::Attr { base, name } => {
            if ctx.kind() == ContextKind::Select && base.is_dataset_ref() {
                return Ok(Value::Str(name.clone()));
            }
            evaluate(base, ctx)?.get_attr(name)
        }
        ExprNode::Index { base, key } => {
            if ctx.kind() == ContextKind::Select && base.is_dataset_ref() {
                return evaluate(key, ctx);
            }
            let base = evaluate(base, ctx)?;
            let key = evaluate(key, ctx)?;
            base.get_index(&key)
        }
        ExprNode::Call { func, args, kwargs } => {
            let callee = evaluate(func, ctx)?;
            match callee {
                Value::Function(function) => {
                    let mut values = Vec::with_capacity(args.len());
                    for arg in args {
                        values.push(evaluate(arg, ctx)?);
                    }
                    let mut named = IndexMap::with_capacity(kwargs.len());
                    for (name, arg) in kwargs {
                        named.insert(name.clone(), evaluate(arg, ctx)?);
                    }
                    function.call(&values, &named)
                }
                Value::Verb(verb) => call_verb(&verb, args, kwargs, ctx),
                other => Err(PlyrError::NotCallable(other.type_name())),
            }
        }
        ExprNode::BinOp { op, left, right } => {
            let left = evaluate(left, ctx)?;
            let right = evaluate(right, ctx)?;
            value::binary(*op, &left, &right)
        }
        ExprNode::UnOp { op, operand } => value::unary(*op, &evaluate(operand, ctx)?),
    }
}

/// Evaluate `expr` once per group when the subject is grouped.
///
/// Only `Eval` contexts fan out. The result is `Value::Groups` holding one
/// entry per group in the subject's group order. Ungrouped subjects and
/// other context kinds evaluate once.
pub fn evaluate_grouped(expr: &Expr, ctx: &EvaluationContext) -> Result<Value> {
    if ctx.kind() != ContextKind::Eval {
        return evaluate(expr, ctx);
    }
    let Some(groups) = ctx.groups() else {
        return evaluate(expr, ctx);
    };

    let count = groups.len();
    tracing::trace!("Evaluating {} across {} groups", expr, count);
    let mut results = Vec::with_capacity(count);
    for (index, group) in groups.into_iter().enumerate() {
        let sub = ctx.group_context(index, group, count);
        results.push(evaluate(expr, &sub)?);
    }
    Ok(Value::Groups(results))
}

/// A verb called from inside an expression.
///
/// Only the subject is resolved here. The remaining arguments are handed to
/// the dispatcher unevaluated so they resolve against the verb's own subject.
fn call_verb(
    verb: &VerbRef,
    args: &[Expr],
    kwargs: &IndexMap<String, Expr>,
    ctx: &EvaluationContext,
) -> Result<Value> {
    let handle = ctx.dispatch().ok_or_else(|| {
        PlyrError::MalformedCall(format!(
            "verb '{}' called outside of a dispatch",
            verb.name()
        ))
    })?;

    let mut rest = args.iter();
    let subject = if verb.inject_subject {
        ctx.subject().clone()
    } else {
        let first = rest
            .next()
            .ok_or_else(|| PlyrError::MissingSubject(verb.name().to_string()))?;
        evaluate(first, ctx)?
    };

    let mut forwarded = Vec::with_capacity(args.len() + 1);
    forwarded.push(Arg::Value(subject));
    forwarded.extend(rest.cloned().map(Arg::Expr));
    let named = kwargs
        .iter()
        .map(|(name, arg)| (name.clone(), Arg::Expr(arg.clone())))
        .collect();

    handle.dispatch(verb.name(), forwarded, named)
}
