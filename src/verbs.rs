//! The documented verb surface.
//!
//! Verbs are plain names; what they do for a given subject is up to the
//! backend that claims the subject's type. This module lists the names the
//! bundled backends understand and provides builders for pipe stages and
//! data-function calls.

use crate::expr::Expr;
use crate::pipe::PipeExpr;
use crate::value::{Value, VerbRef};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Verbs of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    // Table verbs
    Select,
    Filter,
    Mutate,
    Rename,
    Arrange,
    GroupBy,
    Ungroup,
    Summarise,
    Pull,
    InnerJoin,
    LeftJoin,
    Count,

    // Data functions (receive the dataset in scope as their subject)
    N,
    Sum,
    Mean,
    Min,
    Max,
    StartsWith,
    EndsWith,
    Contains,
}

impl Verb {
    /// Name the verb is registered and dispatched under.
    pub fn name(&self) -> &'static str {
        match self {
            Verb::Select => "select",
            Verb::Filter => "filter",
            Verb::Mutate => "mutate",
            Verb::Rename => "rename",
            Verb::Arrange => "arrange",
            Verb::GroupBy => "group_by",
            Verb::Ungroup => "ungroup",
            Verb::Summarise => "summarise",
            Verb::Pull => "pull",
            Verb::InnerJoin => "inner_join",
            Verb::LeftJoin => "left_join",
            Verb::Count => "count",
            Verb::N => "n",
            Verb::Sum => "sum",
            Verb::Mean => "mean",
            Verb::Min => "min",
            Verb::Max => "max",
            Verb::StartsWith => "starts_with",
            Verb::EndsWith => "ends_with",
            Verb::Contains => "contains",
        }
    }

    /// Get all verbs.
    pub fn all() -> &'static [Verb] {
        &[
            Verb::Select,
            Verb::Filter,
            Verb::Mutate,
            Verb::Rename,
            Verb::Arrange,
            Verb::GroupBy,
            Verb::Ungroup,
            Verb::Summarise,
            Verb::Pull,
            Verb::InnerJoin,
            Verb::LeftJoin,
            Verb::Count,
            Verb::N,
            Verb::Sum,
            Verb::Mean,
            Verb::Min,
            Verb::Max,
            Verb::StartsWith,
            Verb::EndsWith,
            Verb::Contains,
        ]
    }

    pub fn from_name(name: &str) -> Option<Verb> {
        let name = match name {
            "summarize" => "summarise",
            other => other,
        };
        Self::all().iter().copied().find(|v| v.name() == name)
    }

    /// Whether the verb takes the dataset in scope as its implicit subject
    /// when called inside an expression.
    pub fn is_data_function(&self) -> bool {
        matches!(
            self,
            Verb::N
                | Verb::Sum
                | Verb::Mean
                | Verb::Min
                | Verb::Max
                | Verb::StartsWith
                | Verb::EndsWith
                | Verb::Contains
        )
    }

    pub fn verb_ref(&self) -> VerbRef {
        if self.is_data_function() {
            VerbRef::data_fn(self.name())
        } else {
            VerbRef::new(self.name())
        }
    }

    /// The verb as an expression callee.
    pub fn expr(&self) -> Expr {
        Expr::lit(Value::Verb(self.verb_ref()))
    }

    pub fn description(&self) -> &'static str {
        match self {
            Verb::Select => "Keep the named columns, in the order given.",
            Verb::Filter => "Keep rows where every predicate is true.",
            Verb::Mutate => "Add or replace columns; a null value drops the column.",
            Verb::Rename => "Rename columns with new = old pairs.",
            Verb::Arrange => "Sort rows by the given keys.",
            Verb::GroupBy => "Group rows by the named columns.",
            Verb::Ungroup => "Drop grouping.",
            Verb::Summarise => "Reduce each group to one row.",
            Verb::Pull => "Extract one column as a vector.",
            Verb::InnerJoin => "Rows with matching keys in both tables.",
            Verb::LeftJoin => "All rows of the left table, matched where possible.",
            Verb::Count => "Number of rows per combination of the named columns.",
            Verb::N => "Number of rows in the dataset in scope.",
            Verb::Sum => "Sum of non-null values.",
            Verb::Mean => "Arithmetic mean of non-null values.",
            Verb::Min => "Smallest non-null value.",
            Verb::Max => "Largest non-null value.",
            Verb::StartsWith => "Column names starting with a prefix.",
            Verb::EndsWith => "Column names ending with a suffix.",
            Verb::Contains => "Column names containing a substring.",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ==================== Pipe stages ====================

fn stage(verb: Verb) -> PipeExpr {
    PipeExpr::new(verb.name())
}

fn with_args<I>(mut stage: PipeExpr, args: I) -> PipeExpr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    for arg in args {
        stage = stage.arg(arg);
    }
    stage
}

fn with_kwargs<K, S>(mut stage: PipeExpr, kwargs: K) -> PipeExpr
where
    K: IntoIterator<Item = (S, Expr)>,
    S: Into<String>,
{
    for (name, arg) in kwargs {
        stage = stage.kwarg(name, arg);
    }
    stage
}

pub fn select<I>(columns: I) -> PipeExpr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    with_args(stage(Verb::Select), columns)
}

pub fn filter(predicate: impl Into<Expr>) -> PipeExpr {
    stage(Verb::Filter).arg(predicate)
}

pub fn mutate<K, S>(columns: K) -> PipeExpr
where
    K: IntoIterator<Item = (S, Expr)>,
    S: Into<String>,
{
    with_kwargs(stage(Verb::Mutate), columns)
}

/// `new = old` pairs.
pub fn rename<K, S>(pairs: K) -> PipeExpr
where
    K: IntoIterator<Item = (S, Expr)>,
    S: Into<String>,
{
    with_kwargs(stage(Verb::Rename), pairs)
}

pub fn arrange<I>(keys: I) -> PipeExpr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    with_args(stage(Verb::Arrange), keys)
}

pub fn group_by<I>(columns: I) -> PipeExpr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    with_args(stage(Verb::GroupBy), columns)
}

pub fn ungroup() -> PipeExpr {
    stage(Verb::Ungroup)
}

pub fn summarise<K, S>(aggregates: K) -> PipeExpr
where
    K: IntoIterator<Item = (S, Expr)>,
    S: Into<String>,
{
    with_kwargs(stage(Verb::Summarise), aggregates)
}

pub fn pull(column: impl Into<Expr>) -> PipeExpr {
    stage(Verb::Pull).arg(column)
}

pub fn inner_join(other: impl Into<Expr>, by: impl Into<Expr>) -> PipeExpr {
    stage(Verb::InnerJoin).arg(other).kwarg("by", by)
}

pub fn left_join(other: impl Into<Expr>, by: impl Into<Expr>) -> PipeExpr {
    stage(Verb::LeftJoin).arg(other).kwarg("by", by)
}

pub fn count<I>(columns: I) -> PipeExpr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    with_args(stage(Verb::Count), columns)
}

// ==================== Data functions ====================

fn data_call(verb: Verb, args: Vec<Expr>) -> Expr {
    Expr::call_node(verb.expr(), args, IndexMap::new())
}

/// `n()`: rows in the dataset in scope.
pub fn n() -> Expr {
    data_call(Verb::N, Vec::new())
}

pub fn sum(x: impl Into<Expr>) -> Expr {
    data_call(Verb::Sum, vec![x.into()])
}

pub fn mean(x: impl Into<Expr>) -> Expr {
    data_call(Verb::Mean, vec![x.into()])
}

pub fn min(x: impl Into<Expr>) -> Expr {
    data_call(Verb::Min, vec![x.into()])
}

pub fn max(x: impl Into<Expr>) -> Expr {
    data_call(Verb::Max, vec![x.into()])
}

pub fn starts_with(prefix: &str) -> Expr {
    data_call(Verb::StartsWith, vec![Expr::lit(prefix)])
}

pub fn ends_with(suffix: &str) -> Expr {
    data_call(Verb::EndsWith, vec![Expr::lit(suffix)])
}

pub fn contains(needle: &str) -> Expr {
    data_call(Verb::Contains, vec![Expr::lit(needle)])
}

/// Name-matching helper with every pattern and the case policy spelled out.
///
/// `verb` is one of [`Verb::StartsWith`], [`Verb::EndsWith`] or
/// [`Verb::Contains`]; a name is kept when any pattern matches it. The
/// single-pattern helpers above ignore case.
pub fn name_match(verb: Verb, patterns: &[&str], ignore_case: bool) -> Expr {
    let patterns = Value::List(patterns.iter().map(|p| Value::from(*p)).collect());
    let mut kwargs = IndexMap::new();
    kwargs.insert("ignore_case".to_string(), Expr::lit(ignore_case));
    Expr::call_node(verb.expr(), vec![Expr::lit(patterns)], kwargs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::col;

    #[test]
    fn test_name_round_trip() {
        for verb in Verb::all() {
            assert_eq!(Verb::from_name(verb.name()), Some(*verb));
        }
        assert_eq!(Verb::from_name("summarize"), Some(Verb::Summarise));
        assert_eq!(Verb::from_name("pivot"), None);
    }

    #[test]
    fn test_data_functions_inject_subject() {
        assert!(Verb::Sum.verb_ref().inject_subject);
        assert!(!Verb::Select.verb_ref().inject_subject);
        assert_eq!(sum(col("x")).to_string(), "sum(dataset.x)");
        assert_eq!(n().to_string(), "n()");
    }

    #[test]
    fn test_stage_builders() {
        let stage = mutate([("z", col("x").add(col("y")))]);
        assert_eq!(stage.verb().name(), "mutate");
        assert_eq!(stage.kwargs().len(), 1);

        let stage = inner_join(Expr::symbol("other"), col("id"));
        assert_eq!(stage.args().len(), 1);
        assert!(stage.kwargs().contains_key("by"));
    }
}
