//! Deferred expressions.
//!
//! Expressions are built from a placeholder for the dataset and composed with
//! attribute access, indexing, calls and operators. Nothing is evaluated until
//! an [`EvaluationContext`](crate::eval::EvaluationContext) exists.

mod node;
mod ops;

pub use node::{Expr, ExprNode};
pub use ops::{BinaryOp, UnaryOp};

use crate::value::Value;

/// Column `name` of the dataset in scope (`dataset.name`).
pub fn col(name: impl Into<String>) -> Expr {
    Expr::dataset().attr(name)
}

/// Literal value.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::lit(value)
}
