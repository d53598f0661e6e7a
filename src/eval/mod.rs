//! Expression evaluation against a concrete context.

mod context;
mod evaluator;

pub use context::{symbols, Binding, ContextKind, EvaluationContext};
pub use evaluator::{evaluate, evaluate_grouped};
