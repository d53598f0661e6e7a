//! Expression node model.
//!
//! An [`Expr`] is an immutable, reference-counted node in an expression DAG.
//! Building one never touches data: every builder method returns a new node
//! and the only possible failures are structural (an unknown operator token,
//! a call that could never be invoked, a repeated keyword).
//!
//! ```
//! use plyr_rs::expr::{col, Expr};
//!
//! // dataset.x + dataset.y > 10
//! let e = col("x").add(col("y")).gt(10);
//! assert_eq!(e.to_string(), "dataset.x + dataset.y > 10");
//! ```

use crate::error::{PlyrError, Result};
use crate::eval::symbols;
use crate::expr::ops::{BinaryOp, UnaryOp};
use crate::value::{Function, Value, VerbRef};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// One node of an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    /// Named placeholder resolved through the evaluation context.
    Symbol(String),
    Attr {
        base: Expr,
        name: String,
    },
    Index {
        base: Expr,
        key: Expr,
    },
    Call {
        func: Expr,
        args: Vec<Expr>,
        kwargs: IndexMap<String, Expr>,
    },
    BinOp {
        op: BinaryOp,
        left: Expr,
        right: Expr,
    },
    UnOp {
        op: UnaryOp,
        operand: Expr,
    },
    Literal(Value),
}

/// Shared handle to an immutable expression node.
#[derive(Clone, PartialEq)]
pub struct Expr(Arc<ExprNode>);

impl Expr {
    fn from_node(node: ExprNode) -> Self {
        Self(Arc::new(node))
    }

    pub fn node(&self) -> &ExprNode {
        &self.0
    }

    // ==================== Leaves ====================

    pub fn symbol(name: impl Into<String>) -> Self {
        Self::from_node(ExprNode::Symbol(name.into()))
    }

    /// The dataset currently in scope.
    pub fn dataset() -> Self {
        Self::symbol(symbols::DATASET)
    }

    /// The piped-in value (`.`).
    pub fn piped() -> Self {
        Self::symbol(symbols::PIPED)
    }

    /// Index of the group being evaluated.
    pub fn group_index() -> Self {
        Self::symbol(symbols::GROUP_INDEX)
    }

    pub fn lit(value: impl Into<Value>) -> Self {
        Self::from_node(ExprNode::Literal(value.into()))
    }

    /// Reference to a verb, to be called with an explicit subject.
    pub fn verb(name: impl Into<String>) -> Self {
        Self::lit(Value::Verb(VerbRef::named(name)))
    }

    /// Reference to a verb that receives the dataset in scope as its subject.
    pub fn data_fn(name: impl Into<String>) -> Self {
        let mut verb = VerbRef::named(name);
        verb.inject_subject = true;
        Self::lit(Value::Verb(verb))
    }

    pub fn func(function: Function) -> Self {
        Self::lit(Value::Function(function))
    }

    // ==================== Composition ====================

    pub fn attr(&self, name: impl Into<String>) -> Self {
        Self::from_node(ExprNode::Attr {
            base: self.clone(),
            name: name.into(),
        })
    }

    pub fn index(&self, key: impl Into<Expr>) -> Self {
        Self::from_node(ExprNode::Index {
            base: self.clone(),
            key: key.into(),
        })
    }

    /// Call this expression with positional arguments.
    pub fn call<I>(&self, args: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        self.call_with(args, Vec::<(String, Expr)>::new())
    }

    /// Call this expression with positional and keyword arguments.
    ///
    /// Fails with `MalformedCall` when the callee is a literal that can never
    /// be invoked or when a keyword is repeated.
    pub fn call_with<I, K, S>(&self, args: I, kwargs: K) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
        K: IntoIterator<Item = (S, Expr)>,
        S: Into<String>,
    {
        if let ExprNode::Literal(value) = self.node() {
            if !matches!(value, Value::Function(_) | Value::Verb(_)) {
                return Err(PlyrError::MalformedCall(format!(
                    "literal of type {} is not callable",
                    value.type_name()
                )));
            }
        }

        let mut named = IndexMap::new();
        for (name, value) in kwargs {
            let name = name.into();
            if named.contains_key(&name) {
                return Err(PlyrError::MalformedCall(format!(
                    "keyword argument '{}' given more than once",
                    name
                )));
            }
            named.insert(name, value);
        }

        Ok(Self::call_node(
            self.clone(),
            args.into_iter().map(Into::into).collect(),
            named,
        ))
    }

    /// Build a call node without shape checks.
    pub(crate) fn call_node(func: Expr, args: Vec<Expr>, kwargs: IndexMap<String, Expr>) -> Self {
        Self::from_node(ExprNode::Call { func, args, kwargs })
    }

    pub fn binary(&self, op: BinaryOp, rhs: impl Into<Expr>) -> Self {
        Self::from_node(ExprNode::BinOp {
            op,
            left: self.clone(),
            right: rhs.into(),
        })
    }

    /// Build a binary node from an operator token such as `"+"` or `"<="`.
    pub fn binary_symbol(&self, token: &str, rhs: impl Into<Expr>) -> Result<Self> {
        Ok(self.binary(BinaryOp::from_symbol(token)?, rhs))
    }

    pub fn unary(&self, op: UnaryOp) -> Self {
        Self::from_node(ExprNode::UnOp {
            op,
            operand: self.clone(),
        })
    }

    pub fn unary_symbol(&self, token: &str) -> Result<Self> {
        Ok(self.unary(UnaryOp::from_symbol(token)?))
    }

    pub fn add(&self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Add, rhs)
    }

    pub fn sub(&self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Sub, rhs)
    }

    pub fn mul(&self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Mul, rhs)
    }

    pub fn div(&self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Div, rhs)
    }

    pub fn rem(&self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Mod, rhs)
    }

    pub fn pow(&self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Pow, rhs)
    }

    pub fn equals(&self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Eq, rhs)
    }

    pub fn not_equals(&self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Ne, rhs)
    }

    pub fn lt(&self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Lt, rhs)
    }

    pub fn le(&self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Le, rhs)
    }

    pub fn gt(&self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Gt, rhs)
    }

    pub fn ge(&self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Ge, rhs)
    }

    pub fn and(&self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::And, rhs)
    }

    pub fn or(&self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Or, rhs)
    }

    pub fn neg(&self) -> Self {
        self.unary(UnaryOp::Neg)
    }

    pub fn not(&self) -> Self {
        self.unary(UnaryOp::Not)
    }

    // ==================== Inspection ====================

    /// Whether this node is a direct reference to the dataset in scope.
    pub fn is_dataset_ref(&self) -> bool {
        matches!(self.node(), ExprNode::Symbol(s) if s == symbols::DATASET || s == symbols::PIPED)
    }

    /// If this node is a call to a verb reference, the verb.
    pub fn as_verb_call(&self) -> Option<(&VerbRef, &[Expr], &IndexMap<String, Expr>)> {
        match self.node() {
            ExprNode::Call { func, args, kwargs } => match func.node() {
                ExprNode::Literal(Value::Verb(verb)) => Some((verb, args, kwargs)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Distinct symbol names referenced anywhere in the tree, in first-seen order.
    pub fn symbols(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.visit(&mut |node| {
            if let ExprNode::Symbol(name) = node {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
        });
        out
    }

    /// Nesting depth; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        match self.node() {
            ExprNode::Symbol(_) | ExprNode::Literal(_) => 1,
            ExprNode::Attr { base, .. } => base.depth() + 1,
            ExprNode::Index { base, key } => base.depth().max(key.depth()) + 1,
            ExprNode::Call { func, args, kwargs } => {
                let deepest = args
                    .iter()
                    .chain(kwargs.values())
                    .map(Expr::depth)
                    .fold(func.depth(), usize::max);
                deepest + 1
            }
            ExprNode::BinOp { left, right, .. } => left.depth().max(right.depth()) + 1,
            ExprNode::UnOp { operand, .. } => operand.depth() + 1,
        }
    }

    /// Pre-order walk over every node.
    pub fn visit<F: FnMut(&ExprNode)>(&self, f: &mut F) {
        f(self.node());
        match self.node() {
            ExprNode::Symbol(_) | ExprNode::Literal(_) => {}
            ExprNode::Attr { base, .. } => base.visit(f),
            ExprNode::Index { base, key } => {
                base.visit(f);
                key.visit(f);
            }
            ExprNode::Call { func, args, kwargs } => {
                func.visit(f);
                for arg in args.iter().chain(kwargs.values()) {
                    arg.visit(f);
                }
            }
            ExprNode::BinOp { left, right, .. } => {
                left.visit(f);
                right.visit(f);
            }
            ExprNode::UnOp { operand, .. } => operand.visit(f),
        }
    }

    fn fmt_prec(&self, f: &mut fmt::Formatter<'_>, outer: u8) -> fmt::Result {
        match self.node() {
            ExprNode::Symbol(name) => f.write_str(name),
            ExprNode::Literal(Value::Verb(verb)) => f.write_str(verb.name()),
            ExprNode::Literal(Value::Function(func)) => f.write_str(func.name()),
            ExprNode::Literal(value) => write!(f, "{}", value),
            ExprNode::Attr { base, name } => {
                base.fmt_prec(f, u8::MAX)?;
                write!(f, ".{}", name)
            }
            ExprNode::Index { base, key } => {
                base.fmt_prec(f, u8::MAX)?;
                f.write_str("[")?;
                key.fmt_prec(f, 0)?;
                f.write_str("]")
            }
            ExprNode::Call { func, args, kwargs } => {
                func.fmt_prec(f, u8::MAX)?;
                f.write_str("(")?;
                let mut first = true;
                for arg in args {
                    if !first {
                        f.write_str(", ")?;
                    }
                    first = false;
                    arg.fmt_prec(f, 0)?;
                }
                for (name, arg) in kwargs {
                    if !first {
                        f.write_str(", ")?;
                    }
                    first = false;
                    write!(f, "{}=", name)?;
                    arg.fmt_prec(f, 0)?;
                }
                f.write_str(")")
            }
            ExprNode::BinOp { op, left, right } => {
                let prec = op.precedence();
                if prec < outer {
                    f.write_str("(")?;
                }
                left.fmt_prec(f, prec)?;
                write!(f, " {} ", op)?;
                right.fmt_prec(f, prec + 1)?;
                if prec < outer {
                    f.write_str(")")?;
                }
                Ok(())
            }
            ExprNode::UnOp { op, operand } => {
                f.write_str(op.symbol())?;
                operand.fmt_prec(f, u8::MAX)
            }
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({})", self)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_prec(f, 0)
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::lit(value)
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}

impl From<i64> for Expr {
    fn from(i: i64) -> Self {
        Expr::lit(i)
    }
}

impl From<i32> for Expr {
    fn from(i: i32) -> Self {
        Expr::lit(i)
    }
}

impl From<f64> for Expr {
    fn from(x: f64) -> Self {
        Expr::lit(x)
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Expr::lit(b)
    }
}

/// String literals, not symbols.
impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Expr::lit(s)
    }
}

impl From<String> for Expr {
    fn from(s: String) -> Self {
        Expr::lit(s)
    }
}
