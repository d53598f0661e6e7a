//! Operator tables for expression nodes.

use crate::error::{PlyrError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary operators an expression can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // Logical / elementwise boolean
    And,
    Or,
}

impl BinaryOp {
    /// Source-level symbol for this operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
        }
    }

    /// Get all binary operators.
    pub fn all() -> &'static [BinaryOp] {
        &[
            BinaryOp::Add,
            BinaryOp::Sub,
            BinaryOp::Mul,
            BinaryOp::Div,
            BinaryOp::FloorDiv,
            BinaryOp::Mod,
            BinaryOp::Pow,
            BinaryOp::Eq,
            BinaryOp::Ne,
            BinaryOp::Lt,
            BinaryOp::Le,
            BinaryOp::Gt,
            BinaryOp::Ge,
            BinaryOp::And,
            BinaryOp::Or,
        ]
    }

    /// Parse an operator token. Fails with `UnsupportedOperator`.
    pub fn from_symbol(token: &str) -> Result<Self> {
        let token = match token {
            "and" | "&&" => "&",
            "or" | "||" => "|",
            "^" => "**",
            other => other,
        };
        Self::all()
            .iter()
            .copied()
            .find(|op| op.symbol() == token)
            .ok_or_else(|| PlyrError::UnsupportedOperator(token.to_string()))
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// Binding strength used when rendering expressions.
    pub(crate) fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod => 5,
            BinaryOp::Pow => 6,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary operators an expression can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
    /// Bitwise / elementwise inversion (`~`).
    Invert,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::Not => "!",
            UnaryOp::Invert => "~",
        }
    }

    pub fn from_symbol(token: &str) -> Result<Self> {
        match token {
            "-" => Ok(UnaryOp::Neg),
            "+" => Ok(UnaryOp::Pos),
            "!" | "not" => Ok(UnaryOp::Not),
            "~" => Ok(UnaryOp::Invert),
            other => Err(PlyrError::UnsupportedOperator(other.to_string())),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_round_trip_covers_all_ops() {
        for op in BinaryOp::all() {
            assert_eq!(BinaryOp::from_symbol(op.symbol()).unwrap(), *op);
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(BinaryOp::from_symbol("and").unwrap(), BinaryOp::And);
        assert_eq!(BinaryOp::from_symbol("^").unwrap(), BinaryOp::Pow);
        assert_eq!(UnaryOp::from_symbol("not").unwrap(), UnaryOp::Not);
    }

    #[test]
    fn test_unknown_operator() {
        assert!(matches!(
            BinaryOp::from_symbol("<=>"),
            Err(PlyrError::UnsupportedOperator(ref t)) if t == "<=>"
        ));
        assert!(UnaryOp::from_symbol("++").is_err());
    }
}
