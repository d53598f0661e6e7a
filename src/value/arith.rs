//! Operator semantics for engine-owned values.
//!
//! Scalars follow ordinary numeric rules with `null` propagating through
//! arithmetic. When either operand is a backend [`DataObject`], the operation
//! is handed to that object so elementwise rules stay with the backend.
//!
//! [`DataObject`]: crate::value::DataObject

use crate::error::{PlyrError, Result};
use crate::expr::{BinaryOp, UnaryOp};
use crate::value::Value;
use std::cmp::Ordering;

/// Apply a binary operator to two evaluated operands.
pub fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    if let Value::Data(d) = left {
        return d.binary_op(op, right, false);
    }
    if let Value::Data(d) = right {
        return d.binary_op(op, left, true);
    }

    match op {
        BinaryOp::Eq => return Ok(Value::Bool(left == right)),
        BinaryOp::Ne => return Ok(Value::Bool(left != right)),
        _ => {}
    }

    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }

    if op.is_comparison() {
        return compare(op, left, right);
    }
    if op.is_logical() {
        return logical(op, left, right);
    }

    match (left, right) {
        (Value::Int(a), Value::Int(b)) => int_arith(op, *a, *b, left, right),
        (Value::Str(a), Value::Str(b)) if op == BinaryOp::Add => {
            Ok(Value::Str(format!("{}{}", a, b)))
        }
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => float_arith(op, a, b, left, right),
            _ => Err(unsupported(op, left, right)),
        },
    }
}

/// Apply a unary operator to an evaluated operand.
pub fn unary(op: UnaryOp, operand: &Value) -> Result<Value> {
    match (op, operand) {
        (_, Value::Data(d)) => d.unary_op(op),
        (_, Value::Null) => Ok(Value::Null),
        (UnaryOp::Neg, Value::Int(i)) => i
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| PlyrError::backend("integer overflow in negation")),
        (UnaryOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
        (UnaryOp::Pos, Value::Int(_)) | (UnaryOp::Pos, Value::Float(_)) => Ok(operand.clone()),
        (UnaryOp::Not, Value::Bool(b)) | (UnaryOp::Invert, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Invert, Value::Int(i)) => Ok(Value::Int(!i)),
        _ => Err(PlyrError::UnsupportedOperand {
            op: op.symbol(),
            left: operand.type_name(),
            right: String::new(),
        }),
    }
}

fn unsupported(op: BinaryOp, left: &Value, right: &Value) -> PlyrError {
    PlyrError::UnsupportedOperand {
        op: op.symbol(),
        left: left.type_name(),
        right: right.type_name(),
    }
}

fn int_arith(op: BinaryOp, a: i64, b: i64, left: &Value, right: &Value) -> Result<Value> {
    let overflow = || PlyrError::backend(format!("integer overflow in {} {} {}", a, op, b));
    let zero = || PlyrError::backend(format!("integer division by zero in {} {} {}", a, op, b));
    match op {
        BinaryOp::Add => a.checked_add(b).map(Value::Int).ok_or_else(overflow),
        BinaryOp::Sub => a.checked_sub(b).map(Value::Int).ok_or_else(overflow),
        BinaryOp::Mul => a.checked_mul(b).map(Value::Int).ok_or_else(overflow),
        BinaryOp::Div => float_arith(op, a as f64, b as f64, left, right),
        BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(zero());
            }
            a.checked_div_euclid(b).map(Value::Int).ok_or_else(overflow)
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(zero());
            }
            a.checked_rem_euclid(b).map(Value::Int).ok_or_else(overflow)
        }
        BinaryOp::Pow => match u32::try_from(b) {
            Ok(exp) => a.checked_pow(exp).map(Value::Int).ok_or_else(overflow),
            Err(_) => Ok(Value::Float((a as f64).powf(b as f64))),
        },
        _ => Err(unsupported(op, left, right)),
    }
}

fn float_arith(op: BinaryOp, a: f64, b: f64, left: &Value, right: &Value) -> Result<Value> {
    let out = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::FloorDiv => (a / b).floor(),
        BinaryOp::Mod => a.rem_euclid(b),
        BinaryOp::Pow => a.powf(b),
        _ => return Err(unsupported(op, left, right)),
    };
    Ok(Value::Float(out))
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    let ordering = match (left, right) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => return Err(unsupported(op, left, right)),
        },
    };
    // NaN compares false against everything
    let Some(ordering) = ordering else {
        return Ok(Value::Bool(false));
    };
    let result = match op {
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Le => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::Ge => ordering != Ordering::Less,
        _ => return Err(unsupported(op, left, right)),
    };
    Ok(Value::Bool(result))
}

fn logical(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(match op {
            BinaryOp::And => *a && *b,
            _ => *a || *b,
        })),
        _ => Err(unsupported(op, left, right)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_arithmetic_stays_integral() {
        assert_eq!(
            binary(BinaryOp::Add, &Value::Int(2), &Value::Int(3)).unwrap(),
            Value::Int(5)
        );
        assert_eq!(
            binary(BinaryOp::Mod, &Value::Int(-7), &Value::Int(3)).unwrap(),
            Value::Int(2)
        );
        assert_eq!(
            binary(BinaryOp::Pow, &Value::Int(2), &Value::Int(10)).unwrap(),
            Value::Int(1024)
        );
    }

    #[test]
    fn test_true_division_widens() {
        assert_eq!(
            binary(BinaryOp::Div, &Value::Int(7), &Value::Int(2)).unwrap(),
            Value::Float(3.5)
        );
    }

    #[test]
    fn test_integer_division_by_zero_is_an_error() {
        let err = binary(BinaryOp::FloorDiv, &Value::Int(1), &Value::Int(0)).unwrap_err();
        assert!(matches!(err, PlyrError::Backend(_)));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let min = Value::Int(i64::MIN);
        let max = Value::Int(i64::MAX);
        let minus_one = Value::Int(-1);
        for (op, a, b) in [
            (BinaryOp::Mul, &max, &Value::Int(2)),
            (BinaryOp::Add, &max, &Value::Int(1)),
            (BinaryOp::Sub, &min, &Value::Int(1)),
            (BinaryOp::Pow, &max, &Value::Int(2)),
            (BinaryOp::FloorDiv, &min, &minus_one),
            (BinaryOp::Mod, &min, &minus_one),
        ] {
            assert!(
                matches!(binary(op, a, b), Err(PlyrError::Backend(_))),
                "{} {} {} should overflow",
                a,
                op,
                b
            );
        }
        assert!(unary(UnaryOp::Neg, &min).is_err());
    }

    #[test]
    fn test_overflow_through_evaluate() {
        use crate::eval::{evaluate, EvaluationContext};
        use crate::expr::lit;

        let expr = lit(i64::MIN).binary(BinaryOp::Mod, -1i64);
        assert!(matches!(
            evaluate(&expr, &EvaluationContext::empty()),
            Err(PlyrError::Backend(_))
        ));
    }

    #[test]
    fn test_null_propagates_through_arithmetic() {
        assert_eq!(
            binary(BinaryOp::Mul, &Value::Null, &Value::Int(2)).unwrap(),
            Value::Null
        );
        assert_eq!(
            binary(BinaryOp::Eq, &Value::Null, &Value::Null).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(
            binary(BinaryOp::Lt, &Value::Int(1), &Value::Float(1.5)).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            binary(BinaryOp::Ge, &Value::from("b"), &Value::from("a")).unwrap(),
            Value::Bool(true)
        );
        assert!(binary(BinaryOp::Lt, &Value::from("a"), &Value::Int(1)).is_err());
    }

    #[test]
    fn test_logical_requires_bools() {
        assert_eq!(
            binary(BinaryOp::And, &Value::Bool(true), &Value::Bool(false)).unwrap(),
            Value::Bool(false)
        );
        assert!(matches!(
            binary(BinaryOp::Or, &Value::Int(1), &Value::Bool(false)),
            Err(PlyrError::UnsupportedOperand { op: "|", .. })
        ));
    }

    #[test]
    fn test_unary() {
        assert_eq!(unary(UnaryOp::Neg, &Value::Int(4)).unwrap(), Value::Int(-4));
        assert_eq!(
            unary(UnaryOp::Not, &Value::Bool(true)).unwrap(),
            Value::Bool(false)
        );
        assert!(unary(UnaryOp::Not, &Value::from("x")).is_err());
    }
}
