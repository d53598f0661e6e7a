//! Dense one-dimensional vectors.
//!
//! Operators apply elementwise, with a scalar or a length-one vector
//! broadcast against the other side. Nulls propagate through arithmetic and
//! are skipped by the aggregations.

use crate::dispatch::VerbArgs;
use crate::error::{PlyrError, Result};
use crate::expr::{BinaryOp, UnaryOp};
use crate::registry::{PluginDescriptor, PluginFactory, PLUGINS};
use crate::value::{self, DataObject, TypeKey, Value};
use linkme::distributed_slice;
use std::any::Any;
use std::cmp::Ordering;

pub const VECTOR: TypeKey = TypeKey::new("vector");
/// Capability tag for ordered collections.
pub const SEQUENCE: TypeKey = TypeKey::new("sequence");

/// Plugin name.
pub const PLUGIN_NAME: &str = "vector";

/// Ordered column of scalar values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vector {
    values: Vec<Value>,
}

impl Vector {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// `value` repeated `len` times.
    pub fn repeat(value: &Value, len: usize) -> Self {
        Self::new(vec![value.clone(); len])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Elements at `rows`, in that order.
    pub fn take(&self, rows: &[usize]) -> Vector {
        rows.iter().map(|&i| self.values[i].clone()).collect()
    }

    pub fn into_value(self) -> Value {
        Value::data(self)
    }

    fn non_null(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().filter(|v| !v.is_null())
    }

    pub fn sum(&self) -> Result<Value> {
        let mut int_total: Option<i64> = Some(0);
        let mut float_total = 0.0;
        for v in self.non_null() {
            match v {
                Value::Int(i) => {
                    int_total = int_total.and_then(|t| t.checked_add(*i));
                    float_total += *i as f64;
                }
                Value::Float(x) => {
                    int_total = None;
                    float_total += x;
                }
                other => return Err(PlyrError::type_mismatch("number", other.type_name())),
            }
        }
        let all_int = self.non_null().all(|v| matches!(v, Value::Int(_)));
        match (all_int, int_total) {
            (true, Some(total)) => Ok(Value::Int(total)),
            (true, None) => Err(PlyrError::backend("integer overflow in sum")),
            _ => Ok(Value::Float(float_total)),
        }
    }

    pub fn mean(&self) -> Result<Value> {
        let mut total = 0.0;
        let mut count = 0usize;
        for v in self.non_null() {
            total += v
                .as_f64()
                .ok_or_else(|| PlyrError::type_mismatch("number", v.type_name()))?;
            count += 1;
        }
        if count == 0 {
            return Ok(Value::Null);
        }
        Ok(Value::Float(total / count as f64))
    }

    pub fn min(&self) -> Value {
        self.non_null()
            .min_by(|a, b| compare_values(a, b))
            .cloned()
            .unwrap_or(Value::Null)
    }

    pub fn max(&self) -> Value {
        self.non_null()
            .max_by(|a, b| compare_values(a, b))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Row positions that sort this vector, stable, nulls last.
    pub fn order(&self, descending: bool) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| directed(&self.values[a], &self.values[b], descending));
        order
    }

    fn unsupported(&self, op: BinaryOp, other: &Value, reflected: bool) -> PlyrError {
        let (left, right) = if reflected {
            (other.type_name(), VECTOR.to_string())
        } else {
            (VECTOR.to_string(), other.type_name())
        };
        PlyrError::UnsupportedOperand {
            op: op.symbol(),
            left,
            right,
        }
    }
}

impl FromIterator<Value> for Vector {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl From<Vec<i64>> for Vector {
    fn from(values: Vec<i64>) -> Self {
        values.into_iter().map(Value::Int).collect()
    }
}

impl From<Vec<f64>> for Vector {
    fn from(values: Vec<f64>) -> Self {
        values.into_iter().map(Value::Float).collect()
    }
}

impl From<Vec<bool>> for Vector {
    fn from(values: Vec<bool>) -> Self {
        values.into_iter().map(Value::Bool).collect()
    }
}

impl From<Vec<&str>> for Vector {
    fn from(values: Vec<&str>) -> Self {
        values.into_iter().map(Value::from).collect()
    }
}

impl From<Vec<Value>> for Vector {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

impl DataObject for Vector {
    fn type_key(&self) -> TypeKey {
        VECTOR
    }

    fn ancestry(&self) -> Vec<TypeKey> {
        vec![SEQUENCE]
    }

    fn get_attr(&self, name: &str) -> Result<Value> {
        match name {
            "len" => Ok(Value::Int(self.len() as i64)),
            _ => Err(PlyrError::AttributeNotFound {
                type_key: VECTOR.to_string(),
                name: name.to_string(),
            }),
        }
    }

    fn get_index(&self, key: &Value) -> Result<Value> {
        let not_found = || PlyrError::KeyNotFound {
            type_key: VECTOR.to_string(),
            key: key.to_string(),
        };
        let i = key.as_i64().ok_or_else(not_found)?;
        let len = self.len() as i64;
        let pos = if i < 0 { len + i } else { i };
        if (0..len).contains(&pos) {
            Ok(self.values[pos as usize].clone())
        } else {
            Err(not_found())
        }
    }

    fn binary_op(&self, op: BinaryOp, other: &Value, reflected: bool) -> Result<Value> {
        let rhs: &[Value] = match other {
            Value::Data(d) => match d.as_any().downcast_ref::<Vector>() {
                Some(v) => v.values(),
                None => return Err(self.unsupported(op, other, reflected)),
            },
            Value::List(_)
            | Value::Groups(_)
            | Value::Function(_)
            | Value::Verb(_)
            | Value::Expr(_) => return Err(self.unsupported(op, other, reflected)),
            scalar => std::slice::from_ref(scalar),
        };

        let (n, m) = (self.len(), rhs.len());
        let len = match (n, m) {
            _ if n == m => n,
            (1, _) => m,
            (_, 1) => n,
            _ => {
                return Err(PlyrError::backend(format!(
                    "length mismatch in '{}': {} vs {}",
                    op, n, m
                )))
            }
        };

        let mut out = Vec::with_capacity(len);
        for i in 0..len {
            let a = &self.values[if n == 1 { 0 } else { i }];
            let b = &rhs[if m == 1 { 0 } else { i }];
            out.push(if reflected {
                value::binary(op, b, a)?
            } else {
                value::binary(op, a, b)?
            });
        }
        Ok(Vector::new(out).into_value())
    }

    fn unary_op(&self, op: UnaryOp) -> Result<Value> {
        let out = self
            .values
            .iter()
            .map(|v| value::unary(op, v))
            .collect::<Result<Vec<_>>>()?;
        Ok(Vector::new(out).into_value())
    }

    fn eq_data(&self, other: &dyn DataObject) -> bool {
        other
            .as_any()
            .downcast_ref::<Vector>()
            .is_some_and(|o| o == self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Total order used for sorting and min/max: nulls last, numbers by value,
/// then by type name for mixed types.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => a.type_name().cmp(&b.type_name()),
        },
    }
}

/// [`compare_values`] with the direction applied to non-null values only.
pub(crate) fn directed(a: &Value, b: &Value, descending: bool) -> Ordering {
    if descending && !a.is_null() && !b.is_null() {
        compare_values(b, a)
    } else {
        compare_values(a, b)
    }
}

/// Coerce a predicate result to a row mask of length `len`. Null counts as false.
pub(crate) fn to_mask(value: &Value, len: usize) -> Result<Vec<bool>> {
    let bit = |v: &Value| match v {
        Value::Bool(b) => Ok(*b),
        Value::Null => Ok(false),
        other => Err(PlyrError::type_mismatch("bool", other.type_name())),
    };
    match value {
        Value::Data(_) => {
            let v = value.expect_data::<Vector>("bool vector")?;
            match v.len() {
                n if n == len => v.iter().map(bit).collect(),
                1 => Ok(vec![bit(&v.values[0])?; len]),
                n => Err(PlyrError::backend(format!(
                    "predicate has {} values, expected {}",
                    n, len
                ))),
            }
        }
        scalar => Ok(vec![bit(scalar)?; len]),
    }
}

/// Coerce a column result to exactly `len` values, broadcasting scalars and
/// length-one vectors.
pub(crate) fn to_column(value: &Value, len: usize) -> Result<Vector> {
    match value {
        Value::Data(_) => {
            let v = value.expect_data::<Vector>("vector")?;
            match v.len() {
                n if n == len => Ok(v.clone()),
                1 => Ok(Vector::repeat(&v.values[0], len)),
                n => Err(PlyrError::backend(format!(
                    "column has {} values, expected {}",
                    n, len
                ))),
            }
        }
        Value::List(items) if items.len() == len => Ok(Vector::new(items.clone())),
        Value::List(_) | Value::Groups(_) | Value::Function(_) | Value::Verb(_) | Value::Expr(_) => {
            Err(PlyrError::type_mismatch("column", value.type_name()))
        }
        scalar => Ok(Vector::repeat(scalar, len)),
    }
}

/// Collapse a per-group aggregation result to a single value.
pub(crate) fn to_scalar(value: &Value) -> Result<Value> {
    match value {
        Value::Data(_) => {
            let v = value.expect_data::<Vector>("vector")?;
            match v.len() {
                1 => Ok(v.values[0].clone()),
                n => Err(PlyrError::backend(format!(
                    "aggregate produced {} values, expected 1",
                    n
                ))),
            }
        }
        Value::List(_) | Value::Groups(_) | Value::Function(_) | Value::Verb(_) | Value::Expr(_) => {
            Err(PlyrError::type_mismatch("scalar", value.type_name()))
        }
        scalar => Ok(scalar.clone()),
    }
}

// ==================== Plugin ====================

fn subject(args: &VerbArgs) -> Result<&Vector> {
    args.subject.expect_data::<Vector>("vector")
}

fn descending(args: &VerbArgs) -> bool {
    args.kwarg("descending")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Descriptor for the vector backend.
pub fn descriptor() -> PluginDescriptor {
    PluginDescriptor::new(PLUGIN_NAME)
        .owns(VECTOR)
        .verb("n", |args| Ok(Value::Int(subject(&args)?.len() as i64)))
        .verb("sum", |args| subject(&args)?.sum())
        .verb("mean", |args| subject(&args)?.mean())
        .verb("min", |args| Ok(subject(&args)?.min()))
        .verb("max", |args| Ok(subject(&args)?.max()))
        .verb("filter", |args| {
            let v = subject(&args)?;
            let mut keep = vec![true; v.len()];
            for predicate in &args.args {
                for (k, bit) in keep.iter_mut().zip(to_mask(predicate, v.len())?) {
                    *k &= bit;
                }
            }
            let rows: Vec<usize> = (0..v.len()).filter(|&i| keep[i]).collect();
            Ok(v.take(&rows).into_value())
        })
        .verb("arrange", |args| {
            let v = subject(&args)?;
            Ok(v.take(&v.order(descending(&args))).into_value())
        })
}

#[distributed_slice(PLUGINS)]
static VECTOR_PLUGIN: PluginFactory = descriptor;
