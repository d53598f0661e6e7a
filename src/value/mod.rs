//! Concrete values.
//!
//! [`Value`] is what expression evaluation produces and what verb
//! implementations receive. Scalars and lists are owned by the engine;
//! datasets are opaque [`DataObject`]s owned by backend plugins.

mod arith;
mod data;
mod function;
mod type_key;

pub use arith::{binary, unary};
pub use data::{DataObject, DataRef};
pub use function::{Function, NativeFn, VerbRef};
pub use type_key::{TypeInfo, TypeKey};

use crate::error::{PlyrError, Result};
use crate::expr::Expr;
use std::fmt;
use std::sync::Arc;

/// A concrete, evaluated value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    /// Per-group results of a grouped evaluation, in group order.
    Groups(Vec<Value>),
    /// Backend-owned dataset.
    Data(DataRef),
    Function(Function),
    Verb(VerbRef),
    /// Unevaluated expression, produced under a pending context.
    Expr(Expr),
}

impl Value {
    /// Wrap a backend data object.
    pub fn data<T: DataObject>(object: T) -> Self {
        Value::Data(Arc::new(object))
    }

    /// Dispatch key of this value.
    pub fn type_key(&self) -> TypeKey {
        match self {
            Value::Null => TypeKey::NULL,
            Value::Bool(_) => TypeKey::BOOL,
            Value::Int(_) => TypeKey::INT,
            Value::Float(_) => TypeKey::FLOAT,
            Value::Str(_) => TypeKey::STR,
            Value::List(_) => TypeKey::LIST,
            Value::Groups(_) => TypeKey::GROUPS,
            Value::Data(d) => d.type_key(),
            Value::Function(_) => TypeKey::FUNCTION,
            Value::Verb(_) => TypeKey::VERB,
            Value::Expr(_) => TypeKey::EXPR,
        }
    }

    /// Dispatch key plus ancestry.
    pub fn type_info(&self) -> TypeInfo {
        let ancestry = match self {
            Value::Int(_) | Value::Float(_) => vec![TypeKey::NUMBER, TypeKey::SCALAR],
            Value::Null | Value::Bool(_) | Value::Str(_) => vec![TypeKey::SCALAR],
            Value::Data(d) => d.ancestry(),
            _ => Vec::new(),
        };
        TypeInfo::new(self.type_key(), ancestry)
    }

    pub fn type_name(&self) -> String {
        self.type_key().to_string()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_groups(&self) -> Option<&[Value]> {
        match self {
            Value::Groups(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the backend object as a concrete type.
    pub fn downcast_ref<T: DataObject>(&self) -> Option<&T> {
        match self {
            Value::Data(d) => d.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Borrow the backend object as `T`, or fail with a type mismatch.
    pub fn expect_data<T: DataObject>(&self, expected: &str) -> Result<&T> {
        self.downcast_ref::<T>()
            .ok_or_else(|| PlyrError::type_mismatch(expected, self.type_name()))
    }

    /// Attribute access against this value.
    pub fn get_attr(&self, name: &str) -> Result<Value> {
        match self {
            Value::Data(d) => d.get_attr(name),
            Value::List(items) if name == "len" => Ok(Value::Int(items.len() as i64)),
            Value::Str(s) if name == "len" => Ok(Value::Int(s.chars().count() as i64)),
            _ => Err(PlyrError::AttributeNotFound {
                type_key: self.type_name(),
                name: name.to_string(),
            }),
        }
    }

    /// Index access against this value.
    pub fn get_index(&self, key: &Value) -> Result<Value> {
        match (self, key) {
            (Value::Data(d), _) => d.get_index(key),
            (Value::List(items), Value::Int(i)) | (Value::Groups(items), Value::Int(i)) => {
                let len = items.len() as i64;
                let pos = if *i < 0 { len + i } else { *i };
                if (0..len).contains(&pos) {
                    Ok(items[pos as usize].clone())
                } else {
                    Err(PlyrError::KeyNotFound {
                        type_key: self.type_name(),
                        key: key.to_string(),
                    })
                }
            }
            _ => Err(PlyrError::KeyNotFound {
                type_key: self.type_name(),
                key: key.to_string(),
            }),
        }
    }

    /// Flatten a string or a (possibly nested) list of strings into names.
    pub fn to_names(&self) -> Result<Vec<String>> {
        match self {
            Value::Str(s) => Ok(vec![s.clone()]),
            Value::List(items) => {
                let mut names = Vec::new();
                for item in items {
                    names.extend(item.to_names()?);
                }
                Ok(names)
            }
            other => Err(PlyrError::type_mismatch("column name", other.type_name())),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Groups(a), Value::Groups(b)) => a == b,
            (Value::Data(a), Value::Data(b)) => Arc::ptr_eq(a, b) || a.eq_data(&**b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Verb(a), Value::Verb(b)) => a == b,
            (Value::Expr(a), Value::Expr(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(items) | Value::Groups(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Data(d) => write!(f, "<{}>", d.type_key()),
            Value::Function(func) => write!(f, "<function {}>", func.name()),
            Value::Verb(verb) => write!(f, "<verb {}>", verb),
            Value::Expr(expr) => write!(f, "<expr {}>", expr),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Function> for Value {
    fn from(func: Function) -> Self {
        Value::Function(func)
    }
}

impl From<VerbRef> for Value {
    fn from(verb: VerbRef) -> Self {
        Value::Verb(verb)
    }
}
