//! Backend-owned data objects.
//!
//! The engine never looks inside a dataset. Everything it needs (dispatch key,
//! attribute and index access, operator semantics, grouping) goes through the
//! [`DataObject`] trait, which each backend implements for its own types.

use crate::error::{PlyrError, Result};
use crate::expr::{BinaryOp, UnaryOp};
use crate::value::{TypeKey, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a backend data object.
pub type DataRef = Arc<dyn DataObject>;

/// Interface between the engine and a backend's concrete data types.
pub trait DataObject: Any + Send + Sync + fmt::Debug {
    /// Dispatch key of this object.
    fn type_key(&self) -> TypeKey;

    /// Supertypes and capability tags, nearest first.
    fn ancestry(&self) -> Vec<TypeKey> {
        Vec::new()
    }

    /// Attribute access (`base.name`).
    fn get_attr(&self, name: &str) -> Result<Value> {
        Err(PlyrError::AttributeNotFound {
            type_key: self.type_key().to_string(),
            name: name.to_string(),
        })
    }

    /// Index access (`base[key]`).
    fn get_index(&self, key: &Value) -> Result<Value> {
        Err(PlyrError::KeyNotFound {
            type_key: self.type_key().to_string(),
            key: key.to_string(),
        })
    }

    /// Binary operator with `self` on the left, or on the right when
    /// `reflected` is set.
    fn binary_op(&self, op: BinaryOp, other: &Value, reflected: bool) -> Result<Value> {
        let (left, right) = if reflected {
            (other.type_name(), self.type_key().to_string())
        } else {
            (self.type_key().to_string(), other.type_name())
        };
        Err(PlyrError::UnsupportedOperand {
            op: op.symbol(),
            left,
            right,
        })
    }

    /// Unary operator.
    fn unary_op(&self, op: UnaryOp) -> Result<Value> {
        Err(PlyrError::UnsupportedOperand {
            op: op.symbol(),
            left: self.type_key().to_string(),
            right: String::new(),
        })
    }

    /// Ordered group sub-datasets, if this object carries grouping metadata.
    fn groups(&self) -> Option<Vec<Value>> {
        None
    }

    /// Structural equality with another data object.
    fn eq_data(&self, _other: &dyn DataObject) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;
}
