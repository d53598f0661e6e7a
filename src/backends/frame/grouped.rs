//! Grouped tables.
//!
//! Groups are ordered by the first row in which each key combination appears.
//! Per-group results are written back to row order with [`GroupedFrame::scatter`].

use super::table::{Frame, FRAME, TABLE};
use crate::backends::vector::Vector;
use crate::error::{PlyrError, Result};
use crate::value::{DataObject, TypeKey, Value};
use std::any::Any;

pub const GROUPED_FRAME: TypeKey = TypeKey::new("grouped_frame");

/// One key combination and the rows that carry it.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: Vec<Value>,
    pub rows: Vec<usize>,
}

/// A frame plus grouping metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedFrame {
    frame: Frame,
    keys: Vec<String>,
    groups: Vec<Group>,
}

impl GroupedFrame {
    /// Group `frame` by the named columns.
    pub fn new(frame: Frame, keys: Vec<String>) -> Result<Self> {
        let mut groups: Vec<Group> = Vec::new();
        for row in 0..frame.nrows() {
            let key = frame.row_key(row, &keys)?;
            match groups.iter_mut().find(|g| g.key == key) {
                Some(group) => group.rows.push(row),
                None => groups.push(Group {
                    key,
                    rows: vec![row],
                }),
            }
        }
        // validate keys even for an empty frame
        for key in &keys {
            frame.require(key)?;
        }
        Ok(Self {
            frame,
            keys,
            groups,
        })
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn into_frame(self) -> Frame {
        self.frame
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn ngroups(&self) -> usize {
        self.groups.len()
    }

    pub fn group_frame(&self, index: usize) -> Frame {
        self.frame.take(&self.groups[index].rows)
    }

    /// Write one value per group back to row order.
    ///
    /// A group's value may be a vector as long as the group, or anything that
    /// broadcasts (a scalar or a length-one vector).
    pub fn scatter(&self, per_group: &[Value]) -> Result<Vector> {
        if per_group.len() != self.groups.len() {
            return Err(PlyrError::backend(format!(
                "expected {} group results, got {}",
                self.groups.len(),
                per_group.len()
            )));
        }
        let mut out = vec![Value::Null; self.frame.nrows()];
        for (group, value) in self.groups.iter().zip(per_group) {
            let column = crate::backends::vector::to_column(value, group.rows.len())?;
            for (&row, v) in group.rows.iter().zip(column.into_values()) {
                out[row] = v;
            }
        }
        Ok(Vector::new(out))
    }

    pub fn into_value(self) -> Value {
        Value::data(self)
    }
}

impl DataObject for GroupedFrame {
    fn type_key(&self) -> TypeKey {
        GROUPED_FRAME
    }

    fn ancestry(&self) -> Vec<TypeKey> {
        vec![FRAME, TABLE]
    }

    fn get_attr(&self, name: &str) -> Result<Value> {
        self.frame.get_attr(name)
    }

    fn get_index(&self, key: &Value) -> Result<Value> {
        self.frame.get_index(key)
    }

    fn groups(&self) -> Option<Vec<Value>> {
        Some(
            (0..self.groups.len())
                .map(|i| self.group_frame(i).into_value())
                .collect(),
        )
    }

    fn eq_data(&self, other: &dyn DataObject) -> bool {
        other
            .as_any()
            .downcast_ref::<GroupedFrame>()
            .is_some_and(|o| o == self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
