//! Column-oriented tables.

use crate::backends::vector::Vector;
use crate::error::{PlyrError, Result};
use crate::value::{DataObject, TypeKey, Value};
use indexmap::IndexMap;
use std::any::Any;

pub const FRAME: TypeKey = TypeKey::new("frame");
/// Capability tag shared by plain and grouped frames.
pub const TABLE: TypeKey = TypeKey::new("table");

/// Named, equal-length columns in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    columns: IndexMap<String, Vector>,
    nrows: usize,
    /// Row count was fixed by a source frame, even if no columns remain.
    rows_fixed: bool,
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.nrows == other.nrows && self.columns == other.columns
    }
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, column)` pairs. Every column must have the same length.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vector)>,
        S: Into<String>,
    {
        let mut frame = Frame::new();
        for (name, column) in columns {
            frame.set_column(name, column)?;
        }
        Ok(frame)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Vector> {
        self.columns.get(name)
    }

    /// Column by name, or `KeyNotFound`.
    pub fn require(&self, name: &str) -> Result<&Vector> {
        self.columns.get(name).ok_or_else(|| PlyrError::KeyNotFound {
            type_key: FRAME.to_string(),
            key: format!("{:?}", name),
        })
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Vector)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Add or replace a column.
    ///
    /// On a fresh frame the first column fixes the row count. Frames derived
    /// from another frame keep its row count even with no columns left.
    pub fn set_column(&mut self, name: impl Into<String>, column: Vector) -> Result<()> {
        let name = name.into();
        let fixed = self.rows_fixed || !self.columns.is_empty();
        let replacing_only =
            !self.rows_fixed && self.columns.len() == 1 && self.columns.contains_key(&name);
        if fixed && !replacing_only && column.len() != self.nrows {
            return Err(PlyrError::backend(format!(
                "column '{}' has {} rows, frame has {}",
                name,
                column.len(),
                self.nrows
            )));
        }
        self.nrows = column.len();
        self.columns.insert(name, column);
        Ok(())
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Vector> {
        let removed = self.columns.shift_remove(name);
        if removed.is_some() && self.columns.is_empty() {
            self.rows_fixed = true;
        }
        removed
    }

    /// Rows at `rows`, in that order.
    pub fn take(&self, rows: &[usize]) -> Frame {
        Frame {
            columns: self
                .columns
                .iter()
                .map(|(k, v)| (k.clone(), v.take(rows)))
                .collect(),
            nrows: rows.len(),
            rows_fixed: true,
        }
    }

    /// Only the named columns, in the order given.
    pub fn project(&self, names: &[String]) -> Result<Frame> {
        let mut out = Frame::new();
        for name in names {
            out.set_column(name.clone(), self.require(name)?.clone())?;
        }
        out.nrows = self.nrows;
        out.rows_fixed = self.rows_fixed || !self.columns.is_empty();
        Ok(out)
    }

    /// Rename columns in place, keeping their positions.
    pub fn rename(&self, renames: &[(String, String)]) -> Result<Frame> {
        for (_, old) in renames {
            self.require(old)?;
        }
        let columns = self
            .columns
            .iter()
            .map(|(name, column)| {
                let new = renames
                    .iter()
                    .find(|(_, old)| old == name)
                    .map(|(new, _)| new.clone())
                    .unwrap_or_else(|| name.clone());
                (new, column.clone())
            })
            .collect();
        Ok(Frame {
            columns,
            nrows: self.nrows,
            rows_fixed: self.rows_fixed,
        })
    }

    /// Values of `names` in `row`.
    pub fn row_key(&self, row: usize, names: &[String]) -> Result<Vec<Value>> {
        names
            .iter()
            .map(|name| Ok(self.require(name)?.values()[row].clone()))
            .collect()
    }

    pub fn into_value(self) -> Value {
        Value::data(self)
    }
}

impl DataObject for Frame {
    fn type_key(&self) -> TypeKey {
        FRAME
    }

    fn ancestry(&self) -> Vec<TypeKey> {
        vec![TABLE]
    }

    fn get_attr(&self, name: &str) -> Result<Value> {
        match self.columns.get(name) {
            Some(column) => Ok(column.clone().into_value()),
            None => Err(PlyrError::AttributeNotFound {
                type_key: FRAME.to_string(),
                name: name.to_string(),
            }),
        }
    }

    fn get_index(&self, key: &Value) -> Result<Value> {
        match key {
            Value::Str(name) => Ok(self.require(name)?.clone().into_value()),
            Value::Int(i) => {
                let len = self.columns.len() as i64;
                let pos = if *i < 0 { len + i } else { *i };
                self.columns
                    .get_index(usize::try_from(pos).unwrap_or(usize::MAX))
                    .map(|(_, column)| column.clone().into_value())
                    .ok_or_else(|| PlyrError::KeyNotFound {
                        type_key: FRAME.to_string(),
                        key: key.to_string(),
                    })
            }
            other => Err(PlyrError::KeyNotFound {
                type_key: FRAME.to_string(),
                key: other.to_string(),
            }),
        }
    }

    fn eq_data(&self, other: &dyn DataObject) -> bool {
        other
            .as_any()
            .downcast_ref::<Frame>()
            .is_some_and(|o| o == self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Frame {
        Frame::from_columns([
            ("x", Vector::from(vec![1i64, 2, 3])),
            ("y", Vector::from(vec!["a", "b", "c"])),
        ])
        .unwrap()
    }

    #[test]
    fn test_column_lengths_must_match() {
        let err = Frame::from_columns([
            ("x", Vector::from(vec![1i64, 2])),
            ("y", Vector::from(vec![1i64])),
        ])
        .unwrap_err();
        assert!(matches!(err, PlyrError::Backend(_)));
    }

    #[test]
    fn test_attr_and_index_access() {
        let f = sample();
        assert_eq!(
            f.get_attr("x").unwrap(),
            Vector::from(vec![1i64, 2, 3]).into_value()
        );
        assert_eq!(
            f.get_index(&Value::Int(-1)).unwrap(),
            Vector::from(vec!["a", "b", "c"]).into_value()
        );
        assert!(matches!(
            f.get_attr("z"),
            Err(PlyrError::AttributeNotFound { .. })
        ));
        assert!(matches!(
            f.get_index(&Value::from("z")),
            Err(PlyrError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_take_project_rename() {
        let f = sample();
        let taken = f.take(&[2, 0]);
        assert_eq!(taken.nrows(), 2);
        assert_eq!(taken.column("x").unwrap(), &Vector::from(vec![3i64, 1]));

        let projected = f.project(&["y".to_string()]).unwrap();
        assert_eq!(projected.column_names().collect::<Vec<_>>(), vec!["y"]);

        let renamed = f.rename(&[("z".to_string(), "x".to_string())]).unwrap();
        assert_eq!(renamed.column_names().collect::<Vec<_>>(), vec!["z", "y"]);
    }

    #[test]
    fn test_row_count_survives_dropping_every_column() {
        let mut empty = sample().project(&[]).unwrap();
        assert_eq!(empty.nrows(), 3);
        assert!(matches!(
            empty.set_column("z", Vector::from(vec![1i64])),
            Err(PlyrError::Backend(_))
        ));
        empty.set_column("z", Vector::from(vec![7i64, 8, 9])).unwrap();
        assert_eq!(empty.nrows(), 3);

        let mut none_taken = sample().take(&[]).project(&[]).unwrap();
        assert!(none_taken.set_column("z", Vector::from(vec![1i64])).is_err());

        let mut f = sample();
        f.remove_column("x");
        f.remove_column("y");
        assert_eq!(f.nrows(), 3);
        assert!(f.set_column("x", Vector::from(vec![1i64, 2])).is_err());

        // a fresh frame takes its row count from the first column
        let mut fresh = Frame::new();
        fresh.set_column("x", Vector::from(vec![1i64])).unwrap();
        assert_eq!(fresh.nrows(), 1);
    }
}
