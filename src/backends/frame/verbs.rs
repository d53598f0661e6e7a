//! Frame implementations of the table verbs.
//!
//! Every verb accepts a plain or grouped frame. Verbs that keep rows return
//! a frame grouped by whichever grouping columns are still present.

use super::grouped::GroupedFrame;
use super::table::Frame;
use crate::backends::vector::{self, Vector};
use crate::dispatch::{Arg, VerbArgs};
use crate::error::{PlyrError, Result};
use crate::value::{DataObject, Value};
use std::cmp::Ordering;
use std::collections::HashSet;

/// The subject of a frame verb.
enum Subject<'a> {
    Plain(&'a Frame),
    Grouped(&'a GroupedFrame),
}

impl<'a> Subject<'a> {
    fn of(args: &'a VerbArgs) -> Result<Self> {
        if let Some(g) = args.subject.downcast_ref::<GroupedFrame>() {
            return Ok(Subject::Grouped(g));
        }
        args.subject
            .expect_data::<Frame>("frame")
            .map(Subject::Plain)
    }

    fn frame(&self) -> &'a Frame {
        match self {
            Subject::Plain(f) => f,
            Subject::Grouped(g) => g.frame(),
        }
    }

    fn keys(&self) -> &'a [String] {
        match self {
            Subject::Plain(_) => &[],
            Subject::Grouped(g) => g.keys(),
        }
    }

    /// A column-shaped result: scattered back to row order when grouped.
    fn column(&self, value: &Value) -> Result<Vector> {
        match (self, value) {
            (Subject::Grouped(g), Value::Groups(per_group)) => g.scatter(per_group),
            _ => vector::to_column(value, self.frame().nrows()),
        }
    }

    /// Re-apply the grouping that survives in `frame`.
    fn regroup(&self, frame: Frame) -> Result<Value> {
        let keys: Vec<String> = self
            .keys()
            .iter()
            .filter(|k| frame.has_column(k))
            .cloned()
            .collect();
        regroup(frame, keys)
    }
}

fn regroup(frame: Frame, keys: Vec<String>) -> Result<Value> {
    if keys.is_empty() {
        Ok(frame.into_value())
    } else {
        Ok(GroupedFrame::new(frame, keys)?.into_value())
    }
}

fn names(values: &[Value]) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        for name in value.to_names()? {
            if !out.contains(&name) {
                out.push(name);
            }
        }
    }
    Ok(out)
}

pub(super) fn select(args: VerbArgs) -> Result<Value> {
    let subject = Subject::of(&args)?;
    let mut columns: Vec<String> = subject.keys().to_vec();
    for name in names(&args.args)? {
        if !columns.contains(&name) {
            columns.push(name);
        }
    }
    let frame = subject.frame().project(&columns)?;
    subject.regroup(frame)
}

pub(super) fn filter(args: VerbArgs) -> Result<Value> {
    let subject = Subject::of(&args)?;
    let nrows = subject.frame().nrows();
    let mut keep = vec![true; nrows];
    for predicate in &args.args {
        let mask = vector::to_mask(&subject.column(predicate)?.into_value(), nrows)?;
        for (k, bit) in keep.iter_mut().zip(mask) {
            *k &= bit;
        }
    }
    let rows: Vec<usize> = (0..nrows).filter(|&i| keep[i]).collect();
    subject.regroup(subject.frame().take(&rows))
}

pub(super) fn mutate(args: VerbArgs) -> Result<Value> {
    if !args.args.is_empty() {
        return Err(PlyrError::MalformedCall(
            "mutate() takes named columns only".to_string(),
        ));
    }
    let subject = Subject::of(&args)?;
    let mut frame = subject.frame().clone();
    for (name, value) in &args.kwargs {
        if value.is_null() {
            frame.remove_column(name);
            continue;
        }
        frame.set_column(name.clone(), subject.column(value)?)?;
    }
    subject.regroup(frame)
}

pub(super) fn rename(args: VerbArgs) -> Result<Value> {
    let subject = Subject::of(&args)?;
    let mut renames = Vec::with_capacity(args.kwargs.len());
    for (new, old) in &args.kwargs {
        let old = old
            .as_str()
            .ok_or_else(|| PlyrError::type_mismatch("column name", old.type_name()))?;
        renames.push((new.clone(), old.to_string()));
    }
    let frame = subject.frame().rename(&renames)?;
    let keys = subject
        .keys()
        .iter()
        .map(|k| {
            renames
                .iter()
                .find(|(_, old)| old == k)
                .map(|(new, _)| new.clone())
                .unwrap_or_else(|| k.clone())
        })
        .collect();
    regroup(frame, keys)
}

pub(super) fn arrange(args: VerbArgs) -> Result<Value> {
    let subject = Subject::of(&args)?;
    let frame = subject.frame();
    let descending = args
        .kwarg("descending")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let keys = args
        .args
        .iter()
        .map(|k| subject.column(k))
        .collect::<Result<Vec<_>>>()?;

    let mut order: Vec<usize> = (0..frame.nrows()).collect();
    order.sort_by(|&a, &b| {
        keys.iter()
            .map(|k| vector::directed(&k.values()[a], &k.values()[b], descending))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    subject.regroup(frame.take(&order))
}

pub(super) fn group_by(args: VerbArgs) -> Result<Value> {
    let subject = Subject::of(&args)?;
    let keys = names(&args.args)?;
    regroup(subject.frame().clone(), keys)
}

pub(super) fn ungroup(args: VerbArgs) -> Result<Value> {
    Ok(Subject::of(&args)?.frame().clone().into_value())
}

pub(super) fn summarise(args: VerbArgs) -> Result<Value> {
    let subject = Subject::of(&args)?;
    match subject {
        Subject::Plain(_) => {
            let mut out = Frame::new();
            for (name, value) in &args.kwargs {
                out.set_column(name.clone(), Vector::new(vec![vector::to_scalar(value)?]))?;
            }
            Ok(out.into_value())
        }
        Subject::Grouped(g) => {
            let mut out = Frame::new();
            for (i, key) in g.keys().iter().enumerate() {
                let column = g.groups().iter().map(|grp| grp.key[i].clone()).collect();
                out.set_column(key.clone(), column)?;
            }
            for (name, value) in &args.kwargs {
                let column = match value {
                    Value::Groups(per_group) => per_group
                        .iter()
                        .map(vector::to_scalar)
                        .collect::<Result<Vector>>()?,
                    other => Vector::repeat(&vector::to_scalar(other)?, g.ngroups()),
                };
                out.set_column(name.clone(), column)?;
            }
            // one level of grouping is peeled off
            let keys = g.keys()[..g.keys().len().saturating_sub(1)].to_vec();
            regroup(out, keys)
        }
    }
}

pub(super) fn pull(args: VerbArgs) -> Result<Value> {
    let subject = Subject::of(&args)?;
    let frame = subject.frame();
    let key = args.arg(0).cloned().unwrap_or(Value::Int(-1));
    match key {
        Value::Str(_) | Value::Int(_) => frame.get_index(&key),
        other => Err(PlyrError::type_mismatch("column name or position", other.type_name())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum JoinKind {
    Inner,
    Left,
}

/// Join `suffix` keyword: a pair of non-empty strings, left then right.
fn join_suffixes(args: &VerbArgs) -> Result<(String, String)> {
    let pair = match args.kwarg("suffix") {
        Some(value) if !value.is_null() => value.to_names()?,
        _ => return Ok(("_x".to_string(), "_y".to_string())),
    };
    match pair.as_slice() {
        [left, right] if !left.is_empty() && !right.is_empty() => {
            Ok((left.clone(), right.clone()))
        }
        _ => Err(PlyrError::backend(
            "join suffix must be two non-empty strings",
        )),
    }
}

/// Output names for a join: `(left names, right non-key names)`.
///
/// Shared non-key columns take their side's suffix. Unsuffixed names are
/// claimed first; a suffixed name that is still taken gets its suffix again.
fn join_names(
    left: &Frame,
    right: &Frame,
    by: &[String],
    suffixes: &(String, String),
) -> (Vec<String>, Vec<String>) {
    let is_key = |name: &str| by.iter().any(|b| b == name);
    let shared = |name: &str| !is_key(name) && left.has_column(name) && right.has_column(name);
    let right_cols: Vec<&str> = right.column_names().filter(|n| !is_key(*n)).collect();

    let mut taken: HashSet<String> = left
        .column_names()
        .chain(right_cols.iter().copied())
        .filter(|n| !shared(*n))
        .map(str::to_string)
        .collect();
    let mut claim = |name: &str, suffix: &str| {
        if !shared(name) {
            return name.to_string();
        }
        let mut target = format!("{}{}", name, suffix);
        while taken.contains(&target) {
            target.push_str(suffix);
        }
        taken.insert(target.clone());
        target
    };

    let left_names = left.column_names().map(|n| claim(n, &suffixes.0)).collect();
    let right_names = right_cols.iter().map(|n| claim(*n, &suffixes.1)).collect();
    (left_names, right_names)
}

pub(super) fn join(args: VerbArgs, kind: JoinKind) -> Result<Value> {
    let subject = Subject::of(&args)?;
    let left = subject.frame();
    let other = args.require_arg(0, "a frame to join")?;
    let right = match other.downcast_ref::<GroupedFrame>() {
        Some(g) => g.frame(),
        None => other.expect_data::<Frame>("frame")?,
    };

    let by = match args.kwarg("by") {
        Some(value) if !value.is_null() => value.to_names()?,
        _ => left
            .column_names()
            .filter(|n| right.has_column(n))
            .map(str::to_string)
            .collect(),
    };
    if by.is_empty() {
        return Err(PlyrError::backend("join needs at least one shared column"));
    }
    for name in &by {
        left.require(name)?;
        right.require(name)?;
    }
    let suffixes = join_suffixes(&args)?;

    let right_keys = (0..right.nrows())
        .map(|row| right.row_key(row, &by))
        .collect::<Result<Vec<_>>>()?;

    let mut left_rows = Vec::new();
    let mut right_rows: Vec<Option<usize>> = Vec::new();
    for row in 0..left.nrows() {
        let key = left.row_key(row, &by)?;
        let mut matched = false;
        for (r, rk) in right_keys.iter().enumerate() {
            if *rk == key {
                left_rows.push(row);
                right_rows.push(Some(r));
                matched = true;
            }
        }
        if !matched && kind == JoinKind::Left {
            left_rows.push(row);
            right_rows.push(None);
        }
    }

    let (left_names, right_names) = join_names(left, right, &by, &suffixes);
    let mut out = Frame::new();
    for ((_, column), name) in left.columns().zip(left_names) {
        out.set_column(name, column.take(&left_rows))?;
    }
    let right_columns = right.columns().filter(|(n, _)| !by.iter().any(|b| b.as_str() == *n));
    for ((_, column), name) in right_columns.zip(right_names) {
        let values: Vector = right_rows
            .iter()
            .map(|r| r.map_or(Value::Null, |r| column.values()[r].clone()))
            .collect();
        out.set_column(name, values)?;
    }
    subject.regroup(out)
}

pub(super) fn count(args: VerbArgs) -> Result<Value> {
    let subject = Subject::of(&args)?;
    let mut keys: Vec<String> = subject.keys().to_vec();
    for name in names(&args.args)? {
        if !keys.contains(&name) {
            keys.push(name);
        }
    }

    let frame = subject.frame();
    let mut out = Frame::new();
    if keys.is_empty() {
        out.set_column("n", Vector::new(vec![Value::Int(frame.nrows() as i64)]))?;
        return Ok(out.into_value());
    }

    let grouped = GroupedFrame::new(frame.clone(), keys.clone())?;
    for (i, key) in keys.iter().enumerate() {
        let column = grouped.groups().iter().map(|g| g.key[i].clone()).collect();
        out.set_column(key.clone(), column)?;
    }
    let counts = grouped
        .groups()
        .iter()
        .map(|g| Value::Int(g.rows.len() as i64))
        .collect();
    out.set_column("n", counts)?;
    regroup(out, subject.keys().to_vec())
}

pub(super) fn n(args: VerbArgs) -> Result<Value> {
    match Subject::of(&args)? {
        Subject::Plain(f) => Ok(Value::Int(f.nrows() as i64)),
        Subject::Grouped(g) => Ok(Value::Groups(
            g.groups()
                .iter()
                .map(|grp| Value::Int(grp.rows.len() as i64))
                .collect(),
        )),
    }
}

/// `sum(dataset.x)` and friends: hand the evaluated column to whichever
/// backend owns it.
pub(super) fn aggregate(args: VerbArgs) -> Result<Value> {
    let column = args.require_arg(0, "a column")?;
    match column {
        Value::Groups(per_group) => per_group
            .iter()
            .map(|v| args.call(&args.verb, vec![Arg::Value(v.clone())]))
            .collect::<Result<Vec<_>>>()
            .map(Value::Groups),
        other => args.call(&args.verb, vec![Arg::Value(other.clone())]),
    }
}

/// Column names matching any of the patterns in argument 0 (a string or a
/// list of strings).
///
/// Keywords: `ignore_case` (default true) and `vars`, a list of names to
/// match against instead of the frame's columns.
pub(super) fn match_names(args: VerbArgs, pred: fn(&str, &str) -> bool) -> Result<Value> {
    let subject = Subject::of(&args)?;
    let patterns = args.require_arg(0, "a pattern")?.to_names()?;
    let ignore_case = match args.kwarg("ignore_case") {
        None | Some(Value::Null) => true,
        Some(value) => value
            .as_bool()
            .ok_or_else(|| PlyrError::type_mismatch("bool", value.type_name()))?,
    };
    let vars = match args.kwarg("vars") {
        Some(value) if !value.is_null() => value.to_names()?,
        _ => subject.frame().column_names().map(str::to_string).collect(),
    };

    let fold = |s: &str| {
        if ignore_case {
            s.to_lowercase()
        } else {
            s.to_string()
        }
    };
    let patterns: Vec<String> = patterns.iter().map(|p| fold(p)).collect();
    Ok(Value::List(
        vars.into_iter()
            .filter(|name| {
                let name = fold(name);
                patterns.iter().any(|p| pred(&name, p))
            })
            .map(Value::from)
            .collect(),
    ))
}
