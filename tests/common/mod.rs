//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use indexmap::IndexMap;
use plyr_rs::backends::frame::{Frame, GroupedFrame};
use plyr_rs::backends::vector::Vector;
use plyr_rs::{Arg, Value};

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

/// Keyword arguments from `(name, arg)` pairs, in order.
pub fn kwargs(pairs: Vec<(&str, Arg)>) -> IndexMap<String, Arg> {
    pairs
        .into_iter()
        .map(|(name, arg)| (name.to_string(), arg))
        .collect()
}

/// The frame inside a plain or grouped frame value.
pub fn frame_of(value: &Value) -> &Frame {
    value
        .downcast_ref::<Frame>()
        .or_else(|| value.downcast_ref::<GroupedFrame>().map(GroupedFrame::frame))
        .unwrap_or_else(|| panic!("expected a frame, got {}", value.type_name()))
}

/// Column `name` of a frame value.
pub fn column(value: &Value, name: &str) -> Vector {
    frame_of(value)
        .column(name)
        .unwrap_or_else(|| panic!("no column '{}'", name))
        .clone()
}
