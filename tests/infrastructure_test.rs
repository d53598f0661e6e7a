//! Test to verify test infrastructure works correctly

mod common;

use common::builders::{self, FrameBuilder};
use plyr_rs::backends::vector::Vector;

#[test]
fn test_infrastructure_setup() {
    // Test that builders work
    let frame = FrameBuilder::new()
        .column("x", vec![1.5, 2.5])
        .column("flag", vec![true, false])
        .build();

    assert_eq!(frame.nrows(), 2);
    assert_eq!(frame.column("x").unwrap(), &Vector::from(vec![1.5, 2.5]));

    let registry = builders::builtin_registry();
    assert_eq!(registry.names(), vec!["vector", "frame"]);
}

#[test]
fn test_float_comparison() {
    common::assert_float_eq(1.0, 1.0000001, 0.001);
}

#[test]
#[should_panic]
fn test_float_comparison_fails() {
    common::assert_float_eq(1.0, 2.0, 0.001);
}
