//! Integration tests for the plugin registry
//!
//! - Register/unregister round trips restore lookup results
//! - Lookup order is priority first, registration order second
//! - Trait-object backends are driven through the same dispatch path
//! - The process-wide registry is shared

mod common;

use common::builders::{self, recording_plugin, CallLog, Opaque, OPAQUE};
use common::mock_helpers::described_mock;
use plyr_rs::backends::frame::FRAME;
use plyr_rs::registry::{self, PLUGINS};
use plyr_rs::{Dispatcher, PluginDescriptor, PlyrError, Registry, TypeKey, Value};
use proptest::prelude::*;
use serial_test::serial;
use std::sync::Arc;

fn names(plugins: &[Arc<PluginDescriptor>]) -> Vec<String> {
    plugins.iter().map(|p| p.name().to_string()).collect()
}

#[test]
fn test_register_unregister_round_trip() {
    let registry = builders::builtin_registry();
    let before = names(&registry.lookup_key(&FRAME).unwrap());

    let log = CallLog::default();
    registry
        .register(recording_plugin("shadow", FRAME, 99, &["select"], &log))
        .unwrap();
    assert_eq!(names(&registry.lookup_key(&FRAME).unwrap())[0], "shadow");

    let removed = registry.unregister("shadow").unwrap();
    assert_eq!(removed.name(), "shadow");
    assert_eq!(names(&registry.lookup_key(&FRAME).unwrap()), before);
}

#[test]
fn test_round_trip_on_unclaimed_type() {
    let registry = builders::builtin_registry();
    assert!(matches!(
        registry.lookup_key(&OPAQUE),
        Err(PlyrError::NoBackendForType(_))
    ));

    let log = CallLog::default();
    registry
        .register(recording_plugin("opaque", OPAQUE, 0, &["touch"], &log))
        .unwrap();
    assert!(registry.lookup_key(&OPAQUE).is_ok());

    registry.unregister("opaque").unwrap();
    assert!(matches!(
        registry.lookup_key(&OPAQUE),
        Err(PlyrError::NoBackendForType(_))
    ));
}

#[test]
fn test_duplicate_and_unknown_names() {
    let registry = builders::builtin_registry();
    let err = registry
        .register(plyr_rs::backends::vector::descriptor())
        .unwrap_err();
    assert!(matches!(err, PlyrError::DuplicatePlugin(ref n) if n == "vector"));

    assert!(matches!(
        registry.unregister("nope"),
        Err(PlyrError::UnknownPlugin(_))
    ));
}

#[test]
fn test_mock_backend_is_dispatched_through_descriptor() {
    let mut mock = described_mock("mocked", OPAQUE, 3, "touch");
    mock.expect_call().times(1).returning(|verb, args| {
        assert_eq!(verb, "touch");
        args.subject.get_attr("inner")
    });

    let registry = Registry::new();
    registry
        .register(PluginDescriptor::from_backend(Arc::new(mock)))
        .unwrap();
    let d = Dispatcher::new(Arc::new(registry));

    let out = d.call("touch", vec![Value::data(Opaque(41)).into()]).unwrap();
    assert_eq!(out, Value::Int(41));

    let plugin = d.registry().get("mocked").unwrap();
    assert_eq!(plugin.get_priority(), 3);
    assert!(plugin.claims(&OPAQUE));
}

#[test]
fn test_mock_backend_errors_pass_through() {
    let mut mock = described_mock("grumpy", OPAQUE, 0, "touch");
    mock.expect_call()
        .returning(|_, _| Err(PlyrError::backend("refused")));

    let registry = Registry::new();
    registry
        .register(PluginDescriptor::from_backend(Arc::new(mock)))
        .unwrap();
    let d = Dispatcher::new(Arc::new(registry));

    let err = d.call("touch", vec![Value::data(Opaque(0)).into()]).unwrap_err();
    assert_eq!(err.to_string(), "refused");
}

#[test]
#[serial]
fn test_global_registry_is_shared() {
    let a = registry::global();
    let b = registry::global();
    assert!(Arc::ptr_eq(&a, &b));

    let log = CallLog::default();
    a.register(recording_plugin("global_probe", OPAQUE, 0, &["touch"], &log))
        .unwrap();
    assert!(b.get("global_probe").is_some());
    b.unregister("global_probe").unwrap();
    assert!(a.get("global_probe").is_none());
}

#[test]
#[serial]
fn test_global_registry_holds_every_discovered_plugin() {
    let global = registry::global();
    for factory in PLUGINS.iter() {
        let name = factory().name().to_string();
        assert!(global.get(&name).is_some(), "plugin '{}' not registered", name);
    }
}

proptest! {
    #[test]
    fn prop_lookup_orders_by_priority_then_registration(
        priorities in prop::collection::vec(-5i32..5, 1..12),
    ) {
        let registry = Registry::new();
        let key = TypeKey::new("prop");
        let log = CallLog::default();
        for (i, priority) in priorities.iter().enumerate() {
            registry
                .register(recording_plugin(&format!("p{}", i), key.clone(), *priority, &["touch"], &log))
                .unwrap();
        }

        let mut expected: Vec<usize> = (0..priorities.len()).collect();
        // stable sort keeps registration order among equal priorities
        expected.sort_by(|a, b| priorities[*b].cmp(&priorities[*a]));
        let expected: Vec<String> = expected.into_iter().map(|i| format!("p{}", i)).collect();

        prop_assert_eq!(names(&registry.lookup_key(&key).unwrap()), expected);
    }
}
