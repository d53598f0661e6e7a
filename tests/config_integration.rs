//! Integration tests for configuration files
//!
//! Config files are written to a temp dir, loaded, and fed into a registry.

mod common;

use common::builders;
use plyr_rs::backends;
use plyr_rs::{Dispatcher, PlyrConfig, PlyrError, PluginOverride};
use std::sync::Arc;
use tempfile::TempDir;

const OVERRIDES: &str = r#"
[dispatch]
max_depth = 8

[plugins.vector]
priority = 7

[plugins.frame]
enabled = false
"#;

#[test]
fn test_toml_overrides_reach_the_registry() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plyr.toml");
    std::fs::write(&path, OVERRIDES).unwrap();

    let config = PlyrConfig::load(&path).unwrap();
    let registry = Arc::new(backends::builtin_registry(&config).unwrap());

    assert_eq!(registry.get("vector").unwrap().get_priority(), 7);
    assert!(!registry.get("frame").unwrap().is_enabled());

    let d = Dispatcher::new(registry);
    assert_eq!(d.settings().max_depth, 8);
    let err = d.call("n", vec![builders::people().into()]).unwrap_err();
    assert!(matches!(err, PlyrError::NoBackendForType(ref t) if t == "frame"));
}

#[test]
fn test_save_then_load_json_and_toml() {
    let dir = TempDir::new().unwrap();
    let mut config = PlyrConfig::default();
    config.dispatch.max_depth = 12;
    config.set_plugin(
        "frame",
        PluginOverride {
            enabled: None,
            priority: Some(-1),
        },
    );

    let toml_path = dir.path().join("nested").join("plyr.toml");
    config.save(&toml_path).unwrap();
    assert_eq!(PlyrConfig::load(&toml_path).unwrap(), config);

    let json_path = dir.path().join("plyr.json");
    std::fs::write(&json_path, serde_json::to_string(&config).unwrap()).unwrap();
    assert_eq!(PlyrConfig::load(&json_path).unwrap(), config);
}

#[test]
fn test_missing_and_invalid_files() {
    let dir = TempDir::new().unwrap();

    let err = PlyrConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, PlyrError::WithContext { .. }));

    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "[dispatch]\nmax_depth = \"deep\"\n").unwrap();
    assert!(matches!(
        PlyrConfig::load(&bad),
        Err(PlyrError::Config(_))
    ));
}
