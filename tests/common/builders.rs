//! Test data builders for frames, registries and stub backends

use plyr_rs::backends::frame::Frame;
use plyr_rs::backends::vector::Vector;
use plyr_rs::backends;
use plyr_rs::{DataObject, Dispatcher, PluginDescriptor, PlyrConfig, Registry, TypeKey, Value};
use std::any::Any;
use std::sync::{Arc, Mutex};

/// Builder for test frames.
#[derive(Default)]
pub struct FrameBuilder {
    columns: Vec<(String, Vector)>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, name: &str, column: impl Into<Vector>) -> Self {
        self.columns.push((name.to_string(), column.into()));
        self
    }

    pub fn build(self) -> Frame {
        Frame::from_columns(self.columns).expect("test frame columns must line up")
    }

    pub fn value(self) -> Value {
        self.build().into_value()
    }
}

/// Four people in two teams.
pub fn people() -> Value {
    FrameBuilder::new()
        .column("name", vec!["ann", "bob", "cat", "dan"])
        .column("team", vec!["red", "blue", "red", "blue"])
        .column("score", vec![3i64, 5, 4, 1])
        .value()
}

/// Two numeric columns for arithmetic checks.
pub fn xy() -> Value {
    FrameBuilder::new()
        .column("x", vec![1i64, 2, 3])
        .column("y", vec![10i64, 20, 30])
        .value()
}

/// Isolated registry with the bundled backends.
pub fn builtin_registry() -> Arc<Registry> {
    Arc::new(backends::builtin_registry(&PlyrConfig::default()).expect("builtin backends register"))
}

pub fn dispatcher() -> Dispatcher {
    Dispatcher::new(builtin_registry())
}

/// A data type no bundled backend owns.
pub const OPAQUE: TypeKey = TypeKey::new("opaque");

#[derive(Debug, Clone, PartialEq)]
pub struct Opaque(pub i64);

impl DataObject for Opaque {
    fn type_key(&self) -> TypeKey {
        OPAQUE
    }

    fn get_attr(&self, name: &str) -> plyr_rs::Result<Value> {
        match name {
            "inner" => Ok(Value::Int(self.0)),
            _ => Err(plyr_rs::PlyrError::AttributeNotFound {
                type_key: OPAQUE.to_string(),
                name: name.to_string(),
            }),
        }
    }

    fn eq_data(&self, other: &dyn DataObject) -> bool {
        other
            .as_any()
            .downcast_ref::<Opaque>()
            .is_some_and(|o| o == self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Shared log of which stub implementation ran.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Descriptor whose verbs record `"<plugin>:<verb>"` and echo the subject.
pub fn recording_plugin(
    name: &str,
    owns: TypeKey,
    priority: i32,
    verbs: &[&str],
    log: &CallLog,
) -> PluginDescriptor {
    let mut descriptor = PluginDescriptor::new(name).owns(owns).priority(priority);
    for verb in verbs {
        let log = log.clone();
        let tag = format!("{}:{}", name, verb);
        descriptor = descriptor.verb(*verb, move |args| {
            log.lock().unwrap().push(tag.clone());
            Ok(args.subject)
        });
    }
    descriptor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_builder() {
        let frame = FrameBuilder::new()
            .column("a", vec![1i64, 2])
            .column("b", vec!["x", "y"])
            .build();
        assert_eq!(frame.nrows(), 2);
        assert_eq!(frame.column_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
