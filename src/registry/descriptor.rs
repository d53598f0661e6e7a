//! Plugin descriptors.
//!
//! Two ways to describe a backend:
//! - **Closure map**: build a [`PluginDescriptor`] directly and attach one
//!   [`VerbImpl`] per verb. This is what the bundled backends do.
//! - **`Backend` trait**: implement [`Backend`] on a type and wrap it with
//!   [`PluginDescriptor::from_backend`].
//!
//! Either way the registry only ever sees descriptors.

use crate::dispatch::VerbArgs;
use crate::error::Result;
use crate::eval::ContextKind;
use crate::value::{TypeKey, Value};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Signature of a backend verb implementation.
pub type VerbFn = dyn Fn(VerbArgs) -> Result<Value> + Send + Sync;

/// One backend's implementation of one verb.
#[derive(Clone)]
pub struct VerbImpl {
    func: Arc<VerbFn>,
    context: ContextKind,
    extra_contexts: HashMap<String, ContextKind>,
}

impl VerbImpl {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(VerbArgs) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            context: ContextKind::Eval,
            extra_contexts: HashMap::new(),
        }
    }

    /// Context kind used for arguments without an override.
    pub fn with_context(mut self, kind: ContextKind) -> Self {
        self.context = kind;
        self
    }

    /// Context kind for a single keyword argument.
    pub fn with_extra_context(mut self, keyword: impl Into<String>, kind: ContextKind) -> Self {
        self.extra_contexts.insert(keyword.into(), kind);
        self
    }

    pub fn context(&self) -> ContextKind {
        self.context
    }

    /// Context kind for a keyword, or the default for positional arguments.
    pub fn context_for(&self, keyword: Option<&str>) -> ContextKind {
        keyword
            .and_then(|k| self.extra_contexts.get(k).copied())
            .unwrap_or(self.context)
    }

    pub fn call(&self, args: VerbArgs) -> Result<Value> {
        (self.func)(args)
    }
}

impl fmt::Debug for VerbImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerbImpl")
            .field("context", &self.context)
            .field("extra_contexts", &self.extra_contexts)
            .finish_non_exhaustive()
    }
}

/// Trait for backends that prefer an object over a closure map.
pub trait Backend: Send + Sync {
    /// Unique plugin name.
    fn name(&self) -> String;

    /// Data types this backend owns.
    fn owns(&self) -> Vec<TypeKey>;

    fn priority(&self) -> i32 {
        0
    }

    /// Verbs this backend implements.
    fn verbs(&self) -> Vec<String>;

    /// Context kind used to evaluate the arguments of `verb`.
    fn context(&self, _verb: &str) -> ContextKind {
        ContextKind::Eval
    }

    fn call(&self, verb: &str, args: VerbArgs) -> Result<Value>;
}

/// Identifies a backend and everything dispatch needs to know about it.
#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    name: String,
    owns: Vec<TypeKey>,
    priority: i32,
    enabled: bool,
    verbs: IndexMap<String, VerbImpl>,
}

impl PluginDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owns: Vec::new(),
            priority: 0,
            enabled: true,
            verbs: IndexMap::new(),
        }
    }

    /// Claim a data type.
    pub fn owns(mut self, key: impl Into<TypeKey>) -> Self {
        let key = key.into();
        if !self.owns.contains(&key) {
            self.owns.push(key);
        }
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Attach a verb implementation evaluated in the default context.
    pub fn verb<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(VerbArgs) -> Result<Value> + Send + Sync + 'static,
    {
        self.verb_impl(name, VerbImpl::new(func))
    }

    /// Attach a fully configured verb implementation. Replaces any earlier
    /// implementation of the same verb.
    pub fn verb_impl(mut self, name: impl Into<String>, verb: VerbImpl) -> Self {
        self.verbs.insert(name.into(), verb);
        self
    }

    /// Wrap a [`Backend`] object.
    pub fn from_backend(backend: Arc<dyn Backend>) -> Self {
        let mut descriptor = PluginDescriptor::new(backend.name()).priority(backend.priority());
        for key in backend.owns() {
            descriptor = descriptor.owns(key);
        }
        for verb in backend.verbs() {
            let target = backend.clone();
            let name = verb.clone();
            let imp = VerbImpl::new(move |args| target.call(&name, args))
                .with_context(backend.context(&verb));
            descriptor = descriptor.verb_impl(verb, imp);
        }
        descriptor
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owned_types(&self) -> &[TypeKey] {
        &self.owns
    }

    pub fn claims(&self, key: &TypeKey) -> bool {
        self.owns.contains(key)
    }

    pub fn get_priority(&self) -> i32 {
        self.priority
    }

    pub(crate) fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn implements(&self, verb: &str) -> bool {
        self.verbs.contains_key(verb)
    }

    pub fn get_verb(&self, verb: &str) -> Option<&VerbImpl> {
        self.verbs.get(verb)
    }

    pub fn verb_names(&self) -> impl Iterator<Item = &str> {
        self.verbs.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let d = PluginDescriptor::new("frames")
            .owns("frame")
            .owns("frame")
            .owns("grouped_frame")
            .priority(7)
            .verb("select", |_| Ok(Value::Null))
            .verb_impl(
                "inner_join",
                VerbImpl::new(|_| Ok(Value::Null)).with_extra_context("by", ContextKind::Select),
            );

        assert_eq!(d.name(), "frames");
        assert_eq!(d.owned_types().len(), 2);
        assert!(d.claims(&TypeKey::new("grouped_frame")));
        assert_eq!(d.get_priority(), 7);
        assert!(d.is_enabled());
        assert!(d.implements("select"));
        assert!(!d.implements("mutate"));
        assert_eq!(d.verb_names().collect::<Vec<_>>(), vec!["select", "inner_join"]);

        let join = d.get_verb("inner_join").unwrap();
        assert_eq!(join.context_for(Some("by")), ContextKind::Select);
        assert_eq!(join.context_for(Some("suffix")), ContextKind::Eval);
        assert_eq!(join.context_for(None), ContextKind::Eval);
    }
}
