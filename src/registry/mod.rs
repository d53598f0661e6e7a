//! Plugin registry.
//!
//! The registry maps data types to the backends that claim them. It is
//! written during startup (discovery, explicit registration) and read on
//! every dispatch, so it sits behind a read-mostly lock: lookups never block
//! each other, and a registration excludes readers only while it runs.
//!
//! Lookups return snapshots. A registration that lands after a lookup has
//! returned is visible to the next lookup, never to the one in flight.

mod descriptor;
mod discovery;

pub use descriptor::{Backend, PluginDescriptor, VerbFn, VerbImpl};
pub use discovery::{global, PluginFactory, PLUGINS};

use crate::config::{DispatchSettings, PlyrConfig, PluginOverride};
use crate::error::{PlyrError, Result};
use crate::value::{TypeInfo, TypeKey};
use indexmap::IndexMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug)]
struct Entry {
    seq: u64,
    descriptor: Arc<PluginDescriptor>,
}

#[derive(Debug, Default)]
struct Table {
    entries: Vec<Entry>,
    next_seq: u64,
}

/// Table of registered backend plugins.
#[derive(Debug, Default)]
pub struct Registry {
    table: RwLock<Table>,
    overrides: IndexMap<String, PluginOverride>,
    settings: DispatchSettings,
}

impl Registry {
    /// Empty registry with default settings and no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty registry that applies `config` to every descriptor it registers.
    pub fn with_config(config: &PlyrConfig) -> Self {
        Self {
            table: RwLock::default(),
            overrides: config.plugins.clone(),
            settings: config.dispatch.clone(),
        }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    fn read(&self) -> RwLockReadGuard<'_, Table> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Table> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a plugin. Configured overrides are applied first.
    pub fn register(&self, mut descriptor: PluginDescriptor) -> Result<()> {
        if let Some(o) = self.overrides.get(descriptor.name()) {
            o.apply(&mut descriptor);
        }

        if self.settings.validate_descriptors {
            if descriptor.owned_types().is_empty() {
                return Err(PlyrError::Config(format!(
                    "plugin '{}' does not own any data type",
                    descriptor.name()
                )));
            }
            if descriptor.verb_names().next().is_none() {
                return Err(PlyrError::Config(format!(
                    "plugin '{}' does not implement any verb",
                    descriptor.name()
                )));
            }
        }

        let mut table = self.write();
        if table
            .entries
            .iter()
            .any(|e| e.descriptor.name() == descriptor.name())
        {
            return Err(PlyrError::DuplicatePlugin(descriptor.name().to_string()));
        }

        tracing::debug!(
            "Registering plugin '{}' (priority {}, enabled {}) for {:?}",
            descriptor.name(),
            descriptor.get_priority(),
            descriptor.is_enabled(),
            descriptor.owned_types()
        );

        let seq = table.next_seq;
        table.next_seq += 1;
        table.entries.push(Entry {
            seq,
            descriptor: Arc::new(descriptor),
        });
        Ok(())
    }

    /// Remove a plugin by name, returning its descriptor.
    pub fn unregister(&self, name: &str) -> Result<Arc<PluginDescriptor>> {
        let mut table = self.write();
        let pos = table
            .entries
            .iter()
            .position(|e| e.descriptor.name() == name)
            .ok_or_else(|| PlyrError::UnknownPlugin(name.to_string()))?;
        tracing::debug!("Unregistering plugin '{}'", name);
        Ok(table.entries.remove(pos).descriptor)
    }

    /// Enable or disable a registered plugin in place.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        let mut table = self.write();
        let entry = table
            .entries
            .iter_mut()
            .find(|e| e.descriptor.name() == name)
            .ok_or_else(|| PlyrError::UnknownPlugin(name.to_string()))?;
        let mut updated = PluginDescriptor::clone(&entry.descriptor);
        updated.set_enabled(enabled);
        entry.descriptor = Arc::new(updated);
        Ok(())
    }

    /// Enabled plugins claiming `info.key` or anything in its ancestry.
    ///
    /// Ordered by priority descending, then registration order ascending.
    /// Fails with `NoBackendForType` when nothing matches.
    pub fn lookup(&self, info: &TypeInfo) -> Result<Vec<Arc<PluginDescriptor>>> {
        let table = self.read();
        let mut matches: Vec<&Entry> = table
            .entries
            .iter()
            .filter(|e| e.descriptor.is_enabled())
            .filter(|e| info.chain().any(|key| e.descriptor.claims(key)))
            .collect();

        if matches.is_empty() {
            return Err(PlyrError::NoBackendForType(info.key.to_string()));
        }

        matches.sort_by(|a, b| {
            b.descriptor
                .get_priority()
                .cmp(&a.descriptor.get_priority())
                .then(a.seq.cmp(&b.seq))
        });
        Ok(matches.into_iter().map(|e| e.descriptor.clone()).collect())
    }

    /// Lookup for a bare key with no ancestry beyond `any`.
    pub fn lookup_key(&self, key: &TypeKey) -> Result<Vec<Arc<PluginDescriptor>>> {
        self.lookup(&TypeInfo::from(key.clone()))
    }

    pub fn get(&self, name: &str) -> Option<Arc<PluginDescriptor>> {
        self.read()
            .entries
            .iter()
            .find(|e| e.descriptor.name() == name)
            .map(|e| e.descriptor.clone())
    }

    /// Registered plugin names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.read()
            .entries
            .iter()
            .map(|e| e.descriptor.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
