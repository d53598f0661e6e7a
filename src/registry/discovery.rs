//! Link-time plugin discovery.
//!
//! Backends announce themselves by adding a factory to [`PLUGINS`]:
//!
//! ```ignore
//! use plyr_rs::registry::{PluginFactory, PLUGINS};
//! use plyr_rs::linkme::distributed_slice;
//!
//! #[distributed_slice(PLUGINS)]
//! static MY_BACKEND: PluginFactory = my_backend::descriptor;
//! ```
//!
//! Discovery runs the factories once and registers the results sorted by
//! plugin name, so registration order (the priority tie-break) does not
//! depend on link order.

use super::{PluginDescriptor, Registry};
use crate::config::PlyrConfig;
use crate::error::Result;
use linkme::distributed_slice;
use std::sync::{Arc, OnceLock};

/// Builds one plugin's descriptor.
pub type PluginFactory = fn() -> PluginDescriptor;

/// Every plugin factory linked into the process.
#[distributed_slice]
pub static PLUGINS: [PluginFactory];

impl Registry {
    /// Registry holding every linked plugin, with default settings.
    pub fn discover() -> Result<Self> {
        Self::discover_with(&PlyrConfig::default())
    }

    /// Registry holding every linked plugin, with `config` applied.
    pub fn discover_with(config: &PlyrConfig) -> Result<Self> {
        let registry = Registry::with_config(config);
        let mut descriptors: Vec<PluginDescriptor> = PLUGINS.iter().map(|f| f()).collect();
        descriptors.sort_by(|a, b| a.name().cmp(b.name()));

        tracing::debug!("Discovered {} plugin(s)", descriptors.len());
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }
}

/// Process-wide registry, discovered on first use with the config from
/// [`PlyrConfig::load_or_default`].
///
/// Tests and embedders that need isolation should build their own
/// [`Registry`] instead.
pub fn global() -> Arc<Registry> {
    static GLOBAL: OnceLock<Arc<Registry>> = OnceLock::new();
    GLOBAL
        .get_or_init(|| {
            let config = PlyrConfig::load_or_default();
            let registry = Registry::discover_with(&config).unwrap_or_else(|e| {
                tracing::error!("Plugin discovery failed, starting with an empty registry: {}", e);
                Registry::with_config(&config)
            });
            Arc::new(registry)
        })
        .clone()
}
