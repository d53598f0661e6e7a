//! Bundled reference backends.
//!
//! - [`vector`]: dense one-dimensional vectors with elementwise operators
//! - [`frame`]: column-oriented tables, plain and grouped
//!
//! Both announce themselves through [`PLUGINS`](crate::registry::PLUGINS) and
//! are picked up by [`Registry::discover`]. [`builtin_registry`] registers
//! them explicitly for callers that want an isolated registry.

pub mod frame;
pub mod vector;

use crate::config::PlyrConfig;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::registry::Registry;
use std::sync::Arc;

/// Fresh registry holding only the bundled backends.
pub fn builtin_registry(config: &PlyrConfig) -> Result<Registry> {
    let registry = Registry::with_config(config);
    registry.register(vector::descriptor())?;
    registry.register(frame::descriptor())?;
    Ok(registry)
}

/// Dispatcher over [`builtin_registry`] with default configuration.
pub fn builtin_dispatcher() -> Result<Dispatcher> {
    Ok(Dispatcher::new(Arc::new(builtin_registry(
        &PlyrConfig::default(),
    )?)))
}
