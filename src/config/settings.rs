//! Dispatch and plugin settings
//!
//! These are the resolved values the registry and dispatcher consume. They
//! are plain serde structs so they can come from any source the host likes;
//! [`PlyrConfig`](super::PlyrConfig) loads them from TOML or JSON.
//!
//! # Main Types
//!
//! - [`DispatchSettings`] - Limits applied to every dispatch
//! - [`PluginOverride`] - Per-plugin enable flag and priority override

use crate::registry::PluginDescriptor;
use serde::{Deserialize, Serialize};

/// Default limit on nested re-dispatch
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Settings applied to every dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSettings {
    /// Maximum nesting of verb calls made from inside verb implementations
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Reject descriptors that own no types or implement no verbs
    #[serde(default = "default_true")]
    pub validate_descriptors: bool,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_true() -> bool {
    true
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            validate_descriptors: true,
        }
    }
}

/// Override for one plugin, keyed by plugin name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginOverride {
    /// Force the plugin on or off
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Replace the plugin's declared priority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl PluginOverride {
    /// Apply this override to a descriptor
    pub fn apply(&self, descriptor: &mut PluginDescriptor) {
        if let Some(enabled) = self.enabled {
            descriptor.set_enabled(enabled);
        }
        if let Some(priority) = self.priority {
            descriptor.set_priority(priority);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_none() && self.priority.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_settings_default() {
        let settings = DispatchSettings::default();
        assert_eq!(settings.max_depth, 64);
        assert!(settings.validate_descriptors);
    }

    #[test]
    fn test_override_apply() {
        let mut d = PluginDescriptor::new("frames").priority(3);
        PluginOverride {
            enabled: Some(false),
            priority: None,
        }
        .apply(&mut d);
        assert!(!d.is_enabled());
        assert_eq!(d.get_priority(), 3);

        PluginOverride {
            enabled: None,
            priority: Some(-2),
        }
        .apply(&mut d);
        assert_eq!(d.get_priority(), -2);
        assert!(PluginOverride::default().is_empty());
    }
}
