//! Configuration options for the bridge client

use background_primitives::PLUGIN_NAME;
use serde::Deserialize;

/// Configuration options for [`BackgroundClient`](crate::BackgroundClient)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Service name the native plugin is registered under
    pub plugin: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            plugin: PLUGIN_NAME.to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the service name calls are addressed to
    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin = plugin.into();
        self
    }

    /// Parse a configuration from JSON, filling in defaults for missing keys
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_to_background_plugin() {
        assert_eq!(ClientConfig::new().plugin, "Background");
        assert_eq!(ClientConfig::from_json(json!({})).unwrap(), ClientConfig::default());
    }

    #[test]
    fn overrides() {
        assert_eq!(
            ClientConfig::from_json(json!({"plugin": "BackgroundMode"}))
                .unwrap()
                .plugin,
            "BackgroundMode"
        );
        assert_eq!(ClientConfig::new().with_plugin("Other").plugin, "Other");
        assert!(ClientConfig::from_json(json!({"plugins": "x"})).is_err());
    }
}
