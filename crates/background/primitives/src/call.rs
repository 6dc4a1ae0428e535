use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::Operation;

/// Service name the native plugin is registered under
pub const PLUGIN_NAME: &str = "Background";

/// A single named call across the native bridge
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Display)]
#[display("BridgeCall {{ plugin: {}, method: {}, args: {:?} }}", plugin, method, args)]
pub struct BridgeCall {
    /// Native service name
    pub plugin: String,
    /// Native method name
    pub method: String,
    /// Arguments, forwarded as given
    pub args: Vec<serde_json::Value>,
}

impl BridgeCall {
    /// Build the call for `operation` addressed to `plugin`
    pub fn new(
        plugin: impl Into<String>,
        operation: Operation,
        args: Vec<serde_json::Value>,
    ) -> Self {
        Self {
            plugin: plugin.into(),
            method: operation.bridge_method().to_string(),
            args,
        }
    }

    /// The operation this call was built for, if the method name is known
    pub fn operation(&self) -> Option<Operation> {
        Operation::from_bridge_method(&self.method)
    }
}
