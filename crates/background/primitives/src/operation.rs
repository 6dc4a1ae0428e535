use derive_more::Display;
use serde::{Deserialize, Serialize};

/// One of the five calls the plugin exposes
///
/// `Display` renders the caller-facing name (`setAlarm`); the name sent across
/// the bridge is [`Operation::bridge_method`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// Start receiving device power state changes
    #[display("register")]
    Register,
    /// Stop receiving device power state changes
    #[display("unregister")]
    Unregister,
    /// Schedule an OS alarm
    #[display("setAlarm")]
    SetAlarm,
    /// Cancel the pending OS alarm
    #[display("cancelAlarm")]
    CancelAlarm,
    /// Ask for the time the native plugin was started
    #[display("getStartupTimestamp")]
    GetStartupTimestamp,
}

impl Operation {
    /// Every operation, in declaration order
    pub const ALL: [Self; 5] = [
        Self::Register,
        Self::Unregister,
        Self::SetAlarm,
        Self::CancelAlarm,
        Self::GetStartupTimestamp,
    ];

    /// Method name the native side dispatches on
    pub const fn bridge_method(self) -> &'static str {
        match self {
            Self::Register => "registerDevicePowerChanges",
            Self::Unregister => "unregisterDevicePowerChanges",
            Self::SetAlarm => "setAlarm",
            Self::CancelAlarm => "cancelAlarm",
            Self::GetStartupTimestamp => "getStartupTimestamp",
        }
    }

    /// Whether the call must carry a non-empty argument list
    pub const fn requires_params(self) -> bool {
        matches!(self, Self::SetAlarm)
    }

    /// Reverse of [`Operation::bridge_method`]
    pub fn from_bridge_method(method: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|operation| operation.bridge_method() == method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_method_names() {
        assert_eq!(
            Operation::Register.bridge_method(),
            "registerDevicePowerChanges"
        );
        assert_eq!(
            Operation::Unregister.bridge_method(),
            "unregisterDevicePowerChanges"
        );
        assert_eq!(Operation::SetAlarm.bridge_method(), "setAlarm");
        assert_eq!(Operation::CancelAlarm.bridge_method(), "cancelAlarm");
        assert_eq!(
            Operation::GetStartupTimestamp.bridge_method(),
            "getStartupTimestamp"
        );
    }

    #[test]
    fn reverse_lookup() {
        for operation in Operation::ALL {
            assert_eq!(
                Operation::from_bridge_method(operation.bridge_method()),
                Some(operation)
            );
        }
        assert_eq!(Operation::from_bridge_method("register"), None);
    }

    #[test]
    fn only_set_alarm_needs_params() {
        let needing: Vec<_> = Operation::ALL
            .into_iter()
            .filter(|op| op.requires_params())
            .collect();
        assert_eq!(needing, vec![Operation::SetAlarm]);
    }

    #[test]
    fn display_and_serde_use_caller_names() {
        assert_eq!(Operation::GetStartupTimestamp.to_string(), "getStartupTimestamp");
        assert_eq!(
            serde_json::to_value(Operation::CancelAlarm).unwrap(),
            serde_json::json!("cancelAlarm")
        );
    }
}
