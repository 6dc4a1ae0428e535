//! State updates pushed through the `register` success callback
//!
//! After registering, the native side acknowledges with an empty result and
//! then keeps the same callback alive, invoking it with `{"state": "<STATE>"}`
//! whenever the device or the hosting activity changes state.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::PayloadError;

/// Key holding the state name in an update object
pub const STATE_KEY: &str = "state";

/// A state reported by the native plugin
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceState {
    /// Daydream/screensaver mode started
    #[display("DEVICE_DREAMING_STARTED")]
    DeviceDreamingStarted,
    /// Daydream/screensaver mode stopped
    #[display("DEVICE_DREAMING_STOPPED")]
    DeviceDreamingStopped,
    /// Screen switched off, manually or by timeout
    #[display("DEVICE_SCREEN_OFF")]
    DeviceScreenOff,
    /// Screen switched on
    #[display("DEVICE_SCREEN_ON")]
    DeviceScreenOn,
    /// The app was woken by the alarm set through `setAlarm`
    #[display("ALARM_WAKEUP_ONCE")]
    AlarmWakeupOnce,
    /// The hosting activity started
    #[display("ACTIVITY_STARTED")]
    ActivityStarted,
    /// The hosting activity lost the foreground
    #[display("ACTIVITY_PAUSED")]
    ActivityPaused,
    /// The hosting activity is back in the foreground
    #[display("ACTIVITY_RESUMED")]
    ActivityResumed,
    /// The hosting activity is no longer visible
    #[display("ACTIVITY_STOPPED")]
    ActivityStopped,
    /// The hosting activity is being destroyed
    #[display("ACTIVITY_DESTROYED")]
    ActivityDestroyed,
}

impl DeviceState {
    /// Screen and dreaming transitions
    pub const fn is_power_change(self) -> bool {
        matches!(
            self,
            Self::DeviceDreamingStarted
                | Self::DeviceDreamingStopped
                | Self::DeviceScreenOff
                | Self::DeviceScreenOn
        )
    }

    /// Alarm wake-ups
    pub const fn is_alarm(self) -> bool {
        matches!(self, Self::AlarmWakeupOnce)
    }

    /// Lifecycle changes of the hosting activity
    pub const fn is_lifecycle(self) -> bool {
        matches!(
            self,
            Self::ActivityStarted
                | Self::ActivityPaused
                | Self::ActivityResumed
                | Self::ActivityStopped
                | Self::ActivityDestroyed
        )
    }
}

/// One decoded state update
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("StateUpdate {{ state: {} }}", state)]
pub struct StateUpdate {
    /// The reported state
    pub state: DeviceState,
}

impl StateUpdate {
    /// Decode a success payload delivered to the `register` callback
    ///
    /// The registration acknowledgement carries no data and yields `None`.
    pub fn from_payload(payload: &Value) -> Result<Option<Self>, PayloadError> {
        match payload {
            Value::Null => Ok(None),
            Value::String(s) if s.is_empty() => Ok(None),
            Value::Object(map) if map.is_empty() => Ok(None),
            Value::Object(map) => {
                let Some(Value::String(state)) = map.get(STATE_KEY) else {
                    return Err(PayloadError::NotAStateObject(payload.to_string()));
                };
                serde_json::from_value(Value::String(state.clone()))
                    .map(|state| Some(Self { state }))
                    .map_err(|_| PayloadError::UnknownState(state.clone()))
            }
            other => Err(PayloadError::NotAStateObject(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_state_updates() {
        let update = StateUpdate::from_payload(&json!({"state": "DEVICE_SCREEN_OFF"}))
            .unwrap()
            .unwrap();
        assert_eq!(update.state, DeviceState::DeviceScreenOff);
        assert!(update.state.is_power_change());

        let update = StateUpdate::from_payload(&json!({"state": "ALARM_WAKEUP_ONCE"}))
            .unwrap()
            .unwrap();
        assert!(update.state.is_alarm());
        assert!(!update.state.is_lifecycle());
    }

    #[test]
    fn acknowledgement_has_no_update() {
        assert_eq!(StateUpdate::from_payload(&Value::Null), Ok(None));
        assert_eq!(StateUpdate::from_payload(&json!({})), Ok(None));
        assert_eq!(StateUpdate::from_payload(&json!("")), Ok(None));
    }

    #[test]
    fn rejects_unknown_shapes() {
        assert_eq!(
            StateUpdate::from_payload(&json!({"state": "DEVICE_ON_FIRE"})),
            Err(PayloadError::UnknownState("DEVICE_ON_FIRE".to_string()))
        );
        assert!(matches!(
            StateUpdate::from_payload(&json!({"status": "DEVICE_SCREEN_ON"})),
            Err(PayloadError::NotAStateObject(_))
        ));
        assert!(matches!(
            StateUpdate::from_payload(&json!(42)),
            Err(PayloadError::NotAStateObject(_))
        ));
    }

    #[test]
    fn display_matches_wire_name() {
        for state in [
            DeviceState::ActivityPaused,
            DeviceState::DeviceDreamingStarted,
            DeviceState::AlarmWakeupOnce,
        ] {
            assert_eq!(serde_json::to_value(state).unwrap(), json!(state.to_string()));
        }
    }
}
