use std::time::{Duration, SystemTime, UNIX_EPOCH};

use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::PayloadError;

/// Wall-clock time at which the native plugin instance was created
///
/// A value that changes between two reads means the native side was restarted.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("{}", _0)]
pub struct StartupTimestamp(u64);

impl StartupTimestamp {
    /// Wrap milliseconds since the Unix epoch
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Milliseconds since the Unix epoch
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// As a [`SystemTime`]
    pub fn to_system_time(self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.0)
    }

    /// Decode the `getStartupTimestamp` success payload
    ///
    /// Android delivers the value as a decimal string, other hosts as a number.
    pub fn from_payload(payload: &Value) -> Result<Self, PayloadError> {
        let millis = match payload {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        millis
            .map(Self)
            .ok_or_else(|| PayloadError::InvalidTimestamp(payload.to_string()))
    }
}
