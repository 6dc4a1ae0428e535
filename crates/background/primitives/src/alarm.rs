use std::time::Duration;

use derive_more::Display;
use serde_json::Value;

/// Delay the native side falls back to when it cannot read one from the arguments
pub const DEFAULT_ALARM_DELAY_SECS: u32 = 60;

/// Typed argument list for `setAlarm`
///
/// The native side reads the delay in seconds from the first argument and
/// ignores the rest. Callers with other hosts can still pass raw arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("AlarmRequest {{ delay_secs: {} }}", delay_secs)]
pub struct AlarmRequest {
    delay_secs: u32,
}

impl Default for AlarmRequest {
    fn default() -> Self {
        Self::after_secs(DEFAULT_ALARM_DELAY_SECS)
    }
}

impl AlarmRequest {
    /// Fire `delay_secs` seconds from now
    pub const fn after_secs(delay_secs: u32) -> Self {
        Self { delay_secs }
    }

    /// Fire after `delay`, rounded down to whole seconds and saturated to `u32::MAX`
    pub fn after(delay: Duration) -> Self {
        Self::after_secs(u32::try_from(delay.as_secs()).unwrap_or(u32::MAX))
    }

    /// Delay in seconds
    pub const fn delay_secs(&self) -> u32 {
        self.delay_secs
    }

    /// Argument list as sent across the bridge
    pub fn to_args(&self) -> Vec<Value> {
        vec![Value::from(self.delay_secs)]
    }
}

impl From<AlarmRequest> for Vec<Value> {
    fn from(request: AlarmRequest) -> Self {
        request.to_args()
    }
}
