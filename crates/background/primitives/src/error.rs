/// A payload from the native side did not have the expected shape
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    /// Payload was not a JSON object with a `state` string
    #[error("expected a state object, got {0}")]
    NotAStateObject(String),

    /// The `state` string is not one the plugin reports
    #[error("unknown device state: {0}")]
    UnknownState(String),

    /// Timestamp payload was neither an integer nor a decimal string
    #[error("invalid startup timestamp: {0}")]
    InvalidTimestamp(String),
}
