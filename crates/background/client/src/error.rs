//! Error types for the bridge client
//!
//! Two disjoint domains: [`InvalidArgument`] is raised locally before anything
//! is dispatched, while [`Error::Rejected`] carries whatever the native side
//! reported, untouched.

use background_primitives::{Operation, PayloadError};
use serde_json::Value;

/// Result alias for completed bridge calls
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Why a call was refused before dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Reason {
    /// An error handler was supplied but cannot be invoked
    #[error("failure parameter not a function")]
    ErrorCallbackNotCallable,

    /// The success handler cannot be invoked
    #[error("success callback parameter must be a function")]
    SuccessCallbackNotCallable,

    /// `setAlarm` was called without arguments
    #[error("no parameters were passed")]
    MissingParameters,
}

/// A call refused before reaching the bridge
///
/// Neither callback has been invoked when this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Background.{operation} failure: {reason}")]
pub struct InvalidArgument {
    /// Operation that was refused
    pub operation: Operation,
    /// What was wrong with the call
    pub reason: Reason,
}

impl InvalidArgument {
    /// Create a new invalid argument error
    pub const fn new(operation: Operation, reason: Reason) -> Self {
        Self { operation, reason }
    }
}

/// Outcome errors of a dispatched call
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The call never left the client
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),

    /// The native side reported a failure; the value is passed through verbatim
    #[error("native call failed: {0}")]
    Rejected(Value),

    /// The bridge released the call without answering
    #[error("bridge dropped the call without a response")]
    Dropped,

    /// The native side answered with an unexpected payload
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

impl Error {
    /// The error value reported by the native side, if this is a rejection
    pub const fn rejection(&self) -> Option<&Value> {
        match self {
            Self::Rejected(value) => Some(value),
            _ => None,
        }
    }
}
