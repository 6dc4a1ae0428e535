//! Wire-level types for the `Background` native plugin bridge
//!
//! The native collaborator is addressed by a plugin name and a method name and
//! answers with opaque JSON payloads. This crate names the five operations, the
//! shape of a single bridge call, and the decoders for the payloads the native
//! side is known to deliver.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]

mod alarm;
mod call;
mod error;
mod event;
mod operation;
mod timestamp;

pub use alarm::{AlarmRequest, DEFAULT_ALARM_DELAY_SECS};
pub use call::{BridgeCall, PLUGIN_NAME};
pub use error::PayloadError;
pub use event::{DeviceState, STATE_KEY, StateUpdate};
pub use operation::Operation;
pub use timestamp::StartupTimestamp;

// Re-export so downstream crates build argument lists without a direct dependency
pub use serde_json::{Value, json};
