//! Client for the `Background` native plugin
//!
//! The plugin reports device power state changes and schedules OS alarms. All
//! of that work happens in native code on the far side of a host bridge; this
//! crate only validates what the caller passes in and forwards one named call
//! per operation.
//!
//! ## Overview
//!
//! - [`NativeBridge`] is the injectable transport. A host implements it on top
//!   of whatever call mechanism it has (the wasm binding uses `cordova.exec`).
//! - [`BackgroundClient`] exposes the five operations in two styles:
//!   callback pairs ([`Handler`]) mirroring the host convention, and
//!   [`Completion`] futures resolving to a single `Result`.
//! - [`BackgroundClient::state_updates`] turns the kept `register` callback
//!   into a [`StateUpdates`] stream.
//! - Malformed calls are never dispatched. They are logged and returned as
//!   [`InvalidArgument`].
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]

pub mod bridge;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;

pub use background_primitives as primitives;
pub use bridge::{Listener, NativeBridge, Outcome, Reply};
pub use client::{BackgroundClient, Completion, StateUpdates};
pub use config::ClientConfig;
pub use error::{Error, InvalidArgument, Reason, Result};
pub use handler::{Callback, Handler, RepeatingCallback};

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{
        BackgroundClient, ClientConfig, Completion, Error, Handler, InvalidArgument, Listener,
        NativeBridge, Reason, Reply, StateUpdates,
    };
    pub use background_primitives::{
        AlarmRequest, BridgeCall, DeviceState, Operation, StartupTimestamp, StateUpdate,
    };
}
