//! The validating client
//!
//! Every operation goes through the same steps, in this order:
//!
//! 1. a missing error handler is replaced by a no-op;
//! 2. an error handler that cannot be invoked refuses the call;
//! 3. a success handler that cannot be invoked refuses the call;
//! 4. `setAlarm` without arguments refuses the call.
//!
//! A refused call logs a diagnostic, invokes neither handler and is returned as
//! [`InvalidArgument`]. Anything else results in exactly one bridge dispatch.

use std::{
    pin::Pin,
    task::{Context, Poll},
};

use background_primitives::{
    AlarmRequest, BridgeCall, Operation, StartupTimestamp, StateUpdate,
};
use futures::{
    FutureExt, Stream, StreamExt,
    channel::{mpsc, oneshot},
    ready,
};
use serde_json::Value;
use tracing::{instrument, warn};

use crate::{
    ClientConfig, Error, Handler, InvalidArgument, Listener, NativeBridge, Reason, Reply, Result,
    bridge::Outcome,
};

/// Client for the `Background` native plugin
///
/// Holds no mutable state; one instance can serve any number of calls.
#[derive(Debug)]
pub struct BackgroundClient<B> {
    bridge: B,
    config: ClientConfig,
}

impl<B: NativeBridge> BackgroundClient<B> {
    /// Create a client talking to the default `Background` plugin over `bridge`
    pub fn new(bridge: B) -> Self {
        Self::with_config(bridge, ClientConfig::default())
    }

    /// Create a client with explicit configuration
    pub const fn with_config(bridge: B, config: ClientConfig) -> Self {
        Self { bridge, config }
    }

    /// Get a reference to the underlying bridge
    pub const fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Get the active configuration
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Start receiving device power state changes
    pub fn register(
        &self,
        on_success: Handler,
        on_error: Option<Handler>,
    ) -> Result<(), InvalidArgument> {
        self.dispatch(Operation::Register, on_success, on_error, None)
    }

    /// Stop receiving device power state changes
    pub fn unregister(
        &self,
        on_success: Handler,
        on_error: Option<Handler>,
    ) -> Result<(), InvalidArgument> {
        self.dispatch(Operation::Unregister, on_success, on_error, None)
    }

    /// Schedule an OS alarm; `params` are forwarded as given and must not be empty
    pub fn set_alarm(
        &self,
        on_success: Handler,
        on_error: Option<Handler>,
        params: Option<Vec<Value>>,
    ) -> Result<(), InvalidArgument> {
        self.dispatch(Operation::SetAlarm, on_success, on_error, params)
    }

    /// Cancel the pending OS alarm
    pub fn cancel_alarm(
        &self,
        on_success: Handler,
        on_error: Option<Handler>,
    ) -> Result<(), InvalidArgument> {
        self.dispatch(Operation::CancelAlarm, on_success, on_error, None)
    }

    /// Ask for the time the native plugin was started
    pub fn get_startup_timestamp(
        &self,
        on_success: Handler,
        on_error: Option<Handler>,
    ) -> Result<(), InvalidArgument> {
        self.dispatch(Operation::GetStartupTimestamp, on_success, on_error, None)
    }

    /// Validate a callback-style call and dispatch it
    ///
    /// `params` are only forwarded for operations that take them; every other
    /// operation is sent with an empty argument list.
    #[instrument(level = "trace", skip(self, on_success, on_error, params))]
    pub fn dispatch(
        &self,
        operation: Operation,
        on_success: Handler,
        on_error: Option<Handler>,
        params: Option<Vec<Value>>,
    ) -> Result<(), InvalidArgument> {
        let (on_success, on_error, args) =
            accept(operation, on_success, on_error, params, Handler::into_callback)?;

        let reply = Reply::new(move |outcome| match outcome {
            Ok(payload) => on_success(payload),
            Err(error) => on_error(error),
        });
        self.send(operation, args, reply);
        Ok(())
    }

    /// Validate a callback-style call and dispatch it as a kept call
    ///
    /// Same checks as [`BackgroundClient::dispatch`], but every answer the
    /// bridge delivers for the call is passed on, unmodified, to the matching
    /// handler. This is how the native `register` reports state changes: an
    /// acknowledgement followed by `{"state": ...}` updates. Handlers built
    /// with [`Handler::new`] still see only the first answer.
    #[instrument(level = "trace", skip(self, on_success, on_error, params))]
    pub fn dispatch_kept(
        &self,
        operation: Operation,
        on_success: Handler,
        on_error: Option<Handler>,
        params: Option<Vec<Value>>,
    ) -> Result<(), InvalidArgument> {
        let (mut on_success, mut on_error, args) =
            accept(operation, on_success, on_error, params, Handler::into_repeating)?;

        let listener = Listener::new(move |outcome| match outcome {
            Ok(payload) => on_success(payload),
            Err(error) => on_error(error),
        });
        let call = BridgeCall::new(self.config.plugin.as_str(), operation, args);
        self.bridge.subscribe(call, listener);
        Ok(())
    }

    /// Dispatch `operation` and get its outcome as a future
    ///
    /// `params` follow the same rules as [`BackgroundClient::dispatch`].
    pub fn request(
        &self,
        operation: Operation,
        params: Vec<Value>,
    ) -> Result<Completion, InvalidArgument> {
        let args = check_params(operation, Some(params))?;
        Ok(self.complete(operation, args))
    }

    /// Schedule an alarm described by `alarm`
    pub fn schedule_alarm(&self, alarm: AlarmRequest) -> Completion {
        self.complete(Operation::SetAlarm, alarm.to_args())
    }

    /// Fetch and decode the native plugin's startup time
    pub async fn startup_timestamp(&self) -> Result<StartupTimestamp> {
        let payload = self
            .complete(Operation::GetStartupTimestamp, Vec::new())
            .await?;
        Ok(StartupTimestamp::from_payload(&payload)?)
    }

    /// Register for power state changes and receive them as a stream
    ///
    /// The native side acknowledges the registration and then keeps pushing
    /// updates, including alarm wake-ups, through the same call. The
    /// acknowledgement is skipped. The stream ends when the bridge releases
    /// the call.
    pub fn state_updates(&self) -> StateUpdates {
        let (tx, rx) = mpsc::unbounded();
        let listener = Listener::new(move |outcome| {
            let _ = tx.unbounded_send(outcome);
        });
        let call = BridgeCall::new(self.config.plugin.as_str(), Operation::Register, Vec::new());
        self.bridge.subscribe(call, listener);
        StateUpdates { rx }
    }

    fn complete(&self, operation: Operation, args: Vec<Value>) -> Completion {
        let (tx, rx) = oneshot::channel();
        let reply = Reply::new(move |outcome| {
            // Receiver gone means the caller stopped waiting
            let _ = tx.send(outcome);
        });
        self.send(operation, args, reply);
        Completion { operation, rx }
    }

    fn send(&self, operation: Operation, args: Vec<Value>, reply: Reply) {
        let call = BridgeCall::new(self.config.plugin.as_str(), operation, args);
        self.bridge.exec(call, reply);
    }
}

/// Run the argument checks in order and unwrap both continuations with `unwrap`
fn accept<C>(
    operation: Operation,
    on_success: Handler,
    on_error: Option<Handler>,
    params: Option<Vec<Value>>,
    unwrap: impl Fn(Handler) -> Option<C>,
) -> Result<(C, C, Vec<Value>), InvalidArgument> {
    let on_error = on_error.unwrap_or_else(Handler::noop);
    let Some(on_error) = unwrap(on_error) else {
        return Err(refuse(operation, Reason::ErrorCallbackNotCallable));
    };
    let Some(on_success) = unwrap(on_success) else {
        return Err(refuse(operation, Reason::SuccessCallbackNotCallable));
    };
    let args = check_params(operation, params)?;
    Ok((on_success, on_error, args))
}

fn check_params(
    operation: Operation,
    params: Option<Vec<Value>>,
) -> Result<Vec<Value>, InvalidArgument> {
    if !operation.requires_params() {
        return Ok(Vec::new());
    }
    match params {
        Some(params) if !params.is_empty() => Ok(params),
        _ => Err(refuse(operation, Reason::MissingParameters)),
    }
}

fn refuse(operation: Operation, reason: Reason) -> InvalidArgument {
    let err = InvalidArgument::new(operation, reason);
    warn!(%operation, %reason, "{err}");
    err
}

/// Outcome of a dispatched call, resolved when the bridge answers
///
/// Dropping it does not cancel the native call.
#[derive(Debug)]
pub struct Completion {
    operation: Operation,
    rx: oneshot::Receiver<Outcome>,
}

impl Completion {
    /// The operation this completion belongs to
    pub const fn operation(&self) -> Operation {
        self.operation
    }
}

impl Future for Completion {
    type Output = Result<Value>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.rx.poll_unpin(cx).map(|received| match received {
            Ok(Ok(payload)) => Ok(payload),
            Ok(Err(error)) => Err(Error::Rejected(error)),
            Err(oneshot::Canceled) => Err(Error::Dropped),
        })
    }
}

/// Power state changes pushed by the native side after registration
///
/// Yields an error item for every native failure or undecodable payload and
/// keeps going afterwards.
#[derive(Debug)]
pub struct StateUpdates {
    rx: mpsc::UnboundedReceiver<Outcome>,
}

impl Stream for StateUpdates {
    type Item = Result<StateUpdate>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            let item = match ready!(self.rx.poll_next_unpin(cx)) {
                None => None,
                Some(Err(error)) => Some(Err(Error::Rejected(error))),
                Some(Ok(payload)) => match StateUpdate::from_payload(&payload) {
                    Ok(Some(update)) => Some(Ok(update)),
                    // registration acknowledgement
                    Ok(None) => continue,
                    Err(err) => Some(Err(err.into())),
                },
            };
            return Poll::Ready(item);
        }
    }
}
