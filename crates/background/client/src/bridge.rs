//! Transport abstraction for the native plugin bridge
//!
//! A bridge takes one [`BridgeCall`] and a [`Reply`] handle and eventually
//! answers through the handle. How the call reaches native code, and on which
//! thread the answer arrives, is up to the implementation.
//!
//! Some native calls keep their callback alive and answer repeatedly
//! (`registerDevicePowerChanges` pushes every state change through it). Those
//! go through [`NativeBridge::subscribe`] with a [`Listener`] instead.

use std::{fmt, rc::Rc, sync::Arc};

use background_primitives::BridgeCall;
use serde_json::Value;
use tracing::{debug, trace};

/// What the native side answered: a success payload or an error value
pub type Outcome = Result<Value, Value>;

/// One-shot completion handle for a dispatched call
///
/// Answering consumes the handle, so a call is completed at most once. Dropping
/// it unanswered leaves the caller's callbacks uninvoked.
pub struct Reply {
    deliver: Option<Box<dyn FnOnce(Outcome)>>,
}

impl Reply {
    /// Create a reply that hands the outcome to `deliver`
    pub fn new(deliver: impl FnOnce(Outcome) + 'static) -> Self {
        Self {
            deliver: Some(Box::new(deliver)),
        }
    }

    /// Complete the call successfully
    pub fn success(self, payload: Value) {
        self.send(Ok(payload));
    }

    /// Complete the call with the native error value
    pub fn failure(self, error: Value) {
        self.send(Err(error));
    }

    /// Complete the call with `outcome`
    pub fn send(mut self, outcome: Outcome) {
        trace!(success = outcome.is_ok(), "Bridge replied");
        if let Some(deliver) = self.deliver.take() {
            deliver(outcome);
        }
    }
}

impl Drop for Reply {
    fn drop(&mut self) {
        if self.deliver.is_some() {
            debug!("Bridge released a call without answering");
        }
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reply")
            .field("answered", &self.deliver.is_none())
            .finish()
    }
}

/// Multi-shot sink for calls the native side answers more than once
pub struct Listener {
    deliver: Box<dyn FnMut(Outcome)>,
}

impl Listener {
    /// Create a listener handing every outcome to `deliver`
    pub fn new(deliver: impl FnMut(Outcome) + 'static) -> Self {
        Self {
            deliver: Box::new(deliver),
        }
    }

    /// Deliver one outcome
    pub fn send(&mut self, outcome: Outcome) {
        trace!(success = outcome.is_ok(), "Bridge pushed an update");
        (self.deliver)(outcome);
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").finish_non_exhaustive()
    }
}

/// Channel to the native collaborator
pub trait NativeBridge: fmt::Debug {
    /// Dispatch `call`; the answer goes to `reply`
    ///
    /// Must not block. The reply may be answered before this returns or at any
    /// later point.
    fn exec(&self, call: BridgeCall, reply: Reply) {
        trace!(plugin = %call.plugin, method = %call.method, args = ?call.args, "Dispatching bridge call");
        self.do_exec(call, reply);
    }

    /// Internal implementation of exec
    /// This is the method that concrete implementations should override
    fn do_exec(&self, call: BridgeCall, reply: Reply);

    /// Dispatch `call` and keep delivering answers to `listener`
    ///
    /// Bridges that cannot keep a callback alive deliver the first answer only.
    fn subscribe(&self, call: BridgeCall, mut listener: Listener) {
        self.exec(call, Reply::new(move |outcome| listener.send(outcome)));
    }
}

impl<B: NativeBridge + ?Sized> NativeBridge for &B {
    fn do_exec(&self, call: BridgeCall, reply: Reply) {
        (**self).do_exec(call, reply);
    }

    fn subscribe(&self, call: BridgeCall, listener: Listener) {
        (**self).subscribe(call, listener);
    }
}

impl<B: NativeBridge + ?Sized> NativeBridge for Box<B> {
    fn do_exec(&self, call: BridgeCall, reply: Reply) {
        (**self).do_exec(call, reply);
    }

    fn subscribe(&self, call: BridgeCall, listener: Listener) {
        (**self).subscribe(call, listener);
    }
}

impl<B: NativeBridge + ?Sized> NativeBridge for Rc<B> {
    fn do_exec(&self, call: BridgeCall, reply: Reply) {
        (**self).do_exec(call, reply);
    }

    fn subscribe(&self, call: BridgeCall, listener: Listener) {
        (**self).subscribe(call, listener);
    }
}

impl<B: NativeBridge + ?Sized> NativeBridge for Arc<B> {
    fn do_exec(&self, call: BridgeCall, reply: Reply) {
        (**self).do_exec(call, reply);
    }

    fn subscribe(&self, call: BridgeCall, listener: Listener) {
        (**self).subscribe(call, listener);
    }
}

/// A call held by [`MockBridge`] until the test answers it
#[cfg(test)]
#[derive(Debug)]
pub(crate) enum Pending {
    Reply(Option<Reply>),
    Listener(Listener),
}

/// Bridge that records every call and answers only when told to
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MockBridge {
    calls: std::cell::RefCell<Vec<BridgeCall>>,
    pending: std::cell::RefCell<Vec<Pending>>,
}

#[cfg(test)]
impl MockBridge {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Calls dispatched so far
    pub(crate) fn calls(&self) -> Vec<BridgeCall> {
        self.calls.borrow().clone()
    }

    /// Take the reply handle of the `index`th call
    pub(crate) fn take_reply(&self, index: usize) -> Reply {
        match &mut self.pending.borrow_mut()[index] {
            Pending::Reply(reply) => reply.take().expect("reply already taken"),
            Pending::Listener(_) => panic!("call {index} is a subscription"),
        }
    }

    pub(crate) fn succeed(&self, index: usize, payload: Value) {
        self.take_reply(index).success(payload);
    }

    pub(crate) fn fail(&self, index: usize, error: Value) {
        self.take_reply(index).failure(error);
    }

    /// Push an update through the listener of the `index`th call
    pub(crate) fn push(&self, index: usize, outcome: Outcome) {
        match &mut self.pending.borrow_mut()[index] {
            Pending::Listener(listener) => listener.send(outcome),
            Pending::Reply(_) => panic!("call {index} is not a subscription"),
        }
    }

    /// Release the listener of the `index`th call
    pub(crate) fn close(&self, index: usize) {
        self.pending.borrow_mut()[index] = Pending::Reply(None);
    }
}

#[cfg(test)]
impl NativeBridge for MockBridge {
    fn do_exec(&self, call: BridgeCall, reply: Reply) {
        self.calls.borrow_mut().push(call);
        self.pending.borrow_mut().push(Pending::Reply(Some(reply)));
    }

    fn subscribe(&self, call: BridgeCall, listener: Listener) {
        self.calls.borrow_mut().push(call);
        self.pending.borrow_mut().push(Pending::Listener(listener));
    }
}
