use std::{cell::RefCell, rc::Rc};

use background_client::{Listener, NativeBridge, Outcome, Reply};
use background_primitives::BridgeCall;
use gloo_utils::format::JsValueSerdeExt;
use js_sys::{Array, Function};
use serde_json::Value;
use tracing::trace;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    // Binding for cordova.exec(success, error, service, action, args)
    #[wasm_bindgen(js_namespace = cordova, js_name = exec)]
    fn cordova_exec(success: &Function, error: &Function, service: &str, action: &str, args: &Array);
}

/// [`NativeBridge`] backed by the global `cordova.exec`
#[derive(Debug, Default, Clone, Copy)]
pub struct CordovaBridge;

/// JS callback handed to `cordova.exec`
type JsCallback = Closure<dyn FnMut(JsValue)>;

/// A one-shot call waiting for its answer
///
/// Holds the callbacks Cordova invokes, so they are freed with the reply once
/// the first answer arrives.
struct InFlight {
    reply: Reply,
    callbacks: Option<(JsCallback, JsCallback)>,
}

impl NativeBridge for CordovaBridge {
    fn do_exec(&self, call: BridgeCall, reply: Reply) {
        let Some(args) = args_to_js(&call.args) else {
            reply.failure(Value::from("Failed to serialize bridge arguments"));
            return;
        };

        let pending = Rc::new(RefCell::new(Some(InFlight {
            reply,
            callbacks: None,
        })));
        let answer = {
            let pending = Rc::clone(&pending);
            Rc::new(move |outcome: Outcome| {
                let in_flight = pending.borrow_mut().take();
                match in_flight {
                    // The running callback is released by wasm-bindgen once it returns
                    Some(InFlight { reply, callbacks }) => {
                        reply.send(outcome);
                        drop(callbacks);
                    }
                    None => trace!("Ignoring repeated answer"),
                }
            })
        };

        let on_success = {
            let answer = Rc::clone(&answer);
            Closure::wrap(Box::new(move |payload: JsValue| answer(Ok(value_from_js(&payload))))
                as Box<dyn FnMut(JsValue)>)
        };
        let on_error = Closure::wrap(Box::new(move |error: JsValue| answer(Err(value_from_js(&error))))
            as Box<dyn FnMut(JsValue)>);

        cordova_exec(
            on_success.as_ref().unchecked_ref(),
            on_error.as_ref().unchecked_ref(),
            &call.plugin,
            &call.method,
            &args,
        );

        // Answered synchronously: nothing left to keep alive
        let mut pending = pending.borrow_mut();
        match pending.as_mut() {
            Some(in_flight) => in_flight.callbacks = Some((on_success, on_error)),
            None => trace!("Bridge answered during dispatch"),
        }
    }

    fn subscribe(&self, call: BridgeCall, listener: Listener) {
        trace!(plugin = %call.plugin, method = %call.method, "Subscribing to bridge call");
        let listener = Rc::new(RefCell::new(listener));
        let Some(args) = args_to_js(&call.args) else {
            listener
                .borrow_mut()
                .send(Err(Value::from("Failed to serialize bridge arguments")));
            return;
        };

        let on_success = {
            let listener = Rc::clone(&listener);
            Closure::wrap(Box::new(move |payload: JsValue| {
                listener.borrow_mut().send(Ok(value_from_js(&payload)));
            }) as Box<dyn FnMut(JsValue)>)
        };
        let on_error = Closure::wrap(Box::new(move |error: JsValue| {
            listener.borrow_mut().send(Err(value_from_js(&error)));
        }) as Box<dyn FnMut(JsValue)>);

        cordova_exec(
            on_success.as_ref().unchecked_ref(),
            on_error.as_ref().unchecked_ref(),
            &call.plugin,
            &call.method,
            &args,
        );

        // Kept calls may be answered for as long as the app runs
        on_success.forget();
        on_error.forget();
    }
}

fn args_to_js(args: &[Value]) -> Option<Array> {
    JsValue::from_serde(args)
        .ok()
        .map(|value| value.unchecked_into::<Array>())
}

/// `undefined` and values JSON cannot express become `null`
pub(crate) fn value_from_js(value: &JsValue) -> Value {
    value.into_serde().unwrap_or(Value::Null)
}
