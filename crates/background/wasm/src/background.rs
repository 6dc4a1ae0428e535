use std::rc::Rc;

use background_client::{BackgroundClient, Error, Handler};
use background_primitives::{AlarmRequest, Operation};
use futures::StreamExt;
use gloo_utils::format::JsValueSerdeExt;
use js_sys::{Function, Promise};
use tracing::{trace, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

use crate::{
    bridge::CordovaBridge,
    handler::{handler_from_js, params_from_js, required_handler_from_js},
};

/// JavaScript façade over [`BackgroundClient`]
///
/// The callback methods return `true` when the call was dispatched and `false`
/// when it was refused; a refusal is also logged and invokes no callback.
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct Background {
    client: Rc<BackgroundClient<CordovaBridge>>,
}

impl Background {
    pub(crate) fn from_client(client: BackgroundClient<CordovaBridge>) -> Self {
        Self {
            client: Rc::new(client),
        }
    }

    fn dispatch(
        &self,
        operation: Operation,
        success: JsValue,
        error: JsValue,
        params: Option<&JsValue>,
    ) -> bool {
        // The error callback is checked first, so it is converted first
        let on_error = handler_from_js(error);
        let on_success = required_handler_from_js(success);
        let handlers_ok =
            on_success.is_callable() && on_error.as_ref().is_none_or(Handler::is_callable);
        let params = match params.map(params_from_js).transpose() {
            Ok(params) => params.flatten(),
            Err(err) if handlers_ok => {
                warn!(%operation, %err, "Background.{operation} failure: parameters are not JSON values");
                return false;
            }
            // the client reports the bad callback
            Err(_) => None,
        };

        // `register` keeps its callbacks for the state updates that follow
        let dispatched = if operation == Operation::Register {
            self.client
                .dispatch_kept(operation, on_success, on_error, params)
        } else {
            self.client.dispatch(operation, on_success, on_error, params)
        };
        dispatched.is_ok()
    }
}

#[wasm_bindgen]
impl Background {
    /// Register for device power state changes
    ///
    /// `success` receives the acknowledgement and then `{ state }` for every
    /// change until `unregister`.
    pub fn register(&self, success: JsValue, error: JsValue) -> bool {
        self.dispatch(Operation::Register, success, error, None)
    }

    /// Unregister from device power state changes
    pub fn unregister(&self, success: JsValue, error: JsValue) -> bool {
        self.dispatch(Operation::Unregister, success, error, None)
    }

    /// Set an OS alarm; `parameters` must be a non-empty array
    #[wasm_bindgen(js_name = setAlarm)]
    pub fn set_alarm(&self, success: JsValue, error: JsValue, parameters: JsValue) -> bool {
        self.dispatch(Operation::SetAlarm, success, error, Some(&parameters))
    }

    /// Cancel the pending OS alarm
    #[wasm_bindgen(js_name = cancelAlarm)]
    pub fn cancel_alarm(&self, success: JsValue, error: JsValue) -> bool {
        self.dispatch(Operation::CancelAlarm, success, error, None)
    }

    /// Report the native plugin's startup timestamp
    #[wasm_bindgen(js_name = getStartupTimestamp)]
    pub fn get_startup_timestamp(&self, success: JsValue, error: JsValue) -> bool {
        self.dispatch(Operation::GetStartupTimestamp, success, error, None)
    }

    /// Startup timestamp in milliseconds, as a Promise
    ///
    /// Rejects timestamps a JavaScript number cannot hold exactly.
    #[wasm_bindgen(js_name = startupTimestamp)]
    pub fn startup_timestamp(&self) -> Promise {
        let client = Rc::clone(&self.client);
        future_to_promise(async move {
            let timestamp = client.startup_timestamp().await.map_err(error_to_js)?;
            millis_to_js(timestamp.as_millis())
        })
    }

    /// Schedule an alarm `delay_secs` seconds from now, as a Promise
    #[wasm_bindgen(js_name = scheduleAlarm)]
    pub fn schedule_alarm(&self, delay_secs: u32) -> Promise {
        let completion = self
            .client
            .schedule_alarm(AlarmRequest::after_secs(delay_secs));
        future_to_promise(async move {
            let payload = completion.await.map_err(error_to_js)?;
            JsValue::from_serde(&payload).map_err(|err| JsValue::from_str(&err.to_string()))
        })
    }

    /// Register and call `listener` with `{ state }` for every state change
    pub fn watch(&self, listener: Function) {
        let mut updates = self.client.state_updates();
        spawn_local(async move {
            while let Some(update) = updates.next().await {
                match update {
                    Ok(update) => {
                        trace!(%update, "Forwarding state update");
                        let Ok(value) = JsValue::from_serde(&update) else {
                            continue;
                        };
                        if let Err(err) = listener.call1(&JsValue::NULL, &value) {
                            warn!(?err, "Background listener threw");
                        }
                    }
                    Err(err) => warn!(%err, "Background state update failed"),
                }
            }
        });
    }
}

/// `Number.MAX_SAFE_INTEGER`
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

fn millis_to_js(millis: u64) -> Result<JsValue, JsValue> {
    if millis > MAX_SAFE_INTEGER {
        return Err(JsValue::from_str(&format!(
            "Startup timestamp {millis} exceeds Number.MAX_SAFE_INTEGER"
        )));
    }
    Ok(JsValue::from_f64(millis as f64))
}

/// Native rejections reach JavaScript as the original error value
fn error_to_js(err: Error) -> JsValue {
    match err {
        Error::Rejected(value) => JsValue::from_serde(&value).unwrap_or(JsValue::NULL),
        other => JsValue::from_str(&other.to_string()),
    }
}
