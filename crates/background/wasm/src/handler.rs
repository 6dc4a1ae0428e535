use background_client::Handler;
use gloo_utils::format::JsValueSerdeExt;
use js_sys::{Array, Function, JSON};
use serde_json::Value;
use tracing::warn;
use wasm_bindgen::prelude::*;

/// Interpret a JavaScript argument passed where a callback is expected
///
/// `undefined` and `null` count as absent. A function may be invoked for
/// every answer of a kept call.
pub(crate) fn handler_from_js(value: JsValue) -> Option<Handler> {
    if value.is_undefined() || value.is_null() {
        return None;
    }
    Some(match value.dyn_into::<Function>() {
        Ok(function) => Handler::repeating(move |payload: Value| {
            let argument = JsValue::from_serde(&payload).unwrap_or(JsValue::UNDEFINED);
            if let Err(err) = function.call1(&JsValue::NULL, &argument) {
                warn!(?err, "Background callback threw");
            }
        }),
        Err(other) => Handler::not_callable(other.js_typeof().as_string().unwrap_or_default()),
    })
}

/// A required callback; absent counts as not callable
pub(crate) fn required_handler_from_js(value: JsValue) -> Handler {
    let kind = value.js_typeof().as_string().unwrap_or_default();
    handler_from_js(value).unwrap_or_else(|| Handler::not_callable(kind))
}

/// `setAlarm` parameters: anything other than an array counts as absent
///
/// Fails for arrays holding values JSON cannot express, such as a `BigInt`.
pub(crate) fn params_from_js(value: &JsValue) -> Result<Option<Vec<Value>>, String> {
    if !Array::is_array(value) {
        return Ok(None);
    }
    // JSON.stringify throws on BigInt and cycles
    let json = JSON::stringify(value).map_err(|err| {
        err.dyn_into::<js_sys::Error>()
            .map_or_else(|_| "not serializable".to_string(), |err| err.message().into())
    })?;
    serde_json::from_str(&String::from(json))
        .map(Some)
        .map_err(|err| err.to_string())
}
