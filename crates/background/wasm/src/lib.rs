#![cfg(target_arch = "wasm32")]
//! `wasm32` binding exposing the Background plugin to JavaScript
//!
//! Calls travel over the global `cordova.exec`, so the module has to be loaded
//! after the `deviceready` event.

use std::{cell::RefCell, sync::Once};

use background_client::{BackgroundClient, ClientConfig};
use gloo_utils::format::JsValueSerdeExt;
use wasm_bindgen::prelude::*;

mod background;
mod bridge;
mod handler;

pub use background::Background;
pub use bridge::CordovaBridge;

// Process-wide instance handed out by `background()`
thread_local! {
    static INSTANCE: RefCell<Option<Background>> = const { RefCell::new(None) };
}

static TRACING: Once = Once::new();

/// Install the shared `Background` instance, replacing any previous one
///
/// `config` is an optional object such as `{ plugin: "Background" }`.
#[wasm_bindgen(js_name = installBackground)]
pub fn install(config: JsValue) -> Result<Background, JsValue> {
    // print pretty errors in wasm https://github.com/rustwasm/console_error_panic_hook
    console_error_panic_hook::set_once();
    TRACING.call_once(|| {
        let _ = wasm_tracing::set_as_global_default();
    });

    let config = if config.is_undefined() || config.is_null() {
        ClientConfig::default()
    } else {
        config
            .into_serde::<ClientConfig>()
            .map_err(|err| JsValue::from_str(&format!("Invalid Background config: {err}")))?
    };

    let background = Background::from_client(BackgroundClient::with_config(CordovaBridge, config));
    INSTANCE.with(|instance| *instance.borrow_mut() = Some(background.clone()));
    Ok(background)
}

/// The shared `Background` instance, installed with defaults on first use
#[wasm_bindgen]
pub fn background() -> Result<Background, JsValue> {
    if let Some(background) = INSTANCE.with(|instance| instance.borrow().clone()) {
        return Ok(background);
    }
    install(JsValue::UNDEFINED)
}
