//! Bindings to the Firebase Messaging compat SDK.
//!
//! The host page loads `firebase-app-compat.js` and
//! `firebase-messaging-compat.js` and calls `firebase.initializeApp(...)`
//! before the wasm module starts; these bindings only talk to the global
//! `firebase.messaging()` instance.

use wasm_bindgen::prelude::*;

use herald_client::error::PlatformError;
use herald_client::ports::{MessageCallback, MessageSource};
use herald_common::payload::PushMessage;

#[wasm_bindgen]
extern "C" {
    /// `firebase.messaging.Messaging`.
    #[derive(Clone)]
    pub type Messaging;

    #[wasm_bindgen(catch, js_namespace = firebase, js_name = messaging)]
    fn messaging_instance() -> Result<Messaging, JsValue>;

    #[wasm_bindgen(method, catch, js_name = getToken)]
    async fn get_token(this: &Messaging, options: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, js_name = onMessage)]
    fn on_message(this: &Messaging, next: &Closure<dyn FnMut(JsValue)>) -> JsValue;
}

/// The global messaging instance, or an error when the SDK is not loaded.
pub fn messaging() -> Result<Messaging, PlatformError> {
    messaging_instance().map_err(|e| PlatformError(format!("firebase messaging unavailable: {e:?}")))
}

/// Request a registration token bound to `registration`.
pub async fn token_for(
    registration: &web_sys::ServiceWorkerRegistration,
    vapid_key: &str,
) -> Result<String, PlatformError> {
    let options = js_sys::Object::new();
    js_sys::Reflect::set(&options, &"vapidKey".into(), &vapid_key.into())
        .and_then(|_| {
            js_sys::Reflect::set(&options, &"serviceWorkerRegistration".into(), registration)
        })
        .map_err(|e| PlatformError(format!("{e:?}")))?;

    let token = messaging()?
        .get_token(&options)
        .await
        .map_err(|e| PlatformError(format!("getToken failed: {e:?}")))?;

    token
        .as_string()
        .ok_or_else(|| PlatformError("getToken resolved without a token".into()))
}

/// Foreground message feed of `firebase.messaging().onMessage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirebaseMessageSource;

impl MessageSource for FirebaseMessageSource {
    fn subscribe(&self, callback: MessageCallback) -> Result<(), PlatformError> {
        let messaging = messaging()?;

        let on_message = Closure::<dyn FnMut(JsValue)>::new(move |payload: JsValue| {
            match serde_wasm_bindgen::from_value::<PushMessage>(payload) {
                Ok(message) => callback(message),
                Err(err) => log::warn!("Failed to parse push payload: {err}"),
            }
        });
        messaging.on_message(&on_message);

        // The subscription lives as long as the page.
        on_message.forget();
        Ok(())
    }
}
