//! Notification permission and service worker lifecycle via web-sys.

use async_trait::async_trait;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Notification, ServiceWorkerContainer, ServiceWorkerRegistration};

use herald_client::error::PlatformError;
use herald_client::ports::{Permission, PushPlatform};

use crate::firebase;

fn js_err(context: &str, err: JsValue) -> PlatformError {
    PlatformError(format!("{context}: {err:?}"))
}

/// `navigator.serviceWorker`, if this browser has one.
pub(crate) fn service_worker_container() -> Option<ServiceWorkerContainer> {
    let navigator = web_sys::window()?.navigator();
    let has = js_sys::Reflect::has(&navigator, &JsValue::from_str("serviceWorker")).unwrap_or(false);
    has.then(|| navigator.service_worker())
}

/// Whether the `Notification` constructor exists.
pub(crate) fn notifications_supported() -> bool {
    web_sys::window()
        .map(|w| js_sys::Reflect::has(&w, &JsValue::from_str("Notification")).unwrap_or(false))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserPlatform;

impl BrowserPlatform {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl PushPlatform for BrowserPlatform {
    type Worker = ServiceWorkerRegistration;

    fn supports_service_worker(&self) -> bool {
        service_worker_container().is_some()
    }

    async fn request_permission(&self) -> Result<Permission, PlatformError> {
        if !notifications_supported() {
            return Err(PlatformError("Notification API not available".into()));
        }
        let promise = Notification::request_permission()
            .map_err(|e| js_err("Notification.requestPermission", e))?;
        let answer = JsFuture::from(promise)
            .await
            .map_err(|e| js_err("Notification.requestPermission", e))?;

        Ok(match answer.as_string().as_deref() {
            Some("granted") => Permission::Granted,
            Some("denied") => Permission::Denied,
            _ => Permission::Default,
        })
    }

    async fn register_worker(&self, script_url: &str) -> Result<ServiceWorkerRegistration, PlatformError> {
        let container = service_worker_container()
            .ok_or_else(|| PlatformError("service workers not supported".into()))?;

        // register() hands back the existing registration when the script
        // and scope are unchanged.
        let registration = JsFuture::from(container.register(script_url))
            .await
            .map_err(|e| js_err("serviceWorker.register", e))?;

        registration
            .dyn_into::<ServiceWorkerRegistration>()
            .map_err(|e| js_err("serviceWorker.register returned", e))
    }

    async fn update_worker(&self, worker: &ServiceWorkerRegistration) -> Result<(), PlatformError> {
        let promise = worker
            .update()
            .map_err(|e| js_err("registration.update", e))?;
        JsFuture::from(promise)
            .await
            .map_err(|e| js_err("registration.update", e))?;
        Ok(())
    }

    async fn device_token(
        &self,
        worker: &ServiceWorkerRegistration,
        vapid_key: &str,
    ) -> Result<String, PlatformError> {
        firebase::token_for(worker, vapid_key).await
    }
}
