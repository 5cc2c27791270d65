//! Rendering foreground notifications.

use async_trait::async_trait;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Notification, NotificationOptions, NotificationPermission, ServiceWorkerRegistration};

use herald_client::error::RenderError;
use herald_client::ports::NotificationSurface;
use herald_common::payload::NotificationEnvelope;

use crate::platform::{notifications_supported, service_worker_container};

/// Payload attached to worker-rendered notifications. The worker's
/// `notificationclick` handler reads `url` to decide where to navigate.
#[derive(Serialize)]
struct ClickData<'a> {
    url: Option<&'a str>,
    #[serde(flatten)]
    data: &'a std::collections::BTreeMap<String, String>,
}

fn options_for(envelope: &NotificationEnvelope) -> NotificationOptions {
    let options = NotificationOptions::new();
    options.set_body(&envelope.body);
    options.set_tag(&envelope.dedup_tag);
    if let Some(icon) = &envelope.icon {
        options.set_icon(icon);
    }
    let click = ClickData {
        url: envelope.click_url.as_deref(),
        data: &envelope.data,
    };
    // Plain object, not a JS Map, so the worker can read `data.url`.
    match click.serialize(&serde_wasm_bindgen::Serializer::json_compatible()) {
        Ok(value) => options.set_data(&value),
        Err(err) => log::warn!("Failed to attach notification data: {err}"),
    }
    options
}

fn render_err(err: JsValue) -> RenderError {
    RenderError::Failed(format!("{err:?}"))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserSurface;

impl BrowserSurface {
    pub fn new() -> Self {
        Self
    }

    fn ensure_permitted() -> Result<(), RenderError> {
        if !notifications_supported() || Notification::permission() != NotificationPermission::Granted {
            return Err(RenderError::NotPermitted);
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl NotificationSurface for BrowserSurface {
    async fn show_via_worker(&self, envelope: &NotificationEnvelope) -> Result<(), RenderError> {
        Self::ensure_permitted()?;
        let container = service_worker_container().ok_or(RenderError::NoActiveWorker)?;

        let found = JsFuture::from(container.get_registration())
            .await
            .map_err(render_err)?;
        let registration = found
            .dyn_into::<ServiceWorkerRegistration>()
            .map_err(|_| RenderError::NoActiveWorker)?;
        if registration.active().is_none() {
            return Err(RenderError::NoActiveWorker);
        }

        let promise = registration
            .show_notification_with_options(&envelope.title, &options_for(envelope))
            .map_err(render_err)?;
        JsFuture::from(promise).await.map_err(render_err)?;
        Ok(())
    }

    fn show_in_page(&self, envelope: &NotificationEnvelope) -> Result<(), RenderError> {
        Self::ensure_permitted()?;
        let notification =
            Notification::new_with_options(&envelope.title, &options_for(envelope)).map_err(render_err)?;

        if let Some(url) = envelope.click_url.clone() {
            let on_click = Closure::<dyn FnMut()>::new(move || {
                if let Some(window) = web_sys::window() {
                    let _ = window.focus();
                    if let Err(e) = window.location().set_href(&url) {
                        log::warn!("notification click navigation failed: {e:?}");
                    }
                }
            });
            notification.set_onclick(Some(on_click.as_ref().unchecked_ref()));
            on_click.forget();
        }
        Ok(())
    }
}
