//! Capability ports.
//!
//! Each trait stands in for one browser-owned resource. The browser build
//! implements them with `web-sys`/`gloo`; tests use in-memory fakes.

use async_trait::async_trait;

use herald_common::payload::{NotificationEnvelope, PushMessage};
use herald_common::protocol::TokenRequest;

use crate::error::{PlatformError, RegistryError, RenderError, StorageError};

// ── Storage ─────────────────────────────────────────────────────────

/// Persistent string key-value store. Single-key reads and writes are
/// atomic; nothing else is assumed.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn delete(&self, key: &str);
}

// ── Push platform ───────────────────────────────────────────────────

/// Outcome of a notification permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// The user dismissed the prompt without choosing.
    Default,
}

/// Permission prompts, service worker lifecycle, and the provider SDK.
#[async_trait(?Send)]
pub trait PushPlatform {
    /// Handle to a service worker registration.
    type Worker: Clone + 'static;

    fn supports_service_worker(&self) -> bool;

    /// Ask the user for notification permission. Suspends until answered.
    async fn request_permission(&self) -> Result<Permission, PlatformError>;

    /// Register the worker at `script_url`, or return the existing
    /// registration for it.
    async fn register_worker(&self, script_url: &str) -> Result<Self::Worker, PlatformError>;

    /// Force the browser to re-check the worker script.
    async fn update_worker(&self, worker: &Self::Worker) -> Result<(), PlatformError>;

    /// Ask the provider for a device token bound to `worker`.
    async fn device_token(
        &self,
        worker: &Self::Worker,
        vapid_key: &str,
    ) -> Result<String, PlatformError>;
}

// ── Registry ────────────────────────────────────────────────────────

/// The backend token registry (`/fcm-tokens/*`).
#[async_trait(?Send)]
pub trait TokenRegistry {
    async fn save(&self, bearer: &str, request: &TokenRequest) -> Result<(), RegistryError>;
    async fn remove(&self, bearer: &str, request: &TokenRequest) -> Result<(), RegistryError>;
    async fn send_test(&self, bearer: &str) -> Result<(), RegistryError>;
}

// ── Rendering ───────────────────────────────────────────────────────

/// Where foreground notifications are drawn.
#[async_trait(?Send)]
pub trait NotificationSurface {
    /// Show through the active service worker registration so clicks are
    /// routed through the worker's click handler.
    async fn show_via_worker(&self, envelope: &NotificationEnvelope) -> Result<(), RenderError>;

    /// Show as an in-page notification object.
    fn show_in_page(&self, envelope: &NotificationEnvelope) -> Result<(), RenderError>;
}

// ── Incoming messages ───────────────────────────────────────────────

pub type MessageCallback = Box<dyn Fn(PushMessage)>;

/// Foreground message feed of the push provider.
pub trait MessageSource {
    /// Install `callback` for every message received while the page is
    /// open. There is no unsubscribe; the subscription ends with the page.
    fn subscribe(&self, callback: MessageCallback) -> Result<(), PlatformError>;
}

// ── Clock ───────────────────────────────────────────────────────────

pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
